//! Shared fixtures: a temporary bongo directory plus fake MongoDB tools
//! written as small shell scripts that log their arguments.

#![allow(dead_code)]

use bongo::{Bongo, Config};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let sandbox = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(sandbox.path("bin")).unwrap();
        fs::create_dir_all(sandbox.path("scripts")).unwrap();
        fs::create_dir_all(sandbox.path("out")).unwrap();
        sandbox
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write an executable `#!/bin/sh` script and return its path.
    pub fn tool(&self, name: &str, body: &str) -> String {
        let path = self.path("bin").join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    /// A fake `mongo` shell.
    ///
    /// `--eval` probes succeed unless the `probe-fails` marker exists. Script
    /// runs copy the script to `scripts/<n>.js`, record its path in
    /// `script-paths`, and fail if the `script-fails` marker exists.
    pub fn mongo(&self) -> String {
        let root = self.dir.path().display();
        self.tool(
            "mongo",
            &format!(
                r#"echo "mongo $*" >> "{root}/log"
case "$*" in
  *--eval*)
    if [ -f "{root}/probe-fails" ]; then
      echo "command usersInfo requires authentication"
      exit 1
    fi
    echo "[ ]"
    exit 0
    ;;
esac
for last; do :; done
n=$(ls "{root}/scripts" | wc -l | tr -d ' ')
cp "$last" "{root}/scripts/$n.js"
echo "$last" >> "{root}/script-paths"
if [ -f "{root}/script-fails" ]; then
  echo "Error: couldn't add user: not authorized on admin"
  exit 252
fi
echo "Successfully added user""#
            ),
        )
    }

    pub fn config(&self) -> Config {
        let mut config = Config::with_dir(self.path("home/.bongo"));
        config.tools.mongo = self.mongo();
        config
    }

    pub fn bongo(&self) -> Bongo {
        Bongo::new(self.config())
    }

    pub fn mark(&self, marker: &str) {
        fs::write(self.path(marker), "").unwrap();
    }

    pub fn unmark(&self, marker: &str) {
        let _ = fs::remove_file(self.path(marker));
    }

    /// Everything the fake tools logged, one invocation per line.
    pub fn log(&self) -> String {
        fs::read_to_string(self.path("log")).unwrap_or_default()
    }

    /// Scripts the fake `mongo` ran, in order.
    pub fn scripts(&self) -> Vec<String> {
        let mut scripts = Vec::new();
        let dir = self.path("scripts");
        while let Ok(s) = fs::read_to_string(dir.join(format!("{}.js", scripts.len()))) {
            scripts.push(s);
        }
        scripts
    }

    /// Paths of the scratch files handed to the fake `mongo`.
    pub fn script_paths(&self) -> Vec<PathBuf> {
        fs::read_to_string(self.path("script-paths"))
            .unwrap_or_default()
            .lines()
            .map(PathBuf::from)
            .collect()
    }

    pub fn credentials_path(&self) -> PathBuf {
        Config::with_dir(self.path("home/.bongo")).credentials_file()
    }
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Collects what the tool logs while installed as the thread's subscriber.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

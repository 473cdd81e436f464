//! Running scripts through the `mongo` shell

use super::script::Script;
use crate::credentials::ADMIN_DB;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, instrument};

/// How the shell authenticates.
#[derive(Debug, Clone, Copy)]
pub enum ShellAuth<'a> {
    /// No credentials; only works while security is disabled or for
    /// localhost-exception access.
    None,
    /// As the admin database's `root` user.
    Root(&'a str),
}

impl ShellAuth<'_> {
    fn args(&self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::Root(password) => vec![
                "-u".to_string(),
                "root".to_string(),
                "-p".to_string(),
                password.to_string(),
                "--authenticationDatabase".to_string(),
                ADMIN_DB.to_string(),
            ],
        }
    }
}

/// The `mongo` shell binary
#[derive(Debug, Clone)]
pub struct MongoShell {
    bin: String,
}

impl MongoShell {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// List users without credentials.
    ///
    /// Returns whether the server allowed it. An error means the shell itself
    /// could not be started.
    pub async fn probe_unauthenticated(&self) -> Result<bool> {
        let output = common::run(&self.bin, &["--quiet", "--eval", "db.getUsers()"]).await?;
        debug!(success = output.success, "Unauthenticated probe finished");
        Ok(output.success)
    }

    /// Run `script` from a scratch file and return the shell's output.
    ///
    /// The scratch file holds passwords; it is created 0600 and deleted when
    /// this returns, whatever the result.
    #[instrument(skip_all, fields(statements = script.statements().len()))]
    pub async fn run_script(&self, script: &Script, auth: ShellAuth<'_>) -> Result<String> {
        let mut scratch = tempfile::Builder::new()
            .prefix("bongo-")
            .suffix(".js")
            .tempfile()
            .context("Failed to create scratch script")?;
        scratch
            .write_all(script.render().as_bytes())
            .and_then(|_| scratch.flush())
            .context("Failed to write scratch script")?;

        let mut args = auth.args();
        args.push("--quiet".to_string());
        args.push(scratch.path().display().to_string());

        let output = common::check(&self.bin, common::run(&self.bin, args.as_slice()).await?)?;
        Ok(output.combined())
    }
}

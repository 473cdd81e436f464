//! Tool configuration
//!
//! Built once at process start and passed to [`crate::Bongo`]. Every path and
//! external binary the workflows touch is named here.

use crate::error::{BongoError, Result};
use common::ConfigExt;
use std::path::{Path, PathBuf};

/// Default mongod port
pub const DEFAULT_PORT: u16 = 27017;

/// Name of the credentials file inside the bongo directory
pub const CREDENTIALS_FILE: &str = "credentials.json5";

/// mongod config on Linux (apt/yum packages)
pub const LINUX_MONGOD_CONF: &str = "/etc/mongod.conf";

/// mongod config on macOS (Homebrew)
pub const MACOS_MONGOD_CONF: &str = "/usr/local/etc/mongod.conf";

/// External programs the workflows drive.
///
/// Each entry is either a bare name looked up on `PATH` or a path.
#[derive(Debug, Clone)]
pub struct Tools {
    pub mongo: String,
    pub mongodump: String,
    pub mongorestore: String,
    pub tar: String,
    pub systemctl: String,
    pub lsb_release: String,
    pub brew: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            mongo: "mongo".to_string(),
            mongodump: "mongodump".to_string(),
            mongorestore: "mongorestore".to_string(),
            tar: "tar".to_string(),
            systemctl: "systemctl".to_string(),
            lsb_release: "lsb_release".to_string(),
            brew: "brew".to_string(),
        }
    }
}

impl Tools {
    /// Load tool names from `BONGO_<TOOL>` environment variables
    pub fn from_env() -> Self {
        Self {
            mongo: String::env_or("BONGO_MONGO", "mongo"),
            mongodump: String::env_or("BONGO_MONGODUMP", "mongodump"),
            mongorestore: String::env_or("BONGO_MONGORESTORE", "mongorestore"),
            tar: String::env_or("BONGO_TAR", "tar"),
            systemctl: String::env_or("BONGO_SYSTEMCTL", "systemctl"),
            lsb_release: String::env_or("BONGO_LSB_RELEASE", "lsb_release"),
            brew: String::env_or("BONGO_BREW", "brew"),
        }
    }
}

/// Configuration for the bongo tool
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the credentials file
    pub dir: PathBuf,
    pub tools: Tools,
    /// Overrides the platform's well-known mongod config path
    pub mongod_conf: Option<PathBuf>,
}

impl Config {
    /// Configuration rooted at `dir` with default tool names.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tools: Tools::default(),
            mongod_conf: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// The bongo directory is `BONGO_DIR` if set, otherwise `~/.bongo`.
    pub fn from_env() -> Result<Self> {
        let dir = match String::env_opt("BONGO_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".bongo"))
                .ok_or_else(|| {
                    BongoError::Precondition("Cannot determine home directory".to_string())
                })?,
        };

        Ok(Self {
            dir,
            tools: Tools::from_env(),
            mongod_conf: String::env_opt("BONGO_MONGOD_CONF").map(PathBuf::from),
        })
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// The mongod config to rewrite, given the platform's default location.
    pub fn mongod_conf_or<'a>(&'a self, platform_default: &'a str) -> &'a Path {
        self.mongod_conf
            .as_deref()
            .unwrap_or_else(|| Path::new(platform_default))
    }
}

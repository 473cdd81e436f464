//! mongod service toggle
//!
//! Switches MongoDB security on or off, chooses between binding to every
//! interface or localhost only, and restarts the daemon with the platform's
//! service manager.

pub mod mongod_conf;

use crate::config::{LINUX_MONGOD_CONF, MACOS_MONGOD_CONF};
use crate::error::{ensure_commands, BongoError, Result};
use crate::{Bongo, Outcome};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// Desired daemon settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceToggle {
    /// Require authentication
    pub auth: bool,
    /// Bind to all interfaces instead of localhost only
    pub bind_all: bool,
}

/// Platforms with a known mongod layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Whether `lsb_release -a` output names a release this tool was tested on
fn is_tested_release(release: &str) -> bool {
    release.contains("Ubuntu 16.") || release.contains("Ubuntu 18.")
}

async fn rewrite_config(path: &Path, toggle: ServiceToggle) -> Result<()> {
    let content = fs::read_to_string(path).await?;
    let updated = mongod_conf::apply(&content, toggle)?;
    fs::write(path, updated).await?;
    info!(path = %path.display(), "mongod config updated");
    Ok(())
}

impl Bongo {
    /// Apply `toggle` to the local mongod and restart it.
    pub async fn mongo(&self, toggle: ServiceToggle) -> Result<Outcome> {
        self.mongo_on(Platform::current(), toggle).await
    }

    /// Like [`Bongo::mongo`], for an explicitly chosen platform.
    pub async fn mongo_on(&self, platform: Platform, toggle: ServiceToggle) -> Result<Outcome> {
        info!(
            "Attempting to {} security and bind to {} IP address{}",
            if toggle.auth { "enable" } else { "disable" },
            if toggle.bind_all { "all" } else { "localhost" },
            if toggle.bind_all { "es" } else { "" }
        );

        let tools = &self.config.tools;
        let restart = match platform {
            Platform::Linux => {
                if !nix::unistd::geteuid().is_root() {
                    return Err(BongoError::NotRoot);
                }
                ensure_commands(&[tools.systemctl.as_str(), tools.lsb_release.as_str()])?;

                let release = match common::run_checked(&tools.lsb_release, &["-a"]).await {
                    Ok(output) => output.stdout,
                    Err(e) => return Ok(Outcome::failed("Cannot determine Linux release.", e)),
                };
                if !is_tested_release(&release) {
                    warn!("This release of Linux has not been tested");
                }

                rewrite_config(self.config.mongod_conf_or(LINUX_MONGOD_CONF), toggle).await?;
                common::run_checked(&tools.systemctl, &["restart", "mongod"])
                    .await
                    .map_err(|e| Outcome::failed("Cannot restart 'mongod' service.", e))
            }
            Platform::MacOs => {
                ensure_commands(&[tools.brew.as_str()])?;

                rewrite_config(self.config.mongod_conf_or(MACOS_MONGOD_CONF), toggle).await?;
                common::run_checked(&tools.brew, &["services", "restart", "mongodb"])
                    .await
                    .map_err(|e| Outcome::failed("Unable to restart 'mongodb' service.", e))
            }
            Platform::Other(os) => return Err(BongoError::UnsupportedPlatform(os)),
        };

        Ok(match restart {
            Ok(_) => Outcome::Success("MongoDB restarted".to_string()),
            Err(failed) => failed,
        })
    }
}

//! Opinionated MongoDB administration
//!
//! Ensures the right users and passwords exist for each database and keeps
//! the generated passwords in a credentials file. Creates and restores backup
//! archives with those credentials, and switches the daemon's security and
//! network binding on or off.
//!
//! [`Bongo`] runs one workflow per call; every workflow returns
//! `Result<Outcome, BongoError>`.

pub mod archive;
pub mod config;
pub mod credentials;
pub mod error;
pub mod outcome;
pub mod service;
pub mod shell;
mod users;

pub use archive::{ArchiveFormat, BackupOptions, RestoreOptions};
pub use config::{Config, Tools};
pub use credentials::{AdminCredentials, CredentialFile, Credentials, PasswordPair};
pub use error::{BongoError, Result};
pub use outcome::Outcome;
pub use service::ServiceToggle;

use shell::MongoShell;

/// Runs bongo workflows against one configuration.
#[derive(Debug, Clone)]
pub struct Bongo {
    config: Config,
    credentials: CredentialFile,
    shell: MongoShell,
}

impl Bongo {
    pub fn new(config: Config) -> Self {
        let credentials = CredentialFile::new(config.credentials_file());
        let shell = MongoShell::new(config.tools.mongo.clone());
        Self {
            config,
            credentials,
            shell,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialFile {
        &self.credentials
    }
}

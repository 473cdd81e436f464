//! Error types for bongo workflows
//!
//! These are the failures that stop a workflow before (or instead of) doing
//! its work. Failures of the external tools themselves are not errors; they
//! are reported through [`crate::Outcome::Failed`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BongoError {
    #[error("No 'admin' database root user. Run tool on 'admin' database first.")]
    AdminNotProvisioned,

    #[error("{0}")]
    Precondition(String),

    #[error("Command '{0}' does not exist. Please install it.")]
    MissingCommand(String),

    #[error("Output directory '{}' does not exist", .0.display())]
    OutputDirectoryMissing(PathBuf),

    #[error("Archive file '{}' does not exist", .0.display())]
    ArchiveMissing(PathBuf),

    #[error("Must run this command under sudo on Linux")]
    NotRoot,

    #[error("This platform ({0}) is not yet supported")]
    UnsupportedPlatform(String),

    #[error("failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BongoError>;

/// Fail with [`BongoError::MissingCommand`] unless every command is installed.
pub fn ensure_commands(cmds: &[&str]) -> Result<()> {
    match common::find_missing(cmds) {
        Some(cmd) => Err(BongoError::MissingCommand(cmd.to_string())),
        None => Ok(()),
    }
}

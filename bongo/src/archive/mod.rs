//! Backup and restore
//!
//! Dumps go through `mongodump`/`mongorestore`, authenticating as the admin
//! database's `backup`/`restore` users when their passwords are stored.
//! Two container formats are supported:
//! - `tar`: `mongodump` into a directory, then `tar -czf` (`.tar.gz`)
//! - `archive`: `mongodump --gzip --archive` into a staging file (`.archive`)
//!
//! Either way the backup is built in a temporary directory and only moved
//! into the output directory once every step succeeded.

mod backup;
mod restore;

use crate::config::DEFAULT_PORT;
use crate::credentials::ADMIN_DB;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Backup container format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveFormat {
    #[default]
    Tar,
    Archive,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tar => "tar.gz",
            Self::Archive => "archive",
        }
    }

    /// Guess the format of an existing backup from its file name.
    pub fn detect(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "archive" => Self::Archive,
            _ => Self::Tar,
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tar" => Ok(Self::Tar),
            "archive" => Ok(Self::Archive),
            other => Err(format!(
                "unknown archive format '{}' (expected 'tar' or 'archive')",
                other
            )),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tar => "tar",
            Self::Archive => "archive",
        })
    }
}

/// Inputs to [`crate::Bongo::backup`]
#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub database: String,
    pub port: u16,
    /// Name the database has inside the backup
    pub new_name: Option<String>,
    /// Existing directory for the backup file; defaults to the current directory
    pub output: Option<PathBuf>,
    pub format: ArchiveFormat,
}

impl BackupOptions {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            port: DEFAULT_PORT,
            new_name: None,
            output: None,
            format: ArchiveFormat::default(),
        }
    }
}

/// Inputs to [`crate::Bongo::restore`]
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    pub archive: PathBuf,
    pub port: u16,
}

impl RestoreOptions {
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            port: DEFAULT_PORT,
        }
    }
}

/// UTC timestamp used in backup file names, e.g. `20240131-174502Z`
pub fn backup_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d-%H%M%SZ").to_string()
}

pub fn backup_file_name(name: &str, format: ArchiveFormat, now: DateTime<Utc>) -> String {
    format!("{}-{}.{}", name, backup_timestamp(now), format.extension())
}

/// `mongodump`/`mongorestore` arguments to authenticate as an admin database user
fn auth_args(user: &str, password: &str) -> Vec<String> {
    vec![
        "-u".to_string(),
        user.to_string(),
        "-p".to_string(),
        password.to_string(),
        format!("--authenticationDatabase={}", ADMIN_DB),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_24_hour_utc() {
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 17, 45, 2).unwrap();
        assert_eq!(backup_timestamp(now), "20240131-174502Z");
    }

    #[test]
    fn test_file_names() {
        let now = Utc.with_ymd_and_hms(2023, 7, 4, 9, 5, 0).unwrap();
        assert_eq!(
            backup_file_name("shop", ArchiveFormat::Tar, now),
            "shop-20230704-090500Z.tar.gz"
        );
        assert_eq!(
            backup_file_name("shop", ArchiveFormat::Archive, now),
            "shop-20230704-090500Z.archive"
        );
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            ArchiveFormat::detect(Path::new("/b/shop-20230704-090500Z.archive")),
            ArchiveFormat::Archive
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("/b/shop-20230704-090500Z.tar.gz")),
            ArchiveFormat::Tar
        );
        assert_eq!(ArchiveFormat::detect(Path::new("shop")), ArchiveFormat::Tar);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("archive".parse::<ArchiveFormat>(), Ok(ArchiveFormat::Archive));
        assert_eq!("tar".parse::<ArchiveFormat>(), Ok(ArchiveFormat::Tar));
        assert!("zip".parse::<ArchiveFormat>().is_err());
    }

    #[test]
    fn test_auth_args() {
        assert_eq!(
            auth_args("backup", "pw"),
            vec!["-u", "backup", "-p", "pw", "--authenticationDatabase=admin"]
        );
    }
}

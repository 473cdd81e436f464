//! Credentials file format and persistence

use super::password::generate_password;
use crate::error::{BongoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Name of MongoDB's privileged database
pub const ADMIN_DB: &str = "admin";

/// Passwords for the `admin` database's `root`, `backup` and `restore` users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub root: String,
    pub backup: String,
    pub restore: String,
}

impl AdminCredentials {
    pub fn generate() -> Self {
        Self {
            root: generate_password(),
            backup: generate_password(),
            restore: generate_password(),
        }
    }
}

/// Passwords for a regular database's `admin` and `user` users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPair {
    pub admin: String,
    pub user: String,
}

impl PasswordPair {
    pub fn generate() -> Self {
        Self {
            admin: generate_password(),
            user: generate_password(),
        }
    }
}

/// Everything in the credentials file.
///
/// On disk this is one flat object keyed by database name; the `admin` key
/// holds [`AdminCredentials`] and every other key a [`PasswordPair`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminCredentials>,
    #[serde(flatten)]
    pub databases: BTreeMap<String, PasswordPair>,
}

impl Credentials {
    pub fn database(&self, name: &str) -> Option<&PasswordPair> {
        self.databases.get(name)
    }

    pub fn set_database(&mut self, name: &str, passwords: PasswordPair) {
        self.databases.insert(name.to_string(), passwords);
    }
}

/// The credentials file on disk.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store, or an empty one if the file does not exist yet.
    pub async fn read(&self) -> Result<Credentials> {
        if !fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "No credentials file yet");
            return Ok(Credentials::default());
        }

        let content = fs::read_to_string(&self.path).await?;
        json5::from_str(&content).map_err(|e| BongoError::Parse {
            what: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Replace the file with `credentials`.
    ///
    /// The new content is written to a sibling file with mode 0600 and then
    /// renamed into place, so a failed write leaves the old file intact.
    pub async fn write(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::DirBuilder::new()
                .recursive(true)
                .mode(0o700)
                .create(parent)
                .await?;
        }

        let content = serde_json::to_string_pretty(credentials).map_err(|e| BongoError::Parse {
            what: "credentials".to_string(),
            reason: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("json5.tmp");
        let replaced = async {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&temp_path)
                .await?;
            file.write_all(content.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.sync_all().await?;
            drop(file);

            // mode() only applies when the file is created
            fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600)).await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;
        if let Err(e) = replaced {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), "Credentials written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Credentials {
        let mut creds = Credentials {
            admin: Some(AdminCredentials {
                root: "r00t".to_string(),
                backup: "b4ckup".to_string(),
                restore: "rest0re".to_string(),
            }),
            ..Default::default()
        };
        creds.set_database(
            "shop",
            PasswordPair {
                admin: "shopAdmin".to_string(),
                user: "shopUser".to_string(),
            },
        );
        creds
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("credentials.json5"));

        let creds = file.read().await.unwrap();
        assert_eq!(creds, Credentials::default());
        assert!(!file.path().exists());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("nested/credentials.json5"));

        file.write(&sample()).await.unwrap();
        assert_eq!(file.read().await.unwrap(), sample());
    }

    #[tokio::test]
    async fn test_write_sets_owner_only_permissions() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("credentials.json5"));

        file.write(&sample()).await.unwrap();

        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(!dir.path().join("credentials.json5.tmp").exists());
    }

    #[tokio::test]
    async fn test_flat_layout_on_disk() {
        let dir = TempDir::new().unwrap();
        let file = CredentialFile::new(dir.path().join("credentials.json5"));
        file.write(&sample()).await.unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["admin"]["root"], "r00t");
        assert_eq!(value["shop"]["user"], "shopUser");
        assert!(value.get("databases").is_none());
    }

    #[tokio::test]
    async fn test_reads_hand_edited_json5() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json5");
        std::fs::write(
            &path,
            r#"{
  // written by an older version
  admin: { root: 'r00t', backup: 'b4ckup', restore: 'rest0re', },
  shop: { admin: 'shopAdmin', user: 'shopUser' },
}"#,
        )
        .unwrap();

        let creds = CredentialFile::new(&path).read().await.unwrap();
        assert_eq!(creds, sample());
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json5");
        std::fs::write(&path, "{ admin: ").unwrap();

        let err = CredentialFile::new(&path).read().await.unwrap_err();
        assert!(matches!(err, BongoError::Parse { .. }), "{:?}", err);
    }

    #[test]
    fn test_generated_admin_passwords_are_distinct() {
        let admin = AdminCredentials::generate();
        assert_ne!(admin.root, admin.backup);
        assert_ne!(admin.backup, admin.restore);
        assert_ne!(admin.root, admin.restore);
    }
}

//! Database restore

use super::backup::log_output;
use super::{auth_args, ArchiveFormat, RestoreOptions};
use crate::error::{ensure_commands, BongoError, Result};
use crate::{Bongo, Outcome};
use anyhow::Context;
use std::path::Path;
use tokio::fs;
use tracing::info;

impl Bongo {
    /// Restore every database contained in a backup file.
    ///
    /// Restores always use `--drop`: collections in the target databases are
    /// replaced by the backup's contents.
    pub async fn restore(&self, options: &RestoreOptions) -> Result<Outcome> {
        let archive = if options.archive.is_absolute() {
            options.archive.clone()
        } else {
            std::env::current_dir()?.join(&options.archive)
        };
        let is_file = fs::metadata(&archive)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(BongoError::ArchiveMissing(archive));
        }

        let tools = &self.config.tools;
        let format = ArchiveFormat::detect(&archive);
        match format {
            ArchiveFormat::Tar => {
                ensure_commands(&[tools.mongorestore.as_str(), tools.tar.as_str()])?
            }
            ArchiveFormat::Archive => ensure_commands(&[tools.mongorestore.as_str()])?,
        }

        let credentials = self.credentials.read().await?;
        let auth = credentials
            .admin
            .as_ref()
            .map(|admin| auth_args("restore", &admin.restore))
            .unwrap_or_default();

        info!(archive = %archive.display(), port = options.port, %format, "Restoring backup");

        let result = match format {
            ArchiveFormat::Tar => self.restore_tar(&archive, options.port, auth).await,
            ArchiveFormat::Archive => self.restore_archive(&archive, options.port, auth).await,
        };

        Ok(match result {
            Ok(()) => Outcome::Success(format!(
                "MongoDB database(s) restored from '{}'",
                archive.display()
            )),
            Err(e) => Outcome::failed(
                format!("Unable to restore archive file '{}'.", archive.display()),
                e,
            ),
        })
    }

    async fn restore_tar(
        &self,
        archive: &Path,
        port: u16,
        auth: Vec<String>,
    ) -> anyhow::Result<()> {
        let tools = &self.config.tools;
        let work = tempfile::tempdir().context("Failed to create working directory")?;

        let archive = archive.display().to_string();
        common::check(
            &tools.tar,
            common::run_in(&tools.tar, &["-x", "-f", archive.as_str()], Some(work.path())).await?,
        )?;

        let mut args = vec!["--port".to_string(), port.to_string(), "--drop".to_string()];
        args.extend(auth);
        args.push("dump/".to_string());

        let output = common::check(
            &tools.mongorestore,
            common::run_in(&tools.mongorestore, args.as_slice(), Some(work.path())).await?,
        )?;
        log_output(&output.combined());
        Ok(())
    }

    async fn restore_archive(
        &self,
        archive: &Path,
        port: u16,
        auth: Vec<String>,
    ) -> anyhow::Result<()> {
        let mongorestore = &self.config.tools.mongorestore;
        let mut args = vec![
            "--port".to_string(),
            port.to_string(),
            "--drop".to_string(),
            "--gzip".to_string(),
            format!("--archive={}", archive.display()),
        ];
        args.extend(auth);

        let output = common::check(
            mongorestore,
            common::run(mongorestore, args.as_slice()).await?,
        )?;
        log_output(&output.combined());
        Ok(())
    }
}

//! Database backup

use super::{auth_args, backup_file_name, ArchiveFormat, BackupOptions};
use crate::error::{ensure_commands, BongoError, Result};
use crate::{Bongo, Outcome};
use anyhow::Context;
use chrono::Utc;
use std::path::Path;
use tokio::fs;
use tracing::info;

impl Bongo {
    /// Back up one database into a timestamped file in the output directory.
    ///
    /// The output directory is checked before any external command runs.
    /// Dump, rename, compression and move failures are reported as
    /// [`Outcome::Failed`]; the working directory is removed either way.
    pub async fn backup(&self, options: &BackupOptions) -> Result<Outcome> {
        let database = options.database.as_str();
        if database.is_empty() {
            return Err(BongoError::Precondition(
                "Database name must be given".to_string(),
            ));
        }

        let output_dir = match &options.output {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let is_dir = fs::metadata(&output_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(BongoError::OutputDirectoryMissing(output_dir));
        }

        let tools = &self.config.tools;
        match options.format {
            ArchiveFormat::Tar => {
                ensure_commands(&[tools.mongodump.as_str(), tools.tar.as_str()])?
            }
            ArchiveFormat::Archive => {
                if options.new_name.is_some() {
                    return Err(BongoError::Precondition(
                        "Renaming a database is only supported for tar backups".to_string(),
                    ));
                }
                ensure_commands(&[tools.mongodump.as_str()])?
            }
        }

        let credentials = self.credentials.read().await?;
        let auth = credentials
            .admin
            .as_ref()
            .map(|admin| auth_args("backup", &admin.backup))
            .unwrap_or_default();

        let name = options.new_name.as_deref().unwrap_or(database);
        let file_name = backup_file_name(name, options.format, Utc::now());
        let target = output_dir.join(&file_name);

        info!(database, port = options.port, format = %options.format, "Backing up database");

        let result = match options.format {
            ArchiveFormat::Tar => self.backup_tar(options, auth, &file_name, &target).await,
            ArchiveFormat::Archive => {
                self.backup_archive(options, auth, &file_name, &target)
                    .await
            }
        };

        Ok(match result {
            Ok(()) => Outcome::Success(format!(
                "MongoDB database '{}' backed up to '{}'",
                name,
                target.display()
            )),
            Err(e) => Outcome::failed(format!("Unable to backup database '{}'.", database), e),
        })
    }

    async fn backup_tar(
        &self,
        options: &BackupOptions,
        auth: Vec<String>,
        file_name: &str,
        target: &Path,
    ) -> anyhow::Result<()> {
        let tools = &self.config.tools;
        let work = tempfile::tempdir().context("Failed to create working directory")?;
        let dump_dir = work.path().join("dump");

        let mut args = vec![
            "--port".to_string(),
            options.port.to_string(),
            "--out".to_string(),
            dump_dir.display().to_string(),
            "--db".to_string(),
            options.database.clone(),
        ];
        args.extend(auth);
        let output = common::check(
            &tools.mongodump,
            common::run(&tools.mongodump, args.as_slice()).await?,
        )?;
        log_output(&output.combined());

        if let Some(new_name) = &options.new_name {
            info!("Renaming database to '{}'", new_name);
            fs::rename(dump_dir.join(&options.database), dump_dir.join(new_name))
                .await
                .context("Failed to rename dumped database")?;
        }

        common::check(
            &tools.tar,
            common::run_in(&tools.tar, &["-czf", file_name, "dump"], Some(work.path())).await?,
        )?;

        move_file(&work.path().join(file_name), target).await
    }

    async fn backup_archive(
        &self,
        options: &BackupOptions,
        auth: Vec<String>,
        file_name: &str,
        target: &Path,
    ) -> anyhow::Result<()> {
        let mongodump = &self.config.tools.mongodump;
        // the stream only reaches the output directory once mongodump succeeds
        let work = tempfile::tempdir().context("Failed to create working directory")?;
        let staged = work.path().join(file_name);

        let mut args = vec![
            "--port".to_string(),
            options.port.to_string(),
            "--db".to_string(),
            options.database.clone(),
            "--gzip".to_string(),
            format!("--archive={}", staged.display()),
        ];
        args.extend(auth);

        let output = common::check(mongodump, common::run(mongodump, args.as_slice()).await?)?;
        log_output(&output.combined());

        move_file(&staged, target).await
    }
}

/// Move a file, copying when source and target are on different filesystems.
async fn move_file(from: &Path, to: &Path) -> anyhow::Result<()> {
    if fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    if let Err(e) = fs::copy(from, to).await {
        let _ = fs::remove_file(to).await;
        return Err(e).with_context(|| format!("Failed to move backup to '{}'", to.display()));
    }
    fs::remove_file(from).await?;
    Ok(())
}

pub(super) fn log_output(output: &str) {
    if !output.is_empty() {
        info!("{}", output);
    }
}

//! bongo command-line entry point
//!
//! Runs exactly one workflow per invocation. Exit status:
//! - 0 when the workflow ran, including when it reported a failure
//! - 1 when it was refused before doing anything (missing admin users,
//!   missing commands or directories, unsupported platform, I/O errors)
//! - 2 for usage errors

use bongo::config::DEFAULT_PORT;
use bongo::{ArchiveFormat, BackupOptions, Bongo, Config, RestoreOptions, ServiceToggle};
use clap::{Parser, Subcommand};
use common::init_logging;
use std::path::PathBuf;
use tracing::{debug, error};

/// Opinionated MongoDB management tool.
///
/// Ensures correct users and passwords for databases and stores them in a
/// credentials file. Generates and restores backup archives using stored
/// credentials.
#[derive(Parser)]
#[command(name = "bongo")]
#[command(author, version, about, arg_required_else_help = true)]
struct Cli {
    /// Log debug output
    #[arg(global = true, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure that appropriate users and passwords exist for a database
    ///
    /// Ensures that the users 'admin' & 'user' exist on a regular database,
    /// or 'root', 'backup' & 'restore' if the 'admin' database is given.
    Users {
        /// Database name, or 'admin'
        db: String,

        /// Generate new passwords for existing users
        #[arg(long)]
        new_passwords: bool,
    },

    /// Create a timestamped backup of a database
    Backup {
        /// Database to back up
        db: String,

        /// Host port, for when there are multiple mongod instances
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Rename the database when backing it up
        #[arg(long)]
        new_name: Option<String>,

        /// Output directory for the backup file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Backup container: 'tar' (.tar.gz) or 'archive' (mongodump --archive)
        #[arg(long, default_value = "tar")]
        format: ArchiveFormat,
    },

    /// Restore a database backup
    ///
    /// Databases are restored with the names they had when backed up,
    /// dropping existing collections.
    Restore {
        /// Backup file (.tar.gz or .archive)
        archive: PathBuf,

        /// Host port, for when there are multiple mongod instances
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Take MongoDB security offline or online
    ///
    /// The admin database users can only be created while security is off.
    Mongo {
        /// Enable security for the MongoDB instance
        #[arg(long, overrides_with = "no_auth")]
        auth: bool,

        /// Disable security for the MongoDB instance
        #[arg(long, overrides_with = "auth")]
        no_auth: bool,

        /// Bind to all network interfaces
        #[arg(long, overrides_with = "no_bind_all")]
        bind_all: bool,

        /// Bind only to localhost
        #[arg(long, overrides_with = "bind_all")]
        no_bind_all: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    debug!(dir = %config.dir.display(), "Using bongo directory");

    let bongo = Bongo::new(config);
    let result = match cli.command {
        Commands::Users { db, new_passwords } => bongo.users(&db, new_passwords).await,
        Commands::Backup {
            db,
            port,
            new_name,
            output,
            format,
        } => {
            let options = BackupOptions {
                port,
                new_name,
                output,
                format,
                ..BackupOptions::new(db)
            };
            bongo.backup(&options).await
        }
        Commands::Restore { archive, port } => {
            let options = RestoreOptions {
                port,
                ..RestoreOptions::new(archive)
            };
            bongo.restore(&options).await
        }
        Commands::Mongo { auth, bind_all, .. } => {
            bongo.mongo(ServiceToggle { auth, bind_all }).await
        }
    };

    match result {
        Ok(outcome) => outcome.report(),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

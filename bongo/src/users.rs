//! User provisioning
//!
//! Both workflows follow the same three states:
//! 1. No stored passwords: generate, (re)create the users, store.
//! 2. Stored, no rotation: check the users exist.
//! 3. Stored, rotation: check, set fresh passwords, store.
//!
//! The credentials file is only written after the shell reports success.

use crate::credentials::{AdminCredentials, PasswordPair, ADMIN_DB};
use crate::error::{ensure_commands, BongoError, Result};
use crate::shell::{Role, Script, ShellAuth, Statement};
use crate::{Bongo, Outcome};
use tracing::info;

const ROOT_ROLES: &[Role] = &[
    Role::UserAdminAnyDatabase,
    Role::ReadAnyDatabase,
    Role::ClusterAdmin,
];
const DB_ADMIN_ROLES: &[Role] = &[Role::ReadWrite, Role::DbAdmin, Role::UserAdmin];
const DB_USER_ROLES: &[Role] = &[Role::ReadWrite, Role::DbAdmin];

fn create_admin_users(passwords: &AdminCredentials) -> Script {
    Script::on(ADMIN_DB)
        .recreate_user("root", &passwords.root, ROOT_ROLES)
        .recreate_user("backup", &passwords.backup, &[Role::Backup])
        .recreate_user("restore", &passwords.restore, &[Role::Restore])
}

fn verify_admin_users() -> Script {
    Script::on(ADMIN_DB)
        .assert_user("root")
        .assert_user("backup")
        .assert_user("restore")
}

fn rotate_admin_passwords(passwords: &AdminCredentials) -> Script {
    Script::on(ADMIN_DB)
        .push(Statement::AssertDatabase(ADMIN_DB.to_string()))
        .change_password("root", &passwords.root)
        .change_password("backup", &passwords.backup)
        .change_password("restore", &passwords.restore)
}

fn create_database_users(database: &str, passwords: &PasswordPair) -> Script {
    Script::on(database)
        .recreate_user("admin", &passwords.admin, DB_ADMIN_ROLES)
        .recreate_user("user", &passwords.user, DB_USER_ROLES)
}

fn verify_database_users(database: &str) -> Script {
    Script::on(database).assert_user("admin").assert_user("user")
}

fn rotate_database_passwords(database: &str, passwords: &PasswordPair) -> Script {
    Script::on(database)
        .push(Statement::AssertDatabase(database.to_string()))
        .change_password("admin", &passwords.admin)
        .change_password("user", &passwords.user)
}

impl Bongo {
    /// Ensure the `admin` database has `root`, `backup` and `restore` users.
    ///
    /// Requires MongoDB security to be disabled: the unauthenticated probe
    /// must succeed, since the users are created without credentials.
    pub async fn users_admin(&self, new_passwords: bool) -> Result<Outcome> {
        ensure_commands(&[self.shell.bin()])?;
        let mut credentials = self.credentials.read().await?;

        info!("Adding root, backup and restore users to admin database");

        match self.shell.probe_unauthenticated().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(BongoError::Precondition(
                    "You must disable MongoDB security to initialize the admin database"
                        .to_string(),
                ))
            }
            Err(e) => return Ok(Outcome::failed("Unable to query MongoDB.", e)),
        }

        if credentials.admin.is_none() {
            let passwords = AdminCredentials::generate();
            if let Err(failed) = self
                .execute(
                    &create_admin_users(&passwords),
                    ShellAuth::None,
                    "Unable to create 'admin' database users.",
                )
                .await
            {
                return Ok(failed);
            }

            credentials.admin = Some(passwords);
            self.credentials.write(&credentials).await?;
            return Ok(Outcome::Success(
                "MongoDB 'admin' database users 'root', 'backup' & 'restore' created".to_string(),
            ));
        }

        if let Err(failed) = self
            .execute(
                &verify_admin_users(),
                ShellAuth::None,
                "Unable to confirm existing 'admin' database users.",
            )
            .await
        {
            return Ok(failed);
        }

        if !new_passwords {
            return Ok(Outcome::Skipped(
                "MongoDB 'admin' database users 'root', 'backup' & 'restore' confirmed"
                    .to_string(),
            ));
        }

        let passwords = AdminCredentials::generate();
        if let Err(failed) = self
            .execute(
                &rotate_admin_passwords(&passwords),
                ShellAuth::None,
                "Unable to change 'admin' database user passwords.",
            )
            .await
        {
            return Ok(failed);
        }

        credentials.admin = Some(passwords);
        self.credentials.write(&credentials).await?;
        Ok(Outcome::Success(
            "MongoDB 'admin' database user passwords changed".to_string(),
        ))
    }

    /// Ensure `database` has `admin` and `user` users.
    ///
    /// The `admin` database is handed to [`Bongo::users_admin`]. Any other
    /// database needs the admin users provisioned first and MongoDB security
    /// enabled: the unauthenticated probe must fail. All scripts run as `root`.
    pub async fn users(&self, database: &str, new_passwords: bool) -> Result<Outcome> {
        if database == ADMIN_DB {
            return self.users_admin(new_passwords).await;
        }
        if database.is_empty() {
            return Err(BongoError::Precondition(
                "Database name must be given".to_string(),
            ));
        }

        ensure_commands(&[self.shell.bin()])?;
        let mut credentials = self.credentials.read().await?;
        let root = match &credentials.admin {
            Some(admin) => admin.root.clone(),
            None => return Err(BongoError::AdminNotProvisioned),
        };

        info!(database, "Adding admin and user users");

        match self.shell.probe_unauthenticated().await {
            Ok(false) => {}
            Ok(true) => {
                return Err(BongoError::Precondition(format!(
                    "You must enable MongoDB security to set '{}' database credentials",
                    database
                )))
            }
            Err(e) => return Ok(Outcome::failed("Unable to query MongoDB.", e)),
        }

        let auth = ShellAuth::Root(&root);

        if credentials.database(database).is_none() {
            let passwords = PasswordPair::generate();
            if let Err(failed) = self
                .execute(
                    &create_database_users(database, &passwords),
                    auth,
                    format!("Unable to create '{}' database users.", database),
                )
                .await
            {
                return Ok(failed);
            }

            credentials.set_database(database, passwords);
            self.credentials.write(&credentials).await?;
            return Ok(Outcome::Success(format!(
                "MongoDB '{}' database users 'admin' & 'user' created",
                database
            )));
        }

        if let Err(failed) = self
            .execute(
                &verify_database_users(database),
                auth,
                format!("Unable to confirm existing '{}' database users.", database),
            )
            .await
        {
            return Ok(failed);
        }

        if !new_passwords {
            return Ok(Outcome::Skipped(format!(
                "MongoDB '{}' database users 'admin' & 'user' confirmed",
                database
            )));
        }

        let passwords = PasswordPair::generate();
        if let Err(failed) = self
            .execute(
                &rotate_database_passwords(database, &passwords),
                auth,
                format!("Unable to change '{}' database user passwords.", database),
            )
            .await
        {
            return Ok(failed);
        }

        credentials.set_database(database, passwords);
        self.credentials.write(&credentials).await?;
        Ok(Outcome::Success(format!(
            "MongoDB '{}' database user passwords changed",
            database
        )))
    }

    /// Run a script, logging its output; a failure becomes a `Failed` outcome.
    async fn execute(
        &self,
        script: &Script,
        auth: ShellAuth<'_>,
        context: impl std::fmt::Display,
    ) -> std::result::Result<(), Outcome> {
        match self.shell.run_script(script, auth).await {
            Ok(output) => {
                if !output.is_empty() {
                    info!("{}", output);
                }
                Ok(())
            }
            Err(e) => Err(Outcome::failed(context, e)),
        }
    }
}

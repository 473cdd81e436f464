//! Typed mongo shell scripts
//!
//! User provisioning sends a handful of statements to the `mongo` shell. They
//! are built as data and rendered here, so role names and quoting live in one
//! place.

use std::fmt;

/// Built-in MongoDB roles granted by the provisioning workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    UserAdminAnyDatabase,
    ReadAnyDatabase,
    ClusterAdmin,
    Backup,
    Restore,
    ReadWrite,
    DbAdmin,
    UserAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserAdminAnyDatabase => "userAdminAnyDatabase",
            Self::ReadAnyDatabase => "readAnyDatabase",
            Self::ClusterAdmin => "clusterAdmin",
            Self::Backup => "backup",
            Self::Restore => "restore",
            Self::ReadWrite => "readWrite",
            Self::DbAdmin => "dbAdmin",
            Self::UserAdmin => "userAdmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a mongo shell script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Switch `db` to another database
    UseDatabase(String),
    DropUser(String),
    CreateUser {
        user: String,
        password: String,
        roles: Vec<Role>,
    },
    ChangePassword {
        user: String,
        password: String,
    },
    /// Fail the script unless the user exists in the current database
    AssertUserExists(String),
    /// Fail the script unless the current database has this name
    AssertDatabase(String),
    Quit,
}

impl Statement {
    fn render(&self) -> String {
        match self {
            Self::UseDatabase(name) => format!("db = db.getSiblingDB({})", quote(name)),
            Self::DropUser(user) => format!("db.dropUser({})", quote(user)),
            Self::CreateUser {
                user,
                password,
                roles,
            } => {
                let roles = roles
                    .iter()
                    .map(|role| quote(role.as_str()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    "db.createUser({{user:{},pwd:{},roles:[{}]}})",
                    quote(user),
                    quote(password),
                    roles
                )
            }
            Self::ChangePassword { user, password } => {
                format!("db.changeUserPassword({}, {})", quote(user), quote(password))
            }
            Self::AssertUserExists(user) => format!("assert(db.getUser({}))", quote(user)),
            Self::AssertDatabase(name) => format!("assert.eq(db.getName(), {})", quote(name)),
            Self::Quit => "quit()".to_string(),
        }
    }
}

/// A sequence of statements run against one database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    statements: Vec<Statement>,
}

impl Script {
    /// Start a script that operates on `database`.
    pub fn on(database: &str) -> Self {
        Self {
            statements: vec![Statement::UseDatabase(database.to_string())],
        }
    }

    pub fn push(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Drop `user` if present and create it afresh with `roles`.
    pub fn recreate_user(self, user: &str, password: &str, roles: &[Role]) -> Self {
        self.push(Statement::DropUser(user.to_string()))
            .push(Statement::CreateUser {
                user: user.to_string(),
                password: password.to_string(),
                roles: roles.to_vec(),
            })
    }

    pub fn change_password(self, user: &str, password: &str) -> Self {
        self.push(Statement::ChangePassword {
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    pub fn assert_user(self, user: &str) -> Self {
        self.push(Statement::AssertUserExists(user.to_string()))
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Render to mongo shell JavaScript, terminated by `quit()`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for statement in self.statements.iter().chain([&Statement::Quit]) {
            out.push_str(&statement.render());
            out.push('\n');
        }
        out
    }
}

/// A JavaScript string literal; JSON string syntax is a subset of it.
fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

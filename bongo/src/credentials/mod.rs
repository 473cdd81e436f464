//! Credential store
//!
//! Generated passwords for every provisioned database, kept in a JSON5 file
//! readable only by its owner.

mod password;
mod store;

pub use password::{generate_password, PASSWORD_LEN};
pub use store::{AdminCredentials, CredentialFile, Credentials, PasswordPair, ADMIN_DB};

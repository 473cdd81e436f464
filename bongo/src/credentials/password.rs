//! Password generation

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of every generated password
pub const PASSWORD_LEN: usize = 16;

/// Generate a random mixed-case alphanumeric password.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}

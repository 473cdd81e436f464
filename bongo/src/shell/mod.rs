//! The `mongo` shell client
//!
//! - Typed script building and rendering
//! - Scratch-file script execution

mod mongo;
mod script;

pub use mongo::{MongoShell, ShellAuth};
pub use script::{Role, Script, Statement};

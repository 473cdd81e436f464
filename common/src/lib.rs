//! Shared utilities for the bongo workspace
//!
//! This crate provides functionality used by the MongoDB administration tool:
//! - Structured logging initialization
//! - Environment variable parsing helpers
//! - External command execution and discovery

pub mod command;
pub mod config;
pub mod logging;

pub use command::{check, command_exists, find_missing, run, run_checked, run_in, CommandOutput};
pub use config::ConfigExt;
pub use logging::init_logging;

//! Structured logging initialization
//!
//! All output goes to stderr so that stdout stays free for anything a caller
//! may want to pipe.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging for the tool.
///
/// `RUST_LOG` is honoured; `verbose` raises the default level from INFO to DEBUG.
///
/// # Example
/// ```ignore
/// init_logging(cli.debug);
/// info!("Starting up...");
/// ```
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let format = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}

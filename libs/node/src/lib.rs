//! Bazaar Node - Process bootstrap for the marketplace binaries
//!
//! Argument parsing, configuration, logging, exit statuses and the
//! bind/register/resolve startup sequence shared by every process.

pub mod args;
pub mod bootstrap;
pub mod config;
pub mod exit;
pub mod logging;

// Re-exports for convenience
pub use args::CommonArgs;
pub use config::NodeConfig;
pub use exit::{ExitStatus, Fatal};

use std::process::ExitCode;

use tracing::error;

/// Turn the outcome of a process's run into its exit code
pub fn finish(result: Result<(), Fatal>) -> ExitCode {
    match result {
        Ok(()) => ExitStatus::Success.into(),
        Err(fatal) => {
            error!("{}", fatal);
            fatal.status().into()
        }
    }
}

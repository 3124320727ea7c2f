use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser};

use crate::config::NodeConfig;
use crate::exit::{ExitStatus, Fatal};

/// Flags every process accepts
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the simulated packet loss probability (0 to 1)
    #[arg(long, value_name = "P")]
    pub loss_probability: Option<f64>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// File config (or defaults) with command line overrides applied
    pub fn node_config(&self) -> Result<NodeConfig, Fatal> {
        let config = match &self.config {
            Some(path) => NodeConfig::load(path)?,
            None => NodeConfig::default(),
        };
        let config = config.with_loss_probability(self.loss_probability);
        config.validate()?;
        Ok(config)
    }
}

/// Value parser for port arguments, `1..=65535`
pub fn port(value: &str) -> Result<u16, String> {
    bazaar_core::address::parse_port(value)
        .ok_or_else(|| format!("'{}' is not a port between 1 and 65535", value))
}

/// Parse the command line, mapping usage errors to [`ExitStatus::BadArgs`]
pub fn parse<A: Parser>() -> Result<A, ExitCode> {
    A::try_parse().map_err(|e| {
        let _ = e.print();
        usage_status(&e).into()
    })
}

/// `--help` and `--version` end the process cleanly, anything else is a usage error
pub fn usage_status(error: &clap::Error) -> ExitStatus {
    if error.use_stderr() {
        ExitStatus::BadArgs
    } else {
        ExitStatus::Success
    }
}

//! Node configuration
//!
//! Optional JSON file, every field defaulted. The exchange blocks must be
//! given in full when present.

use std::path::Path;

use bazaar_core::address::{self, LOCALHOST};
use bazaar_fabric::ExchangeConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exit::Fatal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Budget for service-to-service and directory exchanges
    pub service_exchange: ExchangeConfig,
    /// Budget for the buyer client talking to the store
    pub client_exchange: ExchangeConfig,
    /// IP registered with the directory
    pub advertise_ip: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            service_exchange: ExchangeConfig::service(),
            client_exchange: ExchangeConfig::client(),
            advertise_ip: LOCALHOST.to_string(),
        }
    }
}

impl NodeConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Fatal> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Fatal::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, Fatal> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Fatal::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply a command line loss-probability override to both budgets
    pub fn with_loss_probability(mut self, loss_probability: Option<f64>) -> Self {
        if let Some(p) = loss_probability {
            self.service_exchange.loss_probability = p;
            self.client_exchange.loss_probability = p;
        }
        self
    }

    pub fn validate(&self) -> Result<(), Fatal> {
        for exchange in [&self.service_exchange, &self.client_exchange] {
            exchange
                .validate()
                .map_err(|e| Fatal::Config(e.to_string()))?;
        }
        if !address::is_valid_ip(&self.advertise_ip) {
            return Err(Fatal::Config(format!(
                "advertise_ip '{}' is not localhost or a dotted quad",
                self.advertise_ip
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_fields_fall_back_to_presets() {
        let config = NodeConfig::from_json(r#"{ "advertise_ip": "10.0.0.2" }"#).unwrap();

        assert_eq!(config.advertise_ip, "10.0.0.2");
        assert_eq!(config.service_exchange, ExchangeConfig::service());
        assert_eq!(config.client_exchange, ExchangeConfig::client());
    }

    #[test]
    fn exchange_blocks_are_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "service_exchange": {{
                    "max_retries": 4,
                    "loss_probability": 0.0,
                    "inter_send_delay_ms": 10,
                    "receive_timeout_ms": 250
                }}
            }}"#
        )
        .unwrap();

        let config = NodeConfig::load(file.path()).unwrap();
        assert_eq!(config.service_exchange.max_retries, 4);
        assert_eq!(config.service_exchange.receive_timeout_ms, 250);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let bad_ip = NodeConfig::from_json(r#"{ "advertise_ip": "300.0.0.1" }"#);
        assert!(matches!(bad_ip, Err(Fatal::Config(_))));

        let bad_loss = NodeConfig::default().with_loss_probability(Some(2.0));
        assert!(matches!(bad_loss.validate(), Err(Fatal::Config(_))));

        assert!(matches!(NodeConfig::from_json("{"), Err(Fatal::Config(_))));
    }

    #[test]
    fn loss_override_applies_to_both_budgets() {
        let config = NodeConfig::default().with_loss_probability(Some(0.0));
        assert_eq!(config.service_exchange.loss_probability, 0.0);
        assert_eq!(config.client_exchange.loss_probability, 0.0);
    }
}

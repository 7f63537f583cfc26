//! Configuration for RPC endpoints.
//!
//! Endpoints carry an optional weight used by the selector's weighted
//! round-robin; unweighted endpoints default to 1.

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Configuration for a single RPC endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RpcConfig {
    /// The RPC endpoint URL.
    pub url: String,
    /// Selection weight; endpoints with higher weight are picked
    /// proportionally more often. Defaults to 1 when not specified.
    pub weight: Option<u32>,
}

impl RpcConfig {
    /// Creates a config with the given URL and the default weight.
    pub fn new(url: String) -> Self {
        Self { url, weight: None }
    }

    /// Creates a config with the given URL and weight.
    pub fn with_weight(url: String, weight: u32) -> Self {
        Self {
            url,
            weight: Some(weight),
        }
    }

    /// The selection weight, defaulting to 1.
    pub fn get_weight(&self) -> u32 {
        self.weight.unwrap_or(1)
    }

    /// Validates that every URL in the list parses as an absolute URL.
    pub fn validate_list(configs: &[RpcConfig]) -> Result<(), String> {
        for config in configs {
            config
                .url
                .parse::<Url>()
                .map_err(|e| format!("invalid RPC URL {}: {e}", config.url))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_weight() {
        let config = RpcConfig::new("https://example.com".to_string());
        assert_eq!(config.get_weight(), 1);
    }

    #[test]
    fn test_with_weight_keeps_custom_weight() {
        let config = RpcConfig::with_weight("https://example.com".to_string(), 5);
        assert_eq!(config.get_weight(), 5);
    }

    #[test]
    fn test_validate_list_accepts_valid_urls() {
        let configs = vec![
            RpcConfig::new("https://api.devnet.solana.com".to_string()),
            RpcConfig::with_weight("https://api.mainnet-beta.solana.com".to_string(), 3),
        ];
        assert!(RpcConfig::validate_list(&configs).is_ok());
    }

    #[test]
    fn test_validate_list_rejects_invalid_url() {
        let configs = vec![RpcConfig::new("not-a-url".to_string())];
        let result = RpcConfig::validate_list(&configs);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("not-a-url"));
    }
}

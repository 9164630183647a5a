//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, fee positive)
//! - Check the RPC URL and fee recipient are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: IssuerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::config::schema::{FeeConfig, IssuerConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("network.rpc_url '{url}' is invalid: {reason}")]
    RpcUrl { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("fee.amount_sol must be a positive finite number, got {0}")]
    FeeAmount(f64),

    #[error("fee.recipient '{0}' is not a valid base58 address")]
    FeeRecipient(String),

    #[error("explorer.host must not be empty")]
    ExplorerHost,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &IssuerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.network.rpc_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::RpcUrl {
            url: config.network.rpc_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::RpcUrl {
            url: config.network.rpc_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "network.rpc_timeout_secs" });
    }
    if config.network.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "network.confirmation_timeout_secs" });
    }
    if config.network.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero { field: "network.poll_interval_ms" });
    }

    errors.extend(validate_fee(&config.fee));

    if config.explorer.host.trim().is_empty() {
        errors.push(ValidationError::ExplorerHost);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks on the `[fee]` section alone.
pub fn validate_fee(fee: &FeeConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !fee.amount_sol.is_finite() || fee.amount_sol <= 0.0 {
        errors.push(ValidationError::FeeAmount(fee.amount_sol));
    }
    if Pubkey::from_str(&fee.recipient).is_err() {
        errors.push(ValidationError::FeeRecipient(fee.recipient.clone()));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&IssuerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = IssuerConfig::default();
        config.network.rpc_url = "ftp://example.com".to_string();
        config.network.poll_interval_ms = 0;
        config.fee.amount_sol = -1.0;
        config.fee.recipient = "not-a-key".to_string();
        config.explorer.host = "  ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ExplorerHost));
        assert!(errors.contains(&ValidationError::Zero { field: "network.poll_interval_ms" }));
        assert!(errors[0].to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_rejects_nan_fee() {
        let mut config = IssuerConfig::default();
        config.fee.amount_sol = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::FeeAmount(_)));
    }
}

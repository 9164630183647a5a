//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the issuer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default mainnet JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default platform address that receives the issuance fee.
pub const DEFAULT_FEE_RECIPIENT: &str = "EYLG6DcHm3ZpFNycHjDnVeir58W3Ff5SqZupaBfbHqwG";

/// Default issuance fee in SOL.
pub const DEFAULT_FEE_SOL: f64 = 0.05;

/// Root configuration for the token issuer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct IssuerConfig {
    /// RPC endpoint and confirmation settings.
    pub network: NetworkConfig,

    /// Fee charged before a token is minted.
    pub fee: FeeConfig,

    /// Block explorer used for the success link.
    pub explorer: ExplorerConfig,

    /// Local signer settings.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL. A single endpoint; there is no failover.
    pub rpc_url: String,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// How long `confirm_transaction` polls before giving up.
    pub confirmation_timeout_secs: u64,

    /// Delay between signature status polls in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rpc_timeout_secs: 30,
            confirmation_timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }
}

/// Fee configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Fee amount in SOL.
    pub amount_sol: f64,

    /// Base58 address of the fee recipient.
    pub recipient: String,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            amount_sol: DEFAULT_FEE_SOL,
            recipient: DEFAULT_FEE_RECIPIENT.to_string(),
        }
    }
}

/// Cluster the explorer link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    #[default]
    Mainnet,
    Devnet,
}

/// Block explorer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Explorer host, without scheme.
    pub host: String,

    /// Cluster appended as a query parameter when not mainnet.
    pub cluster: Cluster,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            host: "solscan.io".to_string(),
            cluster: Cluster::Mainnet,
        }
    }
}

/// Local signer configuration.
///
/// The keypair itself never lives in the config file; only a path to it.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Path to a JSON keypair file. The environment variable takes precedence.
    pub keypair_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IssuerConfig::default();
        assert_eq!(config.network.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.fee.amount_sol, 0.05);
        assert_eq!(config.fee.recipient, DEFAULT_FEE_RECIPIENT);
        assert_eq!(config.explorer.cluster, Cluster::Mainnet);
        assert!(config.wallet.keypair_path.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: IssuerConfig = toml::from_str(
            r#"
            [network]
            rpc_url = "https://api.devnet.solana.com"

            [explorer]
            cluster = "devnet"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(config.network.poll_interval_ms, 500);
        assert_eq!(config.explorer.cluster, Cluster::Devnet);
        assert_eq!(config.explorer.host, "solscan.io");
        assert_eq!(config.fee.amount_sol, DEFAULT_FEE_SOL);
    }
}

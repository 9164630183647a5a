//! Chain client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a single JSON-RPC endpoint at `confirmed` commitment
//! - Query chain state (balances, blockhash, rent-exempt minimum)
//! - Poll signature status until a transaction settles
//! - Degrade read failures instead of crashing callers
//!
//! # Degradation policy
//! `get_balance` reports 0 SOL when the node cannot be reached, and
//! `confirm_transaction` folds "rejected on-chain", "timed out" and "status
//! lookup failed" into a single `false`. Both are logged, neither is retried.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::TransactionError;
use tokio::time::{interval, timeout};

use crate::blockchain::types::{lamports_to_sol, BalanceReport, BlockchainError, BlockchainResult};
use crate::config::NetworkConfig;
use crate::observability::metrics;

/// Read-side view of the chain used by the transaction builder and the
/// issuance orchestrator.
///
/// Implementations hold no per-transaction state between calls.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Balance of `address` in SOL. Returns 0 on any failure.
    async fn get_balance(&self, address: &Pubkey) -> f64;

    /// A blockhash fetched fresh from the node. Never cached.
    async fn get_latest_blockhash(&self) -> BlockchainResult<Hash>;

    /// Lamports an account of `data_len` bytes needs to be rent exempt.
    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize)
        -> BlockchainResult<u64>;

    /// Wait until `signature` reaches `confirmed`.
    ///
    /// Returns false if the transaction failed, the wait timed out or the
    /// status could not be read.
    async fn confirm_transaction(&self, signature: &Signature) -> bool;

    /// Balance of `address` compared against a fee.
    async fn balance_report(&self, address: &Pubkey, fee_sol: f64) -> BalanceReport {
        BalanceReport {
            balance_sol: self.get_balance(address).await,
            fee_sol,
        }
    }
}

/// JSON-RPC backed chain client.
#[derive(Clone)]
pub struct RpcChainClient {
    rpc: Arc<RpcClient>,
    config: NetworkConfig,
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Create a new chain client.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: NetworkConfig) -> BlockchainResult<Self> {
        let rpc = RpcClient::new_with_timeout_and_commitment(
            config.rpc_url.clone(),
            Duration::from_secs(config.rpc_timeout_secs),
            CommitmentConfig::confirmed(),
        );
        Self::with_rpc(Arc::new(rpc), config)
    }

    /// Wrap an existing RPC connection.
    ///
    /// `config.rpc_url` is only used for logging here; requests go wherever
    /// `rpc` points.
    pub fn with_rpc(rpc: Arc<RpcClient>, config: NetworkConfig) -> BlockchainResult<Self> {
        check_timings(&config)?;
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        tracing::info!(
            rpc_url = %config.rpc_url,
            timeout_secs = config.rpc_timeout_secs,
            "Chain client initialized"
        );

        Ok(Self {
            rpc,
            config,
            timeout_duration,
        })
    }

    /// The underlying RPC connection, shared with signers that broadcast.
    pub fn rpc(&self) -> Arc<RpcClient> {
        self.rpc.clone()
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    async fn call<T, E, F>(&self, operation: &'static str, fut: F) -> BlockchainResult<T>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(BlockchainError::Rpc(format!("{} failed: {}", operation, e))),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> BlockchainResult<Option<Result<(), TransactionError>>> {
        self.call(
            "getSignatureStatuses",
            self.rpc
                .get_signature_status_with_commitment(signature, CommitmentConfig::confirmed()),
        )
        .await
    }

    async fn poll_until_settled(&self, signature: &Signature) -> BlockchainResult<bool> {
        let mut ticker = interval(Duration::from_millis(self.config.poll_interval_ms));

        loop {
            ticker.tick().await;

            match self.signature_status(signature).await? {
                None => {
                    tracing::debug!(signature = %signature, "Transaction pending");
                }
                Some(Ok(())) => return Ok(true),
                Some(Err(e)) => {
                    tracing::warn!(signature = %signature, error = %e, "Transaction failed on-chain");
                    return Ok(false);
                }
            }
        }
    }
}

fn check_timings(config: &NetworkConfig) -> BlockchainResult<()> {
    let zero = [
        ("rpc_timeout_secs", config.rpc_timeout_secs),
        ("confirmation_timeout_secs", config.confirmation_timeout_secs),
        ("poll_interval_ms", config.poll_interval_ms),
    ]
    .into_iter()
    .find(|(_, value)| *value == 0);

    match zero {
        Some((field, _)) => Err(BlockchainError::Config(format!("{} must be greater than zero", field))),
        None => Ok(()),
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_balance(&self, address: &Pubkey) -> f64 {
        match self.call("getBalance", self.rpc.get_balance(address)).await {
            Ok(lamports) => lamports_to_sol(lamports),
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Balance lookup failed, reporting 0");
                metrics::record_rpc_failure("get_balance");
                0.0
            }
        }
    }

    async fn get_latest_blockhash(&self) -> BlockchainResult<Hash> {
        self.call("getLatestBlockhash", self.rpc.get_latest_blockhash())
            .await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> BlockchainResult<u64> {
        self.call(
            "getMinimumBalanceForRentExemption",
            self.rpc.get_minimum_balance_for_rent_exemption(data_len),
        )
        .await
    }

    async fn confirm_transaction(&self, signature: &Signature) -> bool {
        let deadline = Duration::from_secs(self.config.confirmation_timeout_secs);

        match timeout(deadline, self.poll_until_settled(signature)).await {
            Ok(Ok(confirmed)) => confirmed,
            Ok(Err(e)) => {
                tracing::warn!(signature = %signature, error = %e, "Confirmation lookup failed");
                metrics::record_rpc_failure("confirm_transaction");
                false
            }
            Err(_) => {
                tracing::warn!(
                    signature = %signature,
                    timeout_secs = self.config.confirmation_timeout_secs,
                    "Transaction not confirmed before timeout"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

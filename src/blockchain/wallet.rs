//! Wallet capability and a local keypair signer.
//!
//! # Security
//! - The orchestrator only sees [`WalletSigner`]; key material stays here
//! - Keys are loaded from a file path or an environment variable
//! - Keys are never logged or serialized

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair, read_keypair_file, Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Environment variable holding a keypair file path or a JSON byte array.
pub const KEYPAIR_ENV_VAR: &str = "MEMECOIN_ISSUER_KEYPAIR";

/// Errors surfaced by a wallet. Messages are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No key is connected.
    #[error("Wallet not connected")]
    NotConnected,

    /// The user declined to sign.
    #[error("{0}")]
    Rejected(String),

    /// The wallet could not sign or broadcast.
    #[error("{0}")]
    Failed(String),
}

/// The two operations the issuance flow needs from a wallet.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The connected public key, if any.
    fn public_key(&self) -> Option<Pubkey>;

    /// Add the wallet's signature to `transaction` and broadcast it.
    ///
    /// Signatures already present on the transaction must be kept.
    async fn send_transaction(&self, transaction: Transaction) -> Result<Signature, WalletError>;
}

/// Signer backed by a keypair held in process memory.
pub struct KeypairWallet {
    keypair: Keypair,
    rpc: Arc<RpcClient>,
}

impl KeypairWallet {
    /// Wrap an already loaded keypair.
    pub fn new(keypair: Keypair, rpc: Arc<RpcClient>) -> Self {
        tracing::info!(address = %keypair.pubkey(), "Wallet initialized");
        Self { keypair, rpc }
    }

    /// Load from a JSON keypair file.
    pub fn from_file(path: &Path, rpc: Arc<RpcClient>) -> Result<Self, WalletError> {
        let keypair = read_keypair_file(path).map_err(|e| {
            WalletError::Failed(format!("Failed to read keypair {}: {}", path.display(), e))
        })?;
        Ok(Self::new(keypair, rpc))
    }

    /// Load from a JSON byte array such as `[12,34,...]`.
    pub fn from_json(json: &str, rpc: Arc<RpcClient>) -> Result<Self, WalletError> {
        let keypair = read_keypair(&mut Cursor::new(json.as_bytes()))
            .map_err(|e| WalletError::Failed(format!("Invalid keypair format: {}", e)))?;
        Ok(Self::new(keypair, rpc))
    }

    /// Load from `MEMECOIN_ISSUER_KEYPAIR`, falling back to `fallback_path`.
    ///
    /// The variable may hold either a JSON byte array or a file path.
    pub fn from_env(fallback_path: Option<&str>, rpc: Arc<RpcClient>) -> Result<Self, WalletError> {
        match std::env::var(KEYPAIR_ENV_VAR) {
            Ok(value) if value.trim_start().starts_with('[') => Self::from_json(&value, rpc),
            Ok(path) => Self::from_file(Path::new(path.trim()), rpc),
            Err(_) => match fallback_path {
                Some(path) => Self::from_file(Path::new(path), rpc),
                None => Err(WalletError::Failed(format!(
                    "Environment variable {} not set and no wallet.keypair_path configured",
                    KEYPAIR_ENV_VAR
                ))),
            },
        }
    }

    /// Co-sign `transaction`, keeping any signatures already on it.
    pub fn sign(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Failed(format!("Signing failed: {}", e)))?;
        Ok(transaction)
    }
}

#[async_trait]
impl WalletSigner for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn send_transaction(&self, transaction: Transaction) -> Result<Signature, WalletError> {
        let transaction = self.sign(transaction)?;
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(CommitmentLevel::Confirmed),
            ..RpcSendTransactionConfig::default()
        };

        let signature = self
            .rpc
            .send_transaction_with_config(&transaction, config)
            .await
            .map_err(|e| WalletError::Failed(format!("Broadcast failed: {}", e)))?;

        tracing::debug!(signature = %signature, "Transaction broadcast");
        Ok(signature)
    }
}

impl std::fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("address", &self.keypair.pubkey())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::system_instruction;

    fn rpc() -> Arc<RpcClient> {
        Arc::new(RpcClient::new("http://127.0.0.1:1".to_string()))
    }

    fn keypair_json(keypair: &Keypair) -> String {
        serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_wallet_from_json() {
        let keypair = Keypair::new();
        let wallet = KeypairWallet::from_json(&keypair_json(&keypair), rpc()).unwrap();
        assert_eq!(wallet.public_key(), Some(keypair.pubkey()));
    }

    #[test]
    fn test_invalid_keypair() {
        let err = KeypairWallet::from_json("[1, 2, 3]", rpc()).unwrap_err();
        assert!(err.to_string().contains("Invalid keypair"));
    }

    #[test]
    fn test_missing_file() {
        let err = KeypairWallet::from_file(Path::new("no/such/keypair.json"), rpc()).unwrap_err();
        assert!(matches!(err, WalletError::Failed(_)));
    }

    #[test]
    fn test_sign_keeps_existing_signatures() {
        let payer = Keypair::new();
        let co_signer = Keypair::new();
        let wallet = KeypairWallet::from_json(&keypair_json(&payer), rpc()).unwrap();

        // Two signers: the wallet (fee payer) and an account being created.
        let ix = system_instruction::create_account(
            &payer.pubkey(),
            &co_signer.pubkey(),
            1_000,
            0,
            &Pubkey::new_unique(),
        );
        let mut tx = Transaction::new_with_payer(&[ix], Some(&payer.pubkey()));
        let blockhash = Hash::new_unique();
        tx.try_partial_sign(&[&co_signer], blockhash).unwrap();
        assert!(!tx.is_signed());

        let signed = wallet.sign(tx).unwrap();
        assert!(signed.is_signed());
        assert!(signed.verify().is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let keypair = Keypair::new();
        let secret = keypair.to_base58_string();
        let wallet = KeypairWallet::new(keypair, rpc());
        assert!(!format!("{:?}", wallet).contains(&secret));
    }
}

//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkConfig (RPC URL, timeouts)
//!     → client.rs (RPC connection, confirmation polling)
//!     → transaction.rs (fee transfer, mint bundle)
//!     → wallet.rs (sign + broadcast behind WalletSigner)
//! ```
//!
//! # Security Constraints
//! - Private keys live only inside wallet implementations
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{ChainClient, RpcChainClient};
pub use transaction::TxBuilder;
pub use types::{BalanceReport, BlockchainError, BlockchainResult, FeePayment, MintBundle};
pub use wallet::{KeypairWallet, WalletError, WalletSigner};

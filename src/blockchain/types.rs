//! Chain-specific types, constants and error definitions.

use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Decimals of every mint this crate creates.
pub const MINT_DECIMALS: u8 = 9;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// An instruction could not be assembled.
    #[error("Instruction error: {0}")]
    Instruction(String),

    /// Signing with a locally held keypair failed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// The client was given settings it cannot run with.
    #[error("Invalid network configuration: {0}")]
    Config(String),

    /// Supply times 10^decimals does not fit in u64.
    #[error("Supply {supply} overflows with {decimals} decimals")]
    SupplyOverflow { supply: u64, decimals: u8 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Convert a SOL amount to lamports, rounding to the nearest lamport.
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Convert lamports to a SOL amount.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Scale a whole-token supply to base units.
pub fn raw_supply(supply: u64, decimals: u8) -> BlockchainResult<u64> {
    10u64
        .checked_pow(decimals as u32)
        .and_then(|scale| supply.checked_mul(scale))
        .ok_or(BlockchainError::SupplyOverflow { supply, decimals })
}

/// The fee transfer for one issuance attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePayment {
    pub payer: Pubkey,
    pub recipient: Pubkey,
    pub amount_lamports: u64,
}

/// An unsigned-by-payer mint transaction plus the addresses it creates.
///
/// The transaction already carries the mint keypair's signature.
#[derive(Debug, Clone)]
pub struct MintBundle {
    pub transaction: Transaction,
    pub mint_address: Pubkey,
    pub token_account: Pubkey,
    pub decimals: u8,
    pub raw_supply: u64,
}

/// Wallet balance compared against the issuance fee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceReport {
    pub balance_sol: f64,
    pub fee_sol: f64,
}

impl BalanceReport {
    /// Whether the balance covers the fee.
    pub fn is_sufficient(&self) -> bool {
        self.balance_sol >= self.fee_sol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_conversion() {
        assert_eq!(sol_to_lamports(0.05), 50_000_000);
        assert_eq!(sol_to_lamports(1.0), 1_000_000_000);
        assert_eq!(lamports_to_sol(50_000_000), 0.05);
    }

    #[test]
    fn test_raw_supply() {
        assert_eq!(raw_supply(1_000_000, 9).unwrap(), 1_000_000_000_000_000);
        assert_eq!(raw_supply(1, 0).unwrap(), 1);
        assert!(matches!(
            raw_supply(u64::MAX / 10, 9),
            Err(BlockchainError::SupplyOverflow { decimals: 9, .. })
        ));
    }

    #[test]
    fn test_balance_report() {
        let report = BalanceReport { balance_sol: 0.05, fee_sol: 0.05 };
        assert!(report.is_sufficient());
        let report = BalanceReport { balance_sol: 0.0499, fee_sol: 0.05 };
        assert!(!report.is_sufficient());
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");
    }
}

//! SPL token issuer library.
//!
//! A payer sends a fixed fee, and once that transfer confirms a new mint is
//! created with the whole supply minted to the payer's associated token
//! account.

pub mod blockchain;
pub mod config;
pub mod issuance;
pub mod observability;

pub use config::schema::IssuerConfig;
pub use issuance::{IssuanceSession, IssuanceSettings};

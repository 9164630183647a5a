//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use memecoin_issuer::blockchain::{BlockchainError, BlockchainResult, ChainClient, WalletError, WalletSigner};
use memecoin_issuer::issuance::{IssuanceSession, IssuanceSettings, TokenForm};

pub const FEE_RECIPIENT: &str = "EYLG6DcHm3ZpFNycHjDnVeir58W3Ff5SqZupaBfbHqwG";
pub const FEE_LAMPORTS: u64 = 50_000_000;
pub const RENT_LAMPORTS: u64 = 1_461_600;

/// Chain client returning scripted answers and counting calls.
pub struct MockChainClient {
    pub balance: f64,
    pub blockhash: Hash,
    pub fail_blockhash: bool,
    confirmations: Mutex<VecDeque<bool>>,
    pub blockhash_calls: AtomicUsize,
    pub rent_calls: AtomicUsize,
    pub confirm_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
}

impl MockChainClient {
    /// Confirms every transaction.
    pub fn new() -> Self {
        Self {
            balance: 1.0,
            blockhash: Hash::new_unique(),
            fail_blockhash: false,
            confirmations: Mutex::new(VecDeque::new()),
            blockhash_calls: AtomicUsize::new(0),
            rent_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
        }
    }

    /// Answer confirmations from `results` in order, then `true`.
    pub fn with_confirmations(results: &[bool]) -> Self {
        let client = Self::new();
        client.confirmations.lock().unwrap().extend(results.iter().copied());
        client
    }

    pub fn failing_blockhash() -> Self {
        Self {
            fail_blockhash: true,
            ..Self::new()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.blockhash_calls.load(Ordering::SeqCst)
            + self.rent_calls.load(Ordering::SeqCst)
            + self.confirm_calls.load(Ordering::SeqCst)
            + self.balance_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_balance(&self, _address: &Pubkey) -> f64 {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balance
    }

    async fn get_latest_blockhash(&self) -> BlockchainResult<Hash> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_blockhash {
            return Err(BlockchainError::Rpc("getLatestBlockhash failed: connection refused".into()));
        }
        Ok(self.blockhash)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, _data_len: usize) -> BlockchainResult<u64> {
        self.rent_calls.fetch_add(1, Ordering::SeqCst);
        Ok(RENT_LAMPORTS)
    }

    async fn confirm_transaction(&self, _signature: &Signature) -> bool {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.confirmations.lock().unwrap().pop_front().unwrap_or(true)
    }
}

/// Wallet that records what it is asked to send.
pub struct MockWallet {
    pub key: Option<Pubkey>,
    /// Reject the n-th send (0-based) with this message.
    pub reject_at: Option<(usize, String)>,
    pub sent: Mutex<Vec<Transaction>>,
}

impl MockWallet {
    pub fn connected() -> Self {
        Self {
            key: Some(Pubkey::new_unique()),
            reject_at: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            key: None,
            ..Self::connected()
        }
    }

    pub fn rejecting_at(index: usize, message: &str) -> Self {
        Self {
            reject_at: Some((index, message.to_string())),
            ..Self::connected()
        }
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.key
    }

    async fn send_transaction(&self, transaction: Transaction) -> Result<Signature, WalletError> {
        if self.key.is_none() {
            return Err(WalletError::NotConnected);
        }
        let mut sent = self.sent.lock().unwrap();
        if let Some((index, message)) = &self.reject_at {
            if sent.len() == *index {
                return Err(WalletError::Rejected(message.clone()));
            }
        }
        sent.push(transaction);
        Ok(Signature::new_unique())
    }
}

pub fn settings() -> IssuanceSettings {
    IssuanceSettings::new(Pubkey::from_str(FEE_RECIPIENT).unwrap(), FEE_LAMPORTS)
}

pub fn new_session(
    chain: MockChainClient,
    wallet: MockWallet,
) -> (IssuanceSession<MockChainClient, MockWallet>, Arc<MockChainClient>, Arc<MockWallet>) {
    let chain = Arc::new(chain);
    let wallet = Arc::new(wallet);
    let session = IssuanceSession::new(chain.clone(), wallet.clone(), settings());
    (session, chain, wallet)
}

pub fn form(symbol: &str, supply: &str) -> TokenForm {
    TokenForm {
        name: "Doge2".into(),
        symbol: symbol.into(),
        description: "fun".into(),
        initial_supply: supply.into(),
        logo: None,
    }
}

//! Issuance outcome and the explorer link built from it.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use url::Url;

use crate::config::{Cluster, ExplorerConfig};

/// A fully confirmed issuance. Held in session memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceResult {
    pub mint_address: Pubkey,
    pub token_account: Pubkey,
    /// Supply in whole tokens.
    pub supply: u64,
    pub payment_signature: Signature,
    pub mint_signature: Signature,
}

impl IssuanceResult {
    /// Explorer page for the new mint.
    pub fn explorer_url(&self, explorer: &ExplorerConfig) -> Result<Url, url::ParseError> {
        explorer_url(explorer, &self.mint_address)
    }
}

/// `https://{host}/token/{mint}`, with `?cluster=devnet` on devnet.
pub fn explorer_url(explorer: &ExplorerConfig, mint: &Pubkey) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("https://{}/token/{}", explorer.host.trim(), mint))?;
    if explorer.cluster == Cluster::Devnet {
        url.query_pairs_mut().append_pair("cluster", "devnet");
    }
    Ok(url)
}

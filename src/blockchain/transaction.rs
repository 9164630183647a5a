//! Transaction building for the fee payment and the token mint.
//!
//! # Responsibilities
//! - Build the fee transfer with a fresh blockhash
//! - Build the four-instruction mint bundle and pre-sign it with the new mint key
//!
//! Both transactions leave the payer's signature slot empty; the wallet fills
//! it at submission time.

use std::sync::Arc;

use solana_sdk::instruction::Instruction;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::state::Mint;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{
    raw_supply, BlockchainError, BlockchainResult, FeePayment, MintBundle, MINT_DECIMALS,
};

/// The single transfer instruction paying the fee.
pub fn payment_instruction(payment: &FeePayment) -> Instruction {
    system_instruction::transfer(&payment.payer, &payment.recipient, payment.amount_lamports)
}

/// Instructions creating `mint`, the payer's token account, and the supply.
///
/// Order matters: the account must exist before it is initialized as a mint,
/// and the mint must be initialized before anything is minted from it.
pub fn mint_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    token_account: &Pubkey,
    rent_lamports: u64,
    raw_supply: u64,
) -> BlockchainResult<Vec<Instruction>> {
    let token_program = spl_token::id();

    let create_mint_account = system_instruction::create_account(
        payer,
        mint,
        rent_lamports,
        Mint::LEN as u64,
        &token_program,
    );

    let initialize_mint =
        spl_token::instruction::initialize_mint(&token_program, mint, payer, None, MINT_DECIMALS)
            .map_err(|e| BlockchainError::Instruction(format!("initialize_mint: {}", e)))?;

    let create_token_account =
        create_associated_token_account(payer, payer, mint, &token_program);

    let mint_supply =
        spl_token::instruction::mint_to(&token_program, mint, token_account, payer, &[], raw_supply)
            .map_err(|e| BlockchainError::Instruction(format!("mint_to: {}", e)))?;

    Ok(vec![
        create_mint_account,
        initialize_mint,
        create_token_account,
        mint_supply,
    ])
}

/// Transaction builder for the issuance flow.
pub struct TxBuilder<C> {
    client: Arc<C>,
}

impl<C: ChainClient> TxBuilder<C> {
    /// Create a new transaction builder.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Build the unsigned fee transfer.
    pub async fn build_payment_transaction(
        &self,
        payment: &FeePayment,
    ) -> BlockchainResult<Transaction> {
        let blockhash = self.client.get_latest_blockhash().await?;

        let mut tx = Transaction::new_with_payer(&[payment_instruction(payment)], Some(&payment.payer));
        tx.message.recent_blockhash = blockhash;

        tracing::debug!(
            payer = %payment.payer,
            recipient = %payment.recipient,
            lamports = payment.amount_lamports,
            "Payment transaction built"
        );
        Ok(tx)
    }

    /// Build the mint bundle for `supply` whole tokens.
    ///
    /// A new mint keypair is generated on every call, so a rebuilt bundle
    /// never shares an address with an earlier one.
    pub async fn build_mint_transaction(
        &self,
        payer: &Pubkey,
        supply: u64,
    ) -> BlockchainResult<MintBundle> {
        let raw_supply = raw_supply(supply, MINT_DECIMALS)?;

        let mint_keypair = Keypair::new();
        let mint = mint_keypair.pubkey();
        let token_account = get_associated_token_address(payer, &mint);

        let rent_lamports = self
            .client
            .get_minimum_balance_for_rent_exemption(Mint::LEN)
            .await?;

        let instructions = mint_instructions(payer, &mint, &token_account, rent_lamports, raw_supply)?;

        let blockhash = self.client.get_latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(&instructions, Some(payer));
        transaction
            .try_partial_sign(&[&mint_keypair], blockhash)
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        tracing::debug!(
            payer = %payer,
            mint = %mint,
            token_account = %token_account,
            rent_lamports,
            raw_supply,
            "Mint transaction built"
        );

        Ok(MintBundle {
            transaction,
            mint_address: mint,
            token_account,
            decimals: MINT_DECIMALS,
            raw_supply,
        })
    }
}

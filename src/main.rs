//! memecoin-issuer command line.
//!
//! ```text
//! memecoin-issuer [--config issuer.toml] create --name .. --symbol .. --description .. [--supply N] [--logo file]
//! memecoin-issuer [--config issuer.toml] balance [--address PUBKEY]
//! memecoin-issuer [--config issuer.toml] explorer-url MINT
//! ```
//!
//! The signing key comes from `MEMECOIN_ISSUER_KEYPAIR` (file path or JSON
//! byte array) or `wallet.keypair_path` in the config file.
//!
//! No metrics recorder is installed here, so the issuance counters are inert
//! when running this binary.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use tokio::sync::broadcast::error::RecvError;

use memecoin_issuer::blockchain::{ChainClient, KeypairWallet, RpcChainClient, WalletSigner};
use memecoin_issuer::config::{load_config, IssuerConfig};
use memecoin_issuer::issuance::request::DEFAULT_INITIAL_SUPPLY;
use memecoin_issuer::issuance::{explorer_url, IssuanceSession, IssuanceSettings, IssuanceState, TokenForm};
use memecoin_issuer::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "memecoin-issuer")]
#[command(about = "Pay the issuance fee and mint a new SPL token", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pay the fee and create a token
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        description: String,
        /// Whole tokens minted to your account
        #[arg(long, default_value = DEFAULT_INITIAL_SUPPLY)]
        supply: String,
        /// PNG or JPG logo, up to 10MB
        #[arg(long)]
        logo: Option<PathBuf>,
    },
    /// Show a SOL balance against the issuance fee
    Balance {
        /// Address to check instead of the connected wallet
        #[arg(long)]
        address: Option<String>,
    },
    /// Print the explorer link for a mint
    ExplorerUrl { mint: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => IssuerConfig::default(),
    };

    init_logging(&config.observability.log_level);
    tracing::debug!(rpc_url = %config.network.rpc_url, "Configuration loaded");

    match cli.command {
        Commands::Create {
            name,
            symbol,
            description,
            supply,
            logo,
        } => {
            let logo = match logo {
                Some(path) => Some(tokio::fs::read(&path).await?),
                None => None,
            };
            let form = TokenForm {
                name,
                symbol,
                description,
                initial_supply: supply,
                logo,
            };
            create(&config, form).await
        }
        Commands::Balance { address } => balance(&config, address).await,
        Commands::ExplorerUrl { mint } => {
            let mint = Pubkey::from_str(&mint)?;
            println!("{}", explorer_url(&config.explorer, &mint)?);
            Ok(())
        }
    }
}

fn connect_wallet(
    config: &IssuerConfig,
    chain: &RpcChainClient,
) -> Result<KeypairWallet, Box<dyn std::error::Error>> {
    let wallet = KeypairWallet::from_env(config.wallet.keypair_path.as_deref(), chain.rpc())?;
    Ok(wallet)
}

async fn create(config: &IssuerConfig, form: TokenForm) -> Result<(), Box<dyn std::error::Error>> {
    let settings = IssuanceSettings::from_config(&config.fee)?;
    let chain = Arc::new(RpcChainClient::new(config.network.clone())?);
    let wallet = Arc::new(connect_wallet(config, &chain)?);

    let mut session = IssuanceSession::new(chain, wallet, settings);

    if let Some(report) = session.balance_report().await {
        println!(
            "Balance: {:.4} SOL (fee {} SOL){}",
            report.balance_sol,
            report.fee_sol,
            if report.is_sufficient() { "" } else { " - may be insufficient" }
        );
    }

    let mut events = session.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(state) => print_state(&state),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = session.submit(&form).await;
    drop(session);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "State printer task failed");
    }

    match outcome {
        Ok(result) => {
            println!("Mint:          {}", result.mint_address);
            println!("Token account: {}", result.token_account);
            println!("Supply:        {}", result.supply);
            println!("Explorer:      {}", result.explorer_url(&config.explorer)?);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn balance(config: &IssuerConfig, address: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let chain = RpcChainClient::new(config.network.clone())?;
    let address = match address {
        Some(address) => Pubkey::from_str(&address)?,
        None => {
            let wallet = connect_wallet(config, &chain)?;
            wallet.public_key().ok_or("Wallet not connected")?
        }
    };

    let report = chain.balance_report(&address, config.fee.amount_sol).await;
    println!("{}: {:.4} SOL", address, report.balance_sol);
    if !report.is_sufficient() {
        println!("Insufficient for the {} SOL issuance fee", report.fee_sol);
    }
    Ok(())
}

fn print_state(state: &IssuanceState) {
    match state {
        IssuanceState::Form => {}
        IssuanceState::PaymentPending { request } => {
            println!("Requesting fee payment for {}...", request.token_symbol())
        }
        IssuanceState::PaymentConfirming { payment_signature, .. } => {
            println!("Confirming payment {}...", payment_signature)
        }
        IssuanceState::MintingPending { .. } => println!("Payment confirmed. Creating token..."),
        IssuanceState::MintingConfirming { mint_address, .. } => {
            println!("Confirming token {}...", mint_address)
        }
        IssuanceState::Success(_) => println!("Token created."),
        IssuanceState::Error(failure) => {
            if let Some(signature) = failure.fee_spent {
                eprintln!("The fee payment {} was confirmed and is not refunded.", signature);
            }
        }
    }
}

//! Payment-then-mint orchestration.
//!
//! # Sequence
//! ```text
//! validate form
//!     → build + send fee transfer        (payment_pending)
//!     → confirm fee transfer             (payment_confirming)
//!     → build + send mint bundle         (minting_pending)
//!     → confirm mint bundle              (minting_confirming)
//!     → success
//! ```
//!
//! Every step awaits the previous one. Nothing is retried: any failure ends
//! the attempt in `error` and the caller restarts from `form` via `reset`.
//!
//! # Fee is not refunded
//! If the fee transfer confirms and the mint then fails, the fee stays spent.
//! No compensating transfer is attempted. The failure carries the payment
//! signature in `fee_spent` so the caller can show it.
//!
//! # Ordering
//! Each in-flight step is a separate stage type that only the previous step
//! can produce. A mint bundle can only be built from [`FeePaid`], and the only
//! way to get a `FeePaid` is a confirmed payment.

use std::str::FromStr;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::{lamports_to_sol, sol_to_lamports, BalanceReport, FeePayment};
use crate::blockchain::wallet::WalletSigner;
use crate::config::validation::{validate_fee, ValidationError as ConfigValidationError};
use crate::config::FeeConfig;
use crate::issuance::request::{IssuanceRequest, TokenForm, ValidationError};
use crate::issuance::result::IssuanceResult;
use crate::issuance::state::{FailureKind, IssuanceFailure, IssuanceState, Phase};
use crate::observability::metrics;

/// Shown when the fee transfer does not confirm.
pub const PAYMENT_NOT_CONFIRMED: &str = "Payment transaction failed or was not confirmed";

/// Shown when the mint bundle does not confirm.
pub const MINT_NOT_CONFIRMED: &str = "Token creation transaction failed or was not confirmed";

/// Shown when an error carries no message of its own.
pub const GENERIC_FAILURE: &str = "Failed to create token. Please try again.";

const EVENT_CAPACITY: usize = 16;

/// Fee policy handed to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuanceSettings {
    pub fee_recipient: Pubkey,
    pub fee_lamports: u64,
}

impl IssuanceSettings {
    pub fn new(fee_recipient: Pubkey, fee_lamports: u64) -> Self {
        Self {
            fee_recipient,
            fee_lamports,
        }
    }

    /// Resolve the fee section of the configuration.
    ///
    /// Runs the same checks as `validate_config` does for `[fee]`, so an
    /// unvalidated config is safe here. Reports the first problem found.
    pub fn from_config(fee: &FeeConfig) -> Result<Self, ConfigValidationError> {
        if let Some(err) = validate_fee(fee).into_iter().next() {
            return Err(err);
        }
        let fee_recipient = Pubkey::from_str(&fee.recipient)
            .map_err(|_| ConfigValidationError::FeeRecipient(fee.recipient.clone()))?;
        Ok(Self::new(fee_recipient, sol_to_lamports(fee.amount_sol)))
    }

    pub fn fee_sol(&self) -> f64 {
        lamports_to_sol(self.fee_lamports)
    }
}

/// Why `submit` did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuanceError {
    /// No wallet key is connected. State stays at `form`.
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    /// The form was rejected locally. State stays at `form`.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `submit` was called outside `form`.
    #[error("Cannot start a new issuance from '{0}'; reset the session first")]
    NotReady(Phase),

    /// The attempt ran and ended in `error`.
    #[error(transparent)]
    Failed(IssuanceFailure),
}

// Stage types. Fields are private to this module, so each stage can only be
// created by the step before it.

struct AwaitingPayment {
    request: Arc<IssuanceRequest>,
}

struct PaymentSubmitted {
    request: Arc<IssuanceRequest>,
    payment_signature: Signature,
}

/// Proof that the fee transfer confirmed.
struct FeePaid {
    request: Arc<IssuanceRequest>,
    payment_signature: Signature,
}

struct MintSubmitted {
    request: Arc<IssuanceRequest>,
    payment_signature: Signature,
    mint_address: Pubkey,
    token_account: Pubkey,
    mint_signature: Signature,
}

impl PaymentSubmitted {
    fn snapshot(&self) -> IssuanceState {
        IssuanceState::PaymentConfirming {
            request: self.request.clone(),
            payment_signature: self.payment_signature,
        }
    }
}

impl FeePaid {
    fn snapshot(&self) -> IssuanceState {
        IssuanceState::MintingPending {
            request: self.request.clone(),
            payment_signature: self.payment_signature,
        }
    }
}

impl MintSubmitted {
    fn snapshot(&self) -> IssuanceState {
        IssuanceState::MintingConfirming {
            request: self.request.clone(),
            payment_signature: self.payment_signature,
            mint_address: self.mint_address,
            token_account: self.token_account,
            mint_signature: self.mint_signature,
        }
    }
}

fn failure(
    phase: Phase,
    kind: FailureKind,
    message: impl Into<String>,
    fee_spent: Option<Signature>,
) -> IssuanceFailure {
    let message = message.into();
    let message = if message.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message
    };
    IssuanceFailure {
        phase,
        kind,
        message,
        fee_spent,
    }
}

/// One user's issuance flow.
///
/// `submit` takes `&mut self`, so a session never runs two attempts at once.
pub struct IssuanceSession<C, W> {
    chain: Arc<C>,
    wallet: Arc<W>,
    builder: TxBuilder<C>,
    settings: IssuanceSettings,
    state: IssuanceState,
    events: broadcast::Sender<IssuanceState>,
}

impl<C, W> IssuanceSession<C, W>
where
    C: ChainClient,
    W: WalletSigner,
{
    /// Create a session in `form`.
    pub fn new(chain: Arc<C>, wallet: Arc<W>, settings: IssuanceSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            builder: TxBuilder::new(chain.clone()),
            chain,
            wallet,
            settings,
            state: IssuanceState::Form,
            events,
        }
    }

    /// Current state.
    pub fn state(&self) -> &IssuanceState {
        &self.state
    }

    pub fn settings(&self) -> &IssuanceSettings {
        &self.settings
    }

    /// Receive every state this session enters from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<IssuanceState> {
        self.events.subscribe()
    }

    /// Connected wallet's balance against the fee, if a wallet is connected.
    pub async fn balance_report(&self) -> Option<BalanceReport> {
        let payer = self.wallet.public_key()?;
        Some(self.chain.balance_report(&payer, self.settings.fee_sol()).await)
    }

    /// Return to `form`, dropping the last request and result.
    ///
    /// Does nothing while already in `form`.
    pub fn reset(&mut self) {
        if self.state.phase() != Phase::Form {
            self.transition(IssuanceState::Form);
        }
    }

    /// Validate `form` and run one payment-then-mint attempt.
    ///
    /// Validation and connection failures return immediately without any
    /// chain or wallet call and leave the state at `form`.
    pub async fn submit(&mut self, form: &TokenForm) -> Result<IssuanceResult, IssuanceError> {
        let phase = self.state.phase();
        if phase != Phase::Form {
            return Err(IssuanceError::NotReady(phase));
        }

        let payer = self
            .wallet
            .public_key()
            .ok_or(IssuanceError::WalletNotConnected)?;

        let request = match IssuanceRequest::new(payer, form) {
            Ok(request) => Arc::new(request),
            Err(e) => {
                tracing::info!(error = %e, "Issuance form rejected");
                return Err(e.into());
            }
        };

        let span = tracing::info_span!(
            "issuance",
            attempt_id = %Uuid::new_v4(),
            payer = %payer,
            symbol = %request.token_symbol(),
        );

        self.run(request)
            .instrument(span)
            .await
            .map_err(IssuanceError::Failed)
    }

    async fn run(&mut self, request: Arc<IssuanceRequest>) -> Result<IssuanceResult, IssuanceFailure> {
        let outcome = self.pipeline(request).await;

        match &outcome {
            Ok(result) => {
                tracing::info!(
                    mint = %result.mint_address,
                    token_account = %result.token_account,
                    supply = result.supply,
                    "Token issued"
                );
                metrics::record_outcome("success");
                self.transition(IssuanceState::Success(result.clone()));
            }
            Err(failure) => {
                if let Some(payment_signature) = failure.fee_spent {
                    tracing::warn!(
                        payment_signature = %payment_signature,
                        error = %failure.message,
                        "Token creation failed after the fee was paid; the fee is not refunded"
                    );
                } else {
                    tracing::warn!(phase = %failure.phase, error = %failure.message, "Issuance failed");
                }
                metrics::record_outcome("error");
                self.transition(IssuanceState::Error(failure.clone()));
            }
        }

        outcome
    }

    async fn pipeline(&mut self, request: Arc<IssuanceRequest>) -> Result<IssuanceResult, IssuanceFailure> {
        self.transition(IssuanceState::PaymentPending {
            request: request.clone(),
        });

        let submitted = self.send_payment(AwaitingPayment { request }).await?;
        self.transition(submitted.snapshot());

        let paid = self.confirm_payment(submitted).await?;
        self.transition(paid.snapshot());

        let minting = self.send_mint(paid).await?;
        self.transition(minting.snapshot());

        self.confirm_mint(minting).await
    }

    async fn send_payment(&self, stage: AwaitingPayment) -> Result<PaymentSubmitted, IssuanceFailure> {
        let payment = FeePayment {
            payer: *stage.request.payer(),
            recipient: self.settings.fee_recipient,
            amount_lamports: self.settings.fee_lamports,
        };

        let tx = self
            .builder
            .build_payment_transaction(&payment)
            .await
            .map_err(|e| failure(Phase::PaymentPending, FailureKind::Network, e.to_string(), None))?;

        let payment_signature = self
            .wallet
            .send_transaction(tx)
            .await
            .map_err(|e| failure(Phase::PaymentPending, FailureKind::Wallet, e.to_string(), None))?;

        tracing::info!(
            signature = %payment_signature,
            lamports = payment.amount_lamports,
            "Fee payment submitted"
        );

        Ok(PaymentSubmitted {
            request: stage.request,
            payment_signature,
        })
    }

    async fn confirm_payment(&self, stage: PaymentSubmitted) -> Result<FeePaid, IssuanceFailure> {
        if !self.chain.confirm_transaction(&stage.payment_signature).await {
            return Err(failure(
                Phase::PaymentConfirming,
                FailureKind::NotConfirmed,
                PAYMENT_NOT_CONFIRMED,
                None,
            ));
        }

        tracing::info!(signature = %stage.payment_signature, "Fee payment confirmed");
        Ok(FeePaid {
            request: stage.request,
            payment_signature: stage.payment_signature,
        })
    }

    async fn send_mint(&self, stage: FeePaid) -> Result<MintSubmitted, IssuanceFailure> {
        let paid = Some(stage.payment_signature);

        let bundle = self
            .builder
            .build_mint_transaction(stage.request.payer(), stage.request.initial_supply())
            .await
            .map_err(|e| failure(Phase::MintingPending, FailureKind::Network, e.to_string(), paid))?;

        let mint_signature = self
            .wallet
            .send_transaction(bundle.transaction)
            .await
            .map_err(|e| failure(Phase::MintingPending, FailureKind::Wallet, e.to_string(), paid))?;

        tracing::info!(
            signature = %mint_signature,
            mint = %bundle.mint_address,
            "Mint transaction submitted"
        );

        Ok(MintSubmitted {
            request: stage.request,
            payment_signature: stage.payment_signature,
            mint_address: bundle.mint_address,
            token_account: bundle.token_account,
            mint_signature,
        })
    }

    async fn confirm_mint(&self, stage: MintSubmitted) -> Result<IssuanceResult, IssuanceFailure> {
        if !self.chain.confirm_transaction(&stage.mint_signature).await {
            return Err(failure(
                Phase::MintingConfirming,
                FailureKind::NotConfirmed,
                MINT_NOT_CONFIRMED,
                Some(stage.payment_signature),
            ));
        }

        Ok(IssuanceResult {
            mint_address: stage.mint_address,
            token_account: stage.token_account,
            supply: stage.request.initial_supply(),
            payment_signature: stage.payment_signature,
            mint_signature: stage.mint_signature,
        })
    }

    fn transition(&mut self, next: IssuanceState) {
        let from = self.state.phase();
        let to = next.phase();
        debug_assert!(from.can_transition_to(to), "illegal transition {} -> {}", from, to);

        tracing::info!(from = %from, to = %to, "Issuance state changed");
        metrics::record_transition(to.as_str());

        self.state = next;
        // No subscribers is fine.
        let _ = self.events.send(self.state.clone());
    }
}

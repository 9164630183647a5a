//! Issuance state machine states.
//!
//! # States
//! ```text
//! form → payment_pending → payment_confirming → minting_pending
//!      → minting_confirming → success
//!
//! any in-flight state → error
//! success | error → form   (manual restart)
//! ```

use std::fmt;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::issuance::request::IssuanceRequest;
use crate::issuance::result::IssuanceResult;

/// Name of a state, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Form,
    PaymentPending,
    PaymentConfirming,
    MintingPending,
    MintingConfirming,
    Success,
    Error,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Form => "form",
            Phase::PaymentPending => "payment_pending",
            Phase::PaymentConfirming => "payment_confirming",
            Phase::MintingPending => "minting_pending",
            Phase::MintingConfirming => "minting_confirming",
            Phase::Success => "success",
            Phase::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Success | Phase::Error)
    }

    /// Whether the machine may move from `self` to `next`.
    pub fn can_transition_to(&self, next: Phase) -> bool {
        use Phase::*;

        match (*self, next) {
            (Form, PaymentPending)
            | (PaymentPending, PaymentConfirming)
            | (PaymentConfirming, MintingPending)
            | (MintingPending, MintingConfirming)
            | (MintingConfirming, Success) => true,
            (PaymentPending | PaymentConfirming | MintingPending | MintingConfirming, Error) => {
                true
            }
            (Form | Success | Error, Form) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad cause of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The wallet refused or could not sign and broadcast.
    Wallet,
    /// A submitted transaction was not confirmed.
    NotConfirmed,
    /// Building a transaction failed (RPC unreachable, bad instruction).
    Network,
}

/// Why an attempt ended in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct IssuanceFailure {
    /// Phase the attempt was in when it failed.
    pub phase: Phase,
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
    /// Signature of the confirmed fee payment when the failure came after it.
    /// That fee is not refunded.
    pub fee_spent: Option<Signature>,
}

/// Observable state of an issuance session.
#[derive(Debug, Clone, Default)]
pub enum IssuanceState {
    #[default]
    Form,
    PaymentPending {
        request: Arc<IssuanceRequest>,
    },
    PaymentConfirming {
        request: Arc<IssuanceRequest>,
        payment_signature: Signature,
    },
    MintingPending {
        request: Arc<IssuanceRequest>,
        payment_signature: Signature,
    },
    MintingConfirming {
        request: Arc<IssuanceRequest>,
        payment_signature: Signature,
        mint_address: Pubkey,
        token_account: Pubkey,
        mint_signature: Signature,
    },
    Success(IssuanceResult),
    Error(IssuanceFailure),
}

impl IssuanceState {
    pub fn phase(&self) -> Phase {
        match self {
            IssuanceState::Form => Phase::Form,
            IssuanceState::PaymentPending { .. } => Phase::PaymentPending,
            IssuanceState::PaymentConfirming { .. } => Phase::PaymentConfirming,
            IssuanceState::MintingPending { .. } => Phase::MintingPending,
            IssuanceState::MintingConfirming { .. } => Phase::MintingConfirming,
            IssuanceState::Success(_) => Phase::Success,
            IssuanceState::Error(_) => Phase::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }

    /// The request being processed, for in-flight states.
    pub fn request(&self) -> Option<&IssuanceRequest> {
        match self {
            IssuanceState::PaymentPending { request }
            | IssuanceState::PaymentConfirming { request, .. }
            | IssuanceState::MintingPending { request, .. }
            | IssuanceState::MintingConfirming { request, .. } => Some(request.as_ref()),
            IssuanceState::Form | IssuanceState::Success(_) | IssuanceState::Error(_) => None,
        }
    }

    pub fn result(&self) -> Option<&IssuanceResult> {
        match self {
            IssuanceState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&IssuanceFailure> {
        match self {
            IssuanceState::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

//! Token issuance subsystem.
//!
//! # Data Flow
//! ```text
//! TokenForm
//!     → request.rs (local validation → IssuanceRequest)
//!     → orchestrator.rs (payment, confirmation, mint, confirmation)
//!     → state.rs (observable IssuanceState, broadcast per transition)
//!     → result.rs (IssuanceResult, explorer link)
//! ```

pub mod orchestrator;
pub mod request;
pub mod result;
pub mod state;

pub use orchestrator::{IssuanceError, IssuanceSession, IssuanceSettings};
pub use request::{IssuanceRequest, LogoFormat, LogoImage, TokenForm, ValidationError};
pub use result::{explorer_url, IssuanceResult};
pub use state::{FailureKind, IssuanceFailure, IssuanceState, Phase};

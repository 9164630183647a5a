//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! blockchain + issuance produce:
//!     → logging.rs (structured log events, one span per attempt)
//!     → metrics.rs (counters)
//! ```

pub mod logging;
pub mod metrics;

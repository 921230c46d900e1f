//! Pipeline error kinds
//!
//! None of these are fatal: the coordinator logs the error, releases the
//! gate and waits for the next swap signal.
//!
//! Created: 2026-10-18

use crate::types::VenueId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbError {
    /// Reserve or chain read could not complete (network, timeout, empty pool)
    #[error("{venue} unavailable: {reason}")]
    Unavailable { venue: VenueId, reason: String },

    /// Quote simulation reverted or the path is invalid
    #[error("{venue} quote failed: {reason}")]
    Quote { venue: VenueId, reason: String },

    /// Settlement submission or confirmation failed
    #[error("execution failed: {0}")]
    Execution(String),

    /// Funding-token → display-currency rate could not be obtained
    #[error("reference rate unavailable: {0}")]
    RateUnavailable(String),

    /// Value does not fit the fixed-point display type
    #[error("arithmetic error: {0}")]
    Math(String),
}

impl ArbError {
    pub fn unavailable(venue: VenueId, reason: impl ToString) -> Self {
        ArbError::Unavailable {
            venue,
            reason: reason.to_string(),
        }
    }

    pub fn quote(venue: VenueId, reason: impl ToString) -> Self {
        ArbError::Quote {
            venue,
            reason: reason.to_string(),
        }
    }

    /// Short kind tag for logs and the journal
    pub fn kind(&self) -> &'static str {
        match self {
            ArbError::Unavailable { .. } => "unavailable",
            ArbError::Quote { .. } => "quote",
            ArbError::Execution(_) => "execution",
            ArbError::RateUnavailable(_) => "rate_unavailable",
            ArbError::Math(_) => "math",
        }
    }
}

//! Venue Clients
//!
//! Read access to one AMM venue holding the monitored pair: current
//! reserves and a quote for a single-hop swap. Reserves are read fresh on
//! every call; nothing is cached between decision cycles.
//!
//! Implementations:
//! - `V2Venue`: Uniswap V2-style factory/pair/router on-chain
//! - `OfflineVenue`: in-memory constant-product pool (simulation, tests)
//!
//! Created: 2026-10-18

pub mod offline;
pub mod subscription;
pub mod v2;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::ArbError;
use crate::types::{Reserves, TokenPair, VenueId};

pub use offline::OfflineVenue;
pub use subscription::SwapSubscription;
pub use v2::V2Venue;

/// Read-only view of one venue's pool
#[async_trait]
pub trait VenueClient: Send + Sync {
    fn id(&self) -> VenueId;

    /// Display name ("Uniswap", "Sushiswap", ...)
    fn name(&self) -> &str;

    /// Current reserves in pair order. `Unavailable` if the read fails.
    async fn get_reserves(&self) -> Result<Reserves, ArbError>;

    /// Output of swapping `amount_in` of `token_in` for `token_out`.
    /// `Quote` on an invalid path or a reverted simulation.
    async fn quote_output(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address,
    ) -> Result<U256, ArbError>;
}

/// The two monitored venues, addressed by `VenueId`
#[derive(Clone)]
pub struct VenuePair {
    a: Arc<dyn VenueClient>,
    b: Arc<dyn VenueClient>,
}

impl VenuePair {
    pub fn new(a: Arc<dyn VenueClient>, b: Arc<dyn VenueClient>) -> Self {
        Self { a, b }
    }

    pub fn get(&self, id: VenueId) -> &dyn VenueClient {
        match id {
            VenueId::A => self.a.as_ref(),
            VenueId::B => self.b.as_ref(),
        }
    }

    pub fn name(&self, id: VenueId) -> &str {
        self.get(id).name()
    }
}

/// Which pair token a quote sells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSide {
    FundingIn,
    IntermediateIn,
}

/// Validate a quote path against the monitored pair
pub fn quote_side(
    venue: VenueId,
    pair: &TokenPair,
    token_in: Address,
    token_out: Address,
) -> Result<QuoteSide, ArbError> {
    let funding = pair.funding.address;
    let intermediate = pair.intermediate.address;

    if token_in == funding && token_out == intermediate {
        Ok(QuoteSide::FundingIn)
    } else if token_in == intermediate && token_out == funding {
        Ok(QuoteSide::IntermediateIn)
    } else {
        Err(ArbError::quote(
            venue,
            format!("invalid path {:?} -> {:?}", token_in, token_out),
        ))
    }
}

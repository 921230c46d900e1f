//! Offline Venue
//!
//! In-memory constant-product pool with a venue-specific fee. Quotes with
//! the same integer formula a V2 router uses, so simulated runs and tests
//! see the numbers a live router would return for the same reserves.
//!
//! Created: 2026-10-18

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::{quote_side, QuoteSide, VenueClient};
use crate::errors::ArbError;
use crate::pool::get_amount_out;
use crate::types::{Reserves, TokenPair, VenueId};

/// Replaceable reserves plus an optional injected failure
struct OfflineState {
    reserves: Reserves,
    failure: Option<ArbError>,
}

pub struct OfflineVenue {
    id: VenueId,
    name: String,
    pair: TokenPair,
    fee_bps: u32,
    state: RwLock<OfflineState>,
    reserve_reads: AtomicU64,
    quotes: AtomicU64,
}

impl OfflineVenue {
    pub fn new(
        id: VenueId,
        name: impl Into<String>,
        pair: TokenPair,
        reserves: Reserves,
        fee_bps: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            pair,
            fee_bps,
            state: RwLock::new(OfflineState {
                reserves,
                failure: None,
            }),
            reserve_reads: AtomicU64::new(0),
            quotes: AtomicU64::new(0),
        }
    }

    /// Replace the pool reserves (simulates swaps landing on-chain)
    pub fn set_reserves(&self, reserves: Reserves) {
        if let Ok(mut state) = self.state.write() {
            state.reserves = reserves;
        }
    }

    /// Every subsequent read and quote fails with `error` until cleared
    pub fn fail_with(&self, error: Option<ArbError>) {
        if let Ok(mut state) = self.state.write() {
            state.failure = error;
        }
    }

    pub fn reserve_reads(&self) -> u64 {
        self.reserve_reads.load(Ordering::Relaxed)
    }

    pub fn quotes(&self) -> u64 {
        self.quotes.load(Ordering::Relaxed)
    }

    fn snapshot(&self) -> Result<Reserves, ArbError> {
        let state = self
            .state
            .read()
            .map_err(|_| ArbError::unavailable(self.id, "state lock poisoned"))?;
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.reserves),
        }
    }
}

#[async_trait]
impl VenueClient for OfflineVenue {
    fn id(&self) -> VenueId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn get_reserves(&self) -> Result<Reserves, ArbError> {
        self.reserve_reads.fetch_add(1, Ordering::Relaxed);
        self.snapshot()
    }

    async fn quote_output(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address,
    ) -> Result<U256, ArbError> {
        self.quotes.fetch_add(1, Ordering::Relaxed);
        let side = quote_side(self.id, &self.pair, token_in, token_out)?;
        let reserves = self.snapshot()?;

        let (reserve_in, reserve_out) = match side {
            QuoteSide::FundingIn => (reserves.funding, reserves.intermediate),
            QuoteSide::IntermediateIn => (reserves.intermediate, reserves.funding),
        };

        get_amount_out(amount_in, reserve_in, reserve_out, self.fee_bps)
            .ok_or_else(|| ArbError::quote(self.id, "amount out overflow"))
    }
}

//! Core data structures
//!
//! Token pair, venue identity, swap signals, trade direction and the
//! intent/receipt types that flow through the arbitrage pipeline.
//!
//! Created: 2026-10-18

use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pool::Price;

/// Token descriptor (address, symbol, decimal precision)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// The monitored pair. Immutable for the process lifetime.
///
/// `funding` is the token supplied as trade input (e.g. WETH),
/// `intermediate` is the token bought on the first leg (e.g. SHIB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub funding: Token,
    pub intermediate: Token,
}

impl TokenPair {
    pub fn new(funding: Token, intermediate: Token) -> Self {
        Self {
            funding,
            intermediate,
        }
    }

    /// "INTERMEDIATE/FUNDING" label used in logs
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.intermediate.symbol, self.funding.symbol)
    }

    /// True if `token` is one of the two pair tokens
    pub fn contains(&self, token: Address) -> bool {
        token == self.funding.address || token == self.intermediate.address
    }
}

/// One of the two monitored venues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueId {
    A,
    B,
}

impl VenueId {
    pub const ALL: [VenueId; 2] = [VenueId::A, VenueId::B];

    /// Slot index for per-venue arrays
    pub fn index(self) -> usize {
        match self {
            VenueId::A => 0,
            VenueId::B => 1,
        }
    }

    pub fn other(self) -> VenueId {
        match self {
            VenueId::A => VenueId::B,
            VenueId::B => VenueId::A,
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VenueId::A => write!(f, "venue-A"),
            VenueId::B => write!(f, "venue-B"),
        }
    }
}

/// Pool reserves normalized into `TokenPair` order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub funding: U256,
    pub intermediate: U256,
}

impl Reserves {
    pub fn new(funding: U256, intermediate: U256) -> Self {
        Self {
            funding,
            intermediate,
        }
    }

    /// Reorder raw pool reserves (pool token0/token1 order) into pair order
    pub fn from_pool_order(
        reserve0: U256,
        reserve1: U256,
        pool_token0: Address,
        pair: &TokenPair,
    ) -> Self {
        if pool_token0 == pair.funding.address {
            Self::new(reserve0, reserve1)
        } else {
            Self::new(reserve1, reserve0)
        }
    }
}

/// A swap observed on one venue. Consumed once by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapSignal {
    pub venue: VenueId,
    pub block_number: u64,
}

impl SwapSignal {
    pub fn new(venue: VenueId, block_number: u64) -> Self {
        Self {
            venue,
            block_number,
        }
    }
}

/// Buy on `source`, sell on `destination`. Computed fresh per signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Direction {
    pub source: VenueId,
    pub destination: VenueId,
    pub price_a: Price,
    pub price_b: Price,
}

impl Direction {
    /// Settlement contract flag: does the first leg run on venue A?
    pub fn starts_on_a(&self) -> bool {
        self.source == VenueId::A
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "buy {} -> sell {}", self.source, self.destination)
    }
}

/// Result of simulating both legs for one candidate amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitEstimate {
    pub direction: Direction,
    pub amount_in: U256,
    pub intermediate_out: U256,
    pub amount_out: U256,
    /// Signed profit in funding-token units (decimals applied)
    pub profit_funding: Decimal,
    /// Profit converted to the display currency
    pub profit_display: Decimal,
    /// Funding-token → display-currency rate used for the conversion
    pub reference_rate: Decimal,
}

/// Fully computed, ready-to-submit arbitrage attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIntent {
    pub direction: Direction,
    pub amount_in: U256,
    pub expected_out: U256,
    pub profit_funding: Decimal,
    pub profit_display: Decimal,
}

impl From<ProfitEstimate> for TradeIntent {
    fn from(estimate: ProfitEstimate) -> Self {
        Self {
            direction: estimate.direction,
            amount_in: estimate.amount_in,
            expected_out: estimate.amount_out,
            profit_funding: estimate.profit_funding,
            profit_display: estimate.profit_display,
        }
    }
}

/// Confirmed settlement transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// How one admitted pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Both venues quote the same price
    NoDirection,
    /// Simulated profit below the configured minimum
    NotProfitable(ProfitEstimate),
    /// Profitable, but execution is switched off
    ExecutionDisabled(TradeIntent),
    /// Settlement confirmed on-chain
    Executed(TradeIntent, TradeReceipt),
}

impl PipelineOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::NoDirection => "no_direction",
            PipelineOutcome::NotProfitable(_) => "not_profitable",
            PipelineOutcome::ExecutionDisabled(_) => "execution_disabled",
            PipelineOutcome::Executed(_, _) => "executed",
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, PipelineOutcome::Executed(_, _))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair::new(
            Token::new(Address::repeat_byte(0xC0), "WETH", 18),
            Token::new(Address::repeat_byte(0x95), "SHIB", 18),
        )
    }

    #[test]
    fn test_reserves_follow_pair_order() {
        let pair = pair();
        let r0 = U256::from(10u64);
        let r1 = U256::from(20u64);

        // Funding token is pool token0
        let direct = Reserves::from_pool_order(r0, r1, pair.funding.address, &pair);
        assert_eq!(direct, Reserves::new(r0, r1));

        // Funding token is pool token1 (the WETH/SHIB ordering on mainnet)
        let swapped = Reserves::from_pool_order(r0, r1, pair.intermediate.address, &pair);
        assert_eq!(swapped, Reserves::new(r1, r0));
    }

    #[test]
    fn test_pair_symbol_and_membership() {
        let pair = pair();
        assert_eq!(pair.symbol(), "SHIB/WETH");
        assert!(pair.contains(Address::repeat_byte(0xC0)));
        assert!(!pair.contains(Address::ZERO));
    }

    #[test]
    fn test_venue_index_and_other() {
        assert_eq!(VenueId::A.index(), 0);
        assert_eq!(VenueId::B.index(), 1);
        assert_eq!(VenueId::A.other(), VenueId::B);
        assert_eq!(VenueId::B.other(), VenueId::A);
    }
}

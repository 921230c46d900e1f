//! Exact Spot Price
//!
//! A spot price is kept as the raw reserve ratio `numerator / denominator`
//! and compared by cross-multiplication in U512, so two venues are never
//! ranked by a rounded value. `Decimal` only appears at the display edge.
//!
//! Created: 2026-10-18

use alloy::primitives::{U256, U512};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

use super::calculator::ratio_to_decimal;
use crate::errors::ArbError;
use crate::types::Reserves;

/// Funding units per intermediate unit, as an exact rational
#[derive(Debug, Clone, Copy)]
pub struct Price {
    numerator: U256,
    denominator: U256,
}

impl Price {
    /// `None` when the denominator is zero
    pub fn new(numerator: U256, denominator: U256) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    /// funding reserve / intermediate reserve
    pub fn from_reserves(reserves: &Reserves) -> Option<Self> {
        Self::new(reserves.funding, reserves.intermediate)
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// Display value (truncated at the widest scale that fits)
    pub fn to_decimal(&self) -> Result<Decimal, ArbError> {
        ratio_to_decimal(U512::from(self.numerator), U512::from(self.denominator))
    }

    /// `|self − base| / base × 100`
    pub fn spread_percent(&self, base: &Price) -> Result<Decimal, ArbError> {
        if base.is_zero() {
            return Err(ArbError::Math("spread against a zero price".to_string()));
        }

        // a/b − c/d = (a·d − c·b) / (b·d); dividing by c/d gives (a·d − c·b) / (c·b)
        let lhs = U512::from(self.numerator) * U512::from(base.denominator);
        let rhs = U512::from(base.numerator) * U512::from(self.denominator);
        let diff = if lhs >= rhs { lhs - rhs } else { rhs - lhs };

        let scaled = diff
            .checked_mul(U512::from(100u64))
            .ok_or_else(|| ArbError::Math("spread numerator overflow".to_string()))?;

        ratio_to_decimal(scaled, rhs)
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        // Both products fit: U256 × U256 < 2^512
        let lhs = U512::from(self.numerator) * U512::from(other.denominator);
        let rhs = U512::from(other.numerator) * U512::from(self.denominator);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_decimal() {
            Ok(d) => write!(f, "{}", d),
            Err(_) => write!(f, "{}/{}", self.numerator, self.denominator),
        }
    }
}

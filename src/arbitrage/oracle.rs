//! Price Oracle
//!
//! Spot price per venue, the market spread between the two venues and the
//! trade direction. Prices are exact reserve ratios; the spread is the only
//! value computed in `Decimal`.
//!
//! Created: 2026-10-18

use rust_decimal::Decimal;

use crate::errors::ArbError;
use crate::pool::Price;
use crate::types::{Direction, Reserves, VenueId};
use crate::venue::VenuePair;

/// Both spot prices and their spread at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub price_a: Price,
    pub price_b: Price,
    /// `|A − B| / B × 100`
    pub spread_percent: Decimal,
}

impl Observation {
    pub fn price(&self, venue: VenueId) -> Price {
        match venue {
            VenueId::A => self.price_a,
            VenueId::B => self.price_b,
        }
    }
}

/// Funding units per intermediate unit.
/// An empty intermediate side cannot be priced.
pub fn spot_price(venue: VenueId, reserves: &Reserves) -> Result<Price, ArbError> {
    if reserves.funding.is_zero() {
        return Err(ArbError::unavailable(venue, "funding reserve is zero"));
    }
    Price::from_reserves(reserves)
        .ok_or_else(|| ArbError::unavailable(venue, "intermediate reserve is zero"))
}

pub fn spread(price_a: &Price, price_b: &Price) -> Result<Decimal, ArbError> {
    price_a.spread_percent(price_b)
}

/// Buy where the intermediate token is cheaper, sell where it is dearer.
/// `None` when the prices are exactly equal.
pub fn choose_direction(price_a: Price, price_b: Price) -> Option<Direction> {
    let source = if price_a > price_b {
        VenueId::B
    } else if price_b > price_a {
        VenueId::A
    } else {
        return None;
    };

    Some(Direction {
        source,
        destination: source.other(),
        price_a,
        price_b,
    })
}

/// Read both venues (A then B) and price them
pub async fn observe(venues: &VenuePair) -> Result<Observation, ArbError> {
    let reserves_a = venues.get(VenueId::A).get_reserves().await?;
    let reserves_b = venues.get(VenueId::B).get_reserves().await?;

    let price_a = spot_price(VenueId::A, &reserves_a)?;
    let price_b = spot_price(VenueId::B, &reserves_b)?;
    let spread_percent = spread(&price_a, &price_b)?;

    Ok(Observation {
        price_a,
        price_b,
        spread_percent,
    })
}

//! Profitability Estimator
//!
//! Sizes the trade from the smaller funding reserve, simulates both legs
//! through the venues' quote functions and converts the result into the
//! display currency. Holds no state between calls: the same venue state
//! and parameters always produce the same estimate.
//!
//! Created: 2026-10-18

use alloy::primitives::U256;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::ArbError;
use crate::pool::calculator::{candidate_amount, signed_delta_units};
use crate::rate::ReferenceRate;
use crate::types::{Direction, ProfitEstimate, TokenPair, TradeIntent, VenueId};
use crate::venue::VenuePair;

/// Default: trade 1/100,000 of the smaller funding reserve
pub const DEFAULT_SAFETY_DIVISOR: u64 = 100_000;

/// Accept/reject decision for one direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Accepted(TradeIntent),
    Rejected(ProfitEstimate),
}

pub struct ProfitabilityEstimator {
    safety_divisor: U256,
    /// Minimum profit in the display currency (inclusive)
    min_profit: Decimal,
    rate: Arc<dyn ReferenceRate>,
}

impl ProfitabilityEstimator {
    pub fn new(safety_divisor: u64, min_profit: Decimal, rate: Arc<dyn ReferenceRate>) -> Self {
        Self {
            safety_divisor: U256::from(safety_divisor),
            min_profit,
            rate,
        }
    }

    pub fn currency(&self) -> &str {
        self.rate.currency()
    }

    /// Simulate buy on `direction.source`, sell on `direction.destination`
    pub async fn estimate(
        &self,
        direction: &Direction,
        venues: &VenuePair,
        pair: &TokenPair,
    ) -> Result<ProfitEstimate, ArbError> {
        let reserves_a = venues.get(VenueId::A).get_reserves().await?;
        let reserves_b = venues.get(VenueId::B).get_reserves().await?;
        let amount_in = candidate_amount(reserves_a.funding, reserves_b.funding, self.safety_divisor);

        let reference_rate = self.rate.rate().await?;

        if amount_in.is_zero() {
            debug!("Candidate amount rounds to zero, nothing to simulate");
            return Ok(ProfitEstimate {
                direction: direction.clone(),
                amount_in,
                intermediate_out: U256::ZERO,
                amount_out: U256::ZERO,
                profit_funding: Decimal::ZERO,
                profit_display: Decimal::ZERO,
                reference_rate,
            });
        }

        let funding = pair.funding.address;
        let intermediate = pair.intermediate.address;

        let intermediate_out = venues
            .get(direction.source)
            .quote_output(amount_in, funding, intermediate)
            .await?;
        let amount_out = venues
            .get(direction.destination)
            .quote_output(intermediate_out, intermediate, funding)
            .await?;

        let profit_funding = signed_delta_units(amount_out, amount_in, pair.funding.decimals)?;
        let profit_display = profit_funding
            .checked_mul(reference_rate)
            .ok_or_else(|| ArbError::Math(format!("{} x {} overflows", profit_funding, reference_rate)))?;

        Ok(ProfitEstimate {
            direction: direction.clone(),
            amount_in,
            intermediate_out,
            amount_out,
            profit_funding,
            profit_display,
            reference_rate,
        })
    }

    /// Profit at or above the minimum; a zero-size trade never qualifies
    pub fn accepts(&self, estimate: &ProfitEstimate) -> bool {
        !estimate.amount_in.is_zero() && estimate.profit_display >= self.min_profit
    }

    /// Estimate and decide
    pub async fn evaluate(
        &self,
        direction: &Direction,
        venues: &VenuePair,
        pair: &TokenPair,
    ) -> Result<Evaluation, ArbError> {
        let estimate = self.estimate(direction, venues, pair).await?;

        info!(
            "Profit ({}): {} | Profit ({}): {} | amount_in={}",
            pair.funding.symbol,
            estimate.profit_funding.round_dp(6),
            self.currency(),
            estimate.profit_display.round_dp(2),
            estimate.amount_in
        );

        if self.accepts(&estimate) {
            Ok(Evaluation::Accepted(TradeIntent::from(estimate)))
        } else {
            info!(
                "Below minimum profit ({} {}), skipping trade",
                self.min_profit,
                self.currency()
            );
            Ok(Evaluation::Rejected(estimate))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::test_support::{eth, offline_venue, pair, ScriptedVenue};
    use crate::arbitrage::oracle::choose_direction;
    use crate::pool::{get_amount_out, Price, V2_FEE_BPS};
    use crate::rate::FixedRate;
    use rust_decimal_macros::dec;

    fn estimator(min_profit: Decimal) -> ProfitabilityEstimator {
        ProfitabilityEstimator::new(
            DEFAULT_SAFETY_DIVISOR,
            min_profit,
            Arc::new(FixedRate::new("USDC", dec!(2000))),
        )
    }

    fn b_to_a() -> Direction {
        let a = Price::new(U256::from(65u64), U256::from(100_000u64)).unwrap();
        let b = Price::new(U256::from(64u64), U256::from(100_000u64)).unwrap();
        choose_direction(a, b).unwrap()
    }

    /// Both pools hold 100,000 WETH, so the candidate is exactly 1 WETH
    fn venues(sell_output: U256) -> (Arc<ScriptedVenue>, Arc<ScriptedVenue>, VenuePair) {
        let a = Arc::new(ScriptedVenue::new(VenueId::A, eth(100_000), eth(150_000_000)));
        let b = Arc::new(ScriptedVenue::new(VenueId::B, eth(100_000), eth(160_000_000)));
        b.set_quote(eth(1_550));
        a.set_quote(sell_output);
        let pair = VenuePair::new(a.clone(), b.clone());
        (a, b, pair)
    }

    #[tokio::test]
    async fn test_profit_below_minimum_is_rejected() {
        // 1.0019 WETH back for 1 WETH = 0.0019 WETH = 3.80 USDC
        let out = eth(1) + U256::from(1_900_000_000_000_000u64);
        let (_a, _b, venues) = venues(out);

        let evaluation = estimator(dec!(5)).evaluate(&b_to_a(), &venues, &pair()).await.unwrap();
        match evaluation {
            Evaluation::Rejected(estimate) => {
                assert_eq!(estimate.amount_in, eth(1));
                assert_eq!(estimate.profit_funding, dec!(0.0019));
                assert_eq!(estimate.profit_display, dec!(3.8));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_profit_equal_to_minimum_is_accepted() {
        // 0.0025 WETH x 2000 = 5.00
        let out = eth(1) + U256::from(2_500_000_000_000_000u64);
        let (_a, _b, venues) = venues(out);

        let evaluation = estimator(dec!(5)).evaluate(&b_to_a(), &venues, &pair()).await.unwrap();
        match evaluation {
            Evaluation::Accepted(intent) => {
                assert_eq!(intent.amount_in, eth(1));
                assert_eq!(intent.expected_out, out);
                assert_eq!(intent.profit_display, dec!(5));
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_legs_run_on_source_then_destination() {
        let (a, b, venues) = venues(eth(1));
        let estimate = estimator(dec!(5)).estimate(&b_to_a(), &venues, &pair()).await.unwrap();

        // Leg 1 on B (funding in), leg 2 on A with B's output
        assert_eq!(b.quoted_inputs(), vec![eth(1)]);
        assert_eq!(a.quoted_inputs(), vec![eth(1_550)]);
        assert_eq!(estimate.intermediate_out, eth(1_550));
        assert_eq!(estimate.profit_funding, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_loss_is_signed() {
        let out = eth(1) - U256::from(1_000_000_000_000_000u64);
        let (_a, _b, venues) = venues(out);
        let estimate = estimator(dec!(5)).estimate(&b_to_a(), &venues, &pair()).await.unwrap();
        assert_eq!(estimate.profit_funding, dec!(-0.001));
        assert_eq!(estimate.profit_display, dec!(-2));
    }

    #[tokio::test]
    async fn test_zero_candidate_is_not_profitable() {
        let a = Arc::new(ScriptedVenue::new(VenueId::A, U256::from(99_999u64), eth(1)));
        let b = Arc::new(ScriptedVenue::new(VenueId::B, eth(100_000), eth(1)));
        let venues = VenuePair::new(a.clone(), b.clone());

        let evaluation = estimator(Decimal::ZERO).evaluate(&b_to_a(), &venues, &pair()).await.unwrap();
        assert!(matches!(evaluation, Evaluation::Rejected(ref e) if e.amount_in.is_zero()));
        assert_eq!(a.quoted_inputs().len() + b.quoted_inputs().len(), 0);
    }

    #[tokio::test]
    async fn test_estimate_is_idempotent() {
        let out = eth(1) + U256::from(3_000_000_000_000_000u64);
        let (_a, _b, venues) = venues(out);
        let estimator = estimator(dec!(5));

        let first = estimator.estimate(&b_to_a(), &venues, &pair()).await.unwrap();
        let second = estimator.estimate(&b_to_a(), &venues, &pair()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_constant_product_round_trip_is_accepted() {
        // SHIB at 1/1500 WETH on A, 1/1600 on B
        let a = offline_venue(VenueId::A, eth(150_000_000));
        let b = offline_venue(VenueId::B, eth(160_000_000));
        let venues = VenuePair::new(a.clone(), b.clone());

        let evaluation = estimator(dec!(5)).evaluate(&b_to_a(), &venues, &pair()).await.unwrap();
        let intent = match evaluation {
            Evaluation::Accepted(intent) => intent,
            other => panic!("expected acceptance, got {:?}", other),
        };

        let bought = get_amount_out(eth(1), eth(100_000), eth(160_000_000), V2_FEE_BPS).unwrap();
        let sold = get_amount_out(bought, eth(150_000_000), eth(100_000), V2_FEE_BPS).unwrap();
        assert_eq!(intent.amount_in, eth(1));
        assert_eq!(intent.expected_out, sold);
        assert_eq!(sold, U256::from(1_060_254_454_303_412_006u64));
        assert_eq!(intent.profit_display, dec!(120.508908606824012));
        assert_eq!(a.quotes(), 1);
        assert_eq!(b.quotes(), 1);
    }

    #[tokio::test]
    async fn test_narrow_spread_does_not_cover_fees() {
        // 0.67% spread: positive after both 0.3% fees, but about 1.23 USDC
        let a = offline_venue(VenueId::A, eth(150_000_000));
        let b = offline_venue(VenueId::B, eth(151_000_000));
        let venues = VenuePair::new(a, b);

        let evaluation = estimator(dec!(5)).evaluate(&b_to_a(), &venues, &pair()).await.unwrap();
        match evaluation {
            Evaluation::Rejected(estimate) => {
                assert!(estimate.profit_display > dec!(1.23));
                assert!(estimate.profit_display < dec!(1.24));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quote_failure_propagates() {
        let (_a, b, venues) = venues(eth(1));
        b.fail_with(Some(ArbError::quote(VenueId::B, "execution reverted")));

        let result = estimator(dec!(5)).evaluate(&b_to_a(), &venues, &pair()).await;
        assert!(matches!(result, Err(ArbError::Quote { .. })));
    }
}

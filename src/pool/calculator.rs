//! Constant-Product Calculator
//!
//! Integer math for V2-style pools (x * y = k) and the fixed-point
//! conversions used when profit and spread are shown in human units.
//! Everything here is `U256`/`U512`/`Decimal`; no floating point.
//!
//! Created: 2026-10-18

use alloy::primitives::{U256, U512};
use rust_decimal::Decimal;

use crate::errors::ArbError;

/// Basis-point denominator for venue fees
pub const FEE_DENOMINATOR_BPS: u32 = 10_000;

/// Uniswap V2 / Sushiswap fee (0.30%)
pub const V2_FEE_BPS: u32 = 30;

/// Largest scale `Decimal` supports
const MAX_DECIMAL_SCALE: u32 = 28;

/// Calculate amount out for a given input using the constant product formula.
///
/// Formula: amount_out = (amount_in * (10000 - fee) * reserve_out) /
///                       (reserve_in * 10000 + amount_in * (10000 - fee))
///
/// Returns zero for zero inputs, `None` on overflow or a fee above 100%.
pub fn get_amount_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> Option<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Some(U256::ZERO);
    }

    let fee_multiplier = FEE_DENOMINATOR_BPS.checked_sub(fee_bps)?;
    let amount_in_with_fee = amount_in.checked_mul(U256::from(fee_multiplier))?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
    let denominator = reserve_in
        .checked_mul(U256::from(FEE_DENOMINATOR_BPS))?
        .checked_add(amount_in_with_fee)?;

    Some(numerator / denominator)
}

/// Candidate trade size: the smaller funding reserve scaled down by `safety_divisor`.
/// Bounds price impact so the simulated quote stays close to spot.
pub fn candidate_amount(reserve_a: U256, reserve_b: U256, safety_divisor: U256) -> U256 {
    if safety_divisor.is_zero() {
        return U256::ZERO;
    }
    reserve_a.min(reserve_b) / safety_divisor
}

/// `10^exp` as U512
fn pow10(exp: u32) -> U512 {
    U512::from(10u64).pow(U512::from(exp))
}

/// Convert `num / den` into a `Decimal`, keeping the largest scale (up to 28)
/// whose mantissa still fits. Truncates toward zero.
pub fn ratio_to_decimal(num: U512, den: U512) -> Result<Decimal, ArbError> {
    if den.is_zero() {
        return Err(ArbError::Math("division by zero".to_string()));
    }

    let max_mantissa = U512::from(Decimal::MAX.mantissa() as u128);

    for scale in (0..=MAX_DECIMAL_SCALE).rev() {
        let scaled = match num.checked_mul(pow10(scale)) {
            Some(v) => v / den,
            None => continue,
        };
        if scaled > max_mantissa {
            continue;
        }
        let mantissa = u128::try_from(scaled)
            .map_err(|e| ArbError::Math(format!("mantissa conversion: {}", e)))?;
        return Ok(Decimal::from_i128_with_scale(mantissa as i128, scale).normalize());
    }

    Err(ArbError::Math(format!("{} / {} exceeds decimal range", num, den)))
}

/// Raw token amount → human units (`amount / 10^decimals`)
pub fn units_to_decimal(amount: U256, decimals: u8) -> Result<Decimal, ArbError> {
    ratio_to_decimal(U512::from(amount), pow10(decimals as u32))
}

/// Signed `received - spent` in human units
pub fn signed_delta_units(received: U256, spent: U256, decimals: u8) -> Result<Decimal, ArbError> {
    if received >= spent {
        units_to_decimal(received - spent, decimals)
    } else {
        units_to_decimal(spent - received, decimals).map(|v| -v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eth(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18))
    }

    #[test]
    fn test_get_amount_out() {
        // 1 ETH into 100 ETH / 200,000 USDC (6 decimals)
        let amount_out =
            get_amount_out(eth(1), eth(100), U256::from(200_000_000_000u64), V2_FEE_BPS).unwrap();

        // Should get approximately 1974 USDC (fee and slippage)
        assert!(amount_out > U256::from(1_970_000_000u64));
        assert!(amount_out < U256::from(2_000_000_000u64));
    }

    #[test]
    fn test_get_amount_out_matches_997_formula() {
        let amount_in = U256::from(1_000_000u64);
        let reserve_in = U256::from(50_000_000u64);
        let reserve_out = U256::from(80_000_000u64);

        let expected = amount_in * U256::from(997) * reserve_out
            / (reserve_in * U256::from(1000) + amount_in * U256::from(997));

        assert_eq!(
            get_amount_out(amount_in, reserve_in, reserve_out, V2_FEE_BPS),
            Some(expected)
        );
    }

    #[test]
    fn test_get_amount_out_zero_inputs() {
        let hundred = U256::from(100);
        assert_eq!(get_amount_out(U256::ZERO, hundred, hundred, 30), Some(U256::ZERO));
        assert_eq!(get_amount_out(hundred, U256::ZERO, hundred, 30), Some(U256::ZERO));
        assert_eq!(get_amount_out(hundred, hundred, U256::ZERO, 30), Some(U256::ZERO));
    }

    #[test]
    fn test_get_amount_out_rejects_fee_above_100_percent() {
        let hundred = U256::from(100);
        assert_eq!(get_amount_out(hundred, hundred, hundred, 10_001), None);
    }

    #[test]
    fn test_candidate_amount_uses_smaller_reserve() {
        let amount = candidate_amount(eth(300), eth(200), U256::from(100_000u64));
        assert_eq!(amount, eth(200) / U256::from(100_000u64));

        assert_eq!(candidate_amount(eth(1), eth(1), U256::ZERO), U256::ZERO);
        // Dust reserves round down to nothing
        assert_eq!(candidate_amount(U256::from(99_999u64), eth(1), U256::from(100_000u64)), U256::ZERO);
    }

    #[test]
    fn test_units_to_decimal_is_exact() {
        let amount = U256::from(1_900_000_000_000_000u64); // 0.0019 WETH
        assert_eq!(units_to_decimal(amount, 18).unwrap(), dec!(0.0019));

        let usdc = U256::from(123_456_789u64);
        assert_eq!(units_to_decimal(usdc, 6).unwrap(), dec!(123.456789));
    }

    #[test]
    fn test_signed_delta_units() {
        let spent = U256::from(1_000_000u64);
        assert_eq!(signed_delta_units(U256::from(1_250_000u64), spent, 6).unwrap(), dec!(0.25));
        assert_eq!(signed_delta_units(U256::from(750_000u64), spent, 6).unwrap(), dec!(-0.25));
        assert_eq!(signed_delta_units(spent, spent, 6).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_ratio_to_decimal_large_values_lose_scale_not_magnitude() {
        // 5e33 (uint112 territory) still converts, at reduced scale
        let big = U512::from(5u64) * pow10(33);
        let value = ratio_to_decimal(big, pow10(10)).unwrap();
        assert_eq!(value, Decimal::from_i128_with_scale(500_000_000_000_000_000_000_000, 0));
    }

    #[test]
    fn test_ratio_to_decimal_division_by_zero() {
        assert!(matches!(
            ratio_to_decimal(U512::from(1u64), U512::ZERO),
            Err(ArbError::Math(_))
        ));
    }
}

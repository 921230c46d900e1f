//! Pool math for the two-venue arbitrage bot
//!
//! Constant-product quoting, exact spot prices and fixed-point
//! conversions. No network access lives here.
//!
//! Created: 2026-10-18

pub mod calculator;
pub mod price;

pub use calculator::{get_amount_out, V2_FEE_BPS};
pub use price::Price;

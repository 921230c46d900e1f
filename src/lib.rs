//! Two-Venue Arbitrage Bot Library
//!
//! Watches two Uniswap V2-style venues holding the same token pair, prices
//! them on every swap, and settles profitable divergences through an
//! on-chain arbitrage contract.
//!
//! Created: 2026-10-18

pub mod arbitrage;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod journal;
pub mod pool;
pub mod rate;
pub mod types;
pub mod venue;

// Re-export commonly used types
pub use arbitrage::{EventCoordinator, ExecutionState, Pipeline, ProfitabilityEstimator};
pub use config::{load_config_from_file, BotConfig};
pub use errors::ArbError;
pub use types::{PipelineOutcome, SwapSignal, TokenPair, TradeIntent, VenueId};
pub use venue::{VenueClient, VenuePair};

//! Arbitrage Module
//!
//! Price oracle, profitability estimation, the execution gate, trade
//! execution and the event coordinator that ties them together.
//!
//! Created: 2026-10-18

pub mod coordinator;
pub mod estimator;
pub mod executor;
pub mod gate;
pub mod oracle;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::{EventCoordinator, Pipeline, RunReport, RunStats};
pub use estimator::{Evaluation, ProfitabilityEstimator};
pub use executor::{ContractExecutor, TradeExecutor};
pub use gate::{Admission, ExecutionState};
pub use oracle::Observation;

//! Event Coordinator
//!
//! Consumes swap signals from both venues on one channel and drives
//! Oracle → Estimator → Executor for each admitted signal.
//!
//! Architecture:
//! - The loop owns `ExecutionState`; nothing else mutates it
//! - An admitted signal's pipeline runs as a spawned task so the loop keeps
//!   receiving; signals arriving meanwhile are dropped by the gate
//! - `biased` select: a ready signal is handled before a finished run
//! - Channel closed → wait for the in-flight run, then return
//!
//! Created: 2026-10-18

use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use super::estimator::{Evaluation, ProfitabilityEstimator};
use super::executor::TradeExecutor;
use super::gate::{Admission, ExecutionState};
use super::oracle::{self, Observation};
use crate::errors::ArbError;
use crate::journal::{JournalEntry, TradeJournal};
use crate::types::{PipelineOutcome, SwapSignal, TokenPair, VenueId};
use crate::venue::VenuePair;

/// Signals between statistics log lines
pub const STATS_INTERVAL: u64 = 100;

/// Result of one admitted run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub signal: SwapSignal,
    /// Prices at decision time, if the venues could be read
    pub observation: Option<Observation>,
    pub result: Result<PipelineOutcome, ArbError>,
}

impl RunReport {
    pub fn executed(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_executed())
    }
}

/// Counters logged every `STATS_INTERVAL` signals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub signals: u64,
    pub first_signals: u64,
    pub stale: u64,
    pub in_flight_skips: u64,
    pub cooldown_skips: u64,
    pub runs: u64,
    pub no_direction: u64,
    pub not_profitable: u64,
    /// Profitable runs (executed or execution disabled)
    pub opportunities: u64,
    pub executions: u64,
    pub failures: u64,
}

/// Oracle → Estimator → Executor for one signal
pub struct Pipeline {
    venues: VenuePair,
    pair: TokenPair,
    estimator: ProfitabilityEstimator,
    executor: Arc<dyn TradeExecutor>,
    execution_enabled: bool,
}

impl Pipeline {
    pub fn new(
        venues: VenuePair,
        pair: TokenPair,
        estimator: ProfitabilityEstimator,
        executor: Arc<dyn TradeExecutor>,
        execution_enabled: bool,
    ) -> Self {
        Self {
            venues,
            pair,
            estimator,
            executor,
            execution_enabled,
        }
    }

    pub fn execution_enabled(&self) -> bool {
        self.execution_enabled
    }

    pub fn venue_name(&self, id: VenueId) -> &str {
        self.venues.name(id)
    }

    pub async fn run(&self, signal: SwapSignal) -> RunReport {
        let mut observation = None;
        let result = self.evaluate(signal, &mut observation).await;
        RunReport {
            signal,
            observation,
            result,
        }
    }

    async fn evaluate(
        &self,
        signal: SwapSignal,
        observation: &mut Option<Observation>,
    ) -> Result<PipelineOutcome, ArbError> {
        info!(
            "Swap detected on {} at block {}",
            self.venue_name(signal.venue),
            signal.block_number
        );

        let observed = oracle::observe(&self.venues).await?;
        let symbol = self.pair.symbol();
        for venue in VenueId::ALL {
            info!("{} price: | {} = {}", self.venue_name(venue), symbol, observed.price(venue));
        }
        info!("Price difference (market spread): {}%", observed.spread_percent.round_dp(6));
        *observation = Some(observed.clone());

        let direction = match oracle::choose_direction(observed.price_a, observed.price_b) {
            Some(direction) => direction,
            None => {
                info!("No arbitrage direction");
                return Ok(PipelineOutcome::NoDirection);
            }
        };
        info!(
            "Direction: Buy {} → Sell {}",
            self.venue_name(direction.source),
            self.venue_name(direction.destination)
        );

        let intent = match self.estimator.evaluate(&direction, &self.venues, &self.pair).await? {
            Evaluation::Accepted(intent) => intent,
            Evaluation::Rejected(estimate) => return Ok(PipelineOutcome::NotProfitable(estimate)),
        };

        if !self.execution_enabled {
            info!(
                "💡 Opportunity: {} | profit {} {} | execution disabled, not submitted",
                intent.direction,
                intent.profit_display.round_dp(2),
                self.estimator.currency()
            );
            return Ok(PipelineOutcome::ExecutionDisabled(intent));
        }

        let receipt = self.executor.execute(&intent).await?;
        Ok(PipelineOutcome::Executed(intent, receipt))
    }
}

pub struct EventCoordinator {
    pipeline: Arc<Pipeline>,
    state: ExecutionState,
    stats: RunStats,
    journal: Option<TradeJournal>,
}

impl EventCoordinator {
    pub fn new(pipeline: Pipeline, state: ExecutionState) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            state,
            stats: RunStats::default(),
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: TradeJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Process signals until the channel closes and the last run finishes
    pub async fn run(&mut self, mut signals: mpsc::Receiver<SwapSignal>) {
        let mut in_flight: Option<JoinHandle<RunReport>> = None;
        let mut open = true;

        info!(
            "Coordinator started (execution {})",
            if self.pipeline.execution_enabled() { "ENABLED" } else { "disabled" }
        );

        while open || in_flight.is_some() {
            tokio::select! {
                biased;

                received = signals.recv(), if open => match received {
                    Some(signal) => {
                        if let Some(handle) = self.on_signal(signal) {
                            in_flight = Some(handle);
                        }
                    }
                    None => {
                        open = false;
                        if in_flight.is_some() {
                            info!("Signal channel closed, waiting for in-flight run...");
                        }
                    }
                },

                joined = wait_for(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    self.on_complete(joined);
                }
            }
        }

        self.log_stats();
        info!("Coordinator stopped");
    }

    /// Gate one signal; spawns the pipeline when admitted
    fn on_signal(&mut self, signal: SwapSignal) -> Option<JoinHandle<RunReport>> {
        self.stats.signals += 1;
        if self.stats.signals % STATS_INTERVAL == 0 {
            self.log_stats();
        }

        match self.state.admit(&signal, Instant::now()) {
            Admission::Admitted { .. } => {
                self.stats.runs += 1;
                let pipeline = Arc::clone(&self.pipeline);
                Some(tokio::spawn(async move { pipeline.run(signal).await }))
            }
            Admission::FirstSignal => {
                self.stats.first_signals += 1;
                None
            }
            Admission::Stale { .. } => {
                self.stats.stale += 1;
                None
            }
            Admission::InFlight => {
                self.stats.in_flight_skips += 1;
                None
            }
            Admission::Cooldown { .. } => {
                self.stats.cooldown_skips += 1;
                None
            }
        }
    }

    /// Release the gate and record the run
    fn on_complete(&mut self, joined: Result<RunReport, JoinError>) {
        let report = match joined {
            Ok(report) => report,
            Err(e) => {
                error!("Pipeline task failed: {}", e);
                self.stats.failures += 1;
                self.state.release(false, Instant::now());
                return;
            }
        };

        self.state.release(report.executed(), Instant::now());

        match &report.result {
            Ok(PipelineOutcome::NoDirection) => self.stats.no_direction += 1,
            Ok(PipelineOutcome::NotProfitable(_)) => self.stats.not_profitable += 1,
            Ok(PipelineOutcome::ExecutionDisabled(_)) => self.stats.opportunities += 1,
            Ok(PipelineOutcome::Executed(intent, receipt)) => {
                self.stats.opportunities += 1;
                self.stats.executions += 1;
                info!(
                    "🎉 Trade executed at block {}: {:?} | expected profit {}",
                    report.signal.block_number,
                    receipt.tx_hash,
                    intent.profit_display.round_dp(2)
                );
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!("Pipeline error [{}]: {}", e.kind(), e);
            }
        }

        if let Some(observation) = &report.observation {
            info!(
                "Last block price history: Block {} | Time {} | {}: {} | {}: {}",
                report.signal.block_number,
                Local::now().format("%H:%M:%S"),
                self.pipeline.venue_name(VenueId::A),
                observation.price_a,
                self.pipeline.venue_name(VenueId::B),
                observation.price_b
            );
        }

        if let Some(journal) = self.journal.as_mut() {
            let entry = JournalEntry::from_report(&report, Utc::now());
            if let Err(e) = journal.log(&entry) {
                warn!("Journal write failed: {:#}", e);
            }
        }
    }

    fn log_stats(&self) {
        let s = &self.stats;
        info!(
            "📊 Stats: signals={} runs={} no_direction={} not_profitable={} opportunities={} executed={} failures={} | dropped: first={} stale={} in_flight={} cooldown={}",
            s.signals,
            s.runs,
            s.no_direction,
            s.not_profitable,
            s.opportunities,
            s.executions,
            s.failures,
            s.first_signals,
            s.stale,
            s.in_flight_skips,
            s.cooldown_skips
        );
    }
}

/// Resolves when the in-flight run finishes; pending forever if there is none
async fn wait_for(in_flight: &mut Option<JoinHandle<RunReport>>) -> Result<RunReport, JoinError> {
    match in_flight.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

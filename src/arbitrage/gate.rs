//! Execution Gate: single-flight guard with a post-trade cooldown
//!
//! Design:
//!     - One global state, owned by the coordinator loop (no locking)
//!     - Admission order: first signal per venue → in flight → cooldown → staleness
//!     - Signals refused while in flight are dropped, never queued
//!     - Cooldown only after a successful execution; `elapsed >= cooldown` admits
//!     - Release is unconditional; only a successful execution moves the cooldown clock

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::types::{SwapSignal, VenueId};

/// Default wait after a confirmed trade
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(15);

/// Gate decision for one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Idle → InFlight. Carries the cooldown skips reported on admission.
    Admitted { cooldown_skips_reported: u64 },
    /// First signal from this venue since startup
    FirstSignal,
    /// Block at or below the last processed block
    Stale { last_processed_block: u64 },
    /// Another run is executing
    InFlight,
    /// Inside the post-trade cooldown window
    Cooldown { remaining: Duration },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

/// The coordinator's mutable state
#[derive(Debug, Clone)]
pub struct ExecutionState {
    cooldown: Duration,
    in_flight: bool,
    last_trade: Option<Instant>,
    last_processed_block: u64,
    first_signal_seen: [bool; 2],
    cooldown_skips: [u64; 2],
    in_flight_skips: [u64; 2],
    first_trade_done: bool,
    admissions: u64,
    releases: u64,
}

impl ExecutionState {
    /// `start_block` is the chain head at startup; nothing at or below it is processed
    pub fn new(cooldown: Duration, start_block: u64) -> Self {
        Self {
            cooldown,
            in_flight: false,
            last_trade: None,
            last_processed_block: start_block,
            first_signal_seen: [false; 2],
            cooldown_skips: [0; 2],
            in_flight_skips: [0; 2],
            first_trade_done: false,
            admissions: 0,
            releases: 0,
        }
    }

    /// Decide one signal. Admission moves the gate to InFlight.
    pub fn admit(&mut self, signal: &SwapSignal, now: Instant) -> Admission {
        let slot = signal.venue.index();

        if !self.first_signal_seen[slot] {
            self.first_signal_seen[slot] = true;
            info!("Skipping first event at startup from {}...", signal.venue);
            return Admission::FirstSignal;
        }

        if self.in_flight {
            self.in_flight_skips[slot] += 1;
            debug!(
                "{} signal at block {} dropped: run in flight ({} skipped)",
                signal.venue, signal.block_number, self.in_flight_skips[slot]
            );
            return Admission::InFlight;
        }

        if let Some(remaining) = self.cooldown_remaining(now) {
            self.cooldown_skips[slot] += 1;
            debug!(
                "{} signal at block {} dropped: cooldown {}ms left",
                signal.venue,
                signal.block_number,
                remaining.as_millis()
            );
            return Admission::Cooldown { remaining };
        }

        if signal.block_number <= self.last_processed_block {
            debug!(
                "{} signal at block {} is stale (last processed {})",
                signal.venue, signal.block_number, self.last_processed_block
            );
            return Admission::Stale {
                last_processed_block: self.last_processed_block,
            };
        }

        self.in_flight = true;
        self.admissions += 1;
        self.last_processed_block = signal.block_number;

        let reported = std::mem::take(&mut self.cooldown_skips[slot]);
        if reported > 0 {
            info!("Skipped {} trades for {} due to cooldown...", reported, signal.venue);
        }

        Admission::Admitted {
            cooldown_skips_reported: reported,
        }
    }

    /// InFlight → Idle. `executed` records the trade time for the cooldown.
    pub fn release(&mut self, executed: bool, now: Instant) {
        if !self.in_flight {
            debug!("Release without a run in flight");
            return;
        }
        self.in_flight = false;
        self.releases += 1;

        if executed {
            self.last_trade = Some(now);
            self.first_trade_done = true;
        }
    }

    /// Time left in the cooldown window, `None` once it has elapsed
    fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        if !self.first_trade_done {
            return None;
        }
        let last_trade = self.last_trade?;
        let elapsed = now.saturating_duration_since(last_trade);
        if elapsed >= self.cooldown {
            None
        } else {
            Some(self.cooldown - elapsed)
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_processed_block(&self) -> u64 {
        self.last_processed_block
    }

    pub fn last_trade(&self) -> Option<Instant> {
        self.last_trade
    }

    pub fn first_trade_done(&self) -> bool {
        self.first_trade_done
    }

    pub fn cooldown_skips(&self, venue: VenueId) -> u64 {
        self.cooldown_skips[venue.index()]
    }

    pub fn in_flight_skips(&self, venue: VenueId) -> u64 {
        self.in_flight_skips[venue.index()]
    }

    /// Idle → InFlight transitions so far
    pub fn admissions(&self) -> u64 {
        self.admissions
    }

    /// InFlight → Idle transitions so far
    pub fn releases(&self) -> u64 {
        self.releases
    }
}

//! Swap Log Subscription
//!
//! One task per venue: subscribes to the pair's `Swap` logs over WebSocket
//! and forwards each as a `SwapSignal` on the coordinator channel. If the
//! subscription fails or the stream ends, re-subscribes after a fixed
//! back-off, giving up after `MAX_RECONNECTS` consecutive sessions that
//! delivered nothing.
//!
//! Created: 2026-10-18

use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::rpc::types::Filter;
use alloy::sol_types::SolEvent;
use anyhow::{bail, Context, Result};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::contracts::IUniswapV2Pair;
use crate::types::{SwapSignal, VenueId};

pub const MAX_RECONNECTS: u32 = 50;
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Why one subscription session ended
enum SessionEnd {
    /// Coordinator dropped its receiver
    ChannelClosed,
    /// Stream ended; re-subscribe
    StreamEnded,
}

/// Counts consecutive unproductive sessions
#[derive(Debug, Default)]
struct ReconnectBudget {
    attempts: u32,
}

impl ReconnectBudget {
    /// Record an ended session. `Some(attempt)` to retry, `None` once exhausted.
    fn record(&mut self, delivered: u64) -> Option<u32> {
        if delivered > 0 {
            self.attempts = 0;
        }
        self.attempts += 1;
        (self.attempts <= MAX_RECONNECTS).then_some(self.attempts)
    }
}

pub struct SwapSubscription<P> {
    venue: VenueId,
    pair_address: Address,
    provider: Arc<P>,
    signals: mpsc::Sender<SwapSignal>,
}

impl<P: Provider + 'static> SwapSubscription<P> {
    pub fn new(
        venue: VenueId,
        pair_address: Address,
        provider: Arc<P>,
        signals: mpsc::Sender<SwapSignal>,
    ) -> Self {
        Self {
            venue,
            pair_address,
            provider,
            signals,
        }
    }

    /// Run until the channel closes or reconnects are exhausted
    pub async fn run(self) -> Result<()> {
        let mut budget = ReconnectBudget::default();

        loop {
            let mut delivered = 0u64;
            match self.session(&mut delivered).await {
                Ok(SessionEnd::ChannelClosed) => {
                    info!("{} subscription: channel closed, stopping", self.venue);
                    return Ok(());
                }
                Ok(SessionEnd::StreamEnded) => {
                    warn!("{} subscription: log stream ended", self.venue);
                }
                Err(e) => {
                    warn!("{} subscription error: {:#}", self.venue, e);
                }
            }

            let Some(attempt) = budget.record(delivered) else {
                error!(
                    "{} subscription: {} reconnects exhausted, giving up",
                    self.venue, MAX_RECONNECTS
                );
                bail!("{} subscription gave up after {} reconnects", self.venue, MAX_RECONNECTS);
            };
            warn!(
                "{} subscription reconnect {}/{} in {}s...",
                self.venue,
                attempt,
                MAX_RECONNECTS,
                RECONNECT_DELAY.as_secs()
            );
            sleep(RECONNECT_DELAY).await;
        }
    }

    /// One subscription session; `delivered` counts forwarded signals
    async fn session(&self, delivered: &mut u64) -> Result<SessionEnd> {
        let filter = Filter::new()
            .address(self.pair_address)
            .event_signature(IUniswapV2Pair::Swap::SIGNATURE_HASH);

        let subscription = self
            .provider
            .subscribe_logs(&filter)
            .await
            .context("subscribe_logs failed")?;
        let mut stream = subscription.into_stream();

        info!("{} subscribed to Swap logs of {:?}", self.venue, self.pair_address);

        while let Some(log) = stream.next().await {
            let block_number = match log.block_number {
                Some(n) => n,
                None => self
                    .provider
                    .get_block_number()
                    .await
                    .context("block number fallback failed")?,
            };

            let signal = SwapSignal::new(self.venue, block_number);
            debug!("{} swap at block {}", self.venue, block_number);

            if self.signals.send(signal).await.is_err() {
                return Ok(SessionEnd::ChannelClosed);
            }
            *delivered += 1;
        }

        Ok(SessionEnd::StreamEnded)
    }
}

//! Trade Journal
//!
//! Append-only record of every pipeline run: one JSON object per line,
//! one file per UTC day (`journal_YYYYMMDD.jsonl`). Write-only; the bot
//! never reads it back.
//!
//! Created: 2026-10-18

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::arbitrage::RunReport;
use crate::types::{PipelineOutcome, ProfitEstimate, TradeIntent, VenueId};

/// One journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
    pub trigger: VenueId,
    /// Outcome label, or "error"
    pub outcome: String,
    pub price_a: Option<String>,
    pub price_b: Option<String>,
    pub spread_percent: Option<Decimal>,
    /// "buy venue-B -> sell venue-A"
    pub direction: Option<String>,
    pub amount_in: Option<String>,
    pub expected_out: Option<String>,
    pub profit_funding: Option<Decimal>,
    pub profit_display: Option<Decimal>,
    pub tx_hash: Option<String>,
    pub gas_used: Option<u64>,
    pub error: Option<String>,
}

impl JournalEntry {
    pub fn from_report(report: &RunReport, timestamp: DateTime<Utc>) -> Self {
        let mut entry = Self {
            timestamp,
            block_number: report.signal.block_number,
            trigger: report.signal.venue,
            outcome: String::new(),
            price_a: report.observation.as_ref().map(|o| o.price_a.to_string()),
            price_b: report.observation.as_ref().map(|o| o.price_b.to_string()),
            spread_percent: report.observation.as_ref().map(|o| o.spread_percent),
            direction: None,
            amount_in: None,
            expected_out: None,
            profit_funding: None,
            profit_display: None,
            tx_hash: None,
            gas_used: None,
            error: None,
        };

        match &report.result {
            Ok(outcome) => {
                entry.outcome = outcome.label().to_string();
                match outcome {
                    PipelineOutcome::NoDirection => {}
                    PipelineOutcome::NotProfitable(estimate) => entry.fill_estimate(estimate),
                    PipelineOutcome::ExecutionDisabled(intent) => entry.fill_intent(intent),
                    PipelineOutcome::Executed(intent, receipt) => {
                        entry.fill_intent(intent);
                        entry.tx_hash = Some(format!("{:?}", receipt.tx_hash));
                        entry.gas_used = Some(receipt.gas_used);
                    }
                }
            }
            Err(err) => {
                entry.outcome = "error".to_string();
                entry.error = Some(format!("[{}] {}", err.kind(), err));
            }
        }

        entry
    }

    fn fill_estimate(&mut self, estimate: &ProfitEstimate) {
        self.direction = Some(estimate.direction.to_string());
        self.amount_in = Some(estimate.amount_in.to_string());
        self.expected_out = Some(estimate.amount_out.to_string());
        self.profit_funding = Some(estimate.profit_funding);
        self.profit_display = Some(estimate.profit_display);
    }

    fn fill_intent(&mut self, intent: &TradeIntent) {
        self.direction = Some(intent.direction.to_string());
        self.amount_in = Some(intent.amount_in.to_string());
        self.expected_out = Some(intent.expected_out.to_string());
        self.profit_funding = Some(intent.profit_funding);
        self.profit_display = Some(intent.profit_display);
    }
}

/// JSONL writer
pub struct TradeJournal {
    base_dir: PathBuf,
}

impl TradeJournal {
    /// Create the journal directory if needed
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create journal directory: {:?}", base_dir))?;
        Ok(Self { base_dir })
    }

    /// Daily file for `timestamp`
    pub fn file_path(&self, timestamp: &DateTime<Utc>) -> PathBuf {
        self.base_dir
            .join(format!("journal_{}.jsonl", timestamp.format("%Y%m%d")))
    }

    pub fn log(&mut self, entry: &JournalEntry) -> Result<()> {
        let path = self.file_path(&entry.timestamp);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open journal file: {:?}", path))?;

        let json = serde_json::to_string(entry).context("Failed to serialize journal entry")?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

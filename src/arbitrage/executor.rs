//! Trade Executor
//!
//! Submits the two-leg arbitrage to the settlement contract as a single
//! `executeTrade` call and waits for the receipt. Both legs run inside the
//! contract, so there is no leg risk on the bot side.
//!
//! Created: 2026-10-18

use alloy::primitives::Address;
use alloy::providers::Provider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::contracts::IArbitrage;
use crate::errors::ArbError;
use crate::types::{TokenPair, TradeIntent, TradeReceipt};

/// Default gas limit for `executeTrade`
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;

#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Submit and wait for confirmation. A reverted receipt is an error.
    async fn execute(&self, intent: &TradeIntent) -> Result<TradeReceipt, ArbError>;
}

/// Settlement-contract executor over an alloy provider with a signer wallet
pub struct ContractExecutor<P> {
    provider: Arc<P>,
    settlement: Address,
    pair: TokenPair,
    gas_limit: u64,
}

impl<P: Provider + 'static> ContractExecutor<P> {
    pub fn new(provider: Arc<P>, settlement: Address, pair: TokenPair, gas_limit: u64) -> Self {
        Self {
            provider,
            settlement,
            pair,
            gas_limit,
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> TradeExecutor for ContractExecutor<P> {
    async fn execute(&self, intent: &TradeIntent) -> Result<TradeReceipt, ArbError> {
        let start_time = Instant::now();
        let start_on_a = intent.direction.starts_on_a();

        info!(
            "🚀 Executing arbitrage: {} | {} | amount_in={} | gas_limit={}",
            self.pair.symbol(),
            intent.direction,
            intent.amount_in,
            self.gas_limit
        );

        let settlement = IArbitrage::new(self.settlement, self.provider.clone());
        let pending = settlement
            .executeTrade(
                start_on_a,
                self.pair.funding.address,
                self.pair.intermediate.address,
                intent.amount_in,
            )
            .gas(self.gas_limit)
            .send()
            .await
            .map_err(|e| ArbError::Execution(format!("submission failed: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        info!("Submitted {:?}, waiting for receipt...", tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ArbError::Execution(format!("confirmation of {:?} failed: {}", tx_hash, e)))?;

        if !receipt.status() {
            error!("❌ Settlement reverted: {:?}", tx_hash);
            return Err(ArbError::Execution(format!("transaction {:?} reverted", tx_hash)));
        }

        info!(
            "✅ Trade completed: {:?} | block={:?} | gas_used={} | {}ms",
            receipt.transaction_hash,
            receipt.block_number,
            receipt.gas_used,
            start_time.elapsed().as_millis()
        );

        Ok(TradeReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

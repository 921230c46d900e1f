//! Scripted and offline venues plus a recording executor for pipeline tests

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::executor::TradeExecutor;
use crate::errors::ArbError;
use crate::pool::V2_FEE_BPS;
use crate::types::{Reserves, Token, TokenPair, TradeIntent, TradeReceipt, VenueId};
use crate::venue::{OfflineVenue, VenueClient};

pub fn eth(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18))
}

pub fn pair() -> TokenPair {
    TokenPair::new(
        Token::new(Address::repeat_byte(0xC0), "WETH", 18),
        Token::new(Address::repeat_byte(0x95), "SHIB", 18),
    )
}

/// Constant-product pool holding 100,000 WETH against `intermediate` SHIB
pub fn offline_venue(id: VenueId, intermediate: U256) -> Arc<OfflineVenue> {
    let name = match id {
        VenueId::A => "Uniswap",
        VenueId::B => "Sushiswap",
    };
    Arc::new(OfflineVenue::new(
        id,
        name,
        pair(),
        Reserves::new(eth(100_000), intermediate),
        V2_FEE_BPS,
    ))
}

/// Venue with fixed reserves and a fixed quote result
pub struct ScriptedVenue {
    id: VenueId,
    reserves: Mutex<Reserves>,
    quote: Mutex<U256>,
    failure: Mutex<Option<ArbError>>,
    quoted_inputs: Mutex<Vec<U256>>,
    reserve_reads: AtomicU64,
}

impl ScriptedVenue {
    pub fn new(id: VenueId, funding: U256, intermediate: U256) -> Self {
        Self {
            id,
            reserves: Mutex::new(Reserves::new(funding, intermediate)),
            quote: Mutex::new(U256::ZERO),
            failure: Mutex::new(None),
            quoted_inputs: Mutex::new(Vec::new()),
            reserve_reads: AtomicU64::new(0),
        }
    }

    pub fn set_quote(&self, amount_out: U256) {
        *self.quote.lock().unwrap() = amount_out;
    }

    pub fn set_reserves(&self, funding: U256, intermediate: U256) {
        *self.reserves.lock().unwrap() = Reserves::new(funding, intermediate);
    }

    pub fn fail_with(&self, error: Option<ArbError>) {
        *self.failure.lock().unwrap() = error;
    }

    pub fn quoted_inputs(&self) -> Vec<U256> {
        self.quoted_inputs.lock().unwrap().clone()
    }

    pub fn reserve_reads(&self) -> u64 {
        self.reserve_reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ArbError> {
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VenueClient for ScriptedVenue {
    fn id(&self) -> VenueId {
        self.id
    }

    fn name(&self) -> &str {
        match self.id {
            VenueId::A => "Uniswap",
            VenueId::B => "Sushiswap",
        }
    }

    async fn get_reserves(&self) -> Result<Reserves, ArbError> {
        self.reserve_reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(*self.reserves.lock().unwrap())
    }

    async fn quote_output(
        &self,
        amount_in: U256,
        _token_in: Address,
        _token_out: Address,
    ) -> Result<U256, ArbError> {
        self.check()?;
        self.quoted_inputs.lock().unwrap().push(amount_in);
        Ok(*self.quote.lock().unwrap())
    }
}

/// How the recording executor behaves
#[derive(Default)]
pub enum ExecutorMode {
    #[default]
    Succeed,
    Fail,
    Panic,
}

/// Records every intent. Optionally parks inside `execute` until released.
#[derive(Default)]
pub struct RecordingExecutor {
    mode: ExecutorMode,
    intents: Mutex<Vec<TradeIntent>>,
    hold: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl RecordingExecutor {
    pub fn new(mode: ExecutorMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// `entered` fires when `execute` starts; it returns after `release` fires
    pub fn holding(entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            hold: Some((entered, release)),
            ..Default::default()
        }
    }

    pub fn intents(&self) -> Vec<TradeIntent> {
        self.intents.lock().unwrap().clone()
    }
}

#[async_trait]
impl TradeExecutor for RecordingExecutor {
    async fn execute(&self, intent: &TradeIntent) -> Result<TradeReceipt, ArbError> {
        self.intents.lock().unwrap().push(intent.clone());

        if let Some((entered, release)) = &self.hold {
            entered.notify_one();
            release.notified().await;
        }

        match self.mode {
            ExecutorMode::Succeed => Ok(TradeReceipt {
                tx_hash: Default::default(),
                block_number: Some(1),
                gas_used: 210_000,
            }),
            ExecutorMode::Fail => Err(ArbError::Execution("transaction reverted".to_string())),
            ExecutorMode::Panic => panic!("executor crashed"),
        }
    }
}

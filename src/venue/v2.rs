//! Uniswap V2-style Venue
//!
//! Resolves the pair from the venue factory once at startup, remembers the
//! pool's token0 to normalize reserve order, and then reads reserves and
//! router quotes on demand.
//!
//! Created: 2026-10-18

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::{quote_side, VenueClient};
use crate::contracts::{IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02};
use crate::errors::ArbError;
use crate::types::{Reserves, TokenPair, VenueId};

/// On-chain factory + router addresses for one venue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2Endpoints {
    pub factory: Address,
    pub router: Address,
}

pub struct V2Venue<P> {
    id: VenueId,
    name: String,
    provider: Arc<P>,
    pair: TokenPair,
    router: Address,
    pair_address: Address,
    token0: Address,
}

impl<P: Provider + 'static> V2Venue<P> {
    /// Look up the pair on the venue factory and read its token0.
    /// Fails if the factory has no pool for the pair.
    pub async fn connect(
        id: VenueId,
        name: impl Into<String>,
        provider: Arc<P>,
        endpoints: V2Endpoints,
        pair: TokenPair,
    ) -> Result<Self> {
        let name = name.into();
        let factory = IUniswapV2Factory::new(endpoints.factory, provider.clone());

        let pair_address = factory
            .getPair(pair.funding.address, pair.intermediate.address)
            .call()
            .await
            .with_context(|| format!("{}: getPair failed", name))?;

        if pair_address == Address::ZERO {
            bail!("{}: pair {} does not exist", name, pair.symbol());
        }

        let pool = IUniswapV2Pair::new(pair_address, provider.clone());
        let token0 = pool
            .token0()
            .call()
            .await
            .with_context(|| format!("{}: token0 failed", name))?;

        if !pair.contains(token0) {
            bail!("{}: pool {:?} token0 {:?} is not a pair token", name, pair_address, token0);
        }

        info!(
            "{} ({}) pair {}: {:?} | token0={:?}",
            name,
            id,
            pair.symbol(),
            pair_address,
            token0
        );

        Ok(Self {
            id,
            name,
            provider,
            pair,
            router: endpoints.router,
            pair_address,
            token0,
        })
    }

    pub fn pair_address(&self) -> Address {
        self.pair_address
    }
}

#[async_trait]
impl<P: Provider + 'static> VenueClient for V2Venue<P> {
    fn id(&self) -> VenueId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn get_reserves(&self) -> Result<Reserves, ArbError> {
        let pool = IUniswapV2Pair::new(self.pair_address, self.provider.clone());
        let r = pool
            .getReserves()
            .call()
            .await
            .map_err(|e| ArbError::unavailable(self.id, e))?;

        let reserves = Reserves::from_pool_order(
            U256::from(r.reserve0),
            U256::from(r.reserve1),
            self.token0,
            &self.pair,
        );
        debug!(
            "{} reserves: funding={} intermediate={}",
            self.name, reserves.funding, reserves.intermediate
        );
        Ok(reserves)
    }

    async fn quote_output(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address,
    ) -> Result<U256, ArbError> {
        quote_side(self.id, &self.pair, token_in, token_out)?;

        let router = IUniswapV2Router02::new(self.router, self.provider.clone());
        let amounts = router
            .getAmountsOut(amount_in, vec![token_in, token_out])
            .call()
            .await
            .map_err(|e| ArbError::quote(self.id, e))?;

        amounts
            .last()
            .copied()
            .ok_or_else(|| ArbError::quote(self.id, "getAmountsOut returned no amounts"))
    }
}

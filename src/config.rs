//! Configuration management
//!
//! Two layers:
//! - `.env`: RPC endpoint, signer key and the token pair (RPC_URL,
//!   PRIVATE_KEY, ARB_FOR, ARB_AGAINST)
//! - TOML settings: venues, settlement contract, strategy parameters,
//!   reference rate and journal
//!
//! Created: 2026-10-18

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::arbitrage::estimator::DEFAULT_SAFETY_DIVISOR;
use crate::arbitrage::executor::DEFAULT_GAS_LIMIT;
use crate::venue::v2::V2Endpoints;

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_SETTINGS_FILE: &str = "config/arb.toml";

// ── TOML layer ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub venue_a: VenueSettings,
    pub venue_b: VenueSettings,
    pub settlement: SettlementSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub reference_rate: ReferenceRateSettings,
    #[serde(default)]
    pub journal: JournalSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueSettings {
    pub name: String,
    pub factory: String,
    pub router: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementSettings {
    pub address: String,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default)]
    pub execution_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategySettings {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Display currency, inclusive
    #[serde(default = "default_min_profit")]
    pub min_profit: Decimal,
    #[serde(default = "default_safety_divisor")]
    pub safety_divisor: u64,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            min_profit: default_min_profit(),
            safety_divisor: default_safety_divisor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReferenceRateSettings {
    Fixed {
        #[serde(default = "default_rate")]
        value: Decimal,
        #[serde(default = "default_currency")]
        currency: String,
    },
    Http {
        url: String,
        /// JSON pointer to the price field, e.g. "/ethereum/usd"
        pointer: String,
        #[serde(default = "default_rate_ttl_secs")]
        ttl_secs: u64,
        #[serde(default = "default_currency")]
        currency: String,
    },
}

impl Default for ReferenceRateSettings {
    fn default() -> Self {
        ReferenceRateSettings::Fixed {
            value: default_rate(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalSettings {
    pub dir: Option<String>,
}

fn default_gas_limit() -> u64 { DEFAULT_GAS_LIMIT }
fn default_cooldown_secs() -> u64 { 15 }
fn default_min_profit() -> Decimal { Decimal::from(5) }
fn default_safety_divisor() -> u64 { DEFAULT_SAFETY_DIVISOR }
fn default_rate() -> Decimal { Decimal::from(2000) }
fn default_currency() -> String { "USDC".to_string() }
fn default_rate_ttl_secs() -> u64 { 30 }

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse TOML configuration")
    }
}

// ── Environment layer ────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EnvSettings {
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub arb_for: String,
    pub arb_against: String,
}

impl EnvSettings {
    /// Read from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{} not set", key));

        Ok(Self {
            rpc_url: required("RPC_URL")?,
            private_key: lookup("PRIVATE_KEY").filter(|k| !k.trim().is_empty()),
            arb_for: required("ARB_FOR")?,
            arb_against: required("ARB_AGAINST")?,
        })
    }
}

// ── Resolved configuration ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueConfig {
    pub name: String,
    pub endpoints: V2Endpoints,
}

/// Validated bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub rpc_url: String,
    pub private_key: Option<String>,
    /// Trade input token (ARB_FOR)
    pub funding_token: Address,
    /// Token bought on the first leg (ARB_AGAINST)
    pub intermediate_token: Address,
    pub venue_a: VenueConfig,
    pub venue_b: VenueConfig,
    pub settlement: Address,
    pub gas_limit: u64,
    pub execution_enabled: bool,
    pub cooldown: Duration,
    pub min_profit: Decimal,
    pub safety_divisor: u64,
    pub reference_rate: ReferenceRateSettings,
    pub journal_dir: Option<PathBuf>,
}

impl BotConfig {
    pub fn build(env: EnvSettings, settings: Settings) -> Result<Self> {
        let funding_token = parse_address("ARB_FOR", &env.arb_for)?;
        let intermediate_token = parse_address("ARB_AGAINST", &env.arb_against)?;
        if funding_token == intermediate_token {
            bail!("ARB_FOR and ARB_AGAINST must be different tokens");
        }

        let venue_a = venue_config("venue_a", &settings.venue_a)?;
        let venue_b = venue_config("venue_b", &settings.venue_b)?;
        if venue_a.name == venue_b.name {
            bail!("venue names must be distinct (both are '{}')", venue_a.name);
        }

        let settlement = parse_address("settlement.address", &settings.settlement.address)?;
        if settings.settlement.gas_limit == 0 {
            bail!("settlement.gas_limit must be greater than zero");
        }
        if settings.settlement.execution_enabled && env.private_key.is_none() {
            bail!("PRIVATE_KEY is required when settlement.execution_enabled = true");
        }

        let strategy = &settings.strategy;
        if strategy.safety_divisor == 0 {
            bail!("strategy.safety_divisor must be greater than zero");
        }
        if strategy.min_profit.is_sign_negative() {
            bail!("strategy.min_profit must not be negative (got {})", strategy.min_profit);
        }

        match &settings.reference_rate {
            ReferenceRateSettings::Fixed { value, .. } if *value <= Decimal::ZERO => {
                bail!("reference_rate.value must be positive (got {})", value);
            }
            ReferenceRateSettings::Http { pointer, .. } if !pointer.is_empty() && !pointer.starts_with('/') => {
                bail!("reference_rate.pointer must be a JSON pointer starting with '/' (got '{}')", pointer);
            }
            _ => {}
        }

        Ok(Self {
            rpc_url: env.rpc_url,
            private_key: env.private_key,
            funding_token,
            intermediate_token,
            venue_a,
            venue_b,
            settlement,
            gas_limit: settings.settlement.gas_limit,
            execution_enabled: settings.settlement.execution_enabled,
            cooldown: Duration::from_secs(strategy.cooldown_secs),
            min_profit: strategy.min_profit,
            safety_divisor: strategy.safety_divisor,
            reference_rate: settings.reference_rate,
            journal_dir: settings.journal.dir.map(PathBuf::from),
        })
    }

    /// First 40 characters of the RPC URL, for the startup log
    pub fn rpc_url_preview(&self) -> String {
        self.rpc_url.chars().take(40).collect()
    }

    /// Force execution off (`--dry-run`)
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        if dry_run {
            self.execution_enabled = false;
        }
        self
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    Address::from_str(value.trim()).with_context(|| format!("Invalid address for {}: '{}'", field, value))
}

fn venue_config(section: &str, venue: &VenueSettings) -> Result<VenueConfig> {
    if venue.name.trim().is_empty() {
        bail!("{}.name must not be empty", section);
    }
    Ok(VenueConfig {
        name: venue.name.clone(),
        endpoints: V2Endpoints {
            factory: parse_address(&format!("{}.factory", section), &venue.factory)?,
            router: parse_address(&format!("{}.router", section), &venue.router)?,
        },
    })
}

/// Load `.env` from `env_file` (missing file is not an error), then the
/// TOML settings, and validate both
pub fn load_config_from_file(env_file: &Path, settings_file: &Path) -> Result<BotConfig> {
    dotenv::from_path(env_file).ok();
    let env = EnvSettings::from_env()?;
    let settings = Settings::load(settings_file)?;
    BotConfig::build(env, settings)
}

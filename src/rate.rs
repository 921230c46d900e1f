//! Reference Rate Sources
//!
//! Converts funding-token profit into the display currency. Two sources:
//! - `FixedRate`: a configured constant (e.g. 1 WETH = 2000 USDC)
//! - `HttpRate`: a JSON price feed read through a JSON pointer, cached for
//!   a TTL. A failed refresh falls back to the last known rate.
//!
//! Created: 2026-10-18

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ReferenceRateSettings;
use crate::errors::ArbError;

/// Timeout for one feed request
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Funding token → display currency
#[async_trait]
pub trait ReferenceRate: Send + Sync {
    /// Display currency label ("USDC")
    fn currency(&self) -> &str;

    /// Display-currency units per one funding token. Always positive.
    async fn rate(&self) -> Result<Decimal, ArbError>;
}

pub struct FixedRate {
    currency: String,
    value: Decimal,
}

impl FixedRate {
    pub fn new(currency: impl Into<String>, value: Decimal) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }
}

#[async_trait]
impl ReferenceRate for FixedRate {
    fn currency(&self) -> &str {
        &self.currency
    }

    async fn rate(&self) -> Result<Decimal, ArbError> {
        if self.value <= Decimal::ZERO {
            return Err(ArbError::RateUnavailable(format!(
                "fixed rate {} is not positive",
                self.value
            )));
        }
        Ok(self.value)
    }
}

/// Cached feed value
#[derive(Debug, Clone, Copy)]
struct CachedRate {
    value: Decimal,
    fetched_at: Instant,
}

pub struct HttpRate {
    currency: String,
    url: String,
    pointer: String,
    ttl: Duration,
    client: reqwest::Client,
    cache: Mutex<Option<CachedRate>>,
}

impl HttpRate {
    pub fn new(
        currency: impl Into<String>,
        url: impl Into<String>,
        pointer: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, ArbError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ArbError::RateUnavailable(format!("http client: {}", e)))?;

        Ok(Self {
            currency: currency.into(),
            url: url.into(),
            pointer: pointer.into(),
            ttl,
            client,
            cache: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<Decimal, ArbError> {
        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| ArbError::RateUnavailable(format!("GET {}: {}", self.url, e)))?
            .json()
            .await
            .map_err(|e| ArbError::RateUnavailable(format!("invalid JSON from {}: {}", self.url, e)))?;

        parse_rate(&body, &self.pointer)
    }
}

#[async_trait]
impl ReferenceRate for HttpRate {
    fn currency(&self) -> &str {
        &self.currency
    }

    async fn rate(&self) -> Result<Decimal, ArbError> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = *cache {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.value);
            }
        }

        match self.fetch().await {
            Ok(value) => {
                debug!("Reference rate refreshed: {} {}", value, self.currency);
                *cache = Some(CachedRate {
                    value,
                    fetched_at: Instant::now(),
                });
                Ok(value)
            }
            Err(e) => match *cache {
                Some(stale) => {
                    warn!("Reference rate refresh failed, using last known {}: {}", stale.value, e);
                    Ok(stale.value)
                }
                None => Err(e),
            },
        }
    }
}

/// Build the configured source
pub fn from_settings(settings: &ReferenceRateSettings) -> Result<Arc<dyn ReferenceRate>, ArbError> {
    match settings {
        ReferenceRateSettings::Fixed { value, currency } => {
            Ok(Arc::new(FixedRate::new(currency.clone(), *value)))
        }
        ReferenceRateSettings::Http {
            url,
            pointer,
            ttl_secs,
            currency,
        } => Ok(Arc::new(HttpRate::new(
            currency.clone(),
            url.clone(),
            pointer.clone(),
            Duration::from_secs(*ttl_secs),
        )?)),
    }
}

/// Extract a positive decimal at `pointer`. Accepts JSON numbers and numeric strings.
pub fn parse_rate(body: &Value, pointer: &str) -> Result<Decimal, ArbError> {
    let field = body
        .pointer(pointer)
        .ok_or_else(|| ArbError::RateUnavailable(format!("no value at {}", pointer)))?;

    let text = match field {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(ArbError::RateUnavailable(format!(
                "value at {} is not numeric: {}",
                pointer, other
            )))
        }
    };

    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| ArbError::RateUnavailable(format!("cannot parse {:?}: {}", text, e)))?;

    if value <= Decimal::ZERO {
        return Err(ArbError::RateUnavailable(format!("rate {} is not positive", value)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_fixed_rate() {
        let rate = FixedRate::new("USDC", dec!(2000));
        assert_eq!(tokio_test::block_on(rate.rate()).unwrap(), dec!(2000));
        assert_eq!(rate.currency(), "USDC");

        let zero = FixedRate::new("USDC", Decimal::ZERO);
        assert!(matches!(tokio_test::block_on(zero.rate()), Err(ArbError::RateUnavailable(_))));
    }

    #[tokio::test]
    async fn test_from_settings() {
        let fixed = from_settings(&ReferenceRateSettings::Fixed {
            value: dec!(2000),
            currency: "USDC".to_string(),
        })
        .unwrap();
        assert_eq!(fixed.rate().await.unwrap(), dec!(2000));

        let http = from_settings(&ReferenceRateSettings::Http {
            url: "http://127.0.0.1:9/price".to_string(),
            pointer: "/usd".to_string(),
            ttl_secs: 30,
            currency: "USD".to_string(),
        })
        .unwrap();
        assert_eq!(http.currency(), "USD");
    }

    #[test]
    fn test_parse_rate_number_and_string() {
        let body = json!({ "ethereum": { "usd": 2543.17 }, "data": { "amount": "2543.17" } });
        assert_eq!(parse_rate(&body, "/ethereum/usd").unwrap(), dec!(2543.17));
        assert_eq!(parse_rate(&body, "/data/amount").unwrap(), dec!(2543.17));
    }

    #[test]
    fn test_parse_rate_rejects_missing_and_non_positive() {
        let body = json!({ "price": -1, "label": true });
        assert!(parse_rate(&body, "/missing").is_err());
        assert!(parse_rate(&body, "/price").is_err());
        assert!(parse_rate(&body, "/label").is_err());
    }

    #[tokio::test]
    async fn test_http_rate_serves_fresh_cache_without_fetching() {
        let rate = HttpRate::new("USDC", "http://127.0.0.1:9/price", "/usd", Duration::from_secs(3600)).unwrap();
        *rate.cache.lock().await = Some(CachedRate {
            value: dec!(1999.5),
            fetched_at: Instant::now(),
        });
        assert_eq!(rate.rate().await.unwrap(), dec!(1999.5));
    }

    #[tokio::test]
    async fn test_http_rate_falls_back_to_stale_value() {
        let rate = HttpRate::new("USDC", "http://127.0.0.1:9/price", "/usd", Duration::ZERO).unwrap();

        // Nothing cached and the feed is unreachable
        assert!(matches!(rate.rate().await, Err(ArbError::RateUnavailable(_))));

        *rate.cache.lock().await = Some(CachedRate {
            value: dec!(1800),
            fetched_at: Instant::now(),
        });
        assert_eq!(rate.rate().await.unwrap(), dec!(1800));
    }
}

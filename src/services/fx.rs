//! Foreign-exchange currency conversion, backed by open.er-api.com.

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::ServiceError;
use crate::service::Service;

const API_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// Answer TTL: rates are refreshed far less often than this anyway.
const TTL: u32 = 900;

/// Retry delay after a failed fetch.
const RETRY_DELAY: Duration = Duration::from_secs(60);

static RE_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9.]*)([A-Z]{3})-([A-Z]{3})").unwrap());

/// Rate table as served by the API; doubles as the snapshot format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RateData {
    #[serde(rename = "base_code")]
    base: String,

    #[serde(rename = "time_last_update_utc")]
    date: String,

    rates: HashMap<String, f64>,
}

/// The `fx` service: `100USD-INR.fx` style conversions over a cached,
/// periodically refreshed rate table.
pub struct Fx {
    data: RwLock<RateData>,
}

impl Fx {
    /// Create the service with an empty rate table. Call
    /// [`Fx::start_refresh`] to populate and keep it fresh.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            data: RwLock::new(RateData::default()),
        })
    }

    /// Restore a snapshot produced by `dump()`.
    pub fn load(&self, bytes: &[u8]) -> Result<(), serde_json::Error> {
        let data: RateData = serde_json::from_slice(bytes)?;
        info!(pairs = data.rates.len(), date = %data.date, "fx snapshot restored");
        *self.data.write() = data;
        Ok(())
    }

    /// Spawn the background task that fetches rates now and then every
    /// `interval`, retrying failed fetches after a minute.
    pub fn start_refresh(self: &Arc<Self>, interval: Duration) {
        let fx = Arc::clone(self);
        tokio::spawn(async move {
            let client = match reqwest::Client::builder()
                .timeout(Duration::from_secs(6))
                .build()
            {
                Ok(client) => client,
                Err(e) => {
                    error!(error = %e, "failed to build fx HTTP client");
                    return;
                }
            };

            loop {
                match fetch(&client).await {
                    Ok(data) => {
                        if !data.rates.contains_key(&data.base) {
                            warn!(base = %data.base, "base currency missing from rates");
                            tokio::time::sleep(RETRY_DELAY).await;
                            continue;
                        }

                        info!(pairs = data.rates.len(), "fx rates loaded");
                        *fx.data.write() = data;
                        tokio::time::sleep(interval).await;
                    }
                    Err(e) => {
                        warn!(error = %e, "error fetching fx rates");
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        });
    }

    #[cfg(test)]
    fn set_rates(&self, base: &str, date: &str, rates: &[(&str, f64)]) {
        *self.data.write() = RateData {
            base: base.to_string(),
            date: date.to_string(),
            rates: rates.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        };
    }
}

async fn fetch(client: &reqwest::Client) -> Result<RateData, reqwest::Error> {
    client
        .get(API_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

impl Service for Fx {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let data = self.data.read();
        if data.rates.is_empty() {
            return Err("fx data unavailable. Please try later.".into());
        }

        // Currency codes are conventionally uppercase; the normalizer
        // lower-cased the argument.
        let q = q.to_uppercase();

        let caps = RE_QUERY
            .captures(&q)
            .ok_or_else(|| ServiceError::from("invalid fx query."))?;

        let val_str = caps.get(1).map_or("", |m| m.as_str());
        let val: f64 = if val_str.is_empty() {
            1.0
        } else {
            val_str
                .parse()
                .map_err(|_| ServiceError::from("invalid number."))?
        };

        let from = caps.get(2).map_or("", |m| m.as_str());
        let to = caps.get(3).map_or("", |m| m.as_str());

        let from_rate = *data
            .rates
            .get(from)
            .ok_or_else(|| ServiceError::new(format!("unknown from currency '{}'.", from)))?;
        let to_rate = *data
            .rates
            .get(to)
            .ok_or_else(|| ServiceError::new(format!("unknown to currency '{}'.", to)))?;
        // A snapshot is not validated the way fetched tables are; the
        // base currency may be missing from a hand-edited file.
        let base_rate = *data
            .rates
            .get(&data.base)
            .ok_or_else(|| ServiceError::from("fx data unavailable. Please try later."))?;

        let conv = (base_rate / from_rate) / (base_rate / to_rate) * val;

        Ok(vec![format!(
            "{} {} TXT \"{:.2} {} = {:.2} {}\" \"{}\"",
            q, TTL, val, from, conv, to, data.date
        )])
    }

    fn dump(&self) -> Result<Option<Vec<u8>>, ServiceError> {
        let data = self.data.read();
        if data.rates.is_empty() {
            return Ok(None);
        }
        let bytes = serde_json::to_vec(&*data)
            .map_err(|e| ServiceError::new(format!("fx snapshot failed: {}", e)))?;
        Ok(Some(bytes))
    }
}

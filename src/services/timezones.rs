//! Current time and time conversion for geographic locations.

use chrono::{NaiveDateTime, Utc};
use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::error::ServiceError;
use crate::geo::{Geo, Location};
use crate::service::Service;

const TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

// Queries arrive lower-cased, hence the lowercase 't' separator.
static RE_CONVERT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}t\d{2}:\d{2})-([a-z/]+)-([a-z/]+)").unwrap()
});

/// The `time` service: city name -> current local time, or
/// `YYYY-MM-DDTHH:MM-<from>-<to>` conversion between two cities.
pub struct Timezones {
    geo: Arc<Geo>,
}

impl Timezones {
    /// Create the service over a loaded geo index.
    pub fn new(geo: Arc<Geo>) -> Self {
        Self { geo }
    }

    fn convert(&self, q: &str, ts: &str, from_q: &str, to_q: &str) -> Result<Vec<String>, ServiceError> {
        let from_locs = self.geo.query(from_q);
        if from_locs.is_empty() {
            return Err("unknown `from` city.".into());
        }

        let to_locs = self.geo.query(to_q);
        if to_locs.is_empty() {
            return Err("unknown `to` city.".into());
        }

        let naive = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dt%H:%M")
            .map_err(|_| ServiceError::from("invalid time format."))?;

        let mut out = Vec::new();
        for from in &from_locs {
            let Some(tm) = naive.and_local_timezone(from.tz).earliest() else {
                return Err("invalid time format.".into());
            };

            for to in &to_locs {
                out.push(format!(
                    "{} 1 TXT \"{} ({}, {}) {}\" = \"{} ({}, {}) {}\"",
                    q,
                    from.name,
                    from.tz_name,
                    from.country,
                    tm.format(TIME_FORMAT),
                    to.name,
                    to.tz_name,
                    to.country,
                    tm.with_timezone(&to.tz).format(TIME_FORMAT),
                ));
            }
        }

        Ok(out)
    }

    fn now(&self, q: &str, locs: &[Location]) -> Vec<String> {
        locs.iter()
            .map(|l| {
                format!(
                    "{} 1 TXT \"{} ({}, {})\" \"{}\"",
                    q,
                    l.name,
                    l.tz_name,
                    l.country,
                    Utc::now().with_timezone(&l.tz).format(TIME_FORMAT),
                )
            })
            .collect()
    }
}

impl Service for Timezones {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let q = q.trim();

        if let Some(caps) = RE_CONVERT.captures(q) {
            return self.convert(
                q,
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(2).map_or("", |m| m.as_str()),
                caps.get(3).map_or("", |m| m.as_str()),
            );
        }

        let locs = self.geo.query(q);
        if locs.is_empty() {
            return Err("unknown city.".into());
        }

        Ok(self.now(q, &locs))
    }
}

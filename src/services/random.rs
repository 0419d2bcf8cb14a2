//! Random numbers in a range (`1-100.rand`).

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ServiceError;
use crate::service::Service;

static RE_QUERY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)-([0-9]+)").unwrap());

/// The `rand` service.
pub struct Random;

impl Random {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Random {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let invalid = || ServiceError::from("invalid random query.");

        let caps = RE_QUERY.captures(q).ok_or_else(invalid)?;

        let min: i64 = caps
            .get(1)
            .map_or("", |m| m.as_str())
            .parse()
            .map_err(|_| invalid())?;
        let max: i64 = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .parse()
            .map_err(|_| invalid())?;

        if min > max {
            return Err(invalid());
        }

        let res = rand::thread_rng().gen_range(min..=max);

        Ok(vec![format!("{} 1 TXT \"Result: {}\"", q, res)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_is_within_range() {
        for _ in 0..20 {
            let out = Random::new().query("10-20").unwrap();
            let n: i64 = out[0]
                .split("Result: ")
                .nth(1)
                .unwrap()
                .trim_end_matches('"')
                .parse()
                .unwrap();
            assert!((10..=20).contains(&n), "got {}", n);
        }
    }

    #[test]
    fn degenerate_range_is_fixed() {
        let out = Random::new().query("7-7").unwrap();
        assert_eq!(out, vec!["7-7 1 TXT \"Result: 7\"".to_string()]);
    }

    #[test]
    fn rejects_inverted_or_malformed_ranges() {
        for q in ["20-10", "hello", "5"] {
            let err = Random::new().query(q).unwrap_err();
            assert_eq!(err.0, "invalid random query.", "query {:?}", q);
        }
    }
}

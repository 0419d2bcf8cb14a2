//! Dice rolls (`1d6.dice`, `3d20/4.dice` with a flat modifier).

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ServiceError;
use crate::service::Service;

static RE_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)d([0-9]+)(?:/([0-9]+))?").unwrap());

/// Upper bound on dice per roll; a DoS guard, not a game rule.
const MAX_DICE: u64 = 1000;

/// The `dice` service.
pub struct Dice;

impl Dice {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Dice {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let invalid = || ServiceError::from("invalid dice query.");

        let caps = RE_QUERY.captures(q).ok_or_else(invalid)?;

        let dice: u64 = caps
            .get(1)
            .map_or("", |m| m.as_str())
            .parse()
            .map_err(|_| invalid())?;
        let sides: u64 = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .parse()
            .map_err(|_| invalid())?;
        let modifier: u64 = match caps.get(3) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };

        if sides == 0 || dice > MAX_DICE {
            return Err(invalid());
        }

        let mut rng = rand::thread_rng();
        let mut results = Vec::with_capacity(dice as usize);
        let mut total = modifier;
        for _ in 0..dice {
            let roll = rng.gen_range(1..=sides);
            results.push(roll.to_string());
            // Huge side counts can overflow the running sum.
            total = total.checked_add(roll).ok_or_else(invalid)?;
        }

        Ok(vec![
            format!("{} 1 TXT \"rolled = [{}]\"", q, results.join(", ")),
            format!("{} 1 TXT \"total = {}\"", q, total),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_expected_count() {
        let out = Dice::new().query("3d6").unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("3d6 1 TXT \"rolled = ["), "got {}", out[0]);
        let rolls = out[0]
            .split('[')
            .nth(1)
            .unwrap()
            .trim_end_matches("]\"")
            .split(", ")
            .count();
        assert_eq!(rolls, 3);
    }

    #[test]
    fn one_sided_die_is_deterministic() {
        let out = Dice::new().query("4d1/10").unwrap();
        assert_eq!(out[0], "4d1/10 1 TXT \"rolled = [1, 1, 1, 1]\"");
        assert_eq!(out[1], "4d1/10 1 TXT \"total = 14\"");
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        // A max-value modifier makes the very first roll overflow.
        for q in [
            "1d6/18446744073709551615",
            "2d18446744073709551615/18446744073709551614",
        ] {
            let err = Dice::new().query(q).unwrap_err();
            assert_eq!(err.0, "invalid dice query.", "query {:?}", q);
        }
    }

    #[test]
    fn rejects_bad_queries() {
        for q in ["hello", "3x6", "1d0", "2000d6"] {
            let err = Dice::new().query(q).unwrap_err();
            assert_eq!(err.0, "invalid dice query.", "query {:?}", q);
        }
    }
}

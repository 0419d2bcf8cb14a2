//! Number base conversion (`100dec-hex.base`).

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ServiceError;
use crate::service::Service;

static RE_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9A-F.]+)([A-Z]{3})-([A-Z]{3})").unwrap());

fn radix(name: &str) -> Option<u32> {
    match name {
        "HEX" => Some(16),
        "DEC" => Some(10),
        "OCT" => Some(8),
        "BIN" => Some(2),
        _ => None,
    }
}

fn format_radix(num: i64, radix: u32) -> String {
    let magnitude = num.unsigned_abs();
    let digits = match radix {
        16 => format!("{:X}", magnitude),
        10 => format!("{}", magnitude),
        8 => format!("{:o}", magnitude),
        _ => format!("{:b}", magnitude),
    };
    if num < 0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// The `base` service.
pub struct Base;

impl Base {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Base {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Base {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let q = q.to_uppercase();

        let caps = RE_QUERY
            .captures(&q)
            .ok_or_else(|| ServiceError::from("invalid base query."))?;

        let digits = caps.get(1).map_or("", |m| m.as_str());
        let from_name = caps.get(2).map_or("", |m| m.as_str());
        let to_name = caps.get(3).map_or("", |m| m.as_str());

        let from = radix(from_name)
            .ok_or_else(|| ServiceError::from("invalid number system; must be one of hex, dec, oct, bin."))?;
        let to = radix(to_name)
            .ok_or_else(|| ServiceError::from("invalid number system; must be one of hex, dec, oct, bin."))?;

        let num = i64::from_str_radix(digits, from)
            .map_err(|_| ServiceError::from("invalid number."))?;

        let res = format_radix(num, to);

        Ok(vec![format!(
            "{} 1 TXT \"{} {} = {} {}\"",
            q, digits, from_name, res, to_name
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dec_to_hex() {
        let out = Base::new().query("100dec-hex").unwrap();
        assert_eq!(out, vec!["100DEC-HEX 1 TXT \"100 DEC = 64 HEX\"".to_string()]);
    }

    #[test]
    fn hex_to_bin() {
        let out = Base::new().query("ffhex-bin").unwrap();
        assert_eq!(out, vec!["FFHEX-BIN 1 TXT \"FF HEX = 11111111 BIN\"".to_string()]);
    }

    #[test]
    fn unknown_system_is_rejected() {
        let err = Base::new().query("999xyz-hex").unwrap_err();
        assert_eq!(err.0, "invalid number system; must be one of hex, dec, oct, bin.");
    }

    #[test]
    fn digits_invalid_for_radix() {
        // 'F' is not a decimal digit.
        let err = Base::new().query("ffdec-hex").unwrap_err();
        assert_eq!(err.0, "invalid number.");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = Base::new().query("hello").unwrap_err();
        assert_eq!(err.0, "invalid base query.");
    }
}

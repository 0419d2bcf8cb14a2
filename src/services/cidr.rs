//! CIDR prefix expansion: first/last usable address and range size.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::ServiceError;
use crate::service::Service;

const TTL: u32 = 900;

/// The `cidr` service.
pub struct Cidr;

impl Cidr {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }

    fn answer_v4(q: &str, addr: Ipv4Addr, prefix: u8) -> String {
        let bits = u32::from(addr);
        let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
        let network = bits & mask;
        let broadcast = bits | !mask;

        // The network and broadcast addresses are unusable except on
        // /31 point-to-point links and /32 host routes.
        let (first, last) = if prefix < 31 {
            (network + 1, broadcast - 1)
        } else {
            (network, broadcast)
        };

        let size = 1u64 << (32 - prefix);

        format!(
            "{} {} TXT \"{}\" \"{}\" \"{}\"",
            q,
            TTL,
            Ipv4Addr::from(first),
            Ipv4Addr::from(last),
            size
        )
    }

    fn answer_v6(q: &str, addr: Ipv6Addr, prefix: u8) -> String {
        let bits = u128::from(addr);
        let mask = if prefix == 0 { 0 } else { u128::MAX << (128 - prefix) };
        let first = bits & mask;
        let last = bits | !mask;

        // 2^128 does not fit in a u128.
        let size = if prefix == 0 {
            "340282366920938463463374607431768211456".to_string()
        } else {
            (1u128 << (128 - prefix)).to_string()
        };

        format!(
            "{} {} TXT \"{}\" \"{}\" \"{}\"",
            q,
            TTL,
            Ipv6Addr::from(first),
            Ipv6Addr::from(last),
            size
        )
    }
}

impl Default for Cidr {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Cidr {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let invalid = || ServiceError::from("invalid cidr notation.");

        let (addr_str, prefix_str) = q.split_once('/').ok_or_else(invalid)?;
        let addr: IpAddr = addr_str.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix_str.parse().map_err(|_| invalid())?;

        let answer = match addr {
            IpAddr::V4(v4) => {
                if prefix > 32 {
                    return Err(invalid());
                }
                Self::answer_v4(q, v4, prefix)
            }
            IpAddr::V6(v6) => {
                if prefix > 128 {
                    return Err(invalid());
                }
                Self::answer_v6(q, v6, prefix)
            }
        };

        Ok(vec![answer])
    }
}

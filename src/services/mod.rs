//! The individual lookup services that back registered suffixes.

pub mod base;
pub mod cidr;
pub mod coin;
pub mod dice;
pub mod epoch;
pub mod fx;
pub mod num2words;
pub mod random;
pub mod timezones;
pub mod units;
pub mod uuid;

//! Epoch timestamps to human-readable time (`784783800.epoch`).
//!
//! Millisecond, microsecond and nanosecond inputs are detected by
//! magnitude and scaled down to seconds.

use chrono::{DateTime, Local};

use crate::error::ServiceError;
use crate::service::Service;

const TTL: u32 = 900;

/// The `epoch` service.
pub struct Epoch {
    send_local_time: bool,
}

impl Epoch {
    /// Create the service; `send_local_time` appends the server's local
    /// time as a second field.
    pub fn new(send_local_time: bool) -> Self {
        Self { send_local_time }
    }
}

impl Service for Epoch {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let invalid = || ServiceError::from("invalid epoch query");

        let mut ts: i64 = q.parse().map_err(|_| invalid())?;

        if ts >= 10i64.pow(16) || ts <= -(10i64.pow(16)) {
            // Nanoseconds.
            ts /= 1_000_000_000;
        } else if ts >= 10i64.pow(14) || ts <= -(10i64.pow(14)) {
            // Microseconds.
            ts /= 1_000_000;
        } else if ts >= 10i64.pow(11) || ts <= -(3 * 10i64.pow(10)) {
            // Milliseconds.
            ts /= 1000;
        }

        let utc = DateTime::from_timestamp(ts, 0).ok_or_else(invalid)?;

        let mut out = format!(
            "{} {} TXT \"{}\"",
            q,
            TTL,
            utc.format("%Y-%m-%d %H:%M:%S %z UTC")
        );
        if self.send_local_time {
            let local = utc.with_timezone(&Local);
            out.push_str(&format!(" \"{}\"", local.format("%Y-%m-%d %H:%M:%S %z")));
        }

        Ok(vec![out])
    }
}

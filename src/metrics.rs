//! Metrics instrumentation for toydns.
//!
//! All metrics are prefixed with `toydns.`

use metrics::{counter, histogram};
use std::time::Instant;

/// Record one handled DNS message.
pub fn record_query(result: QueryResult, duration: std::time::Duration) {
    let result_str = match result {
        QueryResult::Success => "success",
        QueryResult::Ignored => "ignored",
        QueryResult::TooManyQueries => "too_many_queries",
        QueryResult::ServiceError => "service_error",
        QueryResult::FramingError => "framing_error",
    };

    counter!("toydns.query.count", "result" => result_str).increment(1);
    histogram!("toydns.query.duration.seconds", "result" => result_str)
        .record(duration.as_secs_f64());
}

/// How a handled message terminated, for metrics.
#[derive(Debug, Clone, Copy)]
pub enum QueryResult {
    /// Message answered successfully (possibly with zero records).
    Success,
    /// Non-QUERY opcode, replied empty.
    Ignored,
    /// Question-count cap exceeded.
    TooManyQueries,
    /// A service rejected a question.
    ServiceError,
    /// A service answer failed to frame into a record.
    FramingError,
}

/// Record answer records returned for a successful message.
pub fn record_answers_returned(count: usize) {
    histogram!("toydns.query.answers_returned").record(count as f64);
}

/// Record a snapshot save attempt per service.
pub fn record_snapshot(service: &str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("toydns.snapshot.count", "service" => service.to_string(), "result" => result)
        .increment(1);
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

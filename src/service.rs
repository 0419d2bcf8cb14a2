//! The two-method contract every toy service implements.

use crate::error::ServiceError;

/// A pluggable unit that turns a normalized query argument into one or
/// more textual answer records.
///
/// Each returned string must follow the answer-record grammar understood
/// by [`crate::framer`]:
///
/// ```text
/// <name> <ttl> [IN] TXT "<field>" ["<field>" ...]
/// <name> [<ttl>] [IN] A <ipv4>
/// <name> [<ttl>] [IN] AAAA <ipv6>
/// ```
///
/// Returning `Err` rejects the question with that message; returning an
/// empty vector means "no data for this argument".
///
/// `query` is called concurrently from arbitrarily many in-flight
/// requests; services guard their own internal state.
pub trait Service: Send + Sync {
    /// Answer a single normalized question argument.
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError>;

    /// Serialize the service's internal cache for persistence across
    /// restarts, or `None` if there is nothing worth persisting.
    ///
    /// Only the snapshot subsystem calls this; it is never on the
    /// request path.
    fn dump(&self) -> Result<Option<Vec<u8>>, ServiceError> {
        Ok(None)
    }
}

/// One line of the static `help.` answer: a summary and a `dig` example
/// with a `{domain}` placeholder for the server's public domain.
#[derive(Debug, Clone)]
pub struct HelpEntry {
    /// Short description of what the service does.
    pub summary: &'static str,
    /// Example invocation, e.g. `dig mumbai.time @{domain}`.
    pub example: &'static str,
}

impl HelpEntry {
    /// Create a help entry.
    pub fn new(summary: &'static str, example: &'static str) -> Self {
        Self { summary, example }
    }
}

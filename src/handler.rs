//! Query dispatch: suffix registry, fixed handlers and the
//! `RequestHandler` that fans inbound questions out to services.

use async_trait::async_trait;
use hickory_proto::op::{Header, LowerQuery, OpCode, ResponseCode};
use hickory_proto::rr::{Record, RecordType};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

use crate::error::Error;
use crate::framer;
use crate::metrics::{self, QueryResult, Timer};
use crate::normalize::{normalize, Charset, NormalizePolicy};
use crate::service::{HelpEntry, Service};

/// Hard cap on questions per inbound message.
pub const MAX_QUESTIONS: usize = 5;

/// The digits of pi served for TXT questions on `pi.`.
const PI_TXT: &str = "3.141592653589793238462643383279502884197169";

/// Two-letter ISO 3166-1 codes used by country-code registrations.
pub const COUNTRY_CODES: &[&str] = &[
    "ad", "ae", "af", "ag", "ai", "al", "am", "ao", "aq", "ar", "as", "at", "au", "aw", "ax", "az",
    "ba", "bb", "bd", "be", "bf", "bg", "bh", "bi", "bj", "bl", "bm", "bn", "bo", "bq", "br", "bs",
    "bt", "bv", "bw", "by", "bz", "ca", "cc", "cd", "cf", "cg", "ch", "ci", "ck", "cl", "cm", "cn",
    "co", "cr", "cu", "cv", "cw", "cx", "cy", "cz", "de", "dj", "dk", "dm", "do", "dz", "ec", "ee",
    "eg", "eh", "er", "es", "et", "fi", "fj", "fk", "fm", "fo", "fr", "ga", "gb", "gd", "ge", "gf",
    "gg", "gh", "gi", "gl", "gm", "gn", "gp", "gq", "gr", "gs", "gt", "gu", "gw", "gy", "hk", "hm",
    "hn", "hr", "ht", "hu", "id", "ie", "il", "im", "in", "io", "iq", "ir", "is", "it", "je", "jm",
    "jo", "jp", "ke", "kg", "kh", "ki", "km", "kn", "kp", "kr", "kw", "ky", "kz", "la", "lb", "lc",
    "li", "lk", "lr", "ls", "lt", "lu", "lv", "ly", "ma", "mc", "md", "me", "mf", "mg", "mh", "mk",
    "ml", "mm", "mn", "mo", "mp", "mq", "mr", "ms", "mt", "mu", "mv", "mw", "mx", "my", "mz", "na",
    "nc", "ne", "nf", "ng", "ni", "nl", "no", "np", "nr", "nu", "nz", "om", "pa", "pe", "pf", "pg",
    "ph", "pk", "pl", "pm", "pn", "pr", "ps", "pt", "pw", "py", "qa", "re", "ro", "rs", "ru", "rw",
    "sa", "sb", "sc", "sd", "se", "sg", "sh", "si", "sj", "sk", "sl", "sm", "sn", "so", "sr", "ss",
    "st", "sv", "sx", "sy", "sz", "tc", "td", "tf", "tg", "th", "tj", "tk", "tl", "tm", "tn", "to",
    "tr", "tt", "tv", "tw", "tz", "ua", "ug", "um", "us", "uy", "uz", "va", "vc", "ve", "vg", "vi",
    "vn", "vu", "wf", "ws", "ye", "yt", "za", "zm", "zw",
];

/// One suffix binding: the service plus its normalization policy.
#[derive(Clone)]
struct Registration {
    suffix: String,
    service: Arc<dyn Service>,
    policy: NormalizePolicy,
}

/// The suffix -> service table, fixed handlers and the precomputed
/// `help.` answer. Built once at startup, immutable afterwards.
pub struct Registry {
    domain: String,
    entries: HashMap<String, Registration>,
    /// One entry per `register*` call, in call order; drives snapshots.
    logical: Vec<(String, Arc<dyn Service>)>,
    help: Vec<Record>,
    echo_ip: bool,
    pi: bool,
}

impl Registry {
    /// Create an empty registry for a server reachable at `domain`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            entries: HashMap::new(),
            logical: Vec::new(),
            help: Vec::new(),
            echo_ip: false,
            pi: false,
        }
    }

    /// The server's public domain, as shown in help and error text.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Bind a service to a suffix. Re-registering a suffix replaces the
    /// previous binding; registration happens once at startup from
    /// static configuration, so last-writer-wins is fine.
    pub fn register(&mut self, suffix: &str, service: Arc<dyn Service>, policy: NormalizePolicy) {
        debug_assert!(!suffix.is_empty());
        self.entries.insert(
            suffix.to_string(),
            Registration {
                suffix: suffix.to_string(),
                service: Arc::clone(&service),
                policy,
            },
        );
        self.logical.push((suffix.to_string(), service));
    }

    /// Bind one service to `<suffix>.<cc>` for every known country
    /// code. These registrations keep the full question name as the
    /// argument so the service can read the country code itself.
    pub fn register_with_country_codes(
        &mut self,
        suffix: &str,
        service: Arc<dyn Service>,
        charset: Charset,
    ) {
        debug_assert!(!suffix.is_empty());
        for cc in COUNTRY_CODES {
            let full = format!("{}.{}", suffix, cc);
            self.entries.insert(
                full.clone(),
                Registration {
                    suffix: full,
                    service: Arc::clone(&service),
                    policy: NormalizePolicy::keep_name(charset),
                },
            );
        }
        self.logical.push((suffix.to_string(), service));
    }

    /// Append one line to the static `help.` answer. Entries appear in
    /// call order; the record is built here, once, so serving help is a
    /// clone of precomputed records.
    pub fn add_help(&mut self, entry: HelpEntry) -> Result<(), Error> {
        let example = entry.example.replace("{domain}", &self.domain);
        let text = format!("help. 1 TXT \"{}\" \"{}\"", entry.summary, example);
        let record = framer::parse_answer(&text)
            .map_err(|e| Error::Config(format!("bad help entry {:?}: {}", entry.summary, e)))?;
        self.help.push(record);
        Ok(())
    }

    /// Enable the `ip.` echo handler.
    pub fn enable_echo_ip(&mut self) {
        self.echo_ip = true;
    }

    /// Enable the `pi.` handler.
    pub fn enable_pi(&mut self) {
        self.pi = true;
    }

    /// Iterate logical registrations (suffix, service) in registration
    /// order. Used by the snapshot subsystem.
    pub fn services(&self) -> impl Iterator<Item = (&str, &Arc<dyn Service>)> {
        self.logical.iter().map(|(s, svc)| (s.as_str(), svc))
    }

    /// Find the registration for a dot-terminated question name, trying
    /// the final two labels (country-code registrations) before the
    /// final label.
    fn lookup(&self, name: &str) -> Option<&Registration> {
        let labels: Vec<&str> = name.split('.').filter(|l| !l.is_empty()).collect();
        let (last, prev) = match labels.as_slice() {
            [] => return None,
            [last] => (*last, None),
            [.., prev, last] => (*last, Some(*prev)),
        };

        if let Some(prev) = prev {
            if let Some(reg) = self.entries.get(&format!("{}.{}", prev, last)) {
                return Some(reg);
            }
        }
        self.entries.get(last)
    }
}

/// How a question terminated message processing.
enum Reject {
    /// A service rejected the question; the message goes to the client.
    Service(String),
    /// An answer string failed to frame; the client gets a generic
    /// message, the detail stays in the logs.
    Framing,
}

/// The request handler: validates each inbound message and fans its
/// questions out through the registry.
#[derive(Clone)]
pub struct ToyHandler {
    registry: Arc<Registry>,
}

impl ToyHandler {
    /// Wrap a finished registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Answer one question, or decide how it fails.
    fn answer_question(&self, query: &LowerQuery, src: SocketAddr) -> Result<Vec<Record>, Reject> {
        let name = query.name().to_string();
        let qtype = query.query_type();
        trace!(name = %name, qtype = ?qtype, "dispatching question");

        let last_label = name
            .split('.')
            .filter(|l| !l.is_empty())
            .next_back()
            .unwrap_or("");

        // pi has its own record-type rules (TXT, A and AAAA), so it is
        // routed before the generic type filter.
        if self.registry.pi && last_label == "pi" {
            return self.answer_pi(qtype);
        }

        // The server only answers TXT and A questions; anything else is
        // skipped without an answer or an error.
        if qtype != RecordType::TXT && qtype != RecordType::A {
            return Ok(Vec::new());
        }

        if last_label == "help" {
            return Ok(self.registry.help.clone());
        }

        if self.registry.echo_ip && last_label == "ip" {
            return self.answer_echo_ip(src);
        }

        let reg = match self.registry.lookup(&name) {
            Some(reg) => reg,
            None => {
                debug!(name = %name, "no registration for query");
                return Err(Reject::Service(format!(
                    "unknown query. try: dig help @{}",
                    self.registry.domain
                )));
            }
        };

        let arg = normalize(&name, &reg.suffix, reg.policy);
        let answers = match reg.service.query(&arg) {
            Ok(answers) => answers,
            Err(e) => {
                debug!(suffix = %reg.suffix, arg = %arg, error = %e, "service rejected query");
                return Err(Reject::Service(e.0));
            }
        };

        match framer::parse_answers(&answers) {
            Ok(records) => Ok(records),
            Err(e) => {
                // Never leak the malformed content to the client.
                error!(suffix = %reg.suffix, arg = %arg, error = %e, "error preparing response");
                Err(Reject::Framing)
            }
        }
    }

    fn answer_pi(&self, qtype: RecordType) -> Result<Vec<Record>, Reject> {
        let text = match qtype {
            RecordType::TXT => format!("pi. 1 TXT {}", PI_TXT),
            RecordType::A => "pi. IN A 3.141.59.27".to_string(),
            RecordType::AAAA => "pi. IN AAAA 3141:5926:5358:9793:2384:6264:3383:2795".to_string(),
            _ => return Ok(Vec::new()),
        };
        match framer::parse_answer(&text) {
            Ok(record) => Ok(vec![record]),
            Err(e) => {
                error!(error = %e, "error preparing pi response");
                Err(Reject::Framing)
            }
        }
    }

    fn answer_echo_ip(&self, src: SocketAddr) -> Result<Vec<Record>, Reject> {
        let text = match src.ip() {
            IpAddr::V4(ip) => format!("ip. 1 TXT \"{}\"", ip),
            IpAddr::V6(ip) => match ip.to_ipv4_mapped() {
                Some(v4) => format!("ip. 1 TXT \"{}\"", v4),
                None => format!("ip. 1 TXT \"{}\"", ip),
            },
        };
        match framer::parse_answer(&text) {
            Ok(record) => Ok(vec![record]),
            Err(e) => {
                error!(error = %e, "error preparing ip response");
                Err(Reject::Framing)
            }
        }
    }

    async fn respond<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: &mut R,
        code: ResponseCode,
        answers: &[Record],
    ) -> ResponseInfo {
        let mut header = Header::response_from_request(request.header());
        header.set_response_code(code);

        let response = MessageResponseBuilder::from_message_request(request).build(
            header,
            answers.iter(),
            &[],
            &[],
            &[],
        );

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "failed to send DNS response");
                ResponseInfo::from(header)
            }
        }
    }

    async fn respond_error<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: &mut R,
        msg: &str,
    ) -> ResponseInfo {
        let record = framer::error_record(msg);
        self.respond(request, response_handle, ResponseCode::ServFail, &[record])
            .await
    }
}

#[async_trait]
impl RequestHandler for ToyHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let timer = Timer::start();

        // Anything other than a standard query gets a silent empty
        // reply, not an error.
        if request.op_code() != OpCode::Query {
            trace!(op_code = ?request.op_code(), "ignoring non-query opcode");
            metrics::record_query(QueryResult::Ignored, timer.elapsed());
            return self
                .respond(request, &mut response_handle, ResponseCode::NoError, &[])
                .await;
        }

        let queries = request.queries();
        if queries.len() > MAX_QUESTIONS {
            warn!(count = queries.len(), src = %request.src(), "too many questions in one message");
            metrics::record_query(QueryResult::TooManyQueries, timer.elapsed());
            return self
                .respond_error(request, &mut response_handle, "too many queries.")
                .await;
        }

        // Questions are processed in arrival order; the first error
        // aborts the rest and discards any answers gathered so far.
        let mut answers = Vec::new();
        for query in queries {
            match self.answer_question(query, request.src()) {
                Ok(mut records) => answers.append(&mut records),
                Err(Reject::Service(msg)) => {
                    metrics::record_query(QueryResult::ServiceError, timer.elapsed());
                    return self.respond_error(request, &mut response_handle, &msg).await;
                }
                Err(Reject::Framing) => {
                    metrics::record_query(QueryResult::FramingError, timer.elapsed());
                    return self
                        .respond_error(request, &mut response_handle, "error preparing response.")
                        .await;
                }
            }
        }

        metrics::record_answers_returned(answers.len());
        metrics::record_query(QueryResult::Success, timer.elapsed());
        self.respond(request, &mut response_handle, ResponseCode::NoError, &answers)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    struct Echo;

    impl Service for Echo {
        fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
            Ok(vec![format!("{} 1 TXT \"{}\"", q, q)])
        }
    }

    #[test]
    fn lookup_matches_last_label() {
        let mut registry = Registry::new("dns.example.com");
        registry.register("time", Arc::new(Echo), NormalizePolicy::narrow());

        assert!(registry.lookup("mumbai.time.").is_some());
        assert!(registry.lookup("time.").is_some());
        assert!(registry.lookup("mumbai.clock.").is_none());
    }

    #[test]
    fn lookup_prefers_country_code_entries() {
        let mut registry = Registry::new("dns.example.com");
        registry.register("in", Arc::new(Echo), NormalizePolicy::broad());
        registry.register_with_country_codes("holiday", Arc::new(Echo), Charset::Narrow);

        let reg = registry.lookup("goa.holiday.in.").unwrap();
        assert_eq!(reg.suffix, "holiday.in");
        assert_eq!(reg.policy, NormalizePolicy::keep_name(Charset::Narrow));

        // A name ending in a bare registered label still resolves.
        let reg = registry.lookup("something.in.").unwrap();
        assert_eq!(reg.suffix, "in");
    }

    #[test]
    fn reregistering_a_suffix_replaces_it() {
        struct Second;
        impl Service for Second {
            fn query(&self, _q: &str) -> Result<Vec<String>, ServiceError> {
                Ok(vec!["x. 1 TXT \"second\"".to_string()])
            }
        }

        let mut registry = Registry::new("dns.example.com");
        registry.register("time", Arc::new(Echo), NormalizePolicy::narrow());
        registry.register("time", Arc::new(Second), NormalizePolicy::broad());

        let reg = registry.lookup("mumbai.time.").unwrap();
        assert_eq!(reg.policy, NormalizePolicy::broad());
        let out = reg.service.query("anything").unwrap();
        assert_eq!(out[0], "x. 1 TXT \"second\"");
    }

    #[test]
    fn help_entries_keep_registration_order() {
        let mut registry = Registry::new("dns.example.com");
        registry
            .add_help(HelpEntry::new("get time for a city", "dig mumbai.time @{domain}"))
            .unwrap();
        registry
            .add_help(HelpEntry::new("convert currency rates", "dig 99USD-INR.fx @{domain}"))
            .unwrap();

        assert_eq!(registry.help.len(), 2);
        let first = format!("{:?}", registry.help[0].data());
        assert!(first.contains("get time for a city"), "got {}", first);
        assert!(first.contains("dig mumbai.time @dns.example.com"), "got {}", first);
    }
}

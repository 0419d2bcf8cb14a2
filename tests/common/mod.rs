//! Shared test infrastructure for dispatch integration tests.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecoder, BinEncoder};
use hickory_server::authority::{MessageRequest, MessageResponse};
use hickory_server::proto::rr::Record;
use hickory_server::proto::xfer::Protocol;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

use toydns::error::ServiceError;
use toydns::normalize::NormalizePolicy;
use toydns::{HelpEntry, Registry, Service, ToyHandler};

// --- Constants ---

pub const DOMAIN: &str = "dns.example.com";

// --- TestResponseHandler ---

/// Captures the serialized DNS response for inspection in tests.
///
/// Implements `ResponseHandler` so it can be passed to
/// `ToyHandler::handle_request()`. The response is serialized via
/// `MessageResponse::destructive_emit()` and stored as raw wire-format
/// bytes, which can then be parsed with `Message::from_vec()`.
#[derive(Clone)]
pub struct TestResponseHandler {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl TestResponseHandler {
    pub fn new() -> Self {
        Self {
            buf: Arc::new(Mutex::new(Vec::with_capacity(512))),
        }
    }

    /// Parse the captured wire bytes into a `Message` for assertions.
    pub fn into_message(self) -> Message {
        let buf = self.buf.lock().unwrap();
        assert!(!buf.is_empty(), "no response was captured");
        Message::from_vec(&buf).expect("failed to parse captured DNS response")
    }
}

#[async_trait]
impl ResponseHandler for TestResponseHandler {
    async fn send_response<'a>(
        &mut self,
        response: MessageResponse<
            '_,
            'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
        >,
    ) -> io::Result<ResponseInfo> {
        let mut buf = self.buf.lock().unwrap();
        buf.clear();
        let mut encoder = BinEncoder::new(&mut *buf);
        encoder.set_max_size(u16::MAX);
        let info = response
            .destructive_emit(&mut encoder)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(info)
    }
}

// --- Mock services ---

/// A service that answers with a fixed set of strings.
pub struct FixedAnswers(pub Vec<String>);

impl Service for FixedAnswers {
    fn query(&self, _q: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self.0.clone())
    }
}

/// A service that rejects every question with a fixed message.
pub struct AlwaysFails(pub &'static str);

impl Service for AlwaysFails {
    fn query(&self, _q: &str) -> Result<Vec<String>, ServiceError> {
        Err(ServiceError::from(self.0))
    }
}

/// A service that echoes its normalized argument, recording what it saw.
pub struct RecordingEcho {
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingEcho {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (Self { seen: Arc::clone(&seen) }, seen)
    }
}

impl Service for RecordingEcho {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        self.seen.lock().unwrap().push(q.to_string());
        Ok(vec![format!("{} 1 TXT \"{}\"", q, q)])
    }
}

// --- Registry/handler builders ---

pub fn empty_registry() -> Registry {
    Registry::new(DOMAIN)
}

/// A registry with one mocked service bound to a suffix.
pub fn registry_with(suffix: &str, service: Arc<dyn Service>, policy: NormalizePolicy) -> Registry {
    let mut registry = empty_registry();
    registry.register(suffix, service, policy);
    registry
}

pub fn handler(registry: Registry) -> ToyHandler {
    ToyHandler::new(Arc::new(registry))
}

/// A registry with the standard help lines used by the help tests.
pub fn registry_with_help() -> Registry {
    let mut registry = empty_registry();
    registry
        .add_help(HelpEntry::new("get time for a city", "dig mumbai.time @{domain}"))
        .unwrap();
    registry
        .add_help(HelpEntry::new("convert currency rates", "dig 99USD-INR.fx @{domain}"))
        .unwrap();
    registry
}

// --- Query/Request construction ---

pub fn test_src() -> SocketAddr {
    "203.0.113.9:12345".parse().unwrap()
}

/// Build wire-format bytes for a DNS message with any number of questions.
pub fn build_multi_query_bytes(questions: &[(&str, RecordType)], id: u16) -> Vec<u8> {
    let mut msg = Message::new();
    msg.set_id(id);
    msg.set_message_type(MessageType::Query);
    msg.set_op_code(OpCode::Query);
    msg.set_recursion_desired(true);
    for (name, record_type) in questions {
        let mut query = Query::new();
        query.set_name(Name::from_ascii(name).unwrap());
        query.set_query_type(*record_type);
        query.set_query_class(DNSClass::IN);
        msg.add_query(query);
    }
    msg.to_vec().unwrap()
}

pub fn build_query_bytes(name: &str, record_type: RecordType, id: u16) -> Vec<u8> {
    build_multi_query_bytes(&[(name, record_type)], id)
}

/// Parse wire bytes into a MessageRequest.
pub fn parse_message_request(bytes: &[u8]) -> MessageRequest {
    use hickory_proto::serialize::binary::BinDecodable;
    let mut decoder = BinDecoder::new(bytes);
    MessageRequest::read(&mut decoder).expect("failed to parse MessageRequest")
}

/// Build a full `Request` with a crafted source address.
pub fn build_request(bytes: &[u8], src: SocketAddr) -> Request {
    let msg = parse_message_request(bytes);
    Request::new(msg, src, Protocol::Udp)
}

// --- Execution helpers ---

/// Run one single-question query through the handler and return the
/// parsed response.
pub async fn execute_query(
    handler: &ToyHandler,
    name: &str,
    record_type: RecordType,
    id: u16,
) -> Message {
    let bytes = build_query_bytes(name, record_type, id);
    execute_raw(handler, &bytes, test_src()).await
}

/// Run an arbitrary wire-format message through the handler.
pub async fn execute_raw(handler: &ToyHandler, bytes: &[u8], src: SocketAddr) -> Message {
    let request = build_request(bytes, src);
    let response_handler = TestResponseHandler::new();
    handler.handle_request(&request, response_handler.clone()).await;
    response_handler.into_message()
}

// --- Response helpers ---

/// Extract every TXT character-string from the answer section, one
/// string per field, in record order.
pub fn extract_txt_strings(msg: &Message) -> Vec<String> {
    msg.answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::TXT(txt) => Some(
                txt.iter()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Assert response code.
pub fn assert_response_code(msg: &Message, expected: ResponseCode) {
    assert_eq!(
        msg.response_code(),
        expected,
        "expected {:?}, got {:?}",
        expected,
        msg.response_code()
    );
}

/// Assert the response is a SERVFAIL carrying a single `error: ...`
/// TXT record with the given message.
pub fn assert_error_response(msg: &Message, expected: &str) {
    assert_response_code(msg, ResponseCode::ServFail);
    let txt = extract_txt_strings(msg);
    assert_eq!(txt, vec![format!("error: {}", expected)]);
}

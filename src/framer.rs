//! Response framing: turning service answer strings into DNS records.
//!
//! Services speak in a compact textual record form,
//! `<name> <ttl> [IN] TXT "field" "field"`, which this module parses
//! into `hickory_proto` records without reformatting the text. Any
//! error, from whichever layer, degrades to exactly one synthesized
//! `error: ...` TXT record.

use hickory_proto::rr::rdata::{A, AAAA, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record};
use thiserror::Error;

/// TTL attached to synthesized error records.
const ERROR_TTL: u32 = 1;

/// Default TTL when an answer string omits the field.
const DEFAULT_TTL: u32 = 1;

/// A service answer string that could not be converted into a record.
///
/// Surfaced to clients only as a generic "error preparing response.";
/// the detail here is for server-side logs.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The record text ended before a record type was found.
    #[error("incomplete record: {0:?}")]
    Incomplete(String),

    /// The name portion was not a valid DNS name.
    #[error("invalid record name {0:?}: {1}")]
    Name(String, hickory_proto::ProtoError),

    /// The record type is not one the framer emits.
    #[error("unsupported record type {0:?}")]
    RecordType(String),

    /// The rdata portion did not parse (bad address, no TXT fields).
    #[error("invalid rdata for {0} record: {1:?}")]
    Rdata(&'static str, String),
}

/// Convert one service answer string into a record.
///
/// The textual content is preserved exactly; quoted fields become the
/// TXT character-strings verbatim.
pub fn parse_answer(answer: &str) -> Result<Record, FramingError> {
    let mut tokens = Tokenizer::new(answer);

    let name_tok = match tokens.next() {
        Some(Token::Plain(t)) => t,
        _ => return Err(FramingError::Incomplete(answer.to_string())),
    };
    let name = parse_name(&name_tok)?;

    // Optional TTL, optional IN class, then the record type.
    let mut ttl = DEFAULT_TTL;
    let mut tok = tokens.next();
    if let Some(Token::Plain(ref t)) = tok {
        if let Ok(n) = t.parse::<u32>() {
            ttl = n;
            tok = tokens.next();
        }
    }
    if let Some(Token::Plain(ref t)) = tok {
        if t.eq_ignore_ascii_case("IN") {
            tok = tokens.next();
        }
    }

    let rtype = match tok {
        Some(Token::Plain(t)) => t,
        _ => return Err(FramingError::Incomplete(answer.to_string())),
    };

    let rdata = match rtype.to_ascii_uppercase().as_str() {
        "TXT" => {
            let fields: Vec<String> = tokens
                .map(|t| match t {
                    Token::Plain(s) | Token::Quoted(s) => s,
                })
                .collect();
            if fields.is_empty() {
                return Err(FramingError::Rdata("TXT", answer.to_string()));
            }
            RData::TXT(TXT::new(fields))
        }
        "A" => match tokens.next() {
            Some(Token::Plain(s)) => match s.parse() {
                Ok(ip) => RData::A(A(ip)),
                Err(_) => return Err(FramingError::Rdata("A", s)),
            },
            _ => return Err(FramingError::Rdata("A", answer.to_string())),
        },
        "AAAA" => match tokens.next() {
            Some(Token::Plain(s)) => match s.parse() {
                Ok(ip) => RData::AAAA(AAAA(ip)),
                Err(_) => return Err(FramingError::Rdata("AAAA", s)),
            },
            _ => return Err(FramingError::Rdata("AAAA", answer.to_string())),
        },
        other => return Err(FramingError::RecordType(other.to_string())),
    };

    let mut record = Record::from_rdata(name, ttl, rdata);
    record.set_dns_class(DNSClass::IN);
    Ok(record)
}

/// Convert a whole service response; all-or-nothing per question.
pub fn parse_answers(answers: &[String]) -> Result<Vec<Record>, FramingError> {
    answers.iter().map(|a| parse_answer(a)).collect()
}

/// Synthesize the single record carried by every failure response:
/// a root-name TXT with the message prefixed `error: `.
pub fn error_record(msg: &str) -> Record {
    let mut record = Record::from_rdata(
        Name::root(),
        ERROR_TTL,
        RData::TXT(TXT::new(vec![format!("error: {}", msg)])),
    );
    record.set_dns_class(DNSClass::IN);
    record
}

fn parse_name(token: &str) -> Result<Name, FramingError> {
    let fqdn = if token.ends_with('.') {
        token.to_string()
    } else {
        format!("{}.", token)
    };
    Name::from_ascii(&fqdn).map_err(|e| FramingError::Name(token.to_string(), e))
}

enum Token {
    Plain(String),
    Quoted(String),
}

/// Splits an answer string into whitespace-separated tokens, keeping
/// double-quoted spans (which may contain spaces) intact.
struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return None;
        }

        if let Some(stripped) = self.rest.strip_prefix('"') {
            let end = stripped.find('"').unwrap_or(stripped.len());
            let field = &stripped[..end];
            self.rest = stripped.get(end + 1..).unwrap_or("");
            return Some(Token::Quoted(field.to_string()));
        }

        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        let token = &self.rest[..end];
        self.rest = &self.rest[end..];
        Some(Token::Plain(token.to_string()))
    }
}

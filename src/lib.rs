//! toydns - a DNS server that answers useless questions.
//!
//! This crate abuses DNS as a transport for small lookup services:
//! the leading labels of a TXT query carry the argument and the
//! trailing label selects the service, so `dig mumbai.time @host`
//! answers with the current time in Mumbai and `dig 100USD-INR.fx
//! @host` converts currencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          toydns                            │
//! │                                                            │
//! │   UDP :53 ──▶ ToyHandler ──▶ Registry (suffix lookup)      │
//! │                  │               │                         │
//! │                  │               ├─ time  (geonames index) │
//! │                  │               ├─ fx    (cached rates)   │
//! │                  │               ├─ unit, base, cidr, ...  │
//! │                  │               └─ help / ip / pi         │
//! │                  │                                         │
//! │                  └─ framer: "<name> <ttl> TXT \"...\""     │
//! │                     strings from services become records   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each service implements [`service::Service`], returning answers as
//! zone-file-style strings that the framer parses into records. A
//! service error aborts the whole message: the reply carries a single
//! `error: ...` TXT record and the SERVFAIL code.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod framer;
pub mod geo;
pub mod handler;
pub mod metrics;
pub mod normalize;
pub mod server;
pub mod service;
pub mod services;
pub mod snapshot;
pub mod telemetry;

// Re-export main types
pub use config::{Config, ServerConfig, ServicesConfig, TelemetryConfig};
pub use error::{Error, ServiceError};
pub use handler::{Registry, ToyHandler};
pub use server::ToyServer;
pub use service::{HelpEntry, Service};

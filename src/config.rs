//! Configuration types for toydns.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// DNS server configuration.
    pub server: ServerConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Per-service toggles and options.
    #[serde(default)]
    pub services: ServicesConfig,
}

/// DNS server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address for the DNS server to listen on (UDP).
    pub listen_addr: SocketAddr,

    /// Public domain of this server, shown in help and error text
    /// (e.g. "dns.example.com").
    pub domain: String,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "toydns=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus metrics exporter address.
    #[serde(default)]
    pub prometheus_addr: Option<SocketAddr>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prometheus_addr: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One section per toy service. Disabled services are never registered
/// and never appear in the help listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// City time lookups (`mumbai.time`).
    #[serde(default)]
    pub time: TimeConfig,

    /// Currency conversion (`100USD-INR.fx`).
    #[serde(default)]
    pub fx: FxConfig,

    /// Unit conversion (`42km-cm.unit`).
    #[serde(default)]
    pub unit: Toggle,

    /// Number base conversion (`100dec-hex.base`).
    #[serde(default)]
    pub base: Toggle,

    /// CIDR range expansion (`10.100.0.0/24.cidr`).
    #[serde(default)]
    pub cidr: Toggle,

    /// Numbers to words (`123456.words`).
    #[serde(default)]
    pub words: Toggle,

    /// Dice rolls (`1d6.dice`).
    #[serde(default)]
    pub dice: Toggle,

    /// Coin tosses (`2.coin`).
    #[serde(default)]
    pub coin: Toggle,

    /// Random numbers (`1-100.rand`).
    #[serde(default)]
    pub rand: Toggle,

    /// Epoch to human-readable time (`784783800.epoch`).
    #[serde(default)]
    pub epoch: EpochConfig,

    /// Random v4 UUIDs (`5.uuid`).
    #[serde(default)]
    pub uuid: UuidConfig,

    /// Echo the caller's IP (`dig ip`).
    #[serde(default)]
    pub ip: Toggle,

    /// Digits of pi (`dig pi`).
    #[serde(default)]
    pub pi: Toggle,
}

/// Plain on/off switch for services without options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toggle {
    /// Whether the service is registered at startup.
    #[serde(default)]
    pub enabled: bool,
}

/// Time service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Whether the service is registered at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Path to a geonames.org-style tab-separated city file.
    #[serde(default)]
    pub geo_file: Option<PathBuf>,
}

/// FX service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxConfig {
    /// Whether the service is registered at startup.
    #[serde(default)]
    pub enabled: bool,

    /// How often to re-fetch exchange rates, in seconds.
    #[serde(default = "default_fx_refresh")]
    pub refresh_interval_secs: u64,

    /// Where to persist the cached rates across restarts.
    #[serde(default)]
    pub snapshot_file: Option<PathBuf>,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            refresh_interval_secs: default_fx_refresh(),
            snapshot_file: None,
        }
    }
}

fn default_fx_refresh() -> u64 {
    21600
}

/// Epoch service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpochConfig {
    /// Whether the service is registered at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Also include the server's local time in the answer.
    #[serde(default)]
    pub send_local_time: bool,
}

/// UUID service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UuidConfig {
    /// Whether the service is registered at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of UUIDs returned by one query.
    #[serde(default = "default_uuid_max")]
    pub max_results: usize,
}

impl Default for UuidConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_results: default_uuid_max(),
        }
    }
}

fn default_uuid_max() -> usize {
    50
}

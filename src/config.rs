//! Configuration module for the market data client

use std::env;
use std::time::Duration;

use crate::auth::Credentials;
use crate::delivery::DEFAULT_CAPACITY;
use crate::error::{ClientError, Result};

const DEFAULT_SCHEME: &str = "wss";
const DEFAULT_HOST: &str = "ascendex.com";
const DEFAULT_PATH: &str = "/0/api/pro/v1/stream";
const DEFAULT_SYMBOLS: &str = "USDT_BTC,BTC_USDT";
const DEFAULT_PING_INTERVAL_SECS: u64 = 15;
const DEFAULT_PING_DEADLINE_MS: u64 = 1000;

/// Remote WebSocket target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    path: String,
}

impl Endpoint {
    pub fn new(scheme: &str, host: &str, path: &str) -> Self {
        let path = if path.starts_with('/') || path.is_empty() {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            path,
        }
    }

    /// Request path, also covered by the handshake signature
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Endpoint,

    pub credentials: Credentials,

    /// Symbols in caller format (e.g., ["USDT_BTC", "BTC_USDT"])
    pub symbols: Vec<String>,

    /// Interval between keepalive pings
    pub ping_interval: Duration,

    /// Deadline for a single ping write
    pub ping_deadline: Duration,

    /// Undelivered books buffered before the read loop waits
    pub channel_capacity: usize,
}

impl Config {
    /// Load configuration from `.env` and environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ClientError::Config(format!("{} is not set", key)))
        };

        let symbols: Vec<String> = get("SYMBOLS", DEFAULT_SYMBOLS)
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            endpoint: Endpoint::new(
                &get("ASCENDEX_SCHEME", DEFAULT_SCHEME),
                &get("ASCENDEX_HOST", DEFAULT_HOST),
                &get("ASCENDEX_PATH", DEFAULT_PATH),
            ),
            credentials: Credentials::new(
                required("ASCENDEX_APIKEY")?,
                required("ASCENDEX_APISECRET")?,
            ),
            symbols,
            ping_interval: Duration::from_secs(parse_non_zero(
                "PING_INTERVAL_SECS",
                &get("PING_INTERVAL_SECS", &DEFAULT_PING_INTERVAL_SECS.to_string()),
            )?),
            ping_deadline: Duration::from_millis(parse_non_zero(
                "PING_DEADLINE_MS",
                &get("PING_DEADLINE_MS", &DEFAULT_PING_DEADLINE_MS.to_string()),
            )?),
            channel_capacity: parse_number::<usize>(
                "CHANNEL_CAPACITY",
                &get("CHANNEL_CAPACITY", &DEFAULT_CAPACITY.to_string()),
            )?
            .max(1),
        })
    }

    /// Configuration with defaults for everything but the endpoint and credentials
    pub fn new(endpoint: Endpoint, credentials: Credentials) -> Self {
        Self {
            endpoint,
            credentials,
            symbols: DEFAULT_SYMBOLS.split(',').map(str::to_string).collect(),
            ping_interval: Duration::from_secs(DEFAULT_PING_INTERVAL_SECS),
            ping_deadline: Duration::from_millis(DEFAULT_PING_DEADLINE_MS),
            channel_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Timer periods; tokio intervals panic on a zero period
fn parse_non_zero(key: &str, value: &str) -> Result<u64> {
    match parse_number(key, value)? {
        0 => Err(ClientError::Config(format!("{} must be greater than zero", key))),
        n => Ok(n),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{} is not a valid number: {}", key, value)))
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.rescuetime.com";
pub const DATA_PATH: &str = "/anapi/data";
pub const CONNECT_TIMEOUT_SECONDS: u64 = 5;
pub const TLS_HANDSHAKE_TIMEOUT_SECONDS: u64 = 5;
pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Layout of the start column, e.g. `2023-05-01T10:00:00`.
pub const TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

pub const USER_AGENT: &str = concat!("rtexport/", env!("CARGO_PKG_VERSION"));

/// Knobs for a [`Fetcher`](crate::Fetcher).
///
/// The defaults talk to the public service with a 5s connect, 5s TLS
/// handshake and 10s overall budget. Tests point `base_url` at a local
/// listener and shrink the timeouts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub tls_handshake_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECONDS),
            tls_handshake_timeout: Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECONDS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECONDS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeouts(
        mut self,
        connect: Duration,
        tls_handshake: Duration,
        request: Duration,
    ) -> Self {
        self.connect_timeout = connect;
        self.tls_handshake_timeout = tls_handshake;
        self.request_timeout = request;
        self
    }

    /// reqwest bounds TCP connect and TLS setup with a single connector
    /// timeout. It gets the dial limit; the handshake shares that budget
    /// and `tls_handshake_timeout` is not applied separately.
    pub(crate) fn connector_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub(crate) fn data_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), DATA_PATH)
    }
}

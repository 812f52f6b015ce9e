//! Long poll configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the long poll loop.
///
/// All fields map directly onto the `a_check` query parameters except
/// `timeout_margin`, which only shapes the HTTP request timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongPollConfig {
    /// Server-side hold time in seconds. Documented maximum is 90; the
    /// upstream recommendation is 25 so intermediary proxies do not drop
    /// the connection. Not validated client-side.
    #[serde(default = "default_wait")]
    pub wait: u32,

    /// Additional response options bitmask.
    #[serde(default = "default_mode")]
    pub mode: u32,

    /// Long poll protocol version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Headroom in seconds added on top of `wait` for the per-request
    /// HTTP timeout.
    #[serde(default = "default_timeout_margin")]
    pub timeout_margin: u32,
}

fn default_wait() -> u32 {
    25
}

fn default_mode() -> u32 {
    2
}

fn default_version() -> u32 {
    2
}

fn default_timeout_margin() -> u32 {
    10
}

impl LongPollConfig {
    /// The HTTP timeout for a single poll request: the server may hold the
    /// connection for up to `wait` seconds before answering.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs((self.wait + self.timeout_margin) as u64)
    }
}

impl Default for LongPollConfig {
    fn default() -> Self {
        Self {
            wait: default_wait(),
            mode: default_mode(),
            version: default_version(),
            timeout_margin: default_timeout_margin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_serde_defaults() {
        let from_empty: LongPollConfig = serde_json::from_str("{}").unwrap();
        let default = LongPollConfig::default();
        assert_eq!(from_empty.wait, default.wait);
        assert_eq!(from_empty.mode, default.mode);
        assert_eq!(from_empty.version, default.version);
        assert_eq!(from_empty.timeout_margin, default.timeout_margin);
    }

    #[test]
    fn request_timeout_adds_margin() {
        let config = LongPollConfig {
            wait: 25,
            timeout_margin: 10,
            ..LongPollConfig::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(35));
    }
}

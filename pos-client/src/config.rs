//! Client configuration parsed from environment variables.

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without the `/api` prefix, e.g. `http://127.0.0.1:3000`.
    pub base_url: String,
    /// Sent as `x-admin-secret` on every write.
    pub admin_secret: Option<String>,
    /// Socket.IO origin when it differs from `base_url`.
    pub socket_url: Option<String>,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Config for `base_url` with default timeouts and no secret.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            admin_secret: None,
            socket_url: None,
            timeouts: Timeouts::default(),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `POS_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `POS_ADMIN_SECRET`: no header when absent
    /// - `POS_SOCKET_URL`: defaults to `POS_BASE_URL`
    /// - `POS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `POS_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] for a non-HTTP base URL and
    /// [`ClientError::ConfigParse`] for a non-numeric timeout.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let base_url = lookup("POS_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        let admin_secret = lookup("POS_ADMIN_SECRET").filter(|v| !v.is_empty());
        let socket_url = lookup("POS_SOCKET_URL")
            .map(|v| v.trim().trim_end_matches('/').to_owned())
            .filter(|v| !v.is_empty());
        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, "POS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "POS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { base_url, admin_secret, socket_url, timeouts })
    }

    /// Origin the real-time channel connects to.
    #[must_use]
    pub fn socket_origin(&self) -> &str {
        self.socket_url.as_deref().unwrap_or(&self.base_url)
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64, ClientError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ClientError::ConfigParse(format!("{key} must be a whole number of seconds, got {raw:?}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

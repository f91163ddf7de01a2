//! Endpoint and timeout settings injected into a client at construction.

use std::time::Duration;

/// Base URL of the v3 REST API.
pub const DEFAULT_API_HOST: &str = "https://getpocket.com/v3";

/// Browser-facing page where a user approves a request token.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://getpocket.com/auth/authorize";

/// Applied to every call unless the caller's token fires first.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENDPOINT_REQUEST_TOKEN: &str = "/oauth/request";
pub const ENDPOINT_AUTHORIZE: &str = "/oauth/authorize";
pub const ENDPOINT_ADD: &str = "/add";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_host: String,
    pub authorize_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Point the client at another API host, e.g. a local mock server.
    /// A trailing slash is dropped.
    pub fn with_api_host(mut self, api_host: &str) -> Self {
        self.api_host = api_host.trim_end_matches('/').to_string();
        self
    }

    pub fn with_authorize_url(mut self, authorize_url: &str) -> Self {
        self.authorize_url = authorize_url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://localhost:3443";
pub const DEFAULT_API_VERSION: &str = "v3.2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach the game service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without the `/api/<version>` suffix.
    pub api_url: String,
    pub api_version: String,
    /// Sent as a bearer token when present.
    pub token: Option<String>,
    /// Accept self-signed certificates, as development servers use them.
    pub insecure: bool,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::from(DEFAULT_API_URL),
            api_version: String::from(DEFAULT_API_VERSION),
            token: None,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// The URL of an endpoint, e.g. `games/123/roll`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.api_url.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

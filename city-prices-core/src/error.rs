use thiserror::Error;

/// Ways a price lookup can fail. Every failure maps to exactly one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection failure, timeout, or an unusable HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The provider rejected the API key.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider has no data for the requested city/country.
    #[error("no data found: {0}")]
    NotFound(String),

    /// The response body is not the JSON we expect.
    #[error("invalid response: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Auth(_) => "auth",
            FetchError::NotFound(_) => "not-found",
            FetchError::Parse(_) => "parse",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string.
        let err = err.without_url();
        if err.is_timeout() {
            FetchError::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Problems found while resolving startup settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key is required: pass --api-key, set {env}, or run `city-prices configure`")]
    MissingApiKey { env: &'static str },

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("timeout must be at least one second")]
    ZeroTimeout,
}

//! Errors surfaced by the HTTP client.
//!
//! Callers only ever distinguish two kinds: the server answered with something
//! unusable ("API error") or it could not be reached ("network error").

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is the server's `{error}` text when it sent one.
    #[error("request failed with HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Http { status: u16, message: Option<String> },

    /// Connection refused, timeout, TLS failure, ...
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// 2xx response whose body did not match the expected shape.
    #[error("decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The worker fetching this country's series panicked.
    #[error("fetch task for {0} panicked")]
    TaskPanicked(String),
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Short text suitable for a status line.
    pub fn user_message(&self) -> String {
        if self.is_network() {
            "Network error: could not reach the data service.".to_string()
        } else {
            "API error: the data service returned an unusable response.".to_string()
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e)
    }
}

use thiserror::Error;

use crate::domain::DomainError;

/// Network and decode sources are stored without their URL, which carries the API key.
#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("invalid domain rejected for API check: {domain} ({source})")]
    InvalidDomain {
        domain: String,
        #[source]
        source: DomainError,
    },
    #[error("no VerifyMail API keys available")]
    NoKeys,
    #[error("API rate limit exceeded (429)")]
    RateLimited,
    #[error("API response error: {status}")]
    Status { status: u16 },
    #[error("API request timeout or no response: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },
    #[error("API response body could not be decoded: {source}")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid API base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("HTTP client initialization failed: {source}")]
    ClientInit {
        #[source]
        source: reqwest::Error,
    },
}

impl ReputationError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    pub(crate) fn base_url(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::BaseUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

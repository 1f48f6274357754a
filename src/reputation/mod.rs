//! Third-party disposable-domain reputation (VerifyMail).
//!
//! The pipeline only sees `Option<ReputationReport>`: every failure (rate limit, HTTP
//! status, timeout, undecodable body) is logged and collapses to `None`, which means
//! "inconclusive".

mod client;
mod error;
mod keys;
mod types;

pub use client::ReputationClient;
pub use error::ReputationError;
pub use keys::ApiKeyPool;
pub use types::{DEFAULT_API_SOURCE, ReputationReport};

use async_trait::async_trait;

#[async_trait]
pub trait ReputationSource: Send + Sync {
    /// False when no API key is configured; the pipeline then skips the check.
    fn is_available(&self) -> bool;
    async fn check_domain(&self, domain: &str) -> Option<ReputationReport>;
}

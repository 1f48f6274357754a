//! DNS evidence: MX hosts (sorted, truncated, IP-enriched) and the DMARC record.
//!
//! Queries go to a fixed set of public resolvers through [`crate::retry`]. Lookup
//! failures never escape: they are logged and surface as an `error` field on the
//! evidence, which callers must read as "unknown".

mod dmarc;
mod error;
mod mx;
mod resolver;
mod types;

pub use dmarc::KNOWN_DISPOSABLE_DMARC;
pub use error::DnsError;
pub use mx::MAX_MX_HOSTS;
pub use resolver::{DnsLookup, build_resolver};
pub use types::{DmarcEvidence, MxAddress, MxEvidence, MxHost, MxRecord};

use async_trait::async_trait;
use trust_dns_resolver::TokioAsyncResolver;

use crate::config::DnsSettings;
use crate::errlog::ErrorLog;
use crate::retry::RetryPolicy;

/// Evidence the classification pipeline consumes.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    async fn mx_evidence(&self, domain: &str) -> MxEvidence;
    async fn dmarc_evidence(&self, domain: &str) -> DmarcEvidence;
}

pub struct DnsEvidenceResolver<R = TokioAsyncResolver> {
    lookup: R,
    policy: RetryPolicy,
    log: ErrorLog,
}

impl DnsEvidenceResolver<TokioAsyncResolver> {
    pub fn from_settings(settings: &DnsSettings, log: ErrorLog) -> Self {
        let policy = settings.retry_policy();
        let resolver = build_resolver(&settings.servers, policy.timeout);
        Self::with_lookup(resolver, policy, log)
    }
}

impl<R: DnsLookup> DnsEvidenceResolver<R> {
    pub fn with_lookup(lookup: R, policy: RetryPolicy, log: ErrorLog) -> Self {
        Self {
            lookup,
            policy,
            log,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<R: DnsLookup> EvidenceSource for DnsEvidenceResolver<R> {
    async fn mx_evidence(&self, domain: &str) -> MxEvidence {
        self.resolve_mx(domain).await
    }

    async fn dmarc_evidence(&self, domain: &str) -> DmarcEvidence {
        self.resolve_dmarc(domain).await
    }
}

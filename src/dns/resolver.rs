use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    lookup::TxtLookup,
};

use super::{DnsError, MxRecord};

const DNS_PORT: u16 = 53;

/// Record lookups the evidence resolver depends on.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
    /// One entry per TXT record, character-strings concatenated.
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError>;
    async fn resolve_ip(&self, host: &str) -> Result<Option<IpAddr>, DnsError>;
}

/// Async resolver bound to `servers` instead of the host configuration.
///
/// The resolver makes a single attempt per query: retries and the overall deadline are
/// owned by [`crate::retry`].
pub fn build_resolver(servers: &[IpAddr], timeout: Duration) -> TokioAsyncResolver {
    let group = NameServerConfigGroup::from_ips_clear(servers, DNS_PORT, true);
    let config = ResolverConfig::from_parts(None, Vec::new(), group);
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    TokioAsyncResolver::tokio(config, opts)
}

pub(crate) fn fqdn(label: &str, domain: &str) -> String {
    let trimmed = label.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", trimmed.to_ascii_lowercase(), domain)
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

#[async_trait]
impl DnsLookup for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = match TokioAsyncResolver::mx_lookup(self, domain).await {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("MX", domain, err)),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            // null MX (RFC 7505) advertises "no mail"
            if exchange.is_empty() {
                continue;
            }
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        let lookup = match TokioAsyncResolver::txt_lookup(self, name).await {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("TXT", name, err)),
        };
        collect_txt_records(name, &lookup)
    }

    async fn resolve_ip(&self, host: &str) -> Result<Option<IpAddr>, DnsError> {
        match TokioAsyncResolver::lookup_ip(self, host).await {
            Ok(lookup) => Ok(lookup.iter().next()),
            Err(err) if is_no_records(&err) => Ok(None),
            Err(err) => Err(DnsError::lookup("A/AAAA", host, err)),
        }
    }
}

fn collect_txt_records(name: &str, lookup: &TxtLookup) -> Result<Vec<String>, DnsError> {
    let mut records = Vec::new();
    for txt in lookup.iter() {
        let mut record = String::new();
        for piece in txt.txt_data().iter() {
            let segment = std::str::from_utf8(piece.as_ref())
                .map_err(|err| DnsError::txt_data_utf8(name, err))?;
            record.push_str(segment);
        }
        records.push(record);
    }
    Ok(records)
}

fn is_no_records(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

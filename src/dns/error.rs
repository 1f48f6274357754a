use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Failures raised by a [`DnsLookup`](super::DnsLookup) implementation.
///
/// "No records" answers are not errors: lookups report them as empty results.
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("{kind} lookup failed for {name}: {source}")]
    Lookup {
        kind: &'static str,
        name: String,
        #[source]
        source: ResolveError,
    },
    #[error("TXT record {name} contains invalid UTF-8 data: {source}")]
    TxtDataUtf8 {
        name: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl DnsError {
    pub(crate) fn lookup(kind: &'static str, name: impl Into<String>, source: ResolveError) -> Self {
        Self::Lookup {
            kind,
            name: name.into(),
            source,
        }
    }

    pub(crate) fn txt_data_utf8(name: impl Into<String>, source: std::str::Utf8Error) -> Self {
        Self::TxtDataUtf8 {
            name: name.into(),
            source,
        }
    }
}

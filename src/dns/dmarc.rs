use tracing::debug;

use super::{DmarcEvidence, DnsEvidenceResolver, DnsLookup, mx::INVALID_FORMAT, resolver::fqdn};
use crate::domain::normalize_fqdn;
use crate::retry::retry_with_timeout;

/// DMARC record published by the temp-mail.org operator on its rotating domains.
pub const KNOWN_DISPOSABLE_DMARC: &str = "v=DMARC1; p=reject; rua=mailto:reporterdmarc@yandex.ru; ruf=mailto:reporterdmarc@yandex.ru; rf=afrf; sp=reject; fo=1; pct=100; ri=604800; adkim=s; aspf=s";

impl<R: DnsLookup> DnsEvidenceResolver<R> {
    /// DMARC evidence read from `_dmarc.<domain>`.
    pub async fn resolve_dmarc(&self, domain: &str) -> DmarcEvidence {
        let ascii = match normalize_fqdn(domain) {
            Ok(ascii) => ascii,
            Err(err) => {
                self.log
                    .record(format!(
                        "Invalid domain format rejected for DMARC check: {domain} ({err})"
                    ))
                    .await;
                return DmarcEvidence::failed(INVALID_FORMAT);
            }
        };

        let name = fqdn("_dmarc", &ascii);
        match retry_with_timeout(&self.policy, || self.lookup.lookup_txt(&name)).await {
            Ok(records) => {
                let evidence = evaluate(records);
                debug!(
                    domain = %ascii,
                    has_dmarc = evidence.has_dmarc,
                    signature = evidence.is_known_disposable_signature,
                    "DMARC lookup done"
                );
                evidence
            }
            Err(err) => {
                self.log
                    .record(format!("Error checking DMARC for {ascii}: {err}"))
                    .await;
                DmarcEvidence::failed(err.to_string())
            }
        }
    }
}

/// Only the first TXT record is kept; the signature comparison is exact and
/// case-sensitive.
pub(crate) fn evaluate(records: Vec<String>) -> DmarcEvidence {
    let Some(record) = records.into_iter().next() else {
        return DmarcEvidence::absent();
    };
    let is_known_disposable_signature = record == KNOWN_DISPOSABLE_DMARC;
    DmarcEvidence {
        has_dmarc: true,
        record,
        is_known_disposable_signature,
        error: None,
    }
}

use futures::future::join_all;
use tracing::debug;

use super::{DnsEvidenceResolver, DnsLookup, MxAddress, MxEvidence, MxHost, MxRecord};
use crate::domain::normalize_fqdn;
use crate::retry::retry_with_timeout;

pub const MAX_MX_HOSTS: usize = 3;

pub(crate) const INVALID_FORMAT: &str = "invalid format";

impl<R: DnsLookup> DnsEvidenceResolver<R> {
    /// MX evidence for `domain`: at most [`MAX_MX_HOSTS`] hosts by ascending priority,
    /// each resolved to an address independently.
    pub async fn resolve_mx(&self, domain: &str) -> MxEvidence {
        let ascii = match normalize_fqdn(domain) {
            Ok(ascii) => ascii,
            Err(err) => {
                self.log
                    .record(format!(
                        "Invalid domain format rejected for MX check: {domain} ({err})"
                    ))
                    .await;
                return MxEvidence::failed(INVALID_FORMAT);
            }
        };

        let records =
            match retry_with_timeout(&self.policy, || self.lookup.lookup_mx(&ascii)).await {
                Ok(records) => records,
                Err(err) => {
                    let message =
                        format!("Unable to verify mail server configuration for {ascii}. {err}");
                    self.log.record(&message).await;
                    return MxEvidence::failed(message);
                }
            };

        let records = select_preferred(records);
        if records.is_empty() {
            debug!(domain = %ascii, "no MX records");
            return MxEvidence::absent();
        }

        let hosts = join_all(records.into_iter().map(|record| self.enrich(record))).await;
        debug!(domain = %ascii, hosts = hosts.len(), "MX records resolved");
        MxEvidence::found(hosts)
    }

    async fn enrich(&self, record: MxRecord) -> MxHost {
        let address =
            match retry_with_timeout(&self.policy, || self.lookup.resolve_ip(&record.exchange))
                .await
            {
                Ok(Some(ip)) => MxAddress::Resolved(ip),
                Ok(None) => MxAddress::Unresolved,
                Err(err) => {
                    debug!(host = %record.exchange, error = %err, "MX host address lookup failed");
                    MxAddress::Unresolved
                }
            };
        MxHost {
            hostname: record.exchange,
            priority: record.preference,
            address,
        }
    }
}

pub(crate) fn select_preferred(mut records: Vec<MxRecord>) -> Vec<MxRecord> {
    records.sort();
    records.dedup();
    records.truncate(MAX_MX_HOSTS);
    records
}

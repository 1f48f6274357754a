//! Classification pipeline: list match, DNS evidence, DMARC signature override and the
//! reputation fallback, evaluated in a fixed order to a single [`Category`].

mod types;

pub use types::{Category, ClassificationVerdict};

use std::sync::Arc;

use tracing::{debug, info};

use crate::dns::{DmarcEvidence, EvidenceSource};
use crate::domain::{normalize_fqdn, split_email};
use crate::errlog::ErrorLog;
use crate::lists::{DomainListStore, ListMatch};
use crate::reputation::{ReputationReport, ReputationSource};

pub const MAILBOX_ORG: &str = "mailbox.org";
pub const DMARC_SIGNATURE_SOURCE: &str = "temp-mail.org (detected by DMARC signature)";

pub struct Classifier<E, P> {
    store: Arc<DomainListStore>,
    evidence: E,
    reputation: P,
    log: ErrorLog,
}

/// Category decided so far, with the fields that travel with it.
#[derive(Debug, Default)]
struct Decision {
    category: Option<Category>,
    source: Option<String>,
    university_name: Option<String>,
    email_provider: Option<String>,
}

impl Decision {
    fn from_list(found: &ListMatch) -> Self {
        let category = match found {
            ListMatch::Disposable { .. } | ListMatch::NewlyAdded => Some(Category::Disposable),
            ListMatch::Privacy { .. } => Some(Category::Privacy),
            ListMatch::University { .. } => Some(Category::University),
            ListMatch::Free => Some(Category::FreeProvider),
            ListMatch::None => None,
        };
        let university_name = match found {
            ListMatch::University { name } => Some(name.clone()),
            _ => None,
        };
        Self {
            category,
            source: found.source(),
            university_name,
            email_provider: None,
        }
    }

    fn set(&mut self, category: Category, source: impl Into<String>) {
        self.category = Some(category);
        self.source = Some(source.into());
    }

    fn is(&self, category: Category) -> bool {
        self.category == Some(category)
    }
}

impl<E: EvidenceSource, P: ReputationSource> Classifier<E, P> {
    pub fn new(store: Arc<DomainListStore>, evidence: E, reputation: P, log: ErrorLog) -> Self {
        Self {
            store,
            evidence,
            reputation,
            log,
        }
    }

    pub fn store(&self) -> &Arc<DomainListStore> {
        &self.store
    }

    /// Classifies one e-mail address. Always returns a complete verdict: evidence
    /// failures degrade to "unknown" and persistence failures are only logged.
    pub async fn classify(&self, email: &str) -> ClassificationVerdict {
        let email = email.trim();
        let parts = split_email(email).unwrap_or_default();
        let full = parts.full;
        // List keys are normalised FQDNs; fall back to the raw text for lookups.
        let key = normalize_fqdn(&full).unwrap_or_else(|_| full.clone());
        let is_mailbox_org = full == MAILBOX_ORG;

        let found = self.store.classify_against_lists(&key, &parts.bare);
        debug!(domain = %full, list_match = ?found, "list lookup done");
        let mut decision = Decision::from_list(&found);

        let mx = self.evidence.mx_evidence(&full).await;
        let dmarc = if mx.has_mx {
            self.evidence.dmarc_evidence(&full).await
        } else {
            DmarcEvidence::absent()
        };

        if mx.has_mx
            && dmarc.is_known_disposable_signature
            && !decision.is(Category::Disposable)
            // mailbox.org keeps its pinned category and is never written to the
            // newly added list, even when it carries the signature.
            && !is_mailbox_org
        {
            decision.set(Category::Disposable, DMARC_SIGNATURE_SOURCE);
            self.remember(&key, DMARC_SIGNATURE_SOURCE).await;
        }

        let mut api_checked = false;
        if mx.has_mx
            && decision.category.is_none()
            && dmarc.is_known_absent()
            && !is_mailbox_org
            && self.reputation.is_available()
        {
            api_checked = true;
            match self.reputation.check_domain(&key).await {
                Some(report) => self.apply_report(&key, report, &mut decision).await,
                None => decision.category = Some(Category::WeakSecurity),
            }
        }

        if mx.has_mx && dmarc.is_known_absent() && decision.category.is_none() && !api_checked {
            decision.category = Some(Category::WeakSecurity);
        }

        let category = if is_mailbox_org {
            Category::MailboxOrgSpecialCase
        } else {
            decision.category.unwrap_or(Category::Unknown)
        };
        debug!(domain = %full, %category, api_checked, "classification done");

        ClassificationVerdict {
            email: email.to_string(),
            domain: full,
            category,
            source: decision.source,
            university_name: decision.university_name,
            email_provider: decision.email_provider,
            mx,
            dmarc,
            api_checked,
        }
    }

    async fn apply_report(&self, domain: &str, report: ReputationReport, decision: &mut Decision) {
        if report.is_disposable {
            decision.set(Category::Disposable, report.source.clone());
            decision.email_provider = report.email_provider.clone();
            self.remember(domain, &report.source).await;
            if !report.related_domains.is_empty() {
                match self
                    .store
                    .ingest_related(&report.related_domains, report.email_provider.as_deref())
                    .await
                {
                    Ok(outcome) => debug!(?outcome, "related domains ingested"),
                    Err(err) => {
                        self.log
                            .record(format!("Error adding related domains for {domain}: {err}"))
                            .await
                    }
                }
            }
        } else if report.is_privacy {
            decision.set(Category::Privacy, report.source);
        }
    }

    async fn remember(&self, domain: &str, source: &str) {
        match self.store.record_new_disposable(domain, source).await {
            Ok(outcome) => info!(%domain, source, ?outcome, "disposable domain confirmed"),
            Err(err) => {
                self.log
                    .record(format!("Error adding new disposable domain {domain}: {err}"))
                    .await
            }
        }
    }
}

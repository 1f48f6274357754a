#![forbid(unsafe_code)]
//! mailrisk_lib: domain risk classification for e-mail addresses.
//!
//! An address goes through static lists, live DNS evidence (MX, DMARC) and, as a last
//! resort, the VerifyMail reputation API. Confirmed disposable domains are fed back into
//! the lists and persisted.

pub mod classify;
pub mod config;
pub mod dns;
pub mod domain;
pub mod errlog;
pub mod lists;
pub mod reputation;
pub mod retry;

pub use classify::{Category, ClassificationVerdict, Classifier};
pub use config::{ConfigError, Settings};
pub use dns::{DmarcEvidence, DnsEvidenceResolver, EvidenceSource, MxEvidence};
pub use domain::{DomainError, normalize_fqdn, split_email};
pub use errlog::ErrorLog;
pub use lists::{DomainListStore, FileStatus, ListMatch, StoreError};
pub use reputation::{ApiKeyPool, ReputationClient, ReputationReport, ReputationSource};
pub use retry::{RetryError, RetryPolicy, retry_with_timeout};

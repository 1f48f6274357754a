//! Static domain lists: loading, precedence-ordered lookup and append-only growth.
//!
//! Reads take a short lock on the in-memory tables. Mutations are serialised by one
//! async writer lock so the insert and the matching file append happen as a pair.

mod error;
mod files;
mod parse;
mod types;

pub use error::StoreError;
pub use files::{DataFile, DataFiles, ERROR_LOG_FILE};
pub use types::{
    FileStatus, ListCounts, ListMatch, ListTables, NEWLY_ADDED_SOURCE, RecordOutcome,
    RelatedOutcome,
};

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::domain::normalize_fqdn;
use files::{API_KEY_PLACEHOLDER, append_durably};
use parse::{SectionMarker, has_section_header, parse_plain, parse_sections};

pub const RELATED_DOMAIN_SOURCE: &str = "VerifyMail API - Related Domain";

pub struct DomainListStore {
    tables: RwLock<ListTables>,
    files: DataFiles,
    status: FileStatus,
    writer: tokio::sync::Mutex<()>,
}

/// Everything read from the data directory at startup.
pub struct LoadedData {
    pub store: DomainListStore,
    pub api_keys: Vec<String>,
}

/// Loads every list from `dir`, creating the directory, the error log and placeholder
/// files where missing.
pub async fn load(dir: impl Into<PathBuf>) -> Result<LoadedData, StoreError> {
    let files = DataFiles::new(dir);
    files.ensure_dir().await?;
    files.ensure_error_log().await?;

    let mut tables = ListTables::default();
    let mut status = FileStatus::default();

    if let Some(content) = files.read_or_create(DataFile::University).await? {
        status.university = true;
        let parsed = parse_sections(&content, SectionMarker::SingleHash);
        tables.university.extend(parsed.entries);
    }
    if let Some(content) = files.read_or_create(DataFile::Disposable).await? {
        status.disposable = true;
        let parsed = parse_sections(&content, SectionMarker::DoubleHash);
        if parsed.skipped > 0 {
            warn!(skipped = parsed.skipped, "invalid entries in disposable list");
        }
        tables.disposable.extend(parsed.entries);
    }
    if let Some(content) = files.read_or_create(DataFile::Privacy).await? {
        status.privacy = true;
        let parsed = parse_sections(&content, SectionMarker::DoubleHash);
        tables.privacy.extend(parsed.entries);
    }
    if let Some(content) = files.read_or_create(DataFile::Free).await? {
        status.free = true;
        tables
            .free
            .extend(parse_plain(&content).map(str::to_lowercase));
    }
    if let Some(content) = files.read_or_create(DataFile::NewlyAdded).await? {
        status.newly_added = true;
        tables
            .newly_added
            .extend(parse_plain(&content).filter_map(|line| normalize_fqdn(line).ok()));
    }

    let mut api_keys = Vec::new();
    if let Some(content) = files.read_or_create(DataFile::ApiKeys).await? {
        api_keys.extend(
            parse_plain(&content)
                .filter(|key| *key != API_KEY_PLACEHOLDER)
                .map(str::to_string),
        );
    }
    status.api_keys = !api_keys.is_empty();

    let store = DomainListStore::with_status(tables, files, status);
    let counts = store.counts();
    info!(
        disposable = counts.disposable,
        privacy = counts.privacy,
        free = counts.free,
        university = counts.university,
        newly_added = counts.newly_added,
        api_keys = api_keys.len(),
        "domain lists loaded"
    );
    Ok(LoadedData { store, api_keys })
}

impl DomainListStore {
    /// Store over pre-built tables; mutations append under `dir`.
    pub fn new(tables: ListTables, dir: impl Into<PathBuf>) -> Self {
        let status = FileStatus {
            disposable: true,
            privacy: true,
            free: true,
            newly_added: true,
            university: true,
            api_keys: false,
        };
        Self::with_status(tables, DataFiles::new(dir), status)
    }

    fn with_status(tables: ListTables, files: DataFiles, status: FileStatus) -> Self {
        Self {
            tables: RwLock::new(tables),
            files,
            status,
            writer: tokio::sync::Mutex::new(()),
        }
    }

    pub fn files(&self) -> &DataFiles {
        &self.files
    }

    pub fn file_status(&self) -> FileStatus {
        self.status
    }

    pub fn counts(&self) -> ListCounts {
        let tables = self.read_tables();
        ListCounts {
            disposable: tables.disposable.len(),
            privacy: tables.privacy.len(),
            free: tables.free.len(),
            newly_added: tables.newly_added.len(),
            university: tables.university.len(),
        }
    }

    /// Copy of the current tables.
    pub fn snapshot(&self) -> ListTables {
        self.read_tables().clone()
    }

    pub fn is_known_disposable(&self, domain: &str) -> bool {
        let tables = self.read_tables();
        tables.disposable.contains_key(domain) || tables.newly_added.contains(domain)
    }

    /// Looks `full` up in precedence order: disposable, newly added, privacy,
    /// university, then free (where `bare` is checked too).
    pub fn classify_against_lists(&self, full: &str, bare: &str) -> ListMatch {
        let tables = self.read_tables();
        if let Some(source) = tables.disposable.get(full) {
            return ListMatch::Disposable {
                source: source.clone(),
            };
        }
        if tables.newly_added.contains(full) {
            return ListMatch::NewlyAdded;
        }
        if let Some(source) = tables.privacy.get(full) {
            return ListMatch::Privacy {
                source: source.clone(),
            };
        }
        if let Some(name) = tables.university.get(full) {
            return ListMatch::University { name: name.clone() };
        }
        if (!bare.is_empty() && tables.free.contains(bare)) || tables.free.contains(full) {
            return ListMatch::Free;
        }
        ListMatch::None
    }

    /// Adds `domain` to the newly added list and appends it to `newlyadded.txt`.
    ///
    /// Known domains are a no-op. If the append fails the in-memory entry is kept and
    /// [`StoreError::Persist`] is returned.
    pub async fn record_new_disposable(
        &self,
        domain: &str,
        source: &str,
    ) -> Result<RecordOutcome, StoreError> {
        let domain = normalize_fqdn(domain).map_err(|err| StoreError::invalid(domain, err))?;
        let _guard = self.writer.lock().await;

        {
            let mut tables = self.write_tables();
            if tables.disposable.contains_key(&domain) || tables.newly_added.contains(&domain) {
                return Ok(RecordOutcome::AlreadyKnown);
            }
            tables.newly_added.insert(domain.clone());
        }

        let path = self.files.path(DataFile::NewlyAdded);
        append_durably(&path, format!("{domain}\n").as_bytes())
            .await
            .map_err(|err| StoreError::persist(&path, err))?;

        info!(%domain, source, "added newly discovered disposable domain");
        Ok(RecordOutcome::Recorded)
    }

    /// Ingests domains the reputation API reported alongside a disposable hit.
    ///
    /// A provider name containing control characters is treated as absent.
    /// With a provider that has no `## provider` section yet, a new section is appended
    /// to `disposable.txt`. When the section already exists, or without a provider, each
    /// domain goes through [`record_new_disposable`](Self::record_new_disposable)
    /// instead of being merged into the existing section.
    pub async fn ingest_related(
        &self,
        domains: &[String],
        provider: Option<&str>,
    ) -> Result<RelatedOutcome, StoreError> {
        let mut outcome = RelatedOutcome::default();
        let mut valid = Vec::with_capacity(domains.len());
        for domain in domains {
            match normalize_fqdn(domain) {
                Ok(ascii) if !valid.contains(&ascii) => valid.push(ascii),
                Ok(_) => {}
                Err(_) => outcome.skipped_invalid += 1,
            }
        }
        if valid.is_empty() {
            return Ok(outcome);
        }

        // The provider name becomes a header line of disposable.txt.
        let provider = match provider.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) if p.chars().any(char::is_control) => {
                warn!(provider = ?p, "provider name with control characters ignored");
                None
            }
            other => other,
        };
        if let Some(provider) = provider {
            let guard = self.writer.lock().await;
            let path = self.files.path(DataFile::Disposable);
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
                Err(err) => return Err(StoreError::io(&path, err)),
            };

            if !has_section_header(&content, provider) {
                {
                    let mut tables = self.write_tables();
                    for domain in &valid {
                        tables
                            .disposable
                            .entry(domain.clone())
                            .or_insert_with(|| provider.to_string());
                    }
                }
                let section = format!("\n## {provider}\n{}\n", valid.join("\n"));
                append_durably(&path, section.as_bytes())
                    .await
                    .map_err(|err| StoreError::persist(&path, err))?;
                info!(provider, domains = valid.len(), "added new disposable section");
                outcome.section_created = true;
                outcome.recorded = valid.len();
                return Ok(outcome);
            }
            drop(guard);
        }

        let source = provider.unwrap_or(RELATED_DOMAIN_SOURCE);
        let mut first_error = None;
        for domain in &valid {
            match self.record_new_disposable(domain, source).await {
                Ok(RecordOutcome::Recorded) => outcome.recorded += 1,
                Ok(RecordOutcome::AlreadyKnown) => {}
                Err(err) => {
                    warn!(%domain, error = %err, "related domain not persisted");
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(outcome),
        }
    }

    fn read_tables(&self) -> RwLockReadGuard<'_, ListTables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, ListTables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests;

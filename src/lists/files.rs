use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use phf::phf_map;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::StoreError;
use crate::errlog::ERROR_LOG_HEADER;

pub const ERROR_LOG_FILE: &str = "error.log";

/// Content written when a data file is missing at startup. It is not loaded in that
/// run, it only shows the expected format.
const PLACEHOLDERS: phf::Map<&'static str, &'static str> = phf_map! {
    "disposable.txt" => "# Disposable email domains\n## example.com\nexample.disposable.com\n",
    "privacy.txt" => "# Privacy-focused email domains\n## example.com\nexample.privacy.com\n",
    "universities.txt" => "# University email domains\n# Universidad de Mendoza\num.edu.ar\n",
    "free_provider.txt" => "# Common free email providers\ngmail\nhotmail\noutlook\nyahoo\nprotonmail\naol\nicloud\nmail\ngmx\nyandex\nzoho\ntutanota\ninbox\nfastmail\nhushmail\nrackspace\nlycos\naim\ntuta\ncock\nmailbox\nshortmail\npm\nmail.com\n",
    "newlyadded.txt" => "# Newly discovered disposable email domains\n",
    "verifymail_api.txt" => "# VerifyMail.io API keys (one per line)\n# Add your API keys below\nYOUR_API_KEY_HERE\n",
};

pub(crate) const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Disposable,
    Privacy,
    Free,
    University,
    NewlyAdded,
    ApiKeys,
}

impl DataFile {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Disposable => "disposable.txt",
            Self::Privacy => "privacy.txt",
            Self::Free => "free_provider.txt",
            Self::University => "universities.txt",
            Self::NewlyAdded => "newlyadded.txt",
            Self::ApiKeys => "verifymail_api.txt",
        }
    }

    pub fn placeholder(self) -> &'static str {
        PLACEHOLDERS
            .get(self.file_name())
            .copied()
            .unwrap_or_default()
    }
}

/// Locations of the data files under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    dir: PathBuf,
}

impl DataFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: DataFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    pub fn error_log(&self) -> PathBuf {
        self.dir.join(ERROR_LOG_FILE)
    }

    pub(crate) async fn ensure_dir(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.dir)
            .await
            .map_err(|err| StoreError::io(&self.dir, err))?
        {
            return Ok(());
        }
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o750);
        builder
            .create(&self.dir)
            .await
            .map_err(|err| StoreError::io(&self.dir, err))?;
        info!(dir = %self.dir.display(), "created data directory");
        Ok(())
    }

    pub(crate) async fn ensure_error_log(&self) -> Result<(), StoreError> {
        let path = self.error_log();
        match create_new(&path, ERROR_LOG_HEADER).await {
            Ok(()) => {
                info!(path = %path.display(), "created error log");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    /// Returns the file content, or `None` after writing the placeholder when the file
    /// does not exist.
    pub(crate) async fn read_or_create(&self, file: DataFile) -> Result<Option<String>, StoreError> {
        let path = self.path(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(decode_lossy(&path, bytes))),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "'{}' not found, writing placeholder", file.file_name());
                match create_new(&path, file.placeholder()).await {
                    Ok(()) => Ok(None),
                    Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(None),
                    Err(err) => Err(StoreError::io(path, err)),
                }
            }
            Err(err) => Err(StoreError::io(path, err)),
        }
    }
}

/// Invalid UTF-8 sequences become U+FFFD; the affected entries then fail FQDN checks.
fn decode_lossy(path: &Path, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), "invalid UTF-8 in data file, decoding leniently");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

async fn create_new(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o640);
    let mut file = options.open(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.sync_data().await
}

/// Appends `bytes` and waits for the data to reach the disk.
pub(crate) async fn append_durably(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_data().await
}

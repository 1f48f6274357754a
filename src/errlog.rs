//! Append-only error log (`error.log` in the data directory).
//!
//! Recording never fails from the caller's point of view: a write error is reported
//! through `tracing` and swallowed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

pub const ERROR_LOG_HEADER: &str = "# Error log for mailrisk\n";

#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    path: Option<Arc<PathBuf>>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(Arc::new(path.into())),
        }
    }

    /// Log sink that only emits `tracing` events.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    pub async fn record(&self, message: impl AsRef<str>) {
        let message = single_line(message.as_ref());
        error!("{message}");

        let Some(path) = self.path.as_deref() else {
            return;
        };
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let entry = format!("[{timestamp}] {message}\n");
        if let Err(err) = append(path, entry.as_bytes()).await {
            warn!(path = %path.display(), error = %err, "failed to write error log");
        }
    }
}

async fn append(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await
}

// keeps one entry per line
fn single_line(message: &str) -> String {
    message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

use std::collections::{HashMap, HashSet};

use serde::Serialize;

pub const NEWLY_ADDED_SOURCE: &str = "Newly discovered disposable domain";

/// In-memory partitions of the domain lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTables {
    pub disposable: HashMap<String, String>,
    pub privacy: HashMap<String, String>,
    pub university: HashMap<String, String>,
    pub free: HashSet<String>,
    pub newly_added: HashSet<String>,
}

/// Outcome of a static list lookup, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMatch {
    Disposable { source: String },
    NewlyAdded,
    Privacy { source: String },
    University { name: String },
    Free,
    None,
}

impl ListMatch {
    pub fn is_disposable(&self) -> bool {
        matches!(self, Self::Disposable { .. } | Self::NewlyAdded)
    }

    pub fn source(&self) -> Option<String> {
        match self {
            Self::Disposable { source } | Self::Privacy { source } => Some(source.clone()),
            Self::NewlyAdded => Some(NEWLY_ADDED_SOURCE.to_string()),
            Self::University { name } => Some(format!("University: {name}")),
            Self::Free | Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    AlreadyKnown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelatedOutcome {
    /// A new `## provider` section was appended to the disposable file.
    pub section_created: bool,
    pub recorded: usize,
    pub skipped_invalid: usize,
}

/// Which data files existed when the lists were loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub disposable: bool,
    pub privacy: bool,
    pub free: bool,
    pub newly_added: bool,
    pub university: bool,
    pub api_keys: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListCounts {
    pub disposable: usize,
    pub privacy: usize,
    pub free: usize,
    pub newly_added: usize,
    pub university: usize,
}

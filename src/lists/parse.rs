//! Line-oriented list formats.
//!
//! `disposable.txt` and `privacy.txt` open a source section with `##` and treat other
//! `#` lines as comments. `universities.txt` opens an institution section with a single
//! `#`, so every `#` line there is a header. Entries seen before the first header are
//! dropped.

use tracing::debug;

use crate::domain::normalize_fqdn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionMarker {
    DoubleHash,
    SingleHash,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Sections {
    pub entries: Vec<(String, String)>,
    pub skipped: usize,
}

pub(crate) fn parse_sections(content: &str, marker: SectionMarker) -> Sections {
    let mut out = Sections::default();
    let mut label = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match marker {
            SectionMarker::DoubleHash => {
                if let Some(rest) = line.strip_prefix("##") {
                    label = rest.trim().to_string();
                    continue;
                }
                if line.starts_with('#') {
                    continue;
                }
            }
            SectionMarker::SingleHash => {
                if let Some(rest) = line.strip_prefix('#') {
                    label = rest.trim().to_string();
                    continue;
                }
            }
        }
        if label.is_empty() {
            continue;
        }
        match normalize_fqdn(line) {
            Ok(domain) => out.entries.push((domain, label.clone())),
            Err(err) => {
                debug!(entry = line, error = %err, "skipping invalid list entry");
                out.skipped += 1;
            }
        }
    }
    out
}

/// Non-empty, non-comment lines, trimmed.
pub(crate) fn parse_plain(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

pub(crate) fn has_section_header(content: &str, label: &str) -> bool {
    content.lines().any(|line| {
        line.trim()
            .strip_prefix("##")
            .is_some_and(|rest| rest.trim() == label)
    })
}

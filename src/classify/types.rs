use serde::Serialize;

use crate::dns::{DmarcEvidence, MxEvidence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Disposable,
    Privacy,
    University,
    FreeProvider,
    MailboxOrgSpecialCase,
    WeakSecurity,
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disposable => "disposable",
            Self::Privacy => "privacy",
            Self::University => "university",
            Self::FreeProvider => "free_provider",
            Self::MailboxOrgSpecialCase => "mailbox_org_special_case",
            Self::WeakSecurity => "weak_security",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one classification. Built once per request and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationVerdict {
    pub email: String,
    pub domain: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_provider: Option<String>,
    pub mx: MxEvidence,
    pub dmarc: DmarcEvidence,
    pub api_checked: bool,
}

impl ClassificationVerdict {
    pub fn is_disposable(&self) -> bool {
        self.category == Category::Disposable
    }
}

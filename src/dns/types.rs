use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Raw MX answer, before address enrichment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MxAddress {
    Resolved(IpAddr),
    Unresolved,
}

impl std::fmt::Display for MxAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(ip) => write!(f, "{ip}"),
            Self::Unresolved => f.write_str("could not resolve IP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxHost {
    pub hostname: String,
    pub priority: u16,
    pub address: MxAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MxEvidence {
    pub has_mx: bool,
    pub records: Vec<MxHost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MxEvidence {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn found(records: Vec<MxHost>) -> Self {
        Self {
            has_mx: true,
            records,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// True only for a clean negative answer; a failed lookup is "unknown".
    pub fn is_known_absent(&self) -> bool {
        !self.has_mx && self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DmarcEvidence {
    pub has_dmarc: bool,
    pub record: String,
    pub is_known_disposable_signature: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DmarcEvidence {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// True only for a clean negative answer; a failed lookup is "unknown".
    pub fn is_known_absent(&self) -> bool {
        !self.has_dmarc && self.error.is_none()
    }
}

use thiserror::Error;

/// Rejections produced before any I/O touches a domain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain is empty")]
    Empty,
    #[error("domain IDNA conversion failed")]
    IdnaConversion,
    #[error("invalid format: {}", reasons.join("; "))]
    Invalid { reasons: Vec<String> },
}

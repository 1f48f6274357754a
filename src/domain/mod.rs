//! Domain syntax: FQDN validation/normalisation and e-mail domain extraction.

mod email;
mod error;

pub use email::{EmailDomain, split_email};
pub use error::DomainError;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Trims, lowercases and IDNA-encodes `domain`, then checks it is a fully qualified
/// domain name: at least two labels, LDH labels of 1..=63 chars, no trailing dot and an
/// alphabetic (or punycode) TLD of two chars or more.
pub fn normalize_fqdn(domain: &str) -> Result<String, DomainError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Empty);
    }
    let ascii = idna::domain_to_ascii(trimmed).map_err(|_| DomainError::IdnaConversion)?;
    let ascii = ascii.to_ascii_lowercase();

    let reasons = fqdn_violations(&ascii);
    if reasons.is_empty() {
        Ok(ascii)
    } else {
        Err(DomainError::Invalid { reasons })
    }
}

pub fn is_fqdn(domain: &str) -> bool {
    normalize_fqdn(domain).is_ok()
}

/// Collects every rule `ascii` breaks; empty means valid.
fn fqdn_violations(ascii: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    if ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return reasons;
    }
    if ascii.len() > MAX_DOMAIN_LEN {
        reasons.push(format!("domain length {} > {MAX_DOMAIN_LEN}", ascii.len()));
    }
    if ascii.ends_with('.') {
        reasons.push("trailing dot not allowed".to_string());
    }

    let labels: Vec<&str> = ascii.trim_end_matches('.').split('.').collect();
    if labels.len() < 2 {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in &labels {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > MAX_LABEL_LEN {
            reasons.push(format!(
                "domain label '{}' length {} > {MAX_LABEL_LEN}",
                label,
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!("domain label '{label}' cannot start/end with '-'"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{label}' has invalid chars"));
        }
    }

    if labels.len() >= 2 {
        if let Some(tld) = labels.last() {
            if !is_valid_tld(tld) {
                reasons.push(format!("top-level domain '{tld}' is not valid"));
            }
        }
    }

    reasons
}

fn is_valid_tld(tld: &str) -> bool {
    if let Some(rest) = tld.strip_prefix("xn--") {
        return rest.len() >= 2;
    }
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

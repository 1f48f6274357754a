use std::sync::LazyLock;

use regex::Regex;

// Captures everything between '@' and the final dot: "gmail" for "x@gmail.com",
// "mail.yahoo" for "x@mail.yahoo.com".
static BARE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@([^\s@]+)\.[^\s@]+$").expect("static pattern compiles")
});

/// Domain parts of an e-mail address used for list lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailDomain {
    /// Lowercased domain after the `@`.
    pub full: String,
    /// Lowercased domain without its final label; empty when it cannot be derived.
    pub bare: String,
}

/// Splits `email` on its first `@`. Returns `None` when there is no `@` at all.
pub fn split_email(email: &str) -> Option<EmailDomain> {
    let input = email.trim();
    let (_, domain) = input.split_once('@')?;
    let full = domain
        .split('@')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let bare = BARE_DOMAIN
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default();

    Some(EmailDomain { full, bare })
}

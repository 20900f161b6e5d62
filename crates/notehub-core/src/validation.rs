//! Input validation shared by the server and the client.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::MIN_PASSWORD_LENGTH;
use crate::error::{Error, Result};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Lowercase and trim an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// True when the email has a plausible `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// True when the email belongs to `domain` (e.g. `stud.ase.ro`).
pub fn is_institutional_email(email: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('@').to_lowercase();
    normalize_email(email)
        .rsplit_once('@')
        .map(|(local, d)| !local.is_empty() && d == domain)
        .unwrap_or(false)
}

/// Require a non-blank string field.
pub fn require_field<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::InvalidInput(message.to_string())),
    }
}

/// Validate registration input.
///
/// `institution_domain` is enforced only when set.
pub fn validate_registration(
    email: &str,
    password: &str,
    full_name: &str,
    institution_domain: Option<&str>,
) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() || full_name.trim().is_empty() {
        return Err(Error::InvalidInput(
            "Email, password and full name are required".to_string(),
        ));
    }
    if !is_valid_email(email) {
        return Err(Error::InvalidInput("Invalid email address".to_string()));
    }
    if let Some(domain) = institution_domain.filter(|d| !d.trim().is_empty()) {
        if !is_institutional_email(email, domain) {
            return Err(Error::InvalidInput(format!(
                "Email must be an institutional address ending in @{}",
                domain.trim().trim_start_matches('@')
            )));
        }
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

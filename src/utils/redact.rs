//! Redaction of credentials and personal data before anything is logged.

use regex::Regex;
use std::sync::LazyLock;

static SECRET_FIELDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"(password|confirm_?password|token|authorization|api[_-]?key|secret)"\s*:\s*"[^"]*""#)
        .expect("secret field pattern is valid")
});

static BEARER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._~+/=-]+").expect("bearer pattern is valid")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern is valid")
});

/// Redact sensitive data from a payload or message
pub fn redact_sensitive_data(input: &str) -> String {
    let result = SECRET_FIELDS.replace_all(input, r#""$1": "[REDACTED]""#);
    let result = BEARER.replace_all(&result, "Bearer [REDACTED]");
    EMAIL.replace_all(&result, "[EMAIL]").into_owned()
}

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::error::DomainError;

/// Fields every submission must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["username", "email", "password"];

/// Two-part local@domain.tld shape; nothing stricter.
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Truthiness in the sense the intake contract uses it: absent, null,
/// empty string, false and numeric zero all count as missing.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn email_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate a submission payload. Fail-fast: the first failing rule wins.
pub fn validate_submission(payload: &Map<String, Value>) -> Result<(), DomainError> {
    for field in REQUIRED_FIELDS {
        match payload.get(field) {
            Some(v) if is_truthy(v) => {}
            _ => return Err(DomainError::missing_field(field)),
        }
    }

    let email = payload.get("email").map(email_text).unwrap_or_default();
    if !EMAIL_SHAPE.is_match(&email) {
        return Err(DomainError::invalid_email(email));
    }

    Ok(())
}

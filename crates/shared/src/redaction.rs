//! Secret detection and redaction utilities.
//!
//! Provides consistent logic for detecting sensitive keys and redacting their
//! values in error messages, logs, and control-plane response bodies that are
//! echoed back to the user.

use serde_json::Value;

/// The redacted placeholder string.
pub const REDACTED: &str = crate::errors::REDACTED_VALUE;

/// Upper bound on response-body bytes echoed in remote errors.
pub const MAX_ERROR_BODY_BYTES: usize = 512;

/// Checks if a key/variable name likely refers to a secret.
///
/// Uses case-insensitive pattern matching to detect common secret-related
/// naming conventions, including the control plane's `*_pass` and `*_secrets`.
///
/// # Examples
///
/// ```
/// use supaconf_shared::is_secret_key;
///
/// assert!(is_secret_key("smtp_pass"));
/// assert!(is_secret_key("SUPABASE_AUTH_JWT_SECRET"));
/// assert!(is_secret_key("hook_send_sms_secrets"));
/// assert!(!is_secret_key("site_url"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.ends_with("_PASS")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH_TOKEN")
}

/// Redact secret-looking members of a JSON response body.
///
/// Non-JSON bodies are returned as lossy UTF-8. Either way the result is
/// truncated to [`MAX_ERROR_BODY_BYTES`].
pub fn redact_json_body(body: &[u8]) -> String {
    let rendered = match serde_json::from_slice::<Value>(body) {
        Ok(mut value) => {
            redact_value(&mut value);
            value.to_string()
        },
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    truncate_for_error(&rendered, MAX_ERROR_BODY_BYTES)
}

/// Truncate on a char boundary, appending an ellipsis when shortened.
pub fn truncate_for_error(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = text.get(..end).unwrap_or_default().to_string();
    truncated.push_str("...");
    truncated
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if is_secret_key(key) && !entry.is_null() {
                    *entry = Value::String(REDACTED.to_string());
                } else {
                    redact_value(entry);
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {},
    }
}

/// A secret string wrapper that redacts on Display/Debug.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SecretString(Box<str>);

impl SecretString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true when no cleartext is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume and return the underlying secret.
    pub fn into_inner(self) -> Box<str> {
        self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(REDACTED)
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(REDACTED)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detects_control_plane_secret_fields() {
        assert!(is_secret_key("smtp_pass"));
        assert!(is_secret_key("jwt_secret"));
        assert!(is_secret_key("sms_twilio_auth_token"));
        assert!(is_secret_key("sms_textlocal_api_key"));
        assert!(is_secret_key("external_github_secret"));
        assert!(is_secret_key("DOTENV_PRIVATE_KEY_PRODUCTION"));
    }

    #[test]
    fn rejects_non_secret_fields() {
        assert!(!is_secret_key("site_url"));
        assert!(!is_secret_key("max_rows"));
        assert!(!is_secret_key("smtp_port"));
        assert!(!is_secret_key("db_schema"));
    }

    #[test]
    fn json_bodies_are_redacted_recursively() {
        let body = br#"{"message":"bad","config":{"smtp_pass":"hunter2","smtp_host":"mail"}}"#;
        let redacted = redact_json_body(body);
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("mail"));
        assert!(redacted.contains(REDACTED));
    }

    #[test]
    fn non_json_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_BYTES * 2);
        let rendered = redact_json_body(body.as_bytes());
        assert_eq!(rendered.len(), MAX_ERROR_BODY_BYTES + 3);
        assert!(rendered.ends_with("..."));
    }

    #[test]
    fn secret_string_redacts_display() {
        let secret = SecretString::new("shh");
        assert_eq!(secret.to_string(), REDACTED);
        assert_eq!(format!("{secret:?}"), REDACTED);
        assert_eq!(secret.expose(), "shh");
    }

    proptest! {
        #[test]
        fn truncation_never_splits_chars(text in "\\PC{0,80}", max in 0usize..64) {
            let truncated = truncate_for_error(&text, max);
            prop_assert!(truncated.len() <= max.max(text.len()) + 3);
        }
    }
}

//! Step value validation.
//!
//! Validators are plain functions from a candidate value to a
//! [`Verdict`]. This module carries the verdict type plus a few
//! ready-made validators for common step shapes.

use crate::errors::WizardError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// The result of validating a step value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The value is acceptable; the wizard may advance.
    Accepted,
    /// The value was rejected; the message is shown as a warning.
    Rejected(String),
}

impl Verdict {
    /// Creates a rejection with a user-facing message.
    #[must_use]
    pub fn reject(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Returns true if the value was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Accepts any non-blank string and any non-null non-string value.
pub fn non_empty(message: impl Into<String>) -> impl Fn(&Value) -> Verdict + Send + Sync {
    let message = message.into();
    move |value: &Value| {
        let ok = match value {
            Value::String(s) => !s.trim().is_empty(),
            Value::Null => false,
            _ => true,
        };
        if ok {
            Verdict::Accepted
        } else {
            Verdict::Rejected(message.clone())
        }
    }
}

/// Accepts strings whose length does not exceed `limit`.
///
/// Non-string values are accepted; pair with [`non_empty`] or
/// [`matches_pattern`] when the shape matters.
pub fn max_length(
    limit: usize,
    message: impl Into<String>,
) -> impl Fn(&Value) -> Verdict + Send + Sync {
    let message = message.into();
    move |value: &Value| match value {
        Value::String(s) if s.chars().count() > limit => Verdict::Rejected(message.clone()),
        _ => Verdict::Accepted,
    }
}

/// Accepts strings matching the given regular expression.
///
/// Non-string values are rejected with the same message.
///
/// # Errors
///
/// Returns [`WizardError::InvalidPattern`] when the pattern does not
/// compile.
pub fn matches_pattern(
    pattern: &str,
    message: impl Into<String>,
) -> Result<impl Fn(&Value) -> Verdict + Send + Sync, WizardError> {
    let regex = Regex::new(pattern)?;
    let message = message.into();
    Ok(move |value: &Value| match value.as_str() {
        Some(s) if regex.is_match(s) => Verdict::Accepted,
        _ => Verdict::Rejected(message.clone()),
    })
}

/// Accepts strings naming an existing file.
pub fn file_exists(message: impl Into<String>) -> impl Fn(&Value) -> Verdict + Send + Sync {
    let message = message.into();
    move |value: &Value| match value.as_str() {
        Some(path) if Path::new(path).is_file() => Verdict::Accepted,
        _ => Verdict::Rejected(message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_non_empty_rejects_blank_strings() {
        let validate = non_empty("required");
        assert_eq!(validate(&json!("Ada")), Verdict::Accepted);
        assert_eq!(validate(&json!(1)), Verdict::Accepted);
        assert_eq!(validate(&json!("   ")), Verdict::reject("required"));
        assert_eq!(validate(&json!(null)), Verdict::reject("required"));
    }

    #[test]
    fn test_max_length_counts_chars() {
        let validate = max_length(3, "too long");
        assert_eq!(validate(&json!("abc")), Verdict::Accepted);
        assert_eq!(validate(&json!("abcd")), Verdict::reject("too long"));
        assert_eq!(validate(&json!(12345)), Verdict::Accepted);
    }

    #[test]
    fn test_matches_pattern() {
        let validate = matches_pattern(r"^\d{4}$", "must be four digits").unwrap();
        assert_eq!(validate(&json!("2024")), Verdict::Accepted);
        assert_eq!(validate(&json!("24")), Verdict::reject("must be four digits"));
        assert_eq!(validate(&json!(2024)), Verdict::reject("must be four digits"));
    }

    #[test]
    fn test_matches_pattern_rejects_bad_regex() {
        assert!(matches_pattern("(unclosed", "x").is_err());
    }

    #[test]
    fn test_file_exists() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "content").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let validate = file_exists("pick a file");
        assert_eq!(validate(&json!(path)), Verdict::Accepted);
        assert_eq!(
            validate(&json!("/definitely/not/here.txt")),
            Verdict::reject("pick a file")
        );
        assert_eq!(validate(&json!(null)), Verdict::reject("pick a file"));
    }
}

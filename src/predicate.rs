//! Cache eligibility check for response bodies

use serde_json::Value;

/// Default top-level field carrying the domain success flag
pub const DEFAULT_SUCCESS_FIELD: &str = "code";

/// Default value of [`DEFAULT_SUCCESS_FIELD`] that marks success
pub const DEFAULT_SUCCESS_VALUE: i64 = 1;

/// Decides whether a completed response may be written to the cache.
///
/// A response qualifies when its transport status is a success and its body
/// is a JSON object whose discriminator field equals the success sentinel.
/// Numbers and numeric strings both match, so `{"code":1}` and
/// `{"code":"1"}` are eligible. Anything unparsable is simply not eligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessPredicate {
    field: String,
    value: i64,
}

impl SuccessPredicate {
    pub fn new(field: impl Into<String>, value: i64) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    pub fn is_cacheable(&self, status_is_success: bool, body: &str) -> bool {
        if !status_is_success {
            return false;
        }

        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
            return false;
        };

        match map.get(&self.field) {
            Some(Value::Number(n)) => {
                n.as_i64() == Some(self.value) || n.as_f64() == Some(self.value as f64)
            }
            Some(Value::String(s)) => s.trim().parse::<i64>().ok() == Some(self.value),
            _ => false,
        }
    }
}

impl Default for SuccessPredicate {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_FIELD, DEFAULT_SUCCESS_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_success_code() {
        let predicate = SuccessPredicate::default();
        assert!(predicate.is_cacheable(true, r#"{"code":1,"data":"v"}"#));
        assert!(predicate.is_cacheable(true, r#"{"code":1.0}"#));
        assert!(predicate.is_cacheable(true, r#"{"code":"1"}"#));
    }

    #[test]
    fn test_rejects_failed_transport() {
        let predicate = SuccessPredicate::default();
        assert!(!predicate.is_cacheable(false, r#"{"code":1}"#));
    }

    #[test]
    fn test_rejects_other_codes() {
        let predicate = SuccessPredicate::default();
        assert!(!predicate.is_cacheable(true, r#"{"code":0,"data":null}"#));
        assert!(!predicate.is_cacheable(true, r#"{"code":true}"#));
        assert!(!predicate.is_cacheable(true, r#"{"code":null}"#));
        assert!(!predicate.is_cacheable(true, r#"{"data":{"code":1}}"#));
    }

    #[test]
    fn test_rejects_malformed_bodies() {
        let predicate = SuccessPredicate::default();
        assert!(!predicate.is_cacheable(true, ""));
        assert!(!predicate.is_cacheable(true, "<html>oops</html>"));
        assert!(!predicate.is_cacheable(true, r#"{"code":1"#));
        assert!(!predicate.is_cacheable(true, "[1,2,3]"));
        assert!(!predicate.is_cacheable(true, "1"));
    }

    #[test]
    fn test_custom_field_and_value() {
        let predicate = SuccessPredicate::new("status", 0);
        assert!(predicate.is_cacheable(true, r#"{"status":0}"#));
        assert!(!predicate.is_cacheable(true, r#"{"code":1}"#));
    }
}

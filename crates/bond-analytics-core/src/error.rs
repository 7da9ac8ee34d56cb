use serde::Serialize;
use thiserror::Error;

/// A single field-level validation violation, suitable for surfacing
/// to a caller as part of a "bad request" style response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BondAnalyticsError {
    /// One or more input fields are out of range or malformed. Carries
    /// every violation found, not just the first.
    #[error("Invalid input: {}", render_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BondAnalyticsError {
    /// The field violations, if this is a validation failure.
    pub fn violations(&self) -> Option<&[FieldViolation]> {
        match self {
            BondAnalyticsError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

fn render_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} — {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for BondAnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        BondAnalyticsError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_violation() {
        let err = BondAnalyticsError::Validation(vec![
            FieldViolation::new("face_value", "Face value must be positive"),
            FieldViolation::new("market_price", "Market price must be positive"),
        ]);

        let rendered = err.to_string();
        assert!(rendered.contains("face_value"));
        assert!(rendered.contains("market_price"));
        assert!(rendered.contains("; "));
    }
}

//! Error types for the readiness engine.

use thiserror::Error;

/// Error type for readiness engine operations.
///
/// Ticket data never produces an error: absent fields are empty values. Every
/// variant here describes a configuration or programming mistake.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// A severity label outside HIGH/MEDIUM/LOW.
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
    /// A category label outside requirements/technical/testing/context.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// A profile name with no built-in definition.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
    /// A profile that violates a structural rule.
    #[error("invalid profile '{profile}': {message}")]
    InvalidProfile {
        /// Name of the rejected profile.
        profile: String,
        /// Which rule was violated.
        message: String,
    },
    /// A detector pattern that failed to compile.
    #[error("invalid pattern for detector {detector}: {source}")]
    Pattern {
        /// Detector that owns the pattern.
        detector: &'static str,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
    /// Malformed JSON configuration.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for the readiness engine.
pub type Result<T> = std::result::Result<T, ReadinessError>;

#[cfg(test)]
mod tests {
    use super::ReadinessError;

    #[test]
    fn unknown_severity_formats_label() {
        let error = ReadinessError::UnknownSeverity("CRITICAL".to_string());
        assert_eq!(format!("{error}"), "unknown severity: CRITICAL");
    }

    #[test]
    fn invalid_profile_names_profile_and_rule() {
        let error = ReadinessError::InvalidProfile {
            profile: "custom".to_string(),
            message: "category maxima sum to 90, expected 100".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("custom"));
        assert!(message.contains("sum to 90"));
    }

    #[test]
    fn from_json_error_maps_variant() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: ReadinessError = parse.into();
        match error {
            ReadinessError::Json(_) => {}
            other => panic!("expected Json variant, got {other:?}"),
        }
    }
}

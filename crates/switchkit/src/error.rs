//! Error types for SwitchKit.
//!
//! Storage adaptors raise every failure as a [`SwitchKitError`] carrying
//! whatever diagnostic payload could be extracted from the backend response.
//! The [`SwitchKit`](crate::SwitchKit) client is the single place where
//! adaptor-origin errors are caught, logged, and converted into a soft
//! outcome. The exception is [`SwitchKitError::NotInitialized`], which the
//! client raises itself and never swallows.

use thiserror::Error;

/// Main error type for SwitchKit operations.
#[derive(Debug, Error)]
pub enum SwitchKitError {
    /// `get`/`set` was called before a successful `init`.
    #[error("SwitchKit is not initialized; call `init` first")]
    NotInitialized,

    /// Namespace creation failed for a non-conflict reason, or discovery
    /// exhausted every page without finding the target title.
    #[error("Namespace resolution failed: {message}")]
    NamespaceResolution {
        message: String,
        /// Best-effort parsed error payload from the backend.
        detail: serde_json::Value,
    },

    /// One or both of the value/metadata reads failed for a key.
    #[error("Failed to load switch value and/or metadata for {key:?}")]
    Fetch {
        key: String,
        /// Aggregated error detail from each failed request leg.
        detail: serde_json::Value,
    },

    /// The combined value/metadata write was rejected.
    #[error("Failed to write switch {key:?}")]
    Write {
        key: String,
        detail: serde_json::Value,
    },

    /// Network-level rejection before any response was observed.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// An operation was handed an unusable input, such as an empty key.
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for SwitchKit operations.
pub type Result<T> = std::result::Result<T, SwitchKitError>;

impl SwitchKitError {
    /// Create a transport error from any displayable cause.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        SwitchKitError::Transport {
            message: cause.to_string(),
        }
    }

    /// Create a validation error for an empty required identifier.
    pub fn empty_field(field: &str) -> Self {
        SwitchKitError::Validation {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        }
    }

    /// The diagnostic payload attached to this error, if any.
    ///
    /// Used by the client when logging swallowed failures, so the backend's
    /// own error codes survive into the log line. A `Null` payload (nothing
    /// was extractable) reads as no payload at all.
    pub fn detail(&self) -> Option<&serde_json::Value> {
        match self {
            SwitchKitError::NamespaceResolution { detail, .. }
            | SwitchKitError::Fetch { detail, .. }
            | SwitchKitError::Write { detail, .. } => (!detail.is_null()).then_some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SwitchKitError::Fetch {
            key: "switch-a".into(),
            detail: serde_json::json!({ "errors": [] }),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load switch value and/or metadata for \"switch-a\""
        );
    }

    #[test]
    fn test_detail_exposed_for_backend_errors() {
        let detail = serde_json::json!({ "errors": [{ "code": 10013, "message": "denied" }] });
        let err = SwitchKitError::NamespaceResolution {
            message: "create rejected".into(),
            detail: detail.clone(),
        };
        assert_eq!(err.detail(), Some(&detail));
        assert!(SwitchKitError::NotInitialized.detail().is_none());
    }

    #[test]
    fn test_empty_field_helper() {
        let err = SwitchKitError::empty_field("key");
        assert_eq!(err.to_string(), "Validation error for key: must not be empty");
    }
}

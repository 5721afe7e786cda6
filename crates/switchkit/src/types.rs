//! Core data model: switches and their metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single primitive metadata value.
///
/// Metadata values are flat scalars only; nested objects and arrays are not
/// representable, matching what the storage backends accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Number(v.into())
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::String(v)
    }
}

/// Metadata attached to a switch: a flat string-to-scalar mapping.
///
/// An empty map is a valid value and is distinct from "no metadata at all"
/// (`None` on [`Switch::metadata`]).
pub type SwitchMetadata = BTreeMap<String, MetadataValue>;

/// A named flag/value with optional metadata, the unit of data SwitchKit
/// manages.
///
/// Switches are identified externally by their key and are immutable once
/// returned to a caller; setting a key produces a new `Switch` value rather
/// than mutating a previously returned one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    /// The switch value, stored verbatim as text.
    pub value: String,
    /// Optional metadata stored alongside the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SwitchMetadata>,
}

impl Switch {
    /// Convenience constructor for a switch without metadata.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            metadata: None,
        }
    }

    /// Convenience constructor for a switch with metadata.
    pub fn with_metadata(value: impl Into<String>, metadata: SwitchMetadata) -> Self {
        Self {
            value: value.into(),
            metadata: Some(metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_value_deserializes_scalars() {
        let parsed: SwitchMetadata =
            serde_json::from_str(r#"{"enabled": true, "percent": 25, "owner": "growth"}"#)
                .unwrap();

        assert_eq!(parsed.get("enabled"), Some(&MetadataValue::Bool(true)));
        assert_eq!(parsed.get("percent"), Some(&MetadataValue::Number(25.into())));
        assert_eq!(parsed.get("owner"), Some(&"growth".into()));
    }

    #[test]
    fn test_metadata_value_rejects_nesting() {
        let parsed: std::result::Result<SwitchMetadata, _> =
            serde_json::from_str(r#"{"inner": {"too": "deep"}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_switch_serializes_without_absent_metadata() {
        let json = serde_json::to_string(&Switch::new("on")).unwrap();
        assert_eq!(json, r#"{"value":"on"}"#);
    }

    #[test]
    fn test_empty_metadata_distinct_from_absent() {
        let empty = Switch::with_metadata("on", SwitchMetadata::new());
        let absent = Switch::new("on");
        assert_ne!(empty, absent);

        let json = serde_json::to_string(&empty).unwrap();
        assert_eq!(json, r#"{"value":"on","metadata":{}}"#);
    }
}

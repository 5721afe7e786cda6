//! Workers KV API request/response types.
//!
//! Response envelopes follow the Cloudflare v4 API shape: a `result`
//! payload plus `errors`/`messages` arrays and, for listings, a
//! `result_info` pagination block.

use serde::{Deserialize, Serialize};
use switchkit::SwitchMetadata;

/// Sort direction for namespace listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDirection {
    Asc,
    Desc,
}

impl ListDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            ListDirection::Asc => "asc",
            ListDirection::Desc => "desc",
        }
    }
}

/// Sort field for namespace listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Id,
    Title,
}

impl ListOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            ListOrder::Id => "id",
            ListOrder::Title => "title",
        }
    }
}

/// Query parameters for `GET .../storage/kv/namespaces`.
///
/// Omitted fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct ListNamespacesOptions {
    pub direction: Option<ListDirection>,
    pub order: Option<ListOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Query parameters for `GET .../namespaces/{id}/keys`.
///
/// Omitted fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct ListKeysOptions {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub prefix: Option<String>,
}

/// One entry of a `PUT .../namespaces/{id}/bulk` request body.
#[derive(Debug, Clone, Serialize)]
pub struct BulkWriteEntry {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SwitchMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_ttl: Option<u64>,
}

impl BulkWriteEntry {
    /// Entry carrying only a key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            metadata: None,
            base64: None,
            expiration: None,
            expiration_ttl: None,
        }
    }
}

/// One error from a v4 API error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    pub code: i64,
    pub message: String,
}

impl ApiErrorEntry {
    /// Placeholder entry used when an error body could not be parsed.
    pub(crate) fn unknown() -> Self {
        Self {
            code: 0,
            message: "unknown".to_string(),
        }
    }

    /// Entry representing a transport-level rejection.
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            message: message.into(),
        }
    }
}

/// The `errors` array of a failed v4 API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

/// A namespace as reported by the list/create endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub supports_url_encoding: bool,
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// Body of `GET .../storage/kv/namespaces`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListNamespacesResponse {
    #[serde(default)]
    pub result: Vec<NamespaceInfo>,
    pub result_info: Option<ResultInfo>,
}

/// Body of a successful `POST .../storage/kv/namespaces`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateNamespaceResponse {
    pub result: NamespaceInfo,
}

/// Body of `GET .../namespaces/{id}/metadata/{key}`.
#[derive(Debug, Deserialize)]
pub(crate) struct MetadataEnvelope {
    pub result: Option<SwitchMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_namespaces_response_parses() {
        let payload: ListNamespacesResponse = serde_json::from_str(
            r#"{
                "result": [
                    {"id": "abc123", "title": "my-switches", "supports_url_encoding": true}
                ],
                "result_info": {"page": 1, "per_page": 20, "count": 1, "total_count": 1, "total_pages": 1},
                "success": true,
                "errors": [],
                "messages": []
            }"#,
        )
        .unwrap();

        assert_eq!(payload.result.len(), 1);
        assert_eq!(payload.result[0].id, "abc123");
        assert_eq!(payload.result[0].title, "my-switches");
        assert!(payload.result[0].supports_url_encoding);
        let info = payload.result_info.unwrap();
        assert_eq!((info.page, info.per_page), (1, 20));
        assert_eq!((info.count, info.total_count, info.total_pages), (1, 1, 1));
    }

    #[test]
    fn test_result_info_is_optional() {
        let payload: ListNamespacesResponse =
            serde_json::from_str(r#"{"result": []}"#).unwrap();
        assert!(payload.result.is_empty());
        assert!(payload.result_info.is_none());
    }

    #[test]
    fn test_error_envelope_parses_codes() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"errors": [{"code": 10014, "message": "namespace already exists"}], "success": false}"#,
        )
        .unwrap();
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].code, 10014);
    }

    #[test]
    fn test_metadata_envelope_allows_null_result() {
        let envelope: MetadataEnvelope = serde_json::from_str(r#"{"result": null}"#).unwrap();
        assert!(envelope.result.is_none());
    }

    #[test]
    fn test_bulk_write_entry_omits_absent_fields() {
        let json = serde_json::to_string(&BulkWriteEntry::new("switch-a", "on")).unwrap();
        assert_eq!(json, r#"{"key":"switch-a","value":"on"}"#);

        let entry = BulkWriteEntry {
            expiration_ttl: Some(3600),
            ..BulkWriteEntry::new("switch-b", "off")
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""expiration_ttl":3600"#));
        assert!(!json.contains("base64"));
    }
}

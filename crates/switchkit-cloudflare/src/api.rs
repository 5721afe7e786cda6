//! Stateless HTTP gateway for the Cloudflare Workers KV API.
//!
//! [`CloudflareKv`] is a pure protocol adapter: each method maps 1:1 to one
//! Workers KV endpoint, issues the request, and hands back the raw
//! [`reqwest::Response`]. No retries, no caching, and no interpretation of
//! error bodies happen here; success checks and envelope parsing belong to
//! the caller (see [`CloudflareKvAdaptor`](crate::CloudflareKvAdaptor)).

use crate::types::{BulkWriteEntry, ListKeysOptions, ListNamespacesOptions};
use reqwest::{Client, Response};
use std::time::Duration;
use switchkit::{Result, SwitchKitError, SwitchMetadata};

/// Cloudflare v4 API base URL.
const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Timeout for Workers KV API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Construction options for [`CloudflareKv`].
#[derive(Debug, Clone)]
pub struct CloudflareKvOptions {
    /// API token with Workers KV read/write permissions.
    pub auth_token: String,
    /// Cloudflare account identifier.
    pub account_id: String,
    /// Override for the API base URL, mainly for tests.
    pub api_base_url: Option<String>,
}

impl CloudflareKvOptions {
    pub fn new(auth_token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            account_id: account_id.into(),
            api_base_url: None,
        }
    }

    /// Point the gateway at a different base URL.
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }
}

/// Thin client for the Workers KV HTTP API.
pub struct CloudflareKv {
    client: Client,
    auth_token: String,
    account_id: String,
    api_base_url: String,
}

impl std::fmt::Debug for CloudflareKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareKv")
            .field("account_id", &self.account_id)
            .field("api_base_url", &self.api_base_url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl CloudflareKv {
    /// Create a new gateway.
    ///
    /// # Errors
    ///
    /// Fails when `auth_token` or `account_id` is empty, or when the HTTP
    /// client cannot be constructed.
    pub fn new(options: CloudflareKvOptions) -> Result<Self> {
        if options.auth_token.is_empty() {
            return Err(SwitchKitError::empty_field("auth_token"));
        }
        if options.account_id.is_empty() {
            return Err(SwitchKitError::empty_field("account_id"));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("switchkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SwitchKitError::transport)?;

        Ok(Self {
            client,
            auth_token: options.auth_token,
            account_id: options.account_id,
            api_base_url: options
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.auth_token)
    }

    fn namespaces_url(&self) -> String {
        format!(
            "{}/accounts/{}/storage/kv/namespaces",
            self.api_base_url, self.account_id
        )
    }

    fn namespace_url(&self, namespace_id: &str) -> String {
        format!("{}/{}", self.namespaces_url(), namespace_id)
    }

    fn values_url(&self, namespace_id: &str, key: &str) -> String {
        format!(
            "{}/values/{}",
            self.namespace_url(namespace_id),
            urlencoding::encode(key)
        )
    }

    fn metadata_url(&self, namespace_id: &str, key: &str) -> String {
        format!(
            "{}/metadata/{}",
            self.namespace_url(namespace_id),
            urlencoding::encode(key)
        )
    }

    fn require(field: &'static str, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(SwitchKitError::empty_field(field));
        }
        Ok(())
    }

    // ========================================
    // Namespace Operations
    // ========================================

    /// `GET /accounts/{account}/storage/kv/namespaces`
    ///
    /// Omitted options are not sent as query parameters.
    pub async fn list_namespaces(&self, options: &ListNamespacesOptions) -> Result<Response> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(direction) = options.direction {
            query.push(("direction", direction.as_str().to_string()));
        }
        if let Some(order) = options.order {
            query.push(("order", order.as_str().to_string()));
        }
        if let Some(page) = options.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = options.per_page {
            query.push(("per_page", per_page.to_string()));
        }

        self.client
            .get(self.namespaces_url())
            .header("Authorization", self.bearer())
            .query(&query)
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `POST /accounts/{account}/storage/kv/namespaces`
    ///
    /// Fails with the backend's conflict error when a namespace with this
    /// title already exists.
    pub async fn create_namespace(&self, title: &str) -> Result<Response> {
        Self::require("title", title)?;
        self.client
            .post(self.namespaces_url())
            .header("Authorization", self.bearer())
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `DELETE /accounts/{account}/storage/kv/namespaces/{id}`
    pub async fn remove_namespace(&self, namespace_id: &str) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        self.client
            .delete(self.namespace_url(namespace_id))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `PUT /accounts/{account}/storage/kv/namespaces/{id}`
    pub async fn rename_namespace(&self, namespace_id: &str, title: &str) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        Self::require("title", title)?;
        self.client
            .put(self.namespace_url(namespace_id))
            .header("Authorization", self.bearer())
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    // ========================================
    // Key Operations
    // ========================================

    /// `GET .../namespaces/{id}/values/{key}`
    ///
    /// The success body is the raw value text.
    pub async fn read_key(&self, namespace_id: &str, key: &str) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        Self::require("key", key)?;
        self.client
            .get(self.values_url(namespace_id, key))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `DELETE .../namespaces/{id}/values/{key}`
    pub async fn delete_key(&self, namespace_id: &str, key: &str) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        Self::require("key", key)?;
        self.client
            .delete(self.values_url(namespace_id, key))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `PUT .../namespaces/{id}/values/{key}`
    ///
    /// Multipart form with a `value` part and a JSON-encoded `metadata`
    /// part. The content type is left to the transport so it can set the
    /// multipart boundary.
    pub async fn write_key_with_metadata(
        &self,
        namespace_id: &str,
        key: &str,
        value: &str,
        metadata: &SwitchMetadata,
    ) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        Self::require("key", key)?;

        let metadata_json = serde_json::to_string(metadata).map_err(SwitchKitError::transport)?;
        let form = reqwest::multipart::Form::new()
            .text("value", value.to_string())
            .text("metadata", metadata_json);

        self.client
            .put(self.values_url(namespace_id, key))
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `GET .../namespaces/{id}/metadata/{key}`
    pub async fn read_metadata(&self, namespace_id: &str, key: &str) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        Self::require("key", key)?;
        self.client
            .get(self.metadata_url(namespace_id, key))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    // ========================================
    // Bulk Operations
    // ========================================

    /// `GET .../namespaces/{id}/keys`
    pub async fn list_keys(&self, namespace_id: &str, options: &ListKeysOptions) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(ref cursor) = options.cursor {
            query.push(("cursor", cursor.clone()));
        }
        if let Some(limit) = options.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(ref prefix) = options.prefix {
            query.push(("prefix", prefix.clone()));
        }

        self.client
            .get(format!("{}/keys", self.namespace_url(namespace_id)))
            .header("Authorization", self.bearer())
            .query(&query)
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `DELETE .../namespaces/{id}/bulk` with a JSON array of keys.
    pub async fn delete_keys(&self, namespace_id: &str, keys: &[String]) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        self.client
            .delete(format!("{}/bulk", self.namespace_url(namespace_id)))
            .header("Authorization", self.bearer())
            .json(&keys)
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }

    /// `PUT .../namespaces/{id}/bulk` with an array of write entries.
    pub async fn bulk_write(
        &self,
        namespace_id: &str,
        entries: &[BulkWriteEntry],
    ) -> Result<Response> {
        Self::require("namespace_id", namespace_id)?;
        self.client
            .put(format!("{}/bulk", self.namespace_url(namespace_id)))
            .header("Authorization", self.bearer())
            .json(&entries)
            .send()
            .await
            .map_err(SwitchKitError::transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> CloudflareKv {
        CloudflareKv::new(CloudflareKvOptions::new("test-token", "test-account")).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_credentials() {
        let err = CloudflareKv::new(CloudflareKvOptions::new("", "test-account")).unwrap_err();
        assert!(matches!(err, SwitchKitError::Validation { ref field, .. } if field == "auth_token"));

        let err = CloudflareKv::new(CloudflareKvOptions::new("test-token", "")).unwrap_err();
        assert!(matches!(err, SwitchKitError::Validation { ref field, .. } if field == "account_id"));
    }

    #[test]
    fn test_default_base_url() {
        let kv = gateway();
        assert_eq!(
            kv.namespaces_url(),
            "https://api.cloudflare.com/client/v4/accounts/test-account/storage/kv/namespaces"
        );
    }

    #[test]
    fn test_base_url_override() {
        let kv = CloudflareKv::new(
            CloudflareKvOptions::new("test-token", "test-account")
                .with_api_base_url("http://127.0.0.1:8787"),
        )
        .unwrap();
        assert_eq!(
            kv.namespace_url("ns1"),
            "http://127.0.0.1:8787/accounts/test-account/storage/kv/namespaces/ns1"
        );
    }

    #[test]
    fn test_key_path_segments_are_percent_encoded() {
        let kv = gateway();
        let url = kv.values_url("ns1", "feature flags/v2?");
        assert!(url.ends_with("/namespaces/ns1/values/feature%20flags%2Fv2%3F"));

        let url = kv.metadata_url("ns1", "a&b");
        assert!(url.ends_with("/namespaces/ns1/metadata/a%26b"));
    }

    #[tokio::test]
    async fn test_operations_reject_empty_identifiers() {
        let kv = gateway();

        let err = kv.create_namespace("").await.unwrap_err();
        assert!(matches!(err, SwitchKitError::Validation { ref field, .. } if field == "title"));

        let err = kv.read_key("ns1", "").await.unwrap_err();
        assert!(matches!(err, SwitchKitError::Validation { ref field, .. } if field == "key"));

        let err = kv.read_metadata("", "switch-a").await.unwrap_err();
        assert!(
            matches!(err, SwitchKitError::Validation { ref field, .. } if field == "namespace_id")
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", gateway());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("test-token"));
    }
}

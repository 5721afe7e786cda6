//! SwitchKit storage adaptor backed by Cloudflare Workers KV.

use crate::api::{CloudflareKv, CloudflareKvOptions};
use crate::types::{
    ApiErrorEntry, CreateNamespaceResponse, ErrorEnvelope, ListDirection, ListNamespacesOptions,
    ListNamespacesResponse, ListOrder, MetadataEnvelope, NamespaceInfo,
};
use async_trait::async_trait;
use switchkit::{Result, StorageAdaptor, Switch, SwitchKitError, SwitchMetadata};
use tracing::debug;

/// Workers KV error code returned when creating a namespace whose title
/// already exists.
const NAMESPACE_ALREADY_EXISTS: i64 = 10014;

/// Best-effort parse of a v4 error envelope from a failed response.
///
/// Returns `None` when the body is not a parseable envelope; callers decide
/// whether that means a placeholder entry or nothing at all.
async fn parse_error_envelope(response: reqwest::Response) -> Option<Vec<ApiErrorEntry>> {
    response
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .map(|envelope| envelope.errors)
}

/// Whether a failed create is the "namespace already exists" conflict.
///
/// Every reported code must be the conflict code; any other code means the
/// create failed for a reason discovery cannot fix.
fn is_conflict(errors: &[ApiErrorEntry]) -> bool {
    errors.iter().all(|e| e.code == NAMESPACE_ALREADY_EXISTS)
}

fn errors_detail(errors: &[ApiErrorEntry]) -> serde_json::Value {
    serde_json::json!({ "errors": errors })
}

/// Storage adaptor that keeps switches in one Workers KV namespace.
///
/// The namespace is addressed by a human-readable title; `init` resolves it
/// to the backend's opaque namespace ID with a create-or-discover protocol.
/// Creation is the fast path (first-ever run); when it fails with the
/// already-exists conflict the adaptor falls back to scanning the paginated
/// namespace list. The two steps are not atomic on the backend, so a racing
/// initializer may lose the create and win the discovery; that race is
/// benign and resolved by the conflict signal.
#[derive(Debug)]
pub struct CloudflareKvAdaptor {
    kv: CloudflareKv,
    namespace: String,
    namespace_id: Option<String>,
    initialized: bool,
}

impl CloudflareKvAdaptor {
    /// Create an adaptor for the namespace titled `namespace`.
    ///
    /// No network traffic happens here; the namespace is resolved by
    /// [`init`](StorageAdaptor::init).
    pub fn new(namespace: impl Into<String>, options: CloudflareKvOptions) -> Result<Self> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(SwitchKitError::empty_field("namespace"));
        }
        Ok(Self {
            kv: CloudflareKv::new(options)?,
            namespace,
            namespace_id: None,
            initialized: false,
        })
    }

    /// The namespace title this adaptor was configured with.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The resolved opaque namespace ID, once `init` has succeeded.
    ///
    /// Immutable for the lifetime of the adaptor after resolution.
    pub fn namespace_id(&self) -> Option<&str> {
        self.namespace_id.as_deref()
    }

    /// Borrow the underlying gateway, e.g. for bulk operations.
    pub fn kv(&self) -> &CloudflareKv {
        &self.kv
    }

    fn resolved_namespace(&self) -> Result<&str> {
        if !self.initialized {
            return Err(SwitchKitError::NotInitialized);
        }
        self.namespace_id
            .as_deref()
            .ok_or(SwitchKitError::NotInitialized)
    }

    /// Scan the namespace list, page by page, for the target title.
    ///
    /// Pages are requested ordered ascending by title; together with the
    /// `total_pages` bound this guarantees termination against a stable
    /// namespace set. An explicit loop rather than recursion keeps the call
    /// stack flat no matter what `total_pages` the backend reports.
    async fn find_namespace(&self) -> Result<NamespaceInfo> {
        let mut page = 1u32;
        loop {
            let response = self
                .kv
                .list_namespaces(&ListNamespacesOptions {
                    direction: Some(ListDirection::Asc),
                    order: Some(ListOrder::Title),
                    page: Some(page),
                    per_page: None,
                })
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let errors = parse_error_envelope(response)
                    .await
                    .unwrap_or_else(|| vec![ApiErrorEntry::unknown()]);
                return Err(SwitchKitError::NamespaceResolution {
                    message: format!("unable to list namespaces: {}", status),
                    detail: errors_detail(&errors),
                });
            }

            let payload: ListNamespacesResponse = response.json().await.map_err(|e| {
                SwitchKitError::NamespaceResolution {
                    message: format!("unable to parse namespace list: {}", e),
                    detail: serde_json::Value::Null,
                }
            })?;

            if payload.result.is_empty() {
                return Err(SwitchKitError::NamespaceResolution {
                    message: "no namespaces in the list response".to_string(),
                    detail: serde_json::Value::Null,
                });
            }

            if let Some(found) = payload
                .result
                .into_iter()
                .find(|ns| ns.title == self.namespace)
            {
                return Ok(found);
            }

            match payload.result_info {
                Some(ref info) if page < info.total_pages => {
                    debug!(
                        "Namespace {:?} not on page {}/{}, fetching next page",
                        self.namespace, page, info.total_pages
                    );
                    page += 1;
                }
                _ => {
                    return Err(SwitchKitError::NamespaceResolution {
                        message: format!("unable to find namespace: {}", self.namespace),
                        detail: serde_json::Value::Null,
                    });
                }
            }
        }
    }

    /// Collapse one leg of the value/metadata fan-out.
    ///
    /// Success responses pass through; transport rejections and non-success
    /// statuses record whatever error detail is extractable and yield
    /// `None`.
    async fn settle_leg(
        leg: Result<reqwest::Response>,
        errors: &mut Vec<ApiErrorEntry>,
    ) -> Option<reqwest::Response> {
        match leg {
            Ok(response) if response.status().is_success() => Some(response),
            Ok(response) => {
                if let Some(entries) = parse_error_envelope(response).await {
                    errors.extend(entries);
                }
                None
            }
            Err(err) => {
                errors.push(ApiErrorEntry::transport(err.to_string()));
                None
            }
        }
    }
}

#[async_trait]
impl StorageAdaptor for CloudflareKvAdaptor {
    /// Resolve the namespace title to its opaque ID, create-or-discover.
    ///
    /// Idempotent once successful. A failed attempt leaves the adaptor
    /// uninitialized and retryable.
    async fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let response = self.kv.create_namespace(&self.namespace).await?;
        if response.status().is_success() {
            let data: CreateNamespaceResponse = response.json().await.map_err(|e| {
                SwitchKitError::NamespaceResolution {
                    message: format!("unable to parse create namespace response: {}", e),
                    detail: serde_json::Value::Null,
                }
            })?;
            self.namespace_id = Some(data.result.id);
            self.initialized = true;
            return Ok(());
        }

        let status = response.status();
        let errors = parse_error_envelope(response)
            .await
            .unwrap_or_else(|| vec![ApiErrorEntry::unknown()]);
        if !is_conflict(&errors) {
            return Err(SwitchKitError::NamespaceResolution {
                message: format!("unable to create namespace: {}", status),
                detail: errors_detail(&errors),
            });
        }

        debug!(
            "Namespace {:?} already exists, resolving via discovery",
            self.namespace
        );
        let found = self.find_namespace().await?;
        self.namespace_id = Some(found.id);
        self.initialized = true;
        Ok(())
    }

    /// Fetch value and metadata for `key` as two concurrent reads.
    ///
    /// Both legs must succeed; otherwise the extractable error detail from
    /// each failed leg is aggregated into one `Fetch` error. A missing key
    /// surfaces that way too, since Workers KV reports it as a non-success read.
    async fn get(&self, key: &str) -> Result<Option<Switch>> {
        let namespace_id = self.resolved_namespace()?;

        let (value_leg, metadata_leg) = futures::join!(
            self.kv.read_key(namespace_id, key),
            self.kv.read_metadata(namespace_id, key),
        );

        let mut errors: Vec<ApiErrorEntry> = Vec::new();
        let value_response = Self::settle_leg(value_leg, &mut errors).await;
        let metadata_response = Self::settle_leg(metadata_leg, &mut errors).await;

        match (value_response, metadata_response) {
            (Some(value_response), Some(metadata_response)) => {
                let value = value_response
                    .text()
                    .await
                    .map_err(SwitchKitError::transport)?;
                let envelope: MetadataEnvelope = metadata_response
                    .json()
                    .await
                    .map_err(SwitchKitError::transport)?;
                Ok(Some(Switch {
                    value,
                    metadata: envelope.result,
                }))
            }
            _ => Err(SwitchKitError::Fetch {
                key: key.to_string(),
                detail: errors_detail(&errors),
            }),
        }
    }

    /// Write value and metadata in one combined request.
    async fn set(&self, key: &str, value: &str, metadata: Option<SwitchMetadata>) -> Result<()> {
        let namespace_id = self.resolved_namespace()?;
        let metadata = metadata.unwrap_or_default();

        let response = self
            .kv
            .write_key_with_metadata(namespace_id, key, value, &metadata)
            .await?;
        if response.status().is_success() {
            return Ok(());
        }

        let errors = parse_error_envelope(response)
            .await
            .unwrap_or_else(|| vec![ApiErrorEntry::unknown()]);
        Err(SwitchKitError::Write {
            key: key.to_string(),
            detail: errors_detail(&errors),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adaptor() -> CloudflareKvAdaptor {
        CloudflareKvAdaptor::new(
            "my-switches",
            CloudflareKvOptions::new("test-token", "test-account"),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_empty_namespace() {
        let err = CloudflareKvAdaptor::new(
            "",
            CloudflareKvOptions::new("test-token", "test-account"),
        )
        .unwrap_err();
        assert!(matches!(err, SwitchKitError::Validation { ref field, .. } if field == "namespace"));
    }

    #[test]
    fn test_conflict_requires_every_code_to_match() {
        let conflict = vec![ApiErrorEntry {
            code: NAMESPACE_ALREADY_EXISTS,
            message: "already exists".into(),
        }];
        assert!(is_conflict(&conflict));

        let mixed = vec![
            ApiErrorEntry {
                code: NAMESPACE_ALREADY_EXISTS,
                message: "already exists".into(),
            },
            ApiErrorEntry {
                code: 10013,
                message: "something else".into(),
            },
        ];
        assert!(!is_conflict(&mixed));

        // Unparseable bodies become the placeholder entry, which is not a
        // conflict.
        assert!(!is_conflict(&[ApiErrorEntry::unknown()]));
    }

    #[tokio::test]
    async fn test_get_before_init_is_not_initialized() {
        let adaptor = adaptor();
        let err = adaptor.get("switch-a").await.unwrap_err();
        assert!(matches!(err, SwitchKitError::NotInitialized));
    }

    #[tokio::test]
    async fn test_set_before_init_is_not_initialized() {
        let adaptor = adaptor();
        let err = adaptor.set("switch-a", "on", None).await.unwrap_err();
        assert!(matches!(err, SwitchKitError::NotInitialized));
    }
}

//! Cloudflare Workers KV backend for SwitchKit.
//!
//! Two layers:
//!
//! - [`CloudflareKv`]: stateless gateway mapping each Workers KV endpoint
//!   to one HTTP request, returning raw responses
//! - [`CloudflareKvAdaptor`]: implements the
//!   [`StorageAdaptor`](switchkit::StorageAdaptor) contract on top of the
//!   gateway: namespace title → ID resolution at `init`, concurrent
//!   value/metadata reads, combined multipart writes
//!
//! # Example
//!
//! ```rust,ignore
//! use switchkit::SwitchKit;
//! use switchkit_cloudflare::{CloudflareKvAdaptor, CloudflareKvOptions};
//!
//! let mut switches = SwitchKit::new(CloudflareKvAdaptor::new(
//!     "my-switches",
//!     CloudflareKvOptions::new(auth_token, account_id),
//! )?);
//!
//! switches.init().await;
//! let switch_a = switches.get("switch-a").await?;
//! ```

pub mod adaptor;
pub mod api;
pub mod types;

// Re-export commonly used types
pub use adaptor::CloudflareKvAdaptor;
pub use api::{CloudflareKv, CloudflareKvOptions};
pub use types::{
    ApiErrorEntry, BulkWriteEntry, ListDirection, ListKeysOptions, ListNamespacesOptions,
    ListOrder, NamespaceInfo,
};

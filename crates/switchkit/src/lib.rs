//! SwitchKit - Cached feature-switch client over pluggable storage backends.
//!
//! A "switch" is a named string value with optional scalar metadata, stored
//! in a remote key-value backend and read through an in-memory cache. This
//! crate provides the backend-agnostic half of the system:
//!
//! - [`Switch`] / [`SwitchMetadata`]: the data model
//! - [`StorageAdaptor`]: the three-operation capability contract a backend
//!   must satisfy
//! - [`SwitchKit`]: the caching client that wraps any adaptor
//!
//! Concrete backends live in their own crates; see `switchkit-cloudflare`
//! for the Cloudflare Workers KV adaptor.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchkit::SwitchKit;
//! use switchkit_cloudflare::{CloudflareKvAdaptor, CloudflareKvOptions};
//!
//! #[tokio::main]
//! async fn main() -> switchkit::Result<()> {
//!     let mut switches = SwitchKit::new(CloudflareKvAdaptor::new(
//!         "my-switches",
//!         CloudflareKvOptions::new(
//!             std::env::var("CLOUDFLARE_AUTH_TOKEN").unwrap(),
//!             std::env::var("CLOUDFLARE_ACCOUNT_ID").unwrap(),
//!         ),
//!     )?);
//!
//!     switches.init().await;
//!
//!     if let Some(switch_a) = switches.get("switch-a").await? {
//!         if switch_a.value == "on" {
//!             // do something
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use client::SwitchKit;
pub use error::{Result, SwitchKitError};
pub use storage::StorageAdaptor;
pub use types::{MetadataValue, Switch, SwitchMetadata};

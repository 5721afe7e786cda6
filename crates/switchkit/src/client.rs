//! The SwitchKit client: cached orchestration over a storage adaptor.

use crate::error::{Result, SwitchKitError};
use crate::storage::StorageAdaptor;
use crate::types::{Switch, SwitchMetadata};
use std::collections::HashMap;
use tracing::error;

/// Cached feature-switch client over any [`StorageAdaptor`].
///
/// Wraps an adaptor with an in-memory read cache, lifecycle gating (`init`
/// must succeed before reads and writes), and uniform error containment:
/// adaptor failures are logged and degrade to "not found" / no-op instead of
/// propagating. The one hard failure is calling `get`/`set` before a
/// successful `init`.
///
/// The cache is instance-scoped, unbounded, and never expires; entries only
/// leave it through [`clear_cache`](SwitchKit::clear_cache). Two independent
/// clients never share cache state.
///
/// All mutating operations take `&mut self`: there is no internal locking,
/// so exclusive access is the caller's (or the borrow checker's) problem.
///
/// ```rust,ignore
/// use switchkit::SwitchKit;
/// use switchkit_cloudflare::{CloudflareKvAdaptor, CloudflareKvOptions};
///
/// let mut switches = SwitchKit::new(CloudflareKvAdaptor::new(
///     "my-switches",
///     CloudflareKvOptions::new(auth_token, account_id),
/// )?);
///
/// switches.init().await;
///
/// if let Some(switch_a) = switches.get("switch-a").await? {
///     if switch_a.value == "on" {
///         // do something
///     }
/// }
/// ```
#[derive(Debug)]
pub struct SwitchKit<A> {
    adaptor: A,
    cache: HashMap<String, Switch>,
    initialized: bool,
}

impl<A: StorageAdaptor> SwitchKit<A> {
    /// Create a client around `adaptor` with an empty cache.
    pub fn new(adaptor: A) -> Self {
        Self {
            adaptor,
            cache: HashMap::new(),
            initialized: false,
        }
    }

    /// Initialize the wrapped adaptor.
    ///
    /// No-op when already initialized. On adaptor failure the error is
    /// logged and the client stays uninitialized; calling `init` again
    /// retries from scratch.
    pub async fn init(&mut self) {
        if self.initialized {
            return;
        }
        match self.adaptor.init().await {
            Ok(()) => {
                self.initialized = true;
            }
            Err(err) => match err.detail() {
                Some(detail) => error!("Failed to initialize SwitchKit client: {}\n{}", err, detail),
                None => error!("Failed to initialize SwitchKit client: {}", err),
            },
        }
    }

    /// Whether a previous `init` call succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get the switch stored under `key`.
    ///
    /// Cache-aside: a cached entry is returned without contacting the
    /// adaptor, even if the backend has since changed. On a miss the adaptor
    /// result is cached and returned; adaptor failures are logged and
    /// reported as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`SwitchKitError::NotInitialized`] when called before a successful
    /// `init`, regardless of cache state.
    pub async fn get(&mut self, key: &str) -> Result<Option<Switch>> {
        if !self.initialized {
            return Err(SwitchKitError::NotInitialized);
        }
        if let Some(cached) = self.cache.get(key) {
            return Ok(Some(cached.clone()));
        }

        match self.adaptor.get(key).await {
            Ok(Some(switch)) => {
                self.cache.insert(key.to_string(), switch.clone());
                Ok(Some(switch))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                match err.detail() {
                    Some(detail) => error!("Unable to get switch {:?}: {}\n{}", key, err, detail),
                    None => error!("Unable to get switch {:?}: {}", key, err),
                }
                Ok(None)
            }
        }
    }

    /// Set the switch under `key` to `value` with optional metadata.
    ///
    /// Omitted metadata is stored as an empty mapping. On adaptor success
    /// the cache is updated write-through with the caller's intent (no
    /// re-read of the backend); on failure the error is logged and the cache
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// [`SwitchKitError::NotInitialized`] when called before a successful
    /// `init`.
    pub async fn set(
        &mut self,
        key: &str,
        value: &str,
        metadata: Option<SwitchMetadata>,
    ) -> Result<()> {
        if !self.initialized {
            return Err(SwitchKitError::NotInitialized);
        }
        let metadata = metadata.unwrap_or_default();

        match self
            .adaptor
            .set(key, value, Some(metadata.clone()))
            .await
        {
            Ok(()) => {
                self.cache.insert(
                    key.to_string(),
                    Switch::with_metadata(value, metadata),
                );
                Ok(())
            }
            Err(err) => {
                match err.detail() {
                    Some(detail) => error!("Unable to set switch {:?}: {}\n{}", key, err, detail),
                    None => error!("Unable to set switch {:?}: {}", key, err),
                }
                Ok(())
            }
        }
    }

    /// Drop every cached entry. Initialization state is unaffected.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of currently cached switches.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Borrow the wrapped adaptor.
    pub fn adaptor(&self) -> &A {
        &self.adaptor
    }
}

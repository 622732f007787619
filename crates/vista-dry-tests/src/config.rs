// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vista_core::config::{ConfigError, ConfigStore, ViewPortConfig};

/// In-memory implementation of [`ConfigStore`] for testing.
///
/// Clones share state, so a test can hand one clone to a `ConfigService`
/// and inspect the other. Call counts include failed attempts.
///
/// # Example
///
/// ```
/// use vista_dry_tests::InMemoryConfigStore;
/// use vista_core::config::{ConfigService, ViewPortConfig};
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
/// let cfg: ViewPortConfig = service.load_or_init(ViewPortConfig::KEY);
///
/// assert_eq!(cfg, ViewPortConfig::default());
/// assert_eq!(store.load_count(), 1);
/// assert_eq!(store.save_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    data: HashMap<String, Vec<u8>>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
    fail_on_save: bool,
}

impl InMemoryConfigStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `config` under [`ViewPortConfig::KEY`].
    pub fn with_viewport_config(config: &ViewPortConfig) -> Result<Self, ConfigError> {
        let store = Self::new();
        store.lock().data.insert(
            ViewPortConfig::KEY.to_string(),
            serde_json::to_vec(config)?,
        );
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent `load_raw` fail (or stop failing).
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_on_load = fail;
    }

    /// Make every subsequent `save_raw` fail (or stop failing).
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_on_save = fail;
    }

    /// Number of `load_raw` attempts.
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Number of `save_raw` attempts.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Raw blob stored under `key`, bypassing the counters.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().data.get(key).cloned()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.load_count += 1;
        if inner.fail_on_load {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        inner.data.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.save_count += 1;
        if inner.fail_on_save {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        inner.data.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Viewport settings and the keyed config storage port they are loaded through.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// What to do with a positional event that hits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitMissPolicy {
    /// Drop the event.
    #[default]
    Drop,
    /// Deliver it to the root scene in root coordinates.
    Root,
}

/// Settings for one viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPortConfig {
    /// Human-readable viewport name (logging only).
    pub name: String,
    /// Initial width in device pixels.
    pub width: u32,
    /// Initial height in device pixels.
    pub height: u32,
    /// Hit-test traversal bound, in primitive levels.
    pub max_depth: usize,
    /// How long a retiring root may take to acknowledge deactivation.
    pub deactivate_timeout_ms: u64,
    /// Fallback for positional events that hit nothing.
    pub hit_miss: HitMissPolicy,
}

impl Default for ViewPortConfig {
    fn default() -> Self {
        Self {
            name: "main_viewport".into(),
            width: 800,
            height: 600,
            max_depth: 256,
            deactivate_timeout_ms: 5_000,
            hit_miss: HitMissPolicy::Drop,
        }
    }
}

impl ViewPortConfig {
    /// Storage key the viewport config lives under.
    pub const KEY: &'static str = "viewport";

    /// Deactivation wait as a [`Duration`].
    pub fn deactivate_timeout(&self) -> Duration {
        Duration::from_millis(self.deactivate_timeout_ms)
    }
}

/// Storage port for raw config blobs keyed by logical name.
pub trait ConfigStore {
    /// Load a raw blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// JSON (de)serialization on top of a [`ConfigStore`].
#[derive(Debug)]
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Load `key`. Missing or empty blobs are `Ok(None)`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist `value` under `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Best-effort load: returns the stored value, or the default (persisting
    /// it once when the key is absent). Failures are logged, never returned.
    pub fn load_or_init<T>(&self, key: &str) -> T
    where
        T: Default + Serialize + DeserializeOwned,
    {
        match self.load::<T>(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                let value = T::default();
                if let Err(err) = self.save(key, &value) {
                    warn!(%key, ?err, "could not persist default config");
                }
                value
            }
            Err(err) => {
                warn!(%key, ?err, "unreadable config; using defaults");
                T::default()
            }
        }
    }
}

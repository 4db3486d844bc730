use super::kv::KeyValueStore;
use super::STORAGE_KEY;
use crate::error::{CompanionError, Result};
use crate::model::{PersistedState, SCHEMA_VERSION};
use tracing::{debug, error};

/// Loads and saves the whole [`PersistedState`] under one key.
///
/// The adapter never holds state of its own: it is handed copies to save and
/// hands back fresh values on load.
pub struct LocalAdapter<K: KeyValueStore> {
    kv: K,
    key: String,
}

impl<K: KeyValueStore> LocalAdapter<K> {
    pub fn new(kv: K) -> Self {
        Self::with_key(kv, STORAGE_KEY)
    }

    pub fn with_key(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// The stored state, or `None` when nothing usable is stored.
    ///
    /// Read and parse failures are logged, never returned. State written by a
    /// newer schema is refused so a later save cannot downgrade it.
    pub fn load(&self) -> Option<PersistedState> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!(key = %self.key, "no persisted state");
                return None;
            }
            Err(err) => {
                error!(key = %self.key, error = %err, "Failed to read persisted state");
                return None;
            }
        };

        match serde_json::from_str::<PersistedState>(&raw) {
            Ok(state) if state.schema_version > SCHEMA_VERSION => {
                error!(
                    key = %self.key,
                    found = state.schema_version,
                    supported = SCHEMA_VERSION,
                    "Persisted state is from a newer schema"
                );
                None
            }
            Ok(state) => Some(state),
            Err(err) => {
                error!(key = %self.key, error = %err, "Failed to parse persisted state");
                None
            }
        }
    }

    /// The `schemaVersion` of the stored blob, if there is one to read.
    pub fn stored_schema_version(&self) -> Option<u32> {
        let raw = self.kv.get(&self.key).ok().flatten()?;
        let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
        value
            .get("schemaVersion")?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
    }

    /// Overwrites whatever was stored before.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let value = serde_json::to_string(state).map_err(CompanionError::Serialization)?;
        self.kv.set(&self.key, &value)
    }

    pub fn clear(&self) -> Result<()> {
        self.kv.remove(&self.key)
    }
}

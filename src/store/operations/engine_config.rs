use crate::engine::config::EngineConfig;
use crate::store::keys;
use crate::store::{Store, StoreError};

const CONFIG_TYPE: &str = "engine";

impl Store {
    /// Persisted engine config, if any was saved.
    pub fn get_engine_config(&self) -> Result<Option<EngineConfig>, StoreError> {
        let key = keys::config_latest_key(CONFIG_TYPE);
        match self.config_versions.get(key.as_bytes())? {
            Some(raw) => match serde_json::from_slice::<EngineConfig>(&raw) {
                Ok(parsed) => Ok(Some(parsed)),
                Err(error) => {
                    tracing::error!(error = %error, "Failed to deserialize engine config");
                    Err(StoreError::Serialization(error))
                }
            },
            None => Ok(None),
        }
    }

    /// Writes the config as the latest and as a numbered history entry. Returns the version.
    pub fn save_engine_config(&self, config: &EngineConfig) -> Result<u32, StoreError> {
        let prefix = format!("{CONFIG_TYPE}:");
        let latest = keys::config_latest_key(CONFIG_TYPE);
        let mut version = 0u32;
        for item in self.config_versions.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            if key.as_ref() == latest.as_bytes() {
                continue;
            }
            let parsed = std::str::from_utf8(&key)
                .ok()
                .and_then(|k| k.strip_prefix(prefix.as_str()))
                .and_then(|v| v.parse::<u32>().ok());
            if let Some(v) = parsed {
                version = version.max(v);
            }
        }
        let next = version + 1;
        let bytes = Self::serialize(config)?;

        let mut batch = sled::Batch::default();
        batch.insert(keys::config_version_key(CONFIG_TYPE, next).as_bytes(), bytes.clone());
        batch.insert(latest.as_bytes(), bytes);
        self.config_versions.apply_batch(batch)?;
        Ok(next)
    }
}

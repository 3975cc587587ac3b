//! Preset Store for qrstudio.
//!
//! Named snapshots of render options, persisted as one JSON object
//! (name -> options) under a fixed storage key.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::database::{Database, KeyValueStore};
use crate::types::errors::{CustomizationError, StorageError};
use crate::types::record::{is_valid_hex_color, RenderOptions};

/// Storage key holding the serialized presets.
pub const PRESET_STORAGE_KEY: &str = "qrcode_presets";

/// Trait defining preset operations.
pub trait PresetStoreTrait {
    fn save(&mut self, name: &str, options: &RenderOptions) -> Result<(), CustomizationError>;
    fn load(&self, name: &str) -> Result<RenderOptions, CustomizationError>;
    fn list(&self) -> Vec<String>;
    fn delete(&mut self, name: &str) -> Result<bool, StorageError>;
}

pub struct PresetStore {
    db: Arc<Database>,
}

impl PresetStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn read_all(&self) -> BTreeMap<String, RenderOptions> {
        let raw = match self.db.get_item(PRESET_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                log::warn!("presets unreadable: {}", e);
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("presets corrupt, ignoring: {}", e);
            BTreeMap::new()
        })
    }

    fn write_all(&self, presets: &BTreeMap<String, RenderOptions>) -> Result<(), StorageError> {
        let json = serde_json::to_string(presets)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.db.set_item(PRESET_STORAGE_KEY, &json)
    }
}

impl PresetStoreTrait for PresetStore {
    /// Stores `options` under `name`, replacing an existing preset.
    fn save(&mut self, name: &str, options: &RenderOptions) -> Result<(), CustomizationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CustomizationError::InvalidValue {
                field: "name".to_string(),
                reason: "preset name cannot be empty".to_string(),
            });
        }
        for color in [&options.color_dark, &options.color_light] {
            if !is_valid_hex_color(color) {
                return Err(CustomizationError::InvalidColor(color.clone()));
            }
        }

        let mut presets = self.read_all();
        presets.insert(name.to_string(), options.clone());
        self.write_all(&presets)?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<RenderOptions, CustomizationError> {
        self.read_all()
            .remove(name.trim())
            .ok_or_else(|| CustomizationError::PresetNotFound(name.to_string()))
    }

    /// Preset names in alphabetical order.
    fn list(&self) -> Vec<String> {
        self.read_all().into_keys().collect()
    }

    fn delete(&mut self, name: &str) -> Result<bool, StorageError> {
        let mut presets = self.read_all();
        if presets.remove(name.trim()).is_none() {
            return Ok(false);
        }
        self.write_all(&presets)?;
        Ok(true)
    }
}

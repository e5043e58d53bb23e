//! Configuration management for imagenotes.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "imagenotes";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "notes.db";

/// Default name of the slot holding the note sequence.
pub const DEFAULT_SLOT_KEY: &str = "imageNotes";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `IMAGENOTES_`)
/// 2. TOML config file at `~/.config/imagenotes/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Image handling configuration.
    pub image: ImageConfig,
    /// Rendering and prompt configuration.
    pub view: ViewConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/imagenotes/notes.db`
    pub database_path: Option<PathBuf>,
    /// Key of the slot that holds the serialized notes.
    pub slot_key: String,
    /// Treat unreadable slot content as "no notes" instead of failing.
    pub discard_corrupt_slot: bool,
}

/// Image-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Largest image accepted, in bytes. Set to 0 for unlimited.
    pub max_bytes: u64,
    /// MIME types that may be embedded.
    pub allowed_types: Vec<String>,
}

/// Rendering and prompt configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// strftime format for the date shown on each card.
    pub date_format: String,
    /// Page title used by `render`.
    pub title: String,
    /// Text shown when there are no notes.
    pub placeholder: String,
    /// Question asked before a note is deleted.
    pub confirm_delete: String,
    /// Alert shown when the form is incomplete.
    pub validation_message: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            discard_corrupt_slot: false,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_types: default_allowed_types(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            date_format: "%-m/%-d/%Y".to_string(),
            title: "Image Notes".to_string(),
            placeholder: "No notes yet. Add your first note above!".to_string(),
            confirm_delete: "Are you sure you want to delete this note?".to_string(),
            validation_message: "Please select an image and enter a description".to_string(),
        }
    }
}

/// Image types a browser can display from a data URL.
fn default_allowed_types() -> Vec<String> {
    vec![
        "image/png".to_string(),
        "image/jpeg".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
        "image/bmp".to_string(),
        "image/svg+xml".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("IMAGENOTES_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.slot_key must not be empty".to_string(),
            });
        }

        if self.image.allowed_types.is_empty() {
            return Err(Error::ConfigValidation {
                message: "image.allowed_types must list at least one type".to_string(),
            });
        }

        let mime = regex::Regex::new(r"^image/[a-z0-9][a-z0-9.+-]*$")
            .map_err(|e| Error::internal(e.to_string()))?;
        for allowed in &self.image.allowed_types {
            if !mime.is_match(allowed) {
                return Err(Error::ConfigValidation {
                    message: format!("invalid image type: {allowed}"),
                });
            }
        }

        if self.view.date_format.is_empty()
            || StrftimeItems::new(&self.view.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(Error::ConfigValidation {
                message: format!("invalid date_format: {:?}", self.view.date_format),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the image size limit, `None` when unlimited.
    #[must_use]
    pub fn max_image_bytes(&self) -> Option<u64> {
        (self.image.max_bytes > 0).then_some(self.image.max_bytes)
    }
}

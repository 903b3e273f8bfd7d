//! Configuration loading for the inquiry store
//!
//! Supports resolving the SQLite database location from (in order of
//! priority):
//! 1. JSON settings file (~/.config/aisle/inquiry-store.json)
//! 2. Runtime environment variable (fallback)
//! 3. The default location in the Aisle data directory

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::SqliteInquiryStore;

/// Settings filename in the Aisle config directory
const STORE_SETTINGS_FILE: &str = "inquiry-store.json";

/// Environment variable overriding the database location
const DB_PATH_ENV: &str = "AISLE_INQUIRY_DB";

/// Resolved settings for the persistent inquiry store
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub database_path: PathBuf,
}

/// Settings file format
#[derive(Deserialize)]
struct StoreSettingsFile {
    database_path: PathBuf,
}

impl StoreSettings {
    /// Load settings using the following priority:
    /// 1. JSON file (~/.config/aisle/inquiry-store.json)
    /// 2. AISLE_INQUIRY_DB environment variable
    /// 3. Default path under the Aisle data directory
    pub fn load() -> Result<Self> {
        if config::config_exists(STORE_SETTINGS_FILE) {
            let file: StoreSettingsFile = config::load_json(STORE_SETTINGS_FILE)?;
            return Ok(Self {
                database_path: file.database_path,
            });
        }

        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            return Ok(Self {
                database_path: PathBuf::from(path),
            });
        }

        let data_dir = config::ensure_data_dir()?;
        Ok(Self {
            database_path: data_dir.join("inquiries.sqlite"),
        })
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: StoreSettingsFile = config::load_json_file(path)?;
        Ok(Self {
            database_path: file.database_path,
        })
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let file: StoreSettingsFile =
            serde_json::from_str(json).context("Failed to parse store settings JSON")?;
        Ok(Self {
            database_path: file.database_path,
        })
    }

    /// Get the default settings file path (~/.config/aisle/inquiry-store.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(STORE_SETTINGS_FILE)
    }

    /// Open the SQLite store at the configured location
    pub fn open(&self) -> Result<SqliteInquiryStore> {
        SqliteInquiryStore::new(&self.database_path)
    }
}

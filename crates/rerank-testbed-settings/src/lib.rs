use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestbedSettings {
    pub api_base: String,
}

impl Default for TestbedSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl TestbedSettings {
    pub fn new(api_base: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            api_base: normalize_api_base(api_base)?,
        })
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid api base: {0}")]
    InvalidApiBase(String),
}

/// Where settings live between runs. Read once at startup, written when a
/// value changes.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Option<TestbedSettings>, SettingsError>;
    fn save(&self, settings: &TestbedSettings) -> Result<(), SettingsError>;
    fn clear(&self) -> Result<(), SettingsError>;
}

pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Option<TestbedSettings>, SettingsError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let settings: TestbedSettings = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), "loaded settings");
        Ok(Some(settings))
    }

    fn save(&self, settings: &TestbedSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, bytes)?;
        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    fn clear(&self) -> Result<(), SettingsError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: Mutex<Option<TestbedSettings>>,
    writes: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn with(settings: TestbedSettings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
            writes: Mutex::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<TestbedSettings>, SettingsError> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, settings: &TestbedSettings) -> Result<(), SettingsError> {
        *self.saved.lock() = Some(settings.clone());
        *self.writes.lock() += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), SettingsError> {
        *self.saved.lock() = None;
        Ok(())
    }
}

/// Trims whitespace and trailing slashes; the result must be an
/// `http://` or `https://` URL with a host.
pub fn normalize_api_base(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(trimmed.to_string()),
        _ => Err(SettingsError::InvalidApiBase(raw.to_string())),
    }
}

/// Override (flag or environment) beats the stored value, which beats the
/// built-in default.
pub fn resolve_settings(
    api_base_override: Option<&str>,
    store: &dyn SettingsStore,
) -> Result<TestbedSettings, SettingsError> {
    if let Some(raw) = api_base_override {
        return TestbedSettings::new(raw);
    }
    Ok(store.load()?.unwrap_or_default())
}

/// Persists a new API base only when it differs from the stored one.
/// Returns whether a write happened.
pub fn update_api_base(store: &dyn SettingsStore, raw: &str) -> Result<bool, SettingsError> {
    let next = TestbedSettings::new(raw)?;
    if store.load()?.as_ref() == Some(&next) {
        return Ok(false);
    }
    store.save(&next)?;
    Ok(true)
}

pub fn default_settings_path() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from("./data/testbed-settings.json"),
        |home| home.join(".rerank-testbed").join("settings.json"),
    )
}

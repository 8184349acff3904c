use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_LOG_CAPACITY, DEFAULT_PING_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS,
    DEFAULT_PROBE_URL, LANG_STORAGE_KEY,
};
use crate::models::Lang;
use crate::network::ConnectionInfo;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.yaml";
const PREFERENCES_FILE: &str = "preferences.yaml";

/// User-editable settings, read from `settings.yaml`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interval between sampling ticks
    pub ping_interval_ms: u64,
    /// Resource fetched by the latency probe
    pub probe_url: String,
    pub probe_timeout_ms: u64,
    /// Events kept in the log panel
    pub log_capacity: usize,
    /// Where exported event logs are written; the download dir when unset
    pub export_dir: Option<PathBuf>,
    /// Fixed connectivity figures reported in place of a host API
    pub connectivity: Option<ConnectionInfo>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ping_interval_ms: DEFAULT_PING_INTERVAL_MS,
            probe_url: DEFAULT_PROBE_URL.to_string(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            log_capacity: DEFAULT_LOG_CAPACITY,
            export_dir: None,
            connectivity: None,
        }
    }
}

impl Settings {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(1))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Settings and the small key/value preference store on disk
pub struct Storage {
    pub settings: Settings,
    preferences: BTreeMap<String, String>,
    config_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);
        Self::with_dir(config_dir)
    }

    /// Storage rooted at `config_dir`; missing or unreadable files give defaults
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        let mut storage = Storage {
            settings: Settings::default(),
            preferences: BTreeMap::new(),
            config_dir: config_dir.into(),
        };
        storage.load_all();
        storage
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Load settings and preferences from disk. Each file falls back to its
    /// defaults on its own, so a broken settings file keeps the preferences.
    pub fn load_all(&mut self) {
        match read_yaml(&self.config_dir.join(SETTINGS_FILE)) {
            Ok(Some(settings)) => self.settings = settings,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "Falling back to default settings"),
        }

        match read_yaml(&self.config_dir.join(PREFERENCES_FILE)) {
            Ok(Some(preferences)) => self.preferences = preferences,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "Ignoring saved preferences"),
        }
    }

    /// Save the current settings (writes a template on first run)
    pub fn save_settings(&self) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(&self.settings)?;
        fs::write(self.config_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.preferences.get(key).map(String::as_str)
    }

    /// Store a preference and write the preference file
    pub fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.preferences.insert(key.to_string(), value.to_string());
        self.ensure_dir()?;
        let content = serde_yaml::to_string(&self.preferences)?;
        fs::write(self.config_dir.join(PREFERENCES_FILE), content)?;
        Ok(())
    }

    /// Saved language, `en` when unset or unrecognized
    pub fn lang(&self) -> Lang {
        match self.get_item(LANG_STORAGE_KEY) {
            Some("ur") => Lang::Ur,
            _ => Lang::En,
        }
    }

    pub fn save_lang(&mut self, lang: Lang) -> Result<()> {
        self.set_item(LANG_STORAGE_KEY, lang.as_str())
    }
}

/// Parse a YAML file; `None` when it does not exist
fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid {}", path.display()))?;
    Ok(Some(value))
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempdir().unwrap();
        let storage = Storage::with_dir(dir.path().join("missing"));
        assert_eq!(storage.settings, Settings::default());
        assert_eq!(storage.settings.ping_interval(), Duration::from_millis(15_000));
        assert_eq!(storage.lang(), Lang::En);
    }

    #[test]
    fn test_lang_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let mut storage = Storage::with_dir(dir.path());
        storage.save_lang(Lang::Ur).unwrap();

        let content = fs::read_to_string(dir.path().join(PREFERENCES_FILE)).unwrap();
        assert!(content.contains("app_lang: ur"));

        let reloaded = Storage::with_dir(dir.path());
        assert_eq!(reloaded.lang(), Lang::Ur);
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "ping_interval_ms: 5000\nconnectivity:\n  downlink: 12.5\n  rtt: 60\n",
        )
        .unwrap();

        let storage = Storage::with_dir(dir.path());
        assert_eq!(storage.settings.ping_interval_ms, 5000);
        assert_eq!(storage.settings.probe_url, DEFAULT_PROBE_URL);
        let conn = storage.settings.connectivity.unwrap();
        assert_eq!(conn.downlink, Some(12.5));
        assert_eq!(conn.effective_type, None);
    }

    #[test]
    fn test_invalid_settings_fall_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "ping_interval_ms: [not a number").unwrap();
        let storage = Storage::with_dir(dir.path());
        assert_eq!(storage.settings, Settings::default());
    }

    #[test]
    fn test_invalid_settings_keep_preferences() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), "app_lang: ur\n").unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "ping_interval_ms: [not a number").unwrap();

        let storage = Storage::with_dir(dir.path());
        assert_eq!(storage.settings, Settings::default());
        assert_eq!(storage.lang(), Lang::Ur);
    }

    #[test]
    fn test_invalid_preferences_keep_settings() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "ping_interval_ms: 5000\n").unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), "- not\n- a map\n").unwrap();

        let storage = Storage::with_dir(dir.path());
        assert_eq!(storage.settings.ping_interval_ms, 5000);
        assert_eq!(storage.lang(), Lang::En);
    }

    #[test]
    fn test_save_settings_template() {
        let dir = tempdir().unwrap();
        let storage = Storage::with_dir(dir.path().join("cfg"));
        storage.save_settings().unwrap();
        let reloaded = Storage::with_dir(dir.path().join("cfg"));
        assert_eq!(reloaded.settings, storage.settings);
    }
}

use std::{collections::HashMap, fs, path::PathBuf, sync::Mutex};

use serde::{Deserialize, Serialize};

use crate::utils;

const DEFAULT_SHEET_ID: &str = "1LAfG4Nt2g_P12HMCx-wEmWpXoX3yp1qAKdw89eLbeWU";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub sheet_url: Option<String>,
    /// UI theme ("dark"/"light"); owned by the rendering layer, stored here
    /// so it survives restarts alongside the rest of the app state.
    pub theme: Option<String>,
    /// Extra name→asset image overrides, merged over the bundled table.
    pub image_overrides: HashMap<String, String>,
}

impl AppConfig {
    /// Export URL of the sheet, falling back to the published default.
    pub fn sheet_url(&self) -> String {
        self.sheet_url.clone().unwrap_or_else(|| {
            format!("https://docs.google.com/spreadsheets/d/{DEFAULT_SHEET_ID}/export?format=csv")
        })
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::load_from(utils::config_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let data = read_config(&path).unwrap_or_default();
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn read(&self) -> AppConfig {
        self.data.lock().expect("config mutex poisoned").clone()
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig, ConfigError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.data.lock().expect("config mutex poisoned");
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &PathBuf) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_config(path: &PathBuf, config: &AppConfig) -> Result<(), ConfigError> {
    utils::ensure_parent(path);
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_sheet_url_points_at_the_published_export() {
        let config = AppConfig::default();
        assert!(config.sheet_url().ends_with("export?format=csv"));
    }

    #[test]
    fn update_round_trips_through_disk() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.json");

        let store = ConfigStore::load_from(path.clone());
        store
            .update(|config| {
                config.theme = Some("dark".to_string());
                config
                    .image_overrides
                    .insert("beije".to_string(), "./assets/beije2.png".to_string());
            })
            .unwrap();

        let reloaded = ConfigStore::load_from(path);
        let config = reloaded.read();
        assert_eq!(config.theme.as_deref(), Some("dark"));
        assert_eq!(
            config.image_overrides.get("beije").map(String::as_str),
            Some("./assets/beije2.png")
        );
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().expect("temp dir");
        let store = ConfigStore::load_from(dir.path().join("config.json"));
        assert!(store.read().sheet_url.is_none());
    }
}

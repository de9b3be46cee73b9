// Settings - persisted key/value store backing themes, layouts and
// feature switches (TOML file in the platform config directory)

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{QuayError, Result};

pub const KEY_THEME: &str = "appearance.theme";
pub const KEY_LAYOUT: &str = "appearance.layout";
pub const FEATURE_JUMP_FUZZY: &str = "jump.fuzzy";
pub const FEATURE_LAUNCH_OVERVIEW: &str = "overview.launch";
pub const FEATURE_FOLLOW_LOGS: &str = "logs.follow";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Settings {
    /// Load from the platform config directory. A missing file is a
    /// fresh install, not an error.
    pub fn load() -> Result<Self> {
        let Some(dirs) = ProjectDirs::from("", "", "quay-control") else {
            return Ok(Self::default());
        };
        Self::from_path(dirs.config_dir().join("settings.toml"))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        let mut settings = Self {
            values: BTreeMap::new(),
            path: Some(path.clone()),
        };
        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            settings.values =
                toml::from_str(&raw).map_err(|e| QuayError::Settings(e.to_string()))?;
        }
        Ok(settings)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Lenient boolean coercion for hand-edited files.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(&self.values)
            .map_err(|e| QuayError::Settings(e.to_string()))?;
        fs::write(path, raw)?;
        Ok(())
    }
}

//! Settings parser for .pagenav/config.toml

use super::types::NavigationSettings;
use pagenav_core::prelude::*;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.toml";
const PAGENAV_DIR: &str = ".pagenav";

/// Load settings from .pagenav/config.toml
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(project_path: &Path) -> NavigationSettings {
    let config_path = project_path.join(PAGENAV_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return NavigationSettings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                NavigationSettings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            NavigationSettings::default()
        }
    }
}

/// Parse settings from a TOML string, surfacing parse errors
pub fn parse_settings(content: &str) -> Result<NavigationSettings> {
    Ok(toml::from_str(content)?)
}

/// Save settings to .pagenav/config.toml, creating the directory if needed
pub fn save_settings(project_path: &Path, settings: &NavigationSettings) -> Result<()> {
    let dir = project_path.join(PAGENAV_DIR);
    std::fs::create_dir_all(&dir)?;

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;

    std::fs::write(dir.join(CONFIG_FILENAME), content)?;
    debug!("Saved settings to {:?}", dir.join(CONFIG_FILENAME));
    Ok(())
}

/// Create a default config file in .pagenav/ unless one already exists
pub fn init_config_dir(project_path: &Path) -> Result<()> {
    let config_path = project_path.join(PAGENAV_DIR).join(CONFIG_FILENAME);
    if config_path.exists() {
        debug!("Config already present at {:?}", config_path);
        return Ok(());
    }
    save_settings(project_path, &NavigationSettings::default())
}

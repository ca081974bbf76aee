// Configuration loader
// Loads settings from <work_dir>/config.toml, then the user config dir, then defaults

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::constants::CONFIG_FILE_NAME;
use super::settings::Config;

/// Load configuration for a run rooted at `work_dir`.
///
/// Lookup order (first hit wins):
/// 1. `<work_dir>/config.toml` (per project)
/// 2. `<user config dir>/grace-ctx/config.toml`
/// 3. built-in defaults
pub fn load_config(work_dir: &Path) -> Result<Config> {
    let project_config = work_dir.join(CONFIG_FILE_NAME);
    if project_config.exists() {
        return load_config_from(&project_config, work_dir);
    }

    if let Some(user_dir) = dirs::config_dir() {
        let user_config = user_dir.join("grace-ctx").join(CONFIG_FILE_NAME);
        if user_config.exists() {
            return load_config_from(&user_config, work_dir);
        }
    }

    debug!("No config file found, using defaults");
    Ok(Config::with_work_dir(work_dir))
}

/// Parse a specific config file. A malformed file is a hard error.
pub fn load_config_from(path: &Path, work_dir: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.work_dir = work_dir.to_path_buf();

    info!("Loaded config from {}", path.display());
    Ok(config)
}

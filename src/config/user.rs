//! Options file loading.
//!
//! Options can be kept in a TOML or JSON file using the same camelCase keys
//! the in-memory options use. The user-wide default location is
//! $XDG_CONFIG_HOME/xtext-web-client/options.toml, falling back to the
//! platform config directory.

use std::path::{Path, PathBuf};

use super::settings::ServiceOptions;
use crate::error::{ServiceError, ServiceResult};

const CONFIG_DIR_NAME: &str = "xtext-web-client";
const CONFIG_FILE_NAME: &str = "options.toml";

/// Returns the path to the user options file.
///
/// Returns None if neither $XDG_CONFIG_HOME nor a platform config directory
/// is available.
pub fn user_options_path() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load options from a `.toml` or `.json` file, chosen by extension.
///
/// Files without a recognized extension are parsed as TOML.
pub fn load_options(path: &Path) -> ServiceResult<ServiceOptions> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let options = if is_json {
        serde_json::from_str(&content)
            .map_err(|e| ServiceError::options_file(path, e.to_string()))?
    } else {
        toml::from_str(&content).map_err(|e| ServiceError::options_file(path, e.to_string()))?
    };

    log::debug!(
        target: "xtext_web_client::config",
        "Loaded options from {}",
        path.display()
    );
    Ok(options)
}

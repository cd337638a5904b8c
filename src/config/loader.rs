//! Configuration file loading.

use std::path::Path;

use jsonc_parser::ParseOptions;

use super::{
    ConfigError,
    TranslatorSettings,
};

/// Name of the configuration file looked up in the workspace root
pub const CONFIG_FILE_NAME: &str = ".translator.json";

/// Loads the settings from `.translator.json` in the workspace root.
///
/// Comments and trailing commas are accepted.
///
/// # Returns
/// - `Ok(Some(settings))`: the file was found and parsed
/// - `Ok(None)`: no configuration file
///
/// # Errors
/// - The file cannot be read
/// - The content is not valid JSON or does not match the settings shape
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<TranslatorSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let value = jsonc_parser::parse_to_serde_value(&content, &ParseOptions::default())
        .map_err(|e| ConfigError::SyntaxError(e.to_string()))?
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
    let settings: TranslatorSettings = serde_json::from_value(value)?;

    Ok(Some(settings))
}

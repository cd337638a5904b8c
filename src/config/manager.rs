//! Settings lifecycle.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    TranslatorSettings,
    loader,
};

/// Holds the current settings and the workspace they were loaded from.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    current_settings: TranslatorSettings,

    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: TranslatorSettings::default(), workspace_root: None }
    }

    /// Loads and validates the settings of a workspace.
    ///
    /// Without a workspace, or without a configuration file in it, the defaults are used.
    /// Relative `directory` and `cache.path` values are resolved against the workspace root.
    ///
    /// # Errors
    /// - The configuration file cannot be read or parsed
    /// - The settings fail validation
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

        let mut settings = if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.map_or_else(TranslatorSettings::default, |ws| {
                tracing::debug!("Loaded workspace settings: {:?}", ws);
                ws
            })
        } else {
            TranslatorSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        if let Some(root) = &workspace_root {
            resolve_paths(&mut settings, root);
        }

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// Replaces the current settings after validating them.
    ///
    /// # Errors
    /// The new settings fail validation; the current ones are kept.
    pub fn update_settings(&mut self, new_settings: TranslatorSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &TranslatorSettings {
        &self.current_settings
    }

    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }
}

fn resolve_paths(settings: &mut TranslatorSettings, root: &Path) {
    if settings.directory.is_relative() {
        settings.directory = root.join(&settings.directory);
    }
    if let Some(path) = settings.cache.path.as_mut()
        && path.is_relative()
    {
        *path = root.join(&*path);
    }
}

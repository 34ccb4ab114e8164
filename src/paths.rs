//! Well-known file locations and the environment variables that override them.

use std::path::PathBuf;

/// Overrides the base config shipped with the crate.
pub const DEFAULT_CONFIG_PATH_ENV_VAR: &str = "LABELMAKER_DEFAULT_CONFIG_PATH";

/// Set to `1` to disable the base config for everyone (e.g. a facility that
/// ships its own base).
pub const DISABLE_BASE_CONFIG_ENV_VAR: &str = "LABELMAKER_DISABLE_BASE_CONFIG";

/// Path-list delimited custom config names, e.g. `SITE:SHOW`.
pub const CONFIGS_NAMES_ENV_VAR: &str = "LABELMAKER_CONFIGS_NAMES";

/// Path-list delimited custom config paths, in the same order as the names.
pub const CONFIGS_PATHS_ENV_VAR: &str = "LABELMAKER_CONFIGS_PATHS";

/// Separator for the list variables above.
#[cfg(windows)]
pub const LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const LIST_SEPARATOR: char = ':';

/// Source name reserved for the base config.
pub const BASE_SOURCE_NAME: &str = "default";

/// Source name reserved for the personal config.
pub const PERSONAL_SOURCE_NAME: &str = "personal";

/// The host's per-user settings directory (`~/.nuke`).
pub fn user_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nuke")
}

/// Base config shipped alongside the crate.
pub fn bundled_base_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/base_config.json")
}

/// Personal config location used when the preference is unset.
pub fn default_personal_config_path() -> PathBuf {
    user_dir().join("labelmaker_config.json")
}

/// Preference file location used when the caller does not supply one.
pub fn default_preferences_path() -> PathBuf {
    user_dir().join("labelmaker_preferences.json")
}

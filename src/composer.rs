//! Composition of several config sources into one effective rule mapping.
//!
//! Sources are applied in precedence order: the base config, then any custom
//! configs, then the personal config. A later source that defines a class
//! replaces that class's whole rule list; rules are never merged one by one.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{ConfigSource, RuleMap};
use crate::error::{LabelmakerError, Result};
use crate::paths::{self, BASE_SOURCE_NAME, LIST_SEPARATOR, PERSONAL_SOURCE_NAME};
use crate::prefs::{PreferenceStore, knobs};
use crate::rule::DisplayRule;

// ============================================================================
// ConfigSelection
// ============================================================================

/// Which config files to compose, in precedence order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSelection {
    pub base_path: PathBuf,
    pub use_base: bool,
    /// Set when the environment disabled the base config outright.
    pub base_locked: bool,
    /// `(name, path)` pairs, lowest precedence first.
    pub custom: Vec<(String, PathBuf)>,
    pub personal_path: PathBuf,
}

impl ConfigSelection {
    /// Reads the selection from the process environment and preferences.
    pub fn from_env(prefs: &dyn PreferenceStore) -> Self {
        Self::from_lookup(prefs, |key| std::env::var(key).ok())
    }

    /// Reads the selection through `lookup` instead of the process environment.
    pub fn from_lookup(prefs: &dyn PreferenceStore, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_path = lookup(paths::DEFAULT_CONFIG_PATH_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(paths::bundled_base_config_path);

        let base_locked = lookup(paths::DISABLE_BASE_CONFIG_ENV_VAR).as_deref() == Some("1");
        let use_base = !base_locked && prefs.get_bool(knobs::USE_BASE_CONFIG);

        let custom = match (
            lookup(paths::CONFIGS_NAMES_ENV_VAR),
            lookup(paths::CONFIGS_PATHS_ENV_VAR),
        ) {
            (Some(names), Some(config_paths)) => parse_custom(&names, &config_paths),
            _ => Vec::new(),
        };

        let personal_path = prefs
            .get_text(knobs::PERSONAL_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(paths::default_personal_config_path);

        Self {
            base_path,
            use_base,
            base_locked,
            custom,
            personal_path,
        }
    }
}

fn parse_custom(names: &str, config_paths: &str) -> Vec<(String, PathBuf)> {
    let names: Vec<&str> = names.split(LIST_SEPARATOR).collect();
    let config_paths: Vec<&str> = config_paths.split(LIST_SEPARATOR).collect();

    if names.len() != config_paths.len() {
        warn!(
            names = names.len(),
            paths = config_paths.len(),
            "Custom config names and paths differ in length; extra entries are ignored"
        );
    }

    names
        .into_iter()
        .zip(config_paths)
        .filter_map(|(name, path)| {
            if name == BASE_SOURCE_NAME || name == PERSONAL_SOURCE_NAME {
                warn!(name, "Custom config uses a reserved name; skipping");
                return None;
            }
            Some((name.to_string(), PathBuf::from(path)))
        })
        .collect()
}

// ============================================================================
// ComposedConfig
// ============================================================================

/// The sources in precedence order plus the effective rules they produce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedConfig {
    sources: Vec<ConfigSource>,
    effective: RuleMap,
}

impl ComposedConfig {
    /// Composes already-loaded sources, lowest precedence first.
    pub fn compose(sources: Vec<ConfigSource>) -> Self {
        let mut composed = Self {
            sources,
            effective: RuleMap::new(),
        };
        composed.recompose();
        composed
    }

    /// Loads every selected source whose file exists and composes them.
    ///
    /// Missing files are skipped; a malformed file is an error.
    pub fn load(selection: &ConfigSelection) -> Result<Self> {
        let mut sources = Vec::new();

        if selection.use_base {
            push_if_present(&mut sources, BASE_SOURCE_NAME, &selection.base_path)?;
        } else {
            debug!(locked = selection.base_locked, "Base config disabled");
        }

        for (name, path) in &selection.custom {
            push_if_present(&mut sources, name, path)?;
        }

        push_if_present(&mut sources, PERSONAL_SOURCE_NAME, &selection.personal_path)?;

        let composed = Self::compose(sources);
        info!(
            sources = ?composed.list_source_names(),
            classes = composed.effective.len(),
            "Composed label config"
        );
        Ok(composed)
    }

    /// Rebuilds the effective mapping from the current sources.
    ///
    /// Source edits are not picked up until this is called.
    pub fn recompose(&mut self) {
        self.effective.clear();
        for source in &self.sources {
            for (class, rules) in source.rule_map() {
                self.effective.insert(class.clone(), rules.clone());
            }
        }
    }

    /// Effective rules for a class, or `None` if no source defines it.
    pub fn get(&self, class: &str) -> Option<&[DisplayRule]> {
        self.effective.get(class).map(Vec::as_slice)
    }

    pub fn list_source_names(&self) -> Vec<&str> {
        self.sources.iter().map(ConfigSource::name).collect()
    }

    pub fn get_source(&self, name: &str) -> Result<&ConfigSource> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| LabelmakerError::UnknownSource(name.to_string()))
    }

    pub fn get_source_mut(&mut self, name: &str) -> Result<&mut ConfigSource> {
        self.sources
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| LabelmakerError::UnknownSource(name.to_string()))
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }
}

fn push_if_present(sources: &mut Vec<ConfigSource>, name: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        debug!(source = name, path = %path.display(), "Config source not found; skipping");
        return Ok(());
    }
    sources.push(ConfigSource::load(name, path)?);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

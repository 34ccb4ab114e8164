//! Prefixed, versioned preferences persisted as JSON.
//!
//! The preference file is shared with other tools: only keys starting with
//! `<prefix>_` are managed here, everything else is written back untouched.
//! Each managed knob is stored under its mangled name `<prefix>_<name>`, and
//! `<prefix>_version` records the knob layout version. Opening the store with
//! a newer version rebuilds the knobs while carrying previous values over.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{LabelmakerError, Result};
use crate::paths;

/// Knob names used by the label maker itself.
pub mod knobs {
    pub const PERSONAL_CONFIG_PATH: &str = "personal_config_path";
    pub const ALWAYS_SHOW_ALL: &str = "always_show_all";
    pub const COLORIZE_DISABLE: &str = "colorize_disable";
    pub const USE_BASE_CONFIG: &str = "use_base_config";
}

const NO_VERSION: &str = "0.0.0";

// ============================================================================
// PrefValue / PrefKnob
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Definition of one managed preference.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefKnob {
    pub name: String,
    pub label: String,
    pub tooltip: String,
    pub default: PrefValue,
    /// Session-only lock state; not persisted.
    pub enabled: bool,
}

impl PrefKnob {
    pub fn new(name: impl Into<String>, label: impl Into<String>, default: impl Into<PrefValue>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            tooltip: String::new(),
            default: default.into(),
            enabled: true,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }
}

// ============================================================================
// PreferenceStore
// ============================================================================

/// Read access to preferences, keyed by unmangled knob name.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<&PrefValue>;

    fn get_knob(&self, key: &str) -> Option<&PrefKnob>;

    /// `true` only for a stored boolean `true`.
    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(PrefValue::Bool(true)))
    }

    /// Stored text, treating an empty string as unset.
    fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(PrefValue::Text(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

#[derive(Debug)]
pub struct Preferences {
    /// `None` keeps everything in memory.
    path: Option<PathBuf>,
    prefix: String,
    tab_label: String,
    version: String,
    knobs: Vec<PrefKnob>,
    /// Managed entries, keyed by mangled name.
    values: BTreeMap<String, PrefValue>,
    /// Entries owned by other tools, preserved on save.
    foreign: Map<String, Value>,
    /// Session-only values that shadow `values` and are never saved.
    overrides: BTreeMap<String, PrefValue>,
}

impl Preferences {
    /// Opens (or creates) the preference file at `path` and installs `knobs`.
    pub fn open(
        path: impl Into<PathBuf>,
        prefix: impl Into<String>,
        tab_label: impl Into<String>,
        knobs: Vec<PrefKnob>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let path = path.into();
        let document = read_document(&path)?;
        let mut prefs = Self::new(Some(path), prefix.into(), tab_label.into(), knobs, version.into());
        prefs.absorb(document);
        prefs.install()?;
        Ok(prefs)
    }

    /// Creates a store that never touches disk.
    pub fn in_memory(
        prefix: impl Into<String>,
        tab_label: impl Into<String>,
        knobs: Vec<PrefKnob>,
        version: impl Into<String>,
    ) -> Self {
        let mut prefs = Self::new(None, prefix.into(), tab_label.into(), knobs, version.into());
        prefs.fill_knobs();
        prefs
    }

    fn new(
        path: Option<PathBuf>,
        prefix: String,
        tab_label: String,
        knobs: Vec<PrefKnob>,
        version: String,
    ) -> Self {
        Self {
            path,
            prefix,
            tab_label,
            version,
            knobs,
            values: BTreeMap::new(),
            foreign: Map::new(),
            overrides: BTreeMap::new(),
        }
    }

    fn absorb(&mut self, document: Map<String, Value>) {
        for (key, value) in document {
            if key.starts_with(&self.own_prefix()) {
                if let Ok(parsed) = serde_json::from_value::<PrefValue>(value.clone()) {
                    self.values.insert(key, parsed);
                    continue;
                }
            }
            self.foreign.insert(key, value);
        }
    }

    fn install(&mut self) -> Result<()> {
        if self.update_needed()? {
            self.update_knobs()
        } else {
            self.add_knobs()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tab_label(&self) -> &str {
        &self.tab_label
    }

    pub fn knobs(&self) -> &[PrefKnob] {
        &self.knobs
    }

    /// The layout version stored in the file, or `0.0.0`.
    pub fn existing_version(&self) -> &str {
        match self.values.get(&self.mangle("version")) {
            Some(PrefValue::Text(v)) => v.as_str(),
            _ => NO_VERSION,
        }
    }

    /// Sets a managed value and saves immediately.
    pub fn set(&mut self, key: &str, value: impl Into<PrefValue>) -> Result<()> {
        let key = self.mangle(key);
        self.values.insert(key, value.into());
        self.save()
    }

    /// Overrides a value for this session without touching the file.
    ///
    /// The stored value is still what [`save`](Self::save) writes, and what
    /// the next [`open`](Self::open) reads.
    pub fn override_for_session(&mut self, key: &str, value: impl Into<PrefValue>) {
        let key = self.mangle(key);
        self.overrides.insert(key, value.into());
    }

    /// Locks or unlocks a knob for this session. Returns `false` for unknown knobs.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.knobs.iter_mut().find(|k| k.name == key) {
            Some(knob) => {
                knob.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Writes managed and foreign entries back to the file.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut document = self.foreign.clone();
        for (key, value) in &self.values {
            let value = serde_json::to_value(value).map_err(|e| LabelmakerError::json(path, e))?;
            document.insert(key.clone(), value);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| LabelmakerError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&document).map_err(|e| LabelmakerError::json(path, e))?;
        fs::write(path, json).map_err(|e| LabelmakerError::io(path, e))?;
        debug!(path = %path.display(), "Saved preferences");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Versioned knob management
    // ------------------------------------------------------------------------

    fn update_needed(&self) -> Result<bool> {
        if self.version == NO_VERSION {
            return Ok(false);
        }
        version_less_than(self.existing_version(), &self.version)
    }

    /// Rebuilds every managed knob, restoring previous values for knobs that
    /// still exist in the new layout.
    fn update_knobs(&mut self) -> Result<()> {
        info!(
            prefix = %self.prefix,
            from = %self.existing_version(),
            to = %self.version,
            "Migrating preferences"
        );

        let previous = std::mem::take(&mut self.values);
        self.save()?;
        self.add_knobs()?;

        for knob in &self.knobs {
            let key = self.mangle(&knob.name);
            if let Some(value) = previous.get(&key) {
                self.values.insert(key, value.clone());
            }
        }
        self.save()
    }

    /// Adds the tab marker and any missing knobs, then saves.
    fn add_knobs(&mut self) -> Result<()> {
        self.fill_knobs();
        self.save()
    }

    /// Adds the tab marker, missing knob defaults and the version stamp.
    fn fill_knobs(&mut self) {
        let tab_key = self.mangle("tab");
        self.values
            .entry(tab_key)
            .or_insert_with(|| PrefValue::Text(self.tab_label.clone()));

        for knob in &self.knobs {
            self.values
                .entry(format!("{}_{}", self.prefix, knob.name))
                .or_insert_with(|| knob.default.clone());
        }

        let version_key = self.mangle("version");
        self.values.insert(version_key, PrefValue::Text(self.version.clone()));
    }

    fn own_prefix(&self) -> String {
        format!("{}_", self.prefix)
    }

    fn mangle(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

impl PreferenceStore for Preferences {
    fn get(&self, key: &str) -> Option<&PrefValue> {
        let key = self.mangle(key);
        self.overrides.get(&key).or_else(|| self.values.get(&key))
    }

    fn get_knob(&self, key: &str) -> Option<&PrefKnob> {
        self.knobs.iter().find(|k| k.name == key)
    }
}

fn read_document(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let contents = fs::read_to_string(path).map_err(|e| LabelmakerError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| LabelmakerError::json(path, e))
}

/// Returns true if dot-separated numeric version `existing` is older than `new`.
///
/// Missing trailing components count as zero, so `0.1` equals `0.1.0`.
pub fn version_less_than(existing: &str, new: &str) -> Result<bool> {
    let mut existing = parse_version(existing)?;
    let mut new = parse_version(new)?;

    let len = existing.len().max(new.len());
    existing.resize(len, 0);
    new.resize(len, 0);

    Ok(existing < new)
}

fn parse_version(version: &str) -> Result<Vec<u64>> {
    version
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| LabelmakerError::Version(version.to_string()))
        })
        .collect()
}

// ============================================================================
// Label maker preferences
// ============================================================================

/// Prefix of every preference this crate owns.
pub const PREFIX: &str = "labelmaker";

/// Current preference layout version.
pub const VERSION: &str = "0.1.0";

/// The knobs the label maker installs.
pub fn default_knobs() -> Vec<PrefKnob> {
    vec![
        PrefKnob::new(
            knobs::PERSONAL_CONFIG_PATH,
            "Personal Config Path",
            paths::default_personal_config_path().to_string_lossy().into_owned(),
        )
        .with_tooltip(
            "This file holds your personal configuration for Labelmaker, which \
             overrides all other configs.",
        ),
        PrefKnob::new(knobs::ALWAYS_SHOW_ALL, "Always Show All Labels", false).with_tooltip(
            "By default, most labels show only if the knob value is not default. \
             This option displays all knob labels, all the time, keeping node sizes constant.",
        ),
        PrefKnob::new(knobs::COLORIZE_DISABLE, "Disable Colorization", false).with_tooltip(
            "By default, Labelmaker colorizes color knobs so you can see what they \
             are doing at a glance. Disable this if you find it distracting.",
        ),
        PrefKnob::new(knobs::USE_BASE_CONFIG, "Use Base Config", true).with_tooltip(
            "Use the base config which ships with Labelmaker in addition to any \
             custom or personal configs you have set up.",
        ),
    ]
}

/// Opens the label maker's preferences at `path`.
pub fn labelmaker_preferences(path: impl Into<PathBuf>) -> Result<Preferences> {
    Preferences::open(path, PREFIX, "Labelmaker", default_knobs(), VERSION)
}

/// In-memory label maker preferences with default values.
pub fn labelmaker_preferences_in_memory() -> Preferences {
    Preferences::in_memory(PREFIX, "Labelmaker", default_knobs(), VERSION)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn knobs_v1() -> Vec<PrefKnob> {
        vec![
            PrefKnob::new("always_show_all", "Always Show All", false),
            PrefKnob::new("legacy", "Legacy", "old"),
        ]
    }

    fn knobs_v2() -> Vec<PrefKnob> {
        vec![
            PrefKnob::new("always_show_all", "Always Show All", false),
            PrefKnob::new("colorize_disable", "Disable Colorization", false),
        ]
    }

    #[test]
    fn version_ordering() {
        assert!(version_less_than("0.0.0", "0.1.0").unwrap());
        assert!(version_less_than("0.9.9", "1.0.0").unwrap());
        assert!(!version_less_than("1.0.0", "0.1.0").unwrap());
        assert!(!version_less_than("0.1.0", "0.1.0").unwrap());
        assert!(!version_less_than("0.1", "0.1.0").unwrap());
        assert!(version_less_than("0.1", "0.1.1").unwrap());
    }

    #[test]
    fn malformed_version_errors() {
        let err = version_less_than("0.x.1", "0.1.0").unwrap_err();
        assert!(matches!(err, LabelmakerError::Version(v) if v == "0.x.1"));
    }

    #[test]
    fn fresh_file_gets_defaults_and_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let prefs = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0").unwrap();

        assert_eq!(prefs.get("always_show_all"), Some(&PrefValue::Bool(false)));
        assert_eq!(prefs.existing_version(), "0.1.0");

        let stored: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["lm_version"], Value::from("0.1.0"));
        assert_eq!(stored["lm_tab"], Value::from("LM"));
    }

    #[test]
    fn set_saves_immediately_and_keeps_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"other_tool_speed": 3}"#).unwrap();

        let mut prefs = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0").unwrap();
        prefs.set("always_show_all", true).unwrap();

        let reopened = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0").unwrap();
        assert!(reopened.get_bool("always_show_all"));

        let stored: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["other_tool_speed"], Value::from(3));
    }

    #[test]
    fn newer_version_migrates_and_keeps_surviving_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut v1 = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0").unwrap();
        v1.set("always_show_all", true).unwrap();
        drop(v1);

        let v2 = Preferences::open(&path, "lm", "LM", knobs_v2(), "0.2.0").unwrap();
        assert!(v2.get_bool("always_show_all"));
        assert_eq!(v2.get("colorize_disable"), Some(&PrefValue::Bool(false)));
        assert_eq!(v2.get("legacy"), None);
        assert_eq!(v2.existing_version(), "0.2.0");
    }

    #[test]
    fn same_version_only_adds_missing_knobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut v1 = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0").unwrap();
        v1.set("legacy", "kept").unwrap();
        drop(v1);

        let again = Preferences::open(&path, "lm", "LM", knobs_v2(), "0.1.0").unwrap();
        assert_eq!(again.get_text("legacy"), Some("kept"));
        assert_eq!(again.get("colorize_disable"), Some(&PrefValue::Bool(false)));
    }

    #[test]
    fn malformed_stored_version_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"lm_version": "one.two"}"#).unwrap();

        let result = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0");
        assert!(matches!(result, Err(LabelmakerError::Version(_))));
    }

    #[test]
    fn set_enabled_is_session_only() {
        let mut prefs = Preferences::in_memory("lm", "LM", knobs_v1(), "0.1.0");
        assert!(prefs.set_enabled("always_show_all", false));
        assert!(!prefs.get_knob("always_show_all").unwrap().enabled);
        assert!(!prefs.set_enabled("missing", false));
    }

    #[test]
    fn session_override_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut prefs = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0").unwrap();
        prefs.set("always_show_all", true).unwrap();
        prefs.override_for_session("always_show_all", false);
        assert!(!prefs.get_bool("always_show_all"));

        prefs.save().unwrap();
        let reopened = Preferences::open(&path, "lm", "LM", knobs_v1(), "0.1.0").unwrap();
        assert!(reopened.get_bool("always_show_all"));
    }

    #[test]
    fn in_memory_store_has_defaults_and_version() {
        let prefs = Preferences::in_memory("lm", "LM", knobs_v1(), "0.1.0");
        assert_eq!(prefs.get_text("legacy"), Some("old"));
        assert_eq!(prefs.get_text("tab"), Some("LM"));
        assert_eq!(prefs.existing_version(), "0.1.0");
    }

    #[test]
    fn labelmaker_defaults() {
        let prefs = labelmaker_preferences_in_memory();
        assert!(prefs.get_bool(knobs::USE_BASE_CONFIG));
        assert!(!prefs.get_bool(knobs::ALWAYS_SHOW_ALL));
        assert!(!prefs.get_bool(knobs::COLORIZE_DISABLE));
        assert!(prefs
            .get_text(knobs::PERSONAL_CONFIG_PATH)
            .is_some_and(|p| p.ends_with("labelmaker_config.json")));
    }
}

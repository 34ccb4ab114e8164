//! A single named config source backed by a JSON file.
//!
//! The file maps class identifiers to ordered rule lists:
//!
//! ```json
//! {
//!   "Blur": [{ "name": "size", "default": 0.0 }],
//!   "Grade": [{ "name": "white", "label": "gain", "default": [1, 1, 1, 1] }]
//! }
//! ```
//!
//! Structural edits save the file immediately. An edit whose save fails is
//! undone, so the source always matches what is on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{LabelmakerError, Result};
use crate::rule::DisplayRule;

/// Rules keyed by class identifier.
pub type RuleMap = BTreeMap<String, Vec<DisplayRule>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    name: String,
    path: PathBuf,
    rules: RuleMap,
}

impl ConfigSource {
    /// Loads a source from disk. Malformed JSON is an error; there is no
    /// partial load.
    pub fn load(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        let path = path.into();

        let contents = fs::read_to_string(&path).map_err(|e| LabelmakerError::io(&path, e))?;
        let rules: RuleMap =
            serde_json::from_str(&contents).map_err(|e| LabelmakerError::json(&path, e))?;

        info!(source = %name, path = %path.display(), classes = rules.len(), "Loaded config source");
        Ok(Self { name, path, rules })
    }

    /// Creates a source from in-memory rules without touching disk.
    pub fn from_rules(name: impl Into<String>, path: impl Into<PathBuf>, rules: RuleMap) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The full class → rules mapping.
    pub fn rule_map(&self) -> &RuleMap {
        &self.rules
    }

    /// Rules for a class, in display order.
    pub fn rules(&self, class: &str) -> Option<&[DisplayRule]> {
        self.rules.get(class).map(Vec::as_slice)
    }

    /// Class identifiers defined by this source.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Writes the rules back to the source's path.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.rules)
            .map_err(|e| LabelmakerError::json(&self.path, e))?;
        fs::write(&self.path, json).map_err(|e| LabelmakerError::io(&self.path, e))?;
        debug!(source = %self.name, path = %self.path.display(), "Saved config source");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------------

    /// Adds a class with the given rules.
    ///
    /// Returns `false` without writing if the class already exists.
    pub fn add_class(&mut self, class: impl Into<String>, rules: Vec<DisplayRule>) -> Result<bool> {
        let class = class.into();
        if self.rules.contains_key(&class) {
            return Ok(false);
        }
        self.rules.insert(class.clone(), rules);
        self.save_or_revert(|rules| {
            rules.remove(&class);
        })?;
        Ok(true)
    }

    /// Appends a rule to an existing class.
    pub fn add_rule(&mut self, class: &str, rule: DisplayRule) -> Result<()> {
        self.class_rules_mut(class)?.push(rule);
        self.save_or_revert(|rules| {
            if let Some(list) = rules.get_mut(class) {
                list.pop();
            }
        })
    }

    /// Moves the rule at `index` one position earlier.
    ///
    /// Returns `false` if it is already first.
    pub fn move_rule_up(&mut self, class: &str, index: usize) -> Result<bool> {
        let rules = self.checked_rules_mut(class, index)?;
        if index == 0 {
            return Ok(false);
        }
        rules.swap(index - 1, index);
        self.save_or_revert(|rules| {
            if let Some(list) = rules.get_mut(class) {
                list.swap(index - 1, index);
            }
        })?;
        Ok(true)
    }

    /// Moves the rule at `index` one position later.
    ///
    /// Returns `false` if it is already last.
    pub fn move_rule_down(&mut self, class: &str, index: usize) -> Result<bool> {
        let rules = self.checked_rules_mut(class, index)?;
        if index + 1 == rules.len() {
            return Ok(false);
        }
        rules.swap(index, index + 1);
        self.save_or_revert(|rules| {
            if let Some(list) = rules.get_mut(class) {
                list.swap(index, index + 1);
            }
        })?;
        Ok(true)
    }

    /// Saves, running `undo` on the rules if the write fails.
    fn save_or_revert(&mut self, undo: impl FnOnce(&mut RuleMap)) -> Result<()> {
        let saved = self.save();
        if saved.is_err() {
            undo(&mut self.rules);
            warn!(source = %self.name, "Config save failed; edit undone");
        }
        saved
    }

    fn class_rules_mut(&mut self, class: &str) -> Result<&mut Vec<DisplayRule>> {
        self.rules
            .get_mut(class)
            .ok_or_else(|| LabelmakerError::UnknownClass(class.to_string()))
    }

    fn checked_rules_mut(&mut self, class: &str, index: usize) -> Result<&mut Vec<DisplayRule>> {
        let rules = self.class_rules_mut(class)?;
        if index >= rules.len() {
            return Err(LabelmakerError::RuleIndex {
                class: class.to_string(),
                index,
                len: rules.len(),
            });
        }
        Ok(rules)
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Mapping from a node's internal class to the class shown in its label.
//!
//! Versioned classes collapse to their base name (`Merge2` → `Merge`), and
//! OFX plugin classes such as `OFXcom.example.denoise_v2` are shown under the
//! name the host's node menu gives them.

use std::collections::HashMap;

use tracing::debug;

/// Built-in mappings for versioned host classes.
const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("Merge2", "Merge"),
    ("Camera2", "Camera"),
    ("ReadGeo2", "ReadGeo"),
    ("Card2", "Card"),
    ("DeepColorCorrect2", "DeepColorCorrect"),
    ("CheckerBoard2", "CheckerBoard"),
];

/// One entry of the host's node creation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Menu { name: String, items: Vec<MenuEntry> },
    Item { name: String, script: String },
}

impl MenuEntry {
    /// All `(name, script)` leaves below this entry, depth first.
    pub fn leaves(&self) -> Vec<(&str, &str)> {
        match self {
            Self::Item { name, script } => vec![(name.as_str(), script.as_str())],
            Self::Menu { items, .. } => items.iter().flat_map(MenuEntry::leaves).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMappings {
    mappings: HashMap<String, String>,
}

impl Default for ClassMappings {
    fn default() -> Self {
        let mappings = BUILTIN_MAPPINGS
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self { mappings }
    }
}

impl ClassMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The display class for `class`; unmapped classes show as themselves.
    pub fn display_class<'a>(&'a self, class: &'a str) -> &'a str {
        self.mappings.get(class).map(String::as_str).unwrap_or(class)
    }

    pub fn insert(&mut self, class: impl Into<String>, display: impl Into<String>) {
        self.mappings.insert(class.into(), display.into());
    }

    /// Adds a mapping for every OFX plugin found in the host's node menu.
    ///
    /// Returns the number of mappings added or replaced.
    pub fn register_menu(&mut self, menu: &MenuEntry) -> usize {
        let mut added = 0;
        for (name, script) in menu.leaves() {
            if !script.contains("OFX") {
                continue;
            }
            if let Some(class) = find_ofx_class(script) {
                debug!(class, display = name, "Mapped OFX class");
                self.insert(class, name);
                added += 1;
            }
        }
        added
    }
}

/// Extracts an OFX class id from a menu script.
///
/// The id runs from `OFX` to the last quote on the same line, e.g.
/// `nuke.createNode("OFXuk.co.thefoundry.noisetools.denoise_v100")` yields
/// `OFXuk.co.thefoundry.noisetools.denoise_v100`.
pub fn find_ofx_class(script: &str) -> Option<&str> {
    script.match_indices("OFX").find_map(|(start, _)| {
        let line = script[start..].split('\n').next().unwrap_or_default();
        line.rfind(['"', '\'']).map(|end| &line[..end])
    })
}

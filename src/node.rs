//! Read-only view of the node being labelled.
//!
//! The host implements [`Node`] over its live objects. [`NodeSnapshot`] is an
//! owned implementation that can be built in code or deserialized from JSON:
//!
//! ```json
//! {
//!   "class": "Grade",
//!   "name": "Grade3",
//!   "attributes": {
//!     "white": { "value": [1.2, 1.0, 0.9, 1.0], "kind": "color" },
//!     "mix": { "value": 0.75 }
//!   },
//!   "flags": { "has_keyframes": true }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{AttrValue, Attribute};

// ============================================================================
// Node
// ============================================================================

/// Attribute introspection for one node.
///
/// Looking up an attribute the node does not have returns `None`; it is
/// never an error.
pub trait Node {
    /// The node's internal class, e.g. `Merge2`.
    fn class(&self) -> &str;

    /// The node's display name, e.g. `Merge12`.
    fn name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<Attribute>;

    fn flags(&self) -> NodeFlags;

    /// The attribute's value as text, the way the host would print it.
    fn attribute_text(&self, name: &str) -> Option<String> {
        self.attribute(name).map(|attr| attr.value.to_string())
    }
}

// ============================================================================
// NodeFlags / Indicators
// ============================================================================

/// State predicates the host reports alongside attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFlags {
    pub has_keyframes: bool,
    pub has_expression: bool,
    pub is_clone: bool,
    pub has_view_split: bool,
    /// A mask channel is routed in from the main input.
    pub mask_connected: bool,
    pub mix_below_one: bool,
    /// The side mask input has something plugged into it.
    pub mask_input_plugged: bool,
}

/// Indicator bitmask shown by the host next to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Indicators(u8);

impl Indicators {
    pub const KEYFRAMES: u8 = 1;
    pub const EXPRESSION: u8 = 2;
    pub const MASK: u8 = 4;
    pub const CLONES: u8 = 8;
    pub const MIX_BELOW_ONE: u8 = 16;
    pub const VIEW_SPLIT: u8 = 32;

    pub fn from_flags(flags: &NodeFlags) -> Self {
        let mut bits = 0;
        for (set, bit) in [
            (flags.has_keyframes, Self::KEYFRAMES),
            (flags.has_expression, Self::EXPRESSION),
            (flags.mask_connected, Self::MASK),
            (flags.is_clone, Self::CLONES),
            (flags.mix_below_one, Self::MIX_BELOW_ONE),
            (flags.has_view_split, Self::VIEW_SPLIT),
        ] {
            if set {
                bits |= bit;
            }
        }
        Self(bits)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, bit: u8) -> bool {
        self.0 & bit == bit
    }
}

// ============================================================================
// NodeSnapshot
// ============================================================================

/// An owned copy of a node's state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub class: String,
    pub name: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,

    #[serde(default)]
    pub flags: NodeFlags,
}

impl NodeSnapshot {
    pub fn new(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), Attribute::new(value));
        self
    }

    pub fn with_color(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), Attribute::color(value));
        self
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Node for NodeSnapshot {
    fn class(&self) -> &str {
        &self.class
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes.get(name).cloned()
    }

    fn flags(&self) -> NodeFlags {
        self.flags
    }
}

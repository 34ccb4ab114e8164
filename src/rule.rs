//! Display rules: one entry per attribute (or template) shown in a label.
//!
//! On disk a rule is a flat JSON object discriminated by which of `name` or
//! `tcl_string` is present:
//!
//! ```json
//! { "name": "size", "default": 0.0 }
//! { "name": "white", "label": "gain", "default": [1, 1, 1, 1] }
//! { "tcl_string": "[value first]-[value last]" }
//! ```

use serde::{Deserialize, Serialize};

use crate::value::AttrValue;

// ============================================================================
// RuleTarget
// ============================================================================

/// What a rule reads from the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    /// A named attribute looked up on the node.
    Attribute(String),
    /// A template string evaluated by the host.
    Expression(String),
}

// ============================================================================
// DisplayRule
// ============================================================================

/// A single display rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleEntry", into = "RuleEntry")]
pub struct DisplayRule {
    pub target: RuleTarget,

    /// Readout label. Falls back to the attribute name.
    pub label: Option<String>,

    /// Value the attribute is compared against. `None` means always shown.
    pub default: Option<AttrValue>,

    pub always_show: bool,

    /// `None` colorizes color attributes; `Some(false)` opts out.
    pub colorize: Option<bool>,
}

impl DisplayRule {
    /// Creates a rule reading the named attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::with_target(RuleTarget::Attribute(name.into()))
    }

    /// Creates a rule evaluating a host template.
    pub fn expression(template: impl Into<String>) -> Self {
        Self::with_target(RuleTarget::Expression(template.into()))
    }

    fn with_target(target: RuleTarget) -> Self {
        Self {
            target,
            label: None,
            default: None,
            always_show: false,
            colorize: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<AttrValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_always_show(mut self, always_show: bool) -> Self {
        self.always_show = always_show;
        self
    }

    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = Some(colorize);
        self
    }

    /// The attribute name, for attribute rules.
    pub fn name(&self) -> Option<&str> {
        match &self.target {
            RuleTarget::Attribute(name) => Some(name),
            RuleTarget::Expression(_) => None,
        }
    }

    /// The label shown before the value.
    pub fn display_label(&self) -> &str {
        match (&self.label, &self.target) {
            (Some(label), _) => label,
            (None, RuleTarget::Attribute(name)) => name,
            (None, RuleTarget::Expression(template)) => template,
        }
    }

    /// Whether a color attribute should be rendered as a colored swatch.
    pub fn wants_colorize(&self) -> bool {
        self.colorize.unwrap_or(true)
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// The on-disk shape of a rule, before the name/template invariant is checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct RuleEntry {
    /// Attribute to read (mutually exclusive with `tcl_string`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Host template to evaluate (mutually exclusive with `name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcl_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub always_show: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorize: Option<bool>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TryFrom<RuleEntry> for DisplayRule {
    type Error = String;

    fn try_from(entry: RuleEntry) -> Result<Self, Self::Error> {
        let target = match (entry.name, entry.tcl_string) {
            (Some(name), None) => RuleTarget::Attribute(name),
            (None, Some(template)) => RuleTarget::Expression(template),
            (Some(name), Some(_)) => {
                return Err(format!(
                    "rule '{name}' sets both `name` and `tcl_string`; exactly one is allowed"
                ));
            }
            (None, None) => {
                return Err("rule needs either `name` or `tcl_string`".to_string());
            }
        };

        Ok(Self {
            target,
            label: entry.label,
            default: entry.default,
            always_show: entry.always_show,
            colorize: entry.colorize,
        })
    }
}

impl From<DisplayRule> for RuleEntry {
    fn from(rule: DisplayRule) -> Self {
        let (name, tcl_string) = match rule.target {
            RuleTarget::Attribute(name) => (Some(name), None),
            RuleTarget::Expression(template) => (None, Some(template)),
        };

        Self {
            name,
            tcl_string,
            label: rule.label,
            default: rule.default,
            always_show: rule.always_show,
            colorize: rule.colorize,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

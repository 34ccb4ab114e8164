//! Attribute values as read from a node and as written in config defaults.
//!
//! Values are serialized untagged, so a config default of `0.0`, `[1, 1]` or
//! `"none"` reads exactly as it would in hand-written JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// AttrValue
// ============================================================================

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// Returns the numeric value for `Int` and `Float` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Like [`as_f64`](Self::as_f64), but also parses numeric text.
    ///
    /// Hosts commonly report knob values as strings.
    pub fn parse_f64(&self) -> Option<f64> {
        match self {
            Self::Text(s) => s.trim().parse().ok(),
            other => other.as_f64(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns true if a displayed value should be considered different from
    /// the configured default.
    ///
    /// Scalars compare by value, with ints and floats compared numerically.
    /// Sequences compare by their formatted text, so `[1.0, 2.0]` matches a
    /// default of `[1, 2]`. A scalar default is coerced to its formatted text
    /// when the value is a sequence; a sequence default never matches a scalar.
    pub fn differs_from(&self, default: &AttrValue) -> bool {
        match (self, default) {
            (Self::List(_), _) => self.to_string() != default.to_string(),
            (_, Self::List(_)) => true,
            (a, b) => !a.scalar_eq(b),
        }
    }

    fn scalar_eq(&self, other: &AttrValue) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

/// Floats always render with three decimals; sequences are comma-joined
/// after formatting each element.
impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:.3}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttrValue>, const N: usize> From<[T; N]> for AttrValue {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// The kind of control an attribute is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttrKind {
    #[default]
    Plain,
    /// A color picker (RGB or RGBA). Only these can be colorized.
    Color,
}

/// An attribute read from a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: AttrValue,

    #[serde(default)]
    pub kind: AttrKind,
}

impl Attribute {
    pub fn new(value: impl Into<AttrValue>) -> Self {
        Self {
            value: value.into(),
            kind: AttrKind::Plain,
        }
    }

    pub fn color(value: impl Into<AttrValue>) -> Self {
        Self {
            value: value.into(),
            kind: AttrKind::Color,
        }
    }

    pub fn is_color(&self) -> bool {
        self.kind == AttrKind::Color
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Host integration seams.
//!
//! The renderer never talks to the host application directly. Template
//! substitution and the indicator surface go through [`LabelHost`];
//! installing the render callback goes through [`AutolabelRegistry`].

use std::cell::Cell;
use std::sync::Arc;

use thiserror::Error;

use crate::node::{Indicators, Node};

/// Failure to evaluate a host template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template evaluation failed: {0}")]
pub struct TemplateError(pub String);

/// Services the host provides while a label is rendered.
pub trait LabelHost {
    /// Evaluates a template string in the context of `node`.
    fn substitute(&self, node: &dyn Node, template: &str) -> Result<String, TemplateError>;

    /// Pushes the indicator bitmask for `node` to the display surface.
    fn set_indicators(&self, node: &dyn Node, indicators: Indicators);
}

// ============================================================================
// Registration
// ============================================================================

/// A render callback the host invokes once per node redraw.
pub type AutolabelFn = Arc<dyn Fn(&dyn Node, &dyn LabelHost) -> String + Send + Sync>;

/// Identifies a registered callback so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutolabelHandle(pub u64);

/// The host's table of label callbacks.
pub trait AutolabelRegistry {
    fn add_autolabel(&mut self, callback: AutolabelFn) -> AutolabelHandle;

    /// Returns `false` if the handle was not registered.
    fn remove_autolabel(&mut self, handle: AutolabelHandle) -> bool;
}

// ============================================================================
// SnapshotHost
// ============================================================================

/// A minimal host for offline rendering.
///
/// Supports `[value <attribute>]` substitution against the node; any other
/// bracketed command fails, which makes the renderer fall back to raw text.
/// The last indicator push is kept for inspection.
#[derive(Debug, Default)]
pub struct SnapshotHost {
    indicators: Cell<Option<Indicators>>,
}

impl SnapshotHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicators pushed by the most recent render.
    pub fn last_indicators(&self) -> Option<Indicators> {
        self.indicators.get()
    }
}

impl LabelHost for SnapshotHost {
    fn substitute(&self, node: &dyn Node, template: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('[') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find(']')
                .ok_or_else(|| TemplateError(format!("unbalanced brackets in '{template}'")))?;

            let command = after[..close].trim();
            let attribute = command
                .strip_prefix("value ")
                .map(str::trim)
                .ok_or_else(|| TemplateError(format!("unsupported command '{command}'")))?;
            let value = node
                .attribute_text(attribute)
                .ok_or_else(|| TemplateError(format!("no attribute named '{attribute}'")))?;

            out.push_str(&value);
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn set_indicators(&self, _node: &dyn Node, indicators: Indicators) {
        self.indicators.set(Some(indicators));
    }
}

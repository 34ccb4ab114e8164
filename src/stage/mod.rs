//! Line stages that build a label.
//!
//! Each stage reads the node through a shared [`LabelContext`] and appends at
//! most one block of text to it. Stages run in a fixed order defined by
//! [`LabelPipeline`]:
//!
//! ```text
//! Node + ComposedConfig
//!     │
//!     ▼
//! ┌──────────┐
//! │   Name   │ ◄── class | name (operation)
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │   File   │ ◄── base file name
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │ Channels │ ◄── (channels M mask) /* premult
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │ Readout  │ ◄── config rules; may wrap the label for colorized output
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │   Mix    │ ◄── mix 0.500
//! └────┬─────┘
//!      ▼
//! ┌──────────┐
//! │   Note   │ ◄── user label
//! └──────────┘
//! ```

pub mod channels;
pub mod file;
pub mod mix;
pub mod name;
pub mod note;
pub mod readout;

pub use channels::ChannelLine;
pub use file::FileLine;
pub use mix::MixLine;
pub use name::NameLine;
pub use note::NoteLine;
pub use readout::ReadoutBlock;

use tracing::trace;

use crate::composer::ComposedConfig;
use crate::host::LabelHost;
use crate::node::Node;
use crate::renderer::RenderOptions;

// ============================================================================
// Label Context
// ============================================================================

/// Per-render state passed through the pipeline.
///
/// Lives on the stack for a single render call; nothing here outlives it.
pub struct LabelContext<'a> {
    pub node: &'a dyn Node,

    /// The class shown to the user, after class mapping.
    pub display_class: &'a str,

    pub config: &'a ComposedConfig,
    pub options: RenderOptions,
    pub host: &'a dyn LabelHost,

    /// Lines emitted so far, in order.
    pub lines: Vec<String>,

    /// Set once the centering wrapper has been written into the label.
    pub centred: bool,
}

impl<'a> LabelContext<'a> {
    pub fn new(
        node: &'a dyn Node,
        display_class: &'a str,
        config: &'a ComposedConfig,
        options: RenderOptions,
        host: &'a dyn LabelHost,
    ) -> Self {
        Self {
            node,
            display_class,
            config,
            options,
            host,
            lines: Vec::new(),
            centred: false,
        }
    }

    /// The attribute's text, or `fallback` if the node lacks it.
    pub fn text_or(&self, attribute: &str, fallback: &str) -> String {
        self.node
            .attribute_text(attribute)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Evaluates a host template, returning it verbatim if evaluation fails.
    pub fn substitute(&self, template: &str) -> String {
        self.host
            .substitute(self.node, template)
            .unwrap_or_else(|err| {
                trace!(%err, template, "Template evaluation failed; using raw text");
                template.to_string()
            })
    }

    /// Appends a line unless it is empty.
    pub fn push_line(&mut self, line: String) {
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    /// Joins the emitted lines into the final label.
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

// ============================================================================
// Stage Traits
// ============================================================================

/// A single step of the label pipeline.
pub trait LineStage {
    /// Appends this stage's output (if any) to `ctx`.
    fn apply(&self, ctx: &mut LabelContext<'_>);
}

/// A stage plus an on/off switch.
#[derive(Debug, Clone)]
pub struct Stage<S> {
    stage: S,
    enabled: bool,
}

impl<S: Default> Default for Stage<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Stage<S> {
    pub fn new(stage: S) -> Self {
        Self {
            stage,
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if the enabled state changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }
}

impl<S: LineStage> Stage<S> {
    /// Runs the stage if it is enabled.
    pub fn apply(&self, ctx: &mut LabelContext<'_>) {
        if self.enabled {
            self.stage.apply(ctx);
        }
    }
}

// ============================================================================
// Label Pipeline
// ============================================================================

/// All stages, in render order.
#[derive(Debug, Clone, Default)]
pub struct LabelPipeline {
    pub name: Stage<NameLine>,
    pub file: Stage<FileLine>,
    pub channels: Stage<ChannelLine>,
    pub readout: Stage<ReadoutBlock>,
    pub mix: Stage<MixLine>,
    pub note: Stage<NoteLine>,
}

impl LabelPipeline {
    pub fn run(&self, ctx: &mut LabelContext<'_>) {
        self.name.apply(ctx);
        self.file.apply(ctx);
        self.channels.apply(ctx);
        self.readout.apply(ctx);
        self.mix.apply(ctx);
        self.note.apply(ctx);
    }
}

//! Name line: the node's name, qualified by its class when renamed.

use super::{LabelContext, LineStage};

/// Annotation-only classes that never show a name.
pub const NAMELESS_CLASSES: &[&str] = &["Dot", "BackdropNode", "PostageStamp", "StickyNote"];

/// Groups have a distinctive shape, so their class is never prefixed.
const GROUP_CLASS: &str = "Group";

#[derive(Debug, Clone)]
pub struct NameLine {
    /// True classes whose name line is suppressed.
    pub nameless: Vec<String>,
}

impl Default for NameLine {
    fn default() -> Self {
        Self {
            nameless: NAMELESS_CLASSES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LineStage for NameLine {
    fn apply(&self, ctx: &mut LabelContext<'_>) {
        let class = ctx.node.class();
        if self.nameless.iter().any(|c| c == class) {
            return;
        }

        let name = ctx.node.name();
        let display_class = ctx.display_class;
        let mut line = if name.starts_with(display_class) || display_class == GROUP_CLASS {
            name.to_string()
        } else {
            format!("{display_class} | {name}")
        };

        let operation = ctx.text_or("operation", "none");
        if !operation.is_empty() && operation != "none" {
            line = format!("{line} ({operation})");
        }

        ctx.push_line(line);
    }
}

//! Mix line, shown when a node is only partially applied.

use super::{LabelContext, LineStage};

#[derive(Debug, Clone, Default)]
pub struct MixLine;

impl LineStage for MixLine {
    fn apply(&self, ctx: &mut LabelContext<'_>) {
        let Some(mix) = ctx.node.attribute("mix") else {
            return;
        };
        if mix.value.to_string() == "none" {
            return;
        }

        match mix.value.parse_f64() {
            Some(value) if value != 1.0 => ctx.push_line(format!("mix {value:.3}")),
            _ => {}
        }
    }
}

//! Note line: the user's own label text.

use super::{LabelContext, LineStage};

#[derive(Debug, Clone, Default)]
pub struct NoteLine;

impl LineStage for NoteLine {
    fn apply(&self, ctx: &mut LabelContext<'_>) {
        let note = ctx.text_or("label", "");
        if note.is_empty() {
            return;
        }
        let note = ctx.substitute(&note);
        ctx.push_line(note);
    }
}

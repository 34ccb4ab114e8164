//! File line: the base name of a file attribute.

use std::path::Path;

use super::{LabelContext, LineStage};

#[derive(Debug, Clone, Default)]
pub struct FileLine;

impl LineStage for FileLine {
    fn apply(&self, ctx: &mut LabelContext<'_>) {
        let file = ctx.text_or("file", "-");
        if file.is_empty() || file == "-" {
            return;
        }

        let base = Path::new(&file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());
        ctx.push_line(base);
    }
}

//! Label rendering engine.

use crate::classes::{ClassMappings, MenuEntry};
use crate::composer::ComposedConfig;
use crate::host::LabelHost;
use crate::node::{Indicators, Node};
use crate::stage::{LabelContext, LabelPipeline};

/// Per-render switches, usually snapshotted from preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Show every named rule, even at its default.
    pub always_show_all: bool,
    /// Render color readouts as plain text.
    pub colorize_disabled: bool,
}

// ============================================================================
// LabelRenderer
// ============================================================================

/// Builds node labels from a composed config.
///
/// The renderer holds no per-node state. Everything a render needs is passed
/// in, so rendering the same node twice gives the same label.
///
/// # Line Pipeline
///
/// 1. **Name** (`pipeline.name`) - name, class and operation
/// 2. **File** (`pipeline.file`) - base name of the `file` attribute
/// 3. **Channels** (`pipeline.channels`) - channels, mask and premultiplication
/// 4. **Readout** (`pipeline.readout`) - one line per config rule
/// 5. **Mix** (`pipeline.mix`) - `mix` when below one
/// 6. **Note** (`pipeline.note`) - the user's label
///
/// # Example
///
/// ```
/// use labelmaker::{ComposedConfig, LabelRenderer, NodeSnapshot, RenderOptions, SnapshotHost};
///
/// let renderer = LabelRenderer::new();
/// let node = NodeSnapshot::new("Read", "Read1").with_attribute("file", "/tmp/render/plateA.exr");
///
/// let label = renderer.render(
///     &node,
///     &ComposedConfig::default(),
///     RenderOptions::default(),
///     &SnapshotHost::new(),
/// );
/// assert_eq!(label, "Read1\nplateA.exr");
/// ```
#[derive(Debug, Clone, Default)]
pub struct LabelRenderer {
    class_mappings: ClassMappings,

    /// The line pipeline. Access stages directly to toggle them.
    pub pipeline: LabelPipeline,
}

impl LabelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class_mappings(class_mappings: ClassMappings) -> Self {
        Self {
            class_mappings,
            pipeline: LabelPipeline::default(),
        }
    }

    pub fn class_mappings(&self) -> &ClassMappings {
        &self.class_mappings
    }

    pub fn class_mappings_mut(&mut self) -> &mut ClassMappings {
        &mut self.class_mappings
    }

    /// Adds display names for the OFX plugins in the host's node menu.
    pub fn register_menu(&mut self, menu: &MenuEntry) -> usize {
        self.class_mappings.register_menu(menu)
    }

    /// Renders the label for `node`.
    ///
    /// The node's indicators are pushed to `host` first; they are never part
    /// of the returned text.
    pub fn render(
        &self,
        node: &dyn Node,
        config: &ComposedConfig,
        options: RenderOptions,
        host: &dyn LabelHost,
    ) -> String {
        host.set_indicators(node, Indicators::from_flags(&node.flags()));

        let display_class = self.class_mappings.display_class(node.class());
        let mut ctx = LabelContext::new(node, display_class, config, options, host);
        self.pipeline.run(&mut ctx);
        ctx.finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, RuleMap};
    use crate::host::SnapshotHost;
    use crate::node::{NodeFlags, NodeSnapshot};
    use crate::rule::DisplayRule;

    fn grade_config() -> ComposedConfig {
        let mut rules = RuleMap::new();
        rules.insert(
            "Grade".into(),
            vec![
                DisplayRule::attribute("white").with_default(1.0),
                DisplayRule::attribute("value").with_default(0.0),
            ],
        );
        rules.insert("Merge2".into(), vec![DisplayRule::attribute("bbox").with_default("union")]);
        ComposedConfig::compose(vec![ConfigSource::from_rules("test", "test.json", rules)])
    }

    #[test]
    fn full_label_in_stage_order() {
        let node = NodeSnapshot::new("Grade", "hero_grade")
            .with_attribute("channels", "rgb")
            .with_attribute("maskChannelInput", "rgba.alpha")
            .with_attribute("value", 1.5)
            .with_attribute("mix", 0.75)
            .with_attribute("label", "check [value value]");
        let options = RenderOptions {
            colorize_disabled: true,
            ..RenderOptions::default()
        };

        let label = LabelRenderer::new().render(&node, &grade_config(), options, &SnapshotHost::new());
        assert_eq!(
            label,
            "Grade | hero_grade\n(rgb M rgba.alpha)\nvalue 1.500\nmix 0.750\ncheck 1.500"
        );
    }

    #[test]
    fn rules_use_true_class_while_name_uses_display_class() {
        let node = NodeSnapshot::new("Merge2", "Merge3")
            .with_attribute("operation", "plus")
            .with_attribute("bbox", "B");

        let label = LabelRenderer::new().render(
            &node,
            &grade_config(),
            RenderOptions::default(),
            &SnapshotHost::new(),
        );
        assert_eq!(label, "Merge3 (plus)\nbbox B");
    }

    #[test]
    fn centre_wrapper_goes_on_the_first_line() {
        let node = NodeSnapshot::new("Grade", "Grade1").with_color("white", 2.0);

        let label = LabelRenderer::new().render(
            &node,
            &grade_config(),
            RenderOptions::default(),
            &SnapshotHost::new(),
        );
        assert!(label.starts_with("<div style=\"text-align: center\"><font face=\"Verdana\">Grade1\n<span"));
        assert_eq!(label.matches("<div").count(), 1);
    }

    #[test]
    fn nameless_node_centres_its_first_readout() {
        let mut rules = RuleMap::new();
        rules.insert(
            "Dot".into(),
            vec![
                DisplayRule::attribute("a"),
                DisplayRule::attribute("tint").with_default(1.0),
            ],
        );
        let config = ComposedConfig::compose(vec![ConfigSource::from_rules("test", "test.json", rules)]);
        let node = NodeSnapshot::new("Dot", "Dot1")
            .with_attribute("a", 1)
            .with_color("tint", 0.0);

        let label = LabelRenderer::new().render(&node, &config, RenderOptions::default(), &SnapshotHost::new());
        assert!(label.starts_with("<div style=\"text-align: center\"><font face=\"Verdana\">a 1\n<span"));
        assert_eq!(label.matches("<div").count(), 1);
    }

    #[test]
    fn indicators_are_pushed_not_rendered() {
        let node = NodeSnapshot::new("Blur", "Blur1").with_flags(NodeFlags {
            has_keyframes: true,
            is_clone: true,
            ..NodeFlags::default()
        });
        let host = SnapshotHost::new();

        let label = LabelRenderer::new().render(&node, &grade_config(), RenderOptions::default(), &host);
        assert_eq!(label, "Blur1");
        assert_eq!(
            host.last_indicators().map(|i| i.bits()),
            Some(Indicators::KEYFRAMES | Indicators::CLONES)
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let node = NodeSnapshot::new("Grade", "Grade1")
            .with_color("white", vec![0.5, 1.0, 2.0, 1.0])
            .with_attribute("value", 0.25)
            .with_attribute("mix", 0.5);
        let renderer = LabelRenderer::new();
        let config = grade_config();
        let host = SnapshotHost::new();

        let first = renderer.render(&node, &config, RenderOptions::default(), &host);
        let second = renderer.render(&node, &config, RenderOptions::default(), &host);
        assert_eq!(first, second);
    }

    #[test]
    fn ofx_menu_entries_rename_classes() {
        let mut renderer = LabelRenderer::new();
        let menu = MenuEntry::Item {
            name: "Denoise".into(),
            script: "nuke.createNode(\"OFXcom.example.denoise_v2\")".into(),
        };
        assert_eq!(renderer.register_menu(&menu), 1);

        let node = NodeSnapshot::new("OFXcom.example.denoise_v2", "clean_plate");
        let label = renderer.render(
            &node,
            &ComposedConfig::default(),
            RenderOptions::default(),
            &SnapshotHost::new(),
        );
        assert_eq!(label, "Denoise | clean_plate");
    }

    #[test]
    fn stages_can_be_disabled() {
        let node = NodeSnapshot::new("Merge2", "Merge1").with_attribute("mix", 0.5);
        let mut renderer = LabelRenderer::new();
        renderer.pipeline.mix.set_enabled(false);

        let label = renderer.render(
            &node,
            &ComposedConfig::default(),
            RenderOptions::default(),
            &SnapshotHost::new(),
        );
        assert_eq!(label, "Merge1");
    }
}

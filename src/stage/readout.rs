//! Readout block: one line per display rule of the node's class.

use tracing::trace;

use super::{LabelContext, LineStage};
use crate::color;
use crate::rule::{DisplayRule, RuleTarget};

/// Font used in the centering wrapper when the node has no `note_font`.
pub const FALLBACK_NOTE_FONT: &str = "Verdana";

#[derive(Debug, Clone, Default)]
pub struct ReadoutBlock;

impl ReadoutBlock {
    /// The readout for one rule, or `None` if it should not be shown.
    ///
    /// The flag is set when the readout was colorized.
    fn readout(ctx: &LabelContext<'_>, rule: &DisplayRule) -> Option<(String, bool)> {
        let name = match &rule.target {
            RuleTarget::Expression(template) => {
                let text = ctx.substitute(template);
                return (!text.is_empty()).then_some((text, false));
            }
            RuleTarget::Attribute(name) => name,
        };

        let Some(attribute) = ctx.node.attribute(name) else {
            trace!(class = ctx.node.class(), attribute = %name, "Attribute missing; rule skipped");
            return None;
        };

        let shown = ctx.options.always_show_all
            || rule.always_show
            || rule
                .default
                .as_ref()
                .is_none_or(|default| attribute.value.differs_from(default));
        if !shown {
            return None;
        }

        let label = rule.display_label();
        let formatted = attribute.value.to_string();

        if attribute.is_color() && rule.wants_colorize() && !ctx.options.colorize_disabled {
            Some((color::colorize(&attribute.value, label, &formatted), true))
        } else {
            Some((format!("{label} {formatted}"), false))
        }
    }

    fn centre_wrapper(ctx: &LabelContext<'_>) -> String {
        let font = ctx
            .node
            .attribute_text("note_font")
            .filter(|font| !font.is_empty())
            .unwrap_or_else(|| FALLBACK_NOTE_FONT.to_string());
        format!("<div style=\"text-align: center\"><font face=\"{font}\">")
    }
}

impl LineStage for ReadoutBlock {
    fn apply(&self, ctx: &mut LabelContext<'_>) {
        let Some(rules) = ctx.config.get(ctx.node.class()) else {
            return;
        };

        let mut readouts: Vec<String> = Vec::with_capacity(rules.len());
        for rule in rules {
            let Some((mut readout, colorized)) = Self::readout(ctx, rule) else {
                continue;
            };

            if colorized && !ctx.centred {
                let wrapper = Self::centre_wrapper(ctx);
                if let Some(first) = ctx.lines.first_mut() {
                    first.insert_str(0, &wrapper);
                } else if let Some(first) = readouts.first_mut() {
                    first.insert_str(0, &wrapper);
                } else {
                    readout.insert_str(0, &wrapper);
                }
                ctx.centred = true;
            }

            readouts.push(readout);
        }

        ctx.push_line(readouts.join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::ComposedConfig;
    use crate::config::{ConfigSource, RuleMap};
    use crate::node::NodeSnapshot;
    use crate::renderer::RenderOptions;
    use crate::stage::test_support::run_stage;

    fn config(class: &str, rules: Vec<DisplayRule>) -> ComposedConfig {
        let mut map = RuleMap::new();
        map.insert(class.to_string(), rules);
        ComposedConfig::compose(vec![ConfigSource::from_rules("test", "test.json", map)])
    }

    fn readouts(node: &NodeSnapshot, config: &ComposedConfig, options: RenderOptions) -> Vec<String> {
        run_stage(&ReadoutBlock, node, node.class.as_str(), config, options)
    }

    #[test]
    fn value_differing_from_default_is_shown() {
        let config = config("Blur", vec![DisplayRule::attribute("value").with_default(0.0)]);
        let node = NodeSnapshot::new("Blur", "Blur1").with_attribute("value", 1.5);
        assert_eq!(readouts(&node, &config, RenderOptions::default()), ["value 1.500"]);
    }

    #[test]
    fn value_at_default_is_hidden() {
        let config = config("Blur", vec![DisplayRule::attribute("value").with_default(0.0)]);
        let node = NodeSnapshot::new("Blur", "Blur1").with_attribute("value", 0.0);
        assert!(readouts(&node, &config, RenderOptions::default()).is_empty());

        let options = RenderOptions {
            always_show_all: true,
            ..RenderOptions::default()
        };
        assert_eq!(readouts(&node, &config, options), ["value 0.000"]);
    }

    #[test]
    fn always_show_and_missing_default() {
        let config = config(
            "Transform",
            vec![
                DisplayRule::attribute("rotate").with_default(0.0).with_always_show(true),
                DisplayRule::attribute("filter").with_label("f"),
                DisplayRule::attribute("skew").with_default(0.0),
            ],
        );
        let node = NodeSnapshot::new("Transform", "Transform1")
            .with_attribute("rotate", 0.0)
            .with_attribute("filter", "cubic")
            .with_attribute("skew", 0.0);

        assert_eq!(
            readouts(&node, &config, RenderOptions::default()),
            ["rotate 0.000\nf cubic"]
        );
    }

    #[test]
    fn missing_attributes_are_skipped() {
        let config = config(
            "Blur",
            vec![DisplayRule::attribute("nope"), DisplayRule::attribute("size")],
        );
        let node = NodeSnapshot::new("Blur", "Blur1").with_attribute("size", 4);
        assert_eq!(readouts(&node, &config, RenderOptions::default()), ["size 4"]);
    }

    #[test]
    fn sequences_compare_after_formatting() {
        let config = config(
            "Transform",
            vec![DisplayRule::attribute("translate").with_default(vec![0.0, 0.0])],
        );
        let at_default = NodeSnapshot::new("Transform", "T1").with_attribute("translate", vec![0.0, 0.0]);
        assert!(readouts(&at_default, &config, RenderOptions::default()).is_empty());

        let moved = NodeSnapshot::new("Transform", "T1").with_attribute("translate", vec![10.0, 0.0]);
        assert_eq!(
            readouts(&moved, &config, RenderOptions::default()),
            ["translate 10.000, 0.000"]
        );
    }

    #[test]
    fn expressions_fall_back_to_raw_text() {
        let config = config(
            "FrameRange",
            vec![
                DisplayRule::expression("[value first_frame]-[value last_frame]"),
                DisplayRule::expression("[frame]"),
                DisplayRule::expression(""),
            ],
        );
        let node = NodeSnapshot::new("FrameRange", "FrameRange1")
            .with_attribute("first_frame", 1001)
            .with_attribute("last_frame", 1100);

        assert_eq!(
            readouts(&node, &config, RenderOptions::default()),
            ["1001-1100\n[frame]"]
        );
    }

    #[test]
    fn colorized_readout_is_centred_once() {
        let config = config(
            "Grade",
            vec![
                DisplayRule::attribute("white").with_default(1.0),
                DisplayRule::attribute("gamma").with_default(1.0),
            ],
        );
        let node = NodeSnapshot::new("Grade", "Grade1")
            .with_color("white", vec![2.0, 2.0, 2.0, 1.0])
            .with_color("gamma", 0.0)
            .with_attribute("note_font", "Helvetica");

        let lines = readouts(&node, &config, RenderOptions::default());
        assert_eq!(lines.len(), 1);
        let block = &lines[0];
        assert!(block.starts_with("<div style=\"text-align: center\"><font face=\"Helvetica\"><span"));
        assert_eq!(block.matches("<div").count(), 1);
        assert_eq!(block.matches("<span").count(), 2);
        assert!(block.contains("white: </span> 2.000, 2.000, 2.000, 1.000"));
        assert!(block.contains("color: white;\">gamma: </span> 0.000"));
    }

    #[test]
    fn colorization_can_be_turned_off() {
        let config = config(
            "Grade",
            vec![
                DisplayRule::attribute("white").with_default(1.0),
                DisplayRule::attribute("black").with_default(0.0).with_colorize(false),
            ],
        );
        let node = NodeSnapshot::new("Grade", "Grade1")
            .with_color("white", 2.0)
            .with_color("black", 0.1);

        let options = RenderOptions {
            colorize_disabled: true,
            ..RenderOptions::default()
        };
        assert_eq!(readouts(&node, &config, options), ["white 2.000\nblack 0.100"]);

        let lines = readouts(&node, &config, RenderOptions::default());
        assert!(lines[0].ends_with("\nblack 0.100"));
        assert!(lines[0].contains(&format!("<font face=\"{FALLBACK_NOTE_FONT}\">")));
    }

    #[test]
    fn centre_wrapper_goes_on_first_queued_readout_without_name_line() {
        let config = config(
            "Dot",
            vec![
                DisplayRule::attribute("a"),
                DisplayRule::attribute("tint").with_default(1.0),
            ],
        );
        let node = NodeSnapshot::new("Dot", "Dot1")
            .with_attribute("a", 1)
            .with_color("tint", 0.0);

        let lines = readouts(&node, &config, RenderOptions::default());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(
            "<div style=\"text-align: center\"><font face=\"Verdana\">a 1\n<span"
        ));
        assert_eq!(lines[0].matches("<div").count(), 1);
    }

    #[test]
    fn unknown_class_has_no_readouts() {
        let node = NodeSnapshot::new("Blur", "Blur1").with_attribute("size", 4);
        assert!(readouts(&node, &ComposedConfig::default(), RenderOptions::default()).is_empty());
    }
}

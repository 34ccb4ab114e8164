//! Channel line: processed channels, masking, and (un)premultiplication.
//!
//! ```text
//! (rgb)                  no mask
//! (rgba M rgba.alpha)    mask from the main input
//! (rgb Minv mask.a)      inverted mask from the side input
//! (rgb) /* rgba.alpha    unpremultiplied and premultiplied
//! (rgb) / rgba.alpha     unpremultiplied only
//! (rgb) * rgba.alpha     premultiplied only
//! ```

use super::{LabelContext, LineStage};

const NONE: &str = "none";
const NO_CHANNELS: &str = "-";

#[derive(Debug, Clone, Default)]
pub struct ChannelLine;

/// Where the channel readout comes from for a display class.
enum ChannelSource {
    /// The regular `channels` attribute.
    Channels,
    /// `channels`, with `alpha` as the unpremultiply channel.
    Unpremult,
    /// `channels`, with `alpha` as the premultiply channel.
    Premult,
    /// The class's `channels` attribute means something else; show nothing.
    Suppressed,
    /// Another attribute holds the output channels.
    Redirect(&'static str),
}

impl ChannelSource {
    fn for_class(display_class: &str) -> Self {
        match display_class {
            "Unpremult" => Self::Unpremult,
            "Premult" => Self::Premult,
            "Copy" => Self::Suppressed,
            "Roto" | "RotoPaint" => Self::Redirect("output"),
            _ => Self::Channels,
        }
    }
}

impl LineStage for ChannelLine {
    fn apply(&self, ctx: &mut LabelContext<'_>) {
        let mut unpremult = NONE.to_string();
        let mut premult = NONE.to_string();

        let channels = match ChannelSource::for_class(ctx.display_class) {
            ChannelSource::Channels => ctx.text_or("channels", NO_CHANNELS),
            ChannelSource::Unpremult => {
                unpremult = ctx.text_or("alpha", NONE);
                ctx.text_or("channels", NO_CHANNELS)
            }
            ChannelSource::Premult => {
                premult = ctx.text_or("alpha", NONE);
                ctx.text_or("channels", NO_CHANNELS)
            }
            ChannelSource::Suppressed => NO_CHANNELS.to_string(),
            ChannelSource::Redirect(attribute) => ctx.text_or(attribute, NO_CHANNELS),
        };

        if channels == NO_CHANNELS {
            return;
        }

        let mask_from_input = ctx.text_or("maskChannelInput", NONE);
        let mask_from_side = ctx.text_or("maskChannelMask", NONE);
        let side_plugged = ctx.node.flags().mask_input_plugged;
        let mask_marker = if ctx.text_or("invert_mask", "false") == "true" {
            "Minv"
        } else {
            "M"
        };

        let mut line = if mask_from_input != NONE {
            format!("({channels} {mask_marker} {mask_from_input})")
        } else if side_plugged {
            format!("({channels} {mask_marker} {mask_from_side})")
        } else {
            format!("({channels})")
        };

        let combined = ctx.text_or("unpremult", NONE);
        if combined != NONE {
            line = format!("{line} /* {combined}");
        } else if unpremult != NONE {
            line = format!("{line} / {unpremult}");
        } else if premult != NONE {
            line = format!("{line} * {premult}");
        }

        ctx.push_line(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::ComposedConfig;
    use crate::node::{NodeFlags, NodeSnapshot};
    use crate::renderer::RenderOptions;
    use crate::stage::test_support::run_stage;

    fn channel_line(node: &NodeSnapshot, display_class: &str) -> Vec<String> {
        run_stage(
            &ChannelLine,
            node,
            display_class,
            &ComposedConfig::default(),
            RenderOptions::default(),
        )
    }

    #[test]
    fn bare_channels() {
        let node = NodeSnapshot::new("Grade", "Grade1").with_attribute("channels", "rgb");
        assert_eq!(channel_line(&node, "Grade"), ["(rgb)"]);
    }

    #[test]
    fn no_channels_attribute_no_line() {
        let node = NodeSnapshot::new("Transform", "Transform1");
        assert!(channel_line(&node, "Transform").is_empty());
    }

    #[test]
    fn mask_from_main_input() {
        let node = NodeSnapshot::new("Grade", "Grade1")
            .with_attribute("channels", "rgba")
            .with_attribute("maskChannelInput", "rgba.alpha");
        assert_eq!(channel_line(&node, "Grade"), ["(rgba M rgba.alpha)"]);
    }

    #[test]
    fn inverted_side_mask() {
        let node = NodeSnapshot::new("Grade", "Grade1")
            .with_attribute("channels", "rgb")
            .with_attribute("maskChannelMask", "mask.a")
            .with_attribute("invert_mask", true)
            .with_flags(NodeFlags {
                mask_input_plugged: true,
                ..NodeFlags::default()
            });
        assert_eq!(channel_line(&node, "Grade"), ["(rgb Minv mask.a)"]);
    }

    #[test]
    fn unplugged_side_mask_is_ignored() {
        let node = NodeSnapshot::new("Grade", "Grade1")
            .with_attribute("channels", "rgb")
            .with_attribute("maskChannelMask", "rgba.alpha");
        assert_eq!(channel_line(&node, "Grade"), ["(rgb)"]);
    }

    #[test]
    fn premult_suffixes() {
        let combined = NodeSnapshot::new("Grade", "Grade1")
            .with_attribute("channels", "rgb")
            .with_attribute("unpremult", "rgba.alpha");
        assert_eq!(channel_line(&combined, "Grade"), ["(rgb) /* rgba.alpha"]);

        let unpremult = NodeSnapshot::new("Unpremult", "Unpremult1")
            .with_attribute("channels", "rgb")
            .with_attribute("alpha", "rgba.alpha");
        assert_eq!(channel_line(&unpremult, "Unpremult"), ["(rgb) / rgba.alpha"]);

        let premult = NodeSnapshot::new("Premult", "Premult1")
            .with_attribute("channels", "rgb")
            .with_attribute("alpha", "rgba.alpha");
        assert_eq!(channel_line(&premult, "Premult"), ["(rgb) * rgba.alpha"]);
    }

    #[test]
    fn copy_suppresses_channels() {
        let node = NodeSnapshot::new("Copy", "Copy1").with_attribute("channels", "rgba");
        assert!(channel_line(&node, "Copy").is_empty());
    }

    #[test]
    fn roto_reads_output() {
        let node = NodeSnapshot::new("RotoPaint", "RotoPaint1")
            .with_attribute("channels", "none")
            .with_attribute("output", "rgba");
        assert_eq!(channel_line(&node, "RotoPaint"), ["(rgba)"]);
    }
}

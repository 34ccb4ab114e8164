//! Perceptual color helpers used to colorize color readouts.
//!
//! Scene-linear values are pushed through a rough camera-log to display curve
//! so the swatch looks like the color the artist picked, then a contrasting
//! text color is chosen from the swatch's approximate luminance.

use palette::Srgb;

use crate::value::AttrValue;

// Rational fit of a camera-log to Rec.709 style display curve.
const CURVE_A: f64 = 0.023;
const CURVE_B: f64 = 0.888;
const CURVE_C: f64 = 0.293;
const CURVE_D: f64 = 1.02;
const CURVE_E: f64 = 0.023;

/// Upper bound of the curve's input domain.
const CURVE_MAX_INPUT: f64 = 12.0;

/// Backgrounds brighter than this get black text.
pub const LIGHT_BACKGROUND_THRESHOLD: f64 = 0.22;

/// Text color chosen to contrast a swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

/// Maps a scene-linear value to an 8-bit display value.
///
/// Input is clamped to `[0, 12]`, output to `[0, 1]` before scaling to 255
/// and truncating.
pub fn transfer_curve(value: f64) -> u8 {
    let value = clamp(value, 0.0, CURVE_MAX_INPUT);
    let curved = CURVE_D + (CURVE_A - CURVE_D) / (1.0 + (value / CURVE_C).powf(CURVE_B));
    (clamp(curved - CURVE_E, 0.0, 1.0) * 255.0) as u8
}

/// Returns the display color for a value, if it can be shown as one.
///
/// Sequences of three or more numbers map their first three elements; a
/// single number is replicated across all channels.
pub fn to_color_triplet(value: &AttrValue) -> Option<Srgb<u8>> {
    match value {
        AttrValue::List(items) if items.len() >= 3 => {
            let r = items[0].as_f64()?;
            let g = items[1].as_f64()?;
            let b = items[2].as_f64()?;
            Some(Srgb::new(transfer_curve(r), transfer_curve(g), transfer_curve(b)))
        }
        other => {
            let v = transfer_curve(other.as_f64()?);
            Some(Srgb::new(v, v, v))
        }
    }
}

/// Approximate relative luminance in `[0, 1]`.
pub fn luminance(color: Srgb<u8>) -> f64 {
    (f64::from(color.red) * 0.34 + f64::from(color.green) * 0.5 + f64::from(color.blue) * 0.16)
        / 255.0
}

pub fn contrast_text_color(color: Srgb<u8>) -> TextColor {
    if luminance(color) > LIGHT_BACKGROUND_THRESHOLD {
        TextColor::Black
    } else {
        TextColor::White
    }
}

/// Renders a readout as a colored swatch span.
///
/// Values that cannot be shown as a color fall back to `formatted` unchanged.
pub fn colorize(value: &AttrValue, label: &str, formatted: &str) -> String {
    let Some(color) = to_color_triplet(value) else {
        return formatted.to_string();
    };

    format!(
        "<span style=\"background-color: #{:02X}{:02X}{:02X}; color: {};\">{label}: </span> {formatted}",
        color.red,
        color.green,
        color.blue,
        contrast_text_color(color).as_css(),
    )
}

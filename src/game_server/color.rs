//! Color - Distinct horse colors
//!
//! Hues are spread evenly around the color wheel, with saturation and
//! lightness nudged per index so neighbours stay apart at the wrap-around.

/// Color for the horse at `index` in a roster of `total` horses.
///
/// Deterministic for a given `(index, total)`. `total` must be at least 1.
pub fn color_for_index(index: usize, total: usize) -> String {
    let hue = (index as f64 * 360.0) / total as f64;
    let saturation = 65.0 + (index % 3) as f64 * 10.0;
    let lightness = 45.0 + (index % 2) as f64 * 10.0;

    hsl_to_hex(hue, saturation, lightness)
}

/// Palette of `count` distinct colors, one per roster slot.
pub fn palette_of(count: usize) -> Vec<String> {
    (0..count).map(|i| color_for_index(i, count)).collect()
}

/// Hue in degrees, saturation and lightness in percent.
fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let l = l / 100.0;
    let a = s * l.min(1.0 - l) / 100.0;
    let channel = |n: f64| {
        let k = (n + h / 30.0) % 12.0;
        let value = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * value).round().clamp(0.0, 255.0) as u8
    };

    format!("#{:02x}{:02x}{:02x}", channel(0.0), channel(8.0), channel(4.0))
}

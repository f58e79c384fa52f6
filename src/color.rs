//! Color literal parsing.
//!
//! Accepts any CSS color notation: hex (`#rgb`, `#rgba`, `#rrggbb`,
//! `#rrggbbaa`, with or without `#`), `rgb()`/`rgba()` with numbers,
//! percentages or space-separated channels, `hsl()`, `hwb()`, `hsv()` and
//! named colors.

use crate::value::Rgba;

/// Parses a color literal into normalized channels.
///
/// RGB channels are rounded to 8 bits. Alpha comes from the literal when it
/// carries one, full opacity otherwise.
///
/// # Examples
///
/// ```
/// use tokensync::color::parse_color;
///
/// let black = parse_color("#212121").unwrap();
/// assert!((black.r - 33.0 / 255.0).abs() < 1e-9);
/// assert_eq!(black.a, 1.0);
///
/// assert!((parse_color("#00000080").unwrap().a - 128.0 / 255.0).abs() < 1e-6);
/// assert!(parse_color("hsl(0, 100%, 50%)").is_some());
/// assert!(parse_color("not a color").is_none());
/// ```
pub fn parse_color(input: &str) -> Option<Rgba> {
    let color = csscolorparser::parse(input.trim()).ok()?;
    let [r, g, b, _] = color.to_rgba8();
    Some(Rgba::from_rgb8(r, g, b, f64::from(color.a).clamp(0.0, 1.0)))
}

use tokensync::Rgba;
use tokensync::color::parse_color;

fn rgb8(color: Rgba) -> (u8, u8, u8) {
    (
        (color.r * 255.0).round() as u8,
        (color.g * 255.0).round() as u8,
        (color.b * 255.0).round() as u8,
    )
}

#[test]
fn test_six_digit_hex() {
    let color = parse_color("#212121").unwrap();
    assert_eq!(rgb8(color), (33, 33, 33));
    assert_eq!(color.a, 1.0);
}

#[test]
fn test_hex_is_case_insensitive_and_hash_optional() {
    assert_eq!(parse_color("#FFAA00"), parse_color("ffaa00"));
    assert_eq!(rgb8(parse_color("#FFAA00").unwrap()), (255, 170, 0));
}

#[test]
fn test_short_hex_expands() {
    assert_eq!(parse_color("#fa0"), parse_color("#ffaa00"));
}

#[test]
fn test_hex_alpha() {
    let color = parse_color("#ff000080").unwrap();
    assert_eq!(rgb8(color), (255, 0, 0));
    assert!((color.a - 0.502).abs() < 1e-3);
    assert!(!color.is_opaque());

    let short = parse_color("#f008").unwrap();
    assert!((short.a - 0.533).abs() < 1e-3);
}

#[test]
fn test_functional_notation() {
    let color = parse_color("rgb(255, 128, 0)").unwrap();
    assert_eq!(rgb8(color), (255, 128, 0));
    assert_eq!(color.a, 1.0);

    let translucent = parse_color("RGBA(0,0,0,0.3)").unwrap();
    assert!((translucent.a - 0.3).abs() < 1e-6);
}

#[test]
fn test_percentage_channels() {
    let color = parse_color("rgb(100%, 0%, 0%)").unwrap();
    assert_eq!(rgb8(color), (255, 0, 0));
    assert_eq!(color.a, 1.0);
}

#[test]
fn test_space_separated_channels() {
    assert_eq!(parse_color("rgb(255 0 0)"), parse_color("#ff0000"));

    let translucent = parse_color("rgb(0 0 255 / 50%)").unwrap();
    assert_eq!(rgb8(translucent), (0, 0, 255));
    assert!((translucent.a - 0.5).abs() < 1e-6);
}

#[test]
fn test_hsl() {
    let color = parse_color("hsl(210, 50%, 40%)").unwrap();
    assert_eq!(rgb8(color), (51, 102, 153));
    assert!(color.is_opaque());

    assert_eq!(rgb8(parse_color("hsla(0, 100%, 50%, 0.5)").unwrap()), (255, 0, 0));
}

#[test]
fn test_named_colors() {
    assert_eq!(rgb8(parse_color("white").unwrap()), (255, 255, 255));
    assert_eq!(rgb8(parse_color("RebeccaPurple").unwrap()), (102, 51, 153));
    assert_eq!(parse_color("transparent").unwrap().a, 0.0);
}

#[test]
fn test_invalid_colors() {
    for input in ["", "#", "#12", "#12345", "#gggggg", "rgb(1, 2)", "hsl(1)", "blurple"] {
        assert!(parse_color(input).is_none(), "{}", input);
    }
}

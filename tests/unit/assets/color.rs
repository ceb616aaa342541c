use super::*;
use serde_json::json;

#[test]
fn parses_short_long_and_alpha_hex() {
    assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
    assert_eq!(
        "#B7C8DC".parse::<Color>().unwrap(),
        Color::rgb(0xB7, 0xC8, 0xDC)
    );
    assert_eq!(
        "0000ff80".parse::<Color>().unwrap(),
        Color::rgba(0, 0, 255, 0x80)
    );
    assert!("#12345".parse::<Color>().is_err());
    assert!("#gg0000".parse::<Color>().is_err());
}

#[test]
fn serde_accepts_hex_and_arrays() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));
    let c: Color = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c, Color::rgba(1, 2, 3, 4));
    assert!(serde_json::from_value::<Color>(json!([1, 2])).is_err());

    assert_eq!(serde_json::to_value(Color::rgb(0xB7, 0xC8, 0xDC)).unwrap(), json!("#B7C8DC"));
}

#[test]
fn premul_scales_channels_by_alpha() {
    assert_eq!(Color::rgba(255, 128, 0, 128).to_premul(), [128, 64, 0, 128]);
    assert_eq!(Color::WHITE.to_premul(), [255, 255, 255, 255]);
}

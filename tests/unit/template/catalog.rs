use super::*;

const DEMO: &str = include_str!("../../../demos/presets.json");

#[test]
fn demo_catalog_parses() {
    let cat = PresetCatalog::from_json_str(DEMO).unwrap();
    assert_eq!(cat.len(), 4);

    let chalk = cat.find("Blue Chalk").unwrap();
    assert_eq!(chalk.margins, Edges::new(18, 245, 15, 15));
    assert_eq!(chalk.padding, Edges::uniform(20));
    assert_eq!(chalk.background, None);

    let easter = cat.find("Easter").unwrap();
    assert_eq!(easter.padding, Edges::new(20, 20, 25, 25));
    assert_eq!(
        easter.background,
        Some(BackgroundSource::Color {
            value: Color::rgb(0xB7, 0xC8, 0xDC)
        })
    );

    let school = cat.find("School").unwrap();
    assert_eq!(school.url, None);
    assert!(matches!(school.background, Some(BackgroundSource::Image { .. })));
}

#[test]
fn padding_and_background_are_optional() {
    let cat = PresetCatalog::from_json_str(
        r#"{ "presets": [ { "name": "Plain", "url": "plain.png",
              "margins": { "top": 1, "bottom": 2, "left": 3, "right": 4 } } ] }"#,
    )
    .unwrap();
    let p = cat.get(0).unwrap();
    assert_eq!(p.padding, Edges::ZERO);
    assert_eq!(p.background, None);
}

#[test]
fn lookup_by_index_and_name() {
    let cat = PresetCatalog::from_json_str(DEMO).unwrap();
    let (i, p) = cat.lookup(&PresetRef::Name("Blue Sky".into())).unwrap();
    assert_eq!((i, p.name.as_str()), (2, "Blue Sky"));
    let (i, p) = cat.lookup(&PresetRef::Index(1)).unwrap();
    assert_eq!((i, p.name.as_str()), (1, "Easter"));

    let err = cat.lookup(&PresetRef::Index(9)).unwrap_err();
    assert!(matches!(err, PhotoGridError::Template(_)));
    assert!(cat.lookup(&PresetRef::Name("blue sky".into())).is_err());
}

#[test]
fn preset_refs_deserialize_untagged() {
    let r: PresetRef = serde_json::from_str("3").unwrap();
    assert_eq!(r, PresetRef::Index(3));
    let r: PresetRef = serde_json::from_str("\"Easter\"").unwrap();
    assert_eq!(r, PresetRef::Name("Easter".into()));
}

#[test]
fn invalid_catalogs_are_rejected() {
    let dup = r#"{ "presets": [
        { "name": "A", "url": null, "margins": {} },
        { "name": "A", "url": null, "margins": {} } ] }"#;
    assert!(matches!(
        PresetCatalog::from_json_str(dup),
        Err(PhotoGridError::Validation(_))
    ));

    let empty_url = r#"{ "presets": [
        { "name": "A", "url": null, "margins": {},
          "background": { "type": "image", "url": " " } } ] }"#;
    assert!(PresetCatalog::from_json_str(empty_url).is_err());

    let unknown_bg = r#"{ "presets": [
        { "name": "A", "margins": {}, "background": { "type": "video", "url": "x" } } ] }"#;
    assert!(matches!(
        PresetCatalog::from_json_str(unknown_bg),
        Err(PhotoGridError::Serde(_))
    ));

    let bad_color = r##"{ "presets": [
        { "name": "A", "margins": {}, "background": { "type": "color", "value": "#12" } } ] }"##;
    assert!(PresetCatalog::from_json_str(bad_color).is_err());
}

#[test]
fn from_path_reads_demo_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/presets.json");
    let cat = PresetCatalog::from_path(&path).unwrap();
    assert_eq!(cat.get(3).map(|p| p.name.as_str()), Some("School"));
    assert!(PresetCatalog::from_path(path.with_file_name("missing.json")).is_err());
}

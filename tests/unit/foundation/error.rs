use super::*;

#[test]
fn display_prefixes_are_stable() {
    let cases = [
        (PhotoGridError::validation("x"), "validation error:"),
        (PhotoGridError::layout("x"), "layout error:"),
        (PhotoGridError::decode("x"), "decode error:"),
        (PhotoGridError::template("x"), "template error:"),
        (PhotoGridError::render("x"), "render error:"),
        (PhotoGridError::encode("x"), "encode error:"),
        (PhotoGridError::serde("x"), "serialization error:"),
    ];
    for (err, prefix) in cases {
        assert!(err.to_string().contains(prefix), "{err} lacks {prefix}");
    }
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PhotoGridError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

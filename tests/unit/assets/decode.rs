use std::io::Cursor;

use super::*;

fn encode_png(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = encode_png(1, 1, vec![100, 50, 200, 128]);

    let raster = decode_image(&buf).unwrap();
    assert_eq!(raster.width, 1);
    assert_eq!(raster.height, 1);
    assert_eq!(
        raster.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(err.to_string().contains("decode error"));
}

#[test]
fn svg_rasterizes_at_natural_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="6">
        <rect x="0" y="0" width="8" height="6" fill="#ff0000"/>
    </svg>"##;
    let raster = decode_any(svg, None).unwrap();
    assert_eq!((raster.width, raster.height), (8, 6));
    assert_eq!(raster.pixel(4, 3), Some([255, 0, 0, 255]));

    assert!(decode_svg(b"<svg").is_err());
}

#[test]
fn clones_share_identity_and_new_decodes_do_not() {
    let a = RasterImage::solid(2, 2, Color::BLACK).unwrap();
    let b = a.clone();
    let c = RasterImage::solid(2, 2, Color::BLACK).unwrap();
    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
}

#[test]
fn from_premul_validates_length() {
    assert!(RasterImage::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(RasterImage::from_premul_rgba8(0, 2, vec![]).is_err());
    let r = RasterImage::from_premul_rgba8(1, 1, vec![64, 0, 0, 128]).unwrap();
    assert_eq!(r.pixel(0, 0), Some([128, 0, 0, 128]));
    assert_eq!(r.pixel(1, 0), None);
}

#[test]
fn load_raster_reads_files_from_disk() {
    let dir = std::env::temp_dir().join(format!("photogrid_decode_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("px.png");
    std::fs::write(&path, encode_png(3, 2, vec![9; 3 * 2 * 4])).unwrap();

    let raster = load_raster(&path).unwrap();
    assert_eq!((raster.width, raster.height), (3, 2));
    assert!(load_raster(&dir.join("missing.png")).is_err());

    std::fs::remove_dir_all(&dir).ok();
}

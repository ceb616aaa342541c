use super::*;

fn frame() -> FrameRGBA {
    // Opaque red, half-transparent premultiplied blue, fully transparent.
    FrameRGBA {
        width: 3,
        height: 1,
        data: vec![255, 0, 0, 255, 0, 0, 128, 128, 0, 0, 0, 0],
        premultiplied: true,
    }
}

#[test]
fn png_round_trips_as_straight_alpha() {
    let bytes = encode_frame(&frame(), ExportFormat::Png).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 1));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 128]);
    assert_eq!(img.get_pixel(2, 0).0[3], 0);
}

#[test]
fn jpeg_flattens_alpha_onto_black() {
    let f = FrameRGBA {
        width: 16,
        height: 16,
        data: [0u8, 0, 0, 0].repeat(256),
        premultiplied: true,
    };
    let bytes = encode_frame(&f, ExportFormat::default()).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert!(img.pixels().all(|p| p.0.iter().all(|&c| c <= 2)));
}

#[test]
fn straight_frames_are_flattened_too() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![200, 100, 50, 0],
        premultiplied: false,
    };
    assert_eq!(flatten_on_black(&f), vec![0, 0, 0]);
    assert_eq!(flatten_on_black(&frame()), vec![255, 0, 0, 0, 0, 128, 0, 0, 0]);
}

#[test]
fn mismatched_buffer_is_an_encode_error() {
    let mut f = frame();
    f.data.pop();
    let err = encode_frame(&f, ExportFormat::Png).unwrap_err();
    assert!(matches!(err, PhotoGridError::Encode(_)));
}

#[test]
fn formats_from_extension_and_name() {
    assert_eq!(
        ExportFormat::from_extension(Path::new("out/grid.JPG")),
        Some(ExportFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY
        })
    );
    assert_eq!(
        ExportFormat::from_extension(Path::new("grid.png")),
        Some(ExportFormat::Png)
    );
    assert_eq!(ExportFormat::from_extension(Path::new("grid.webp")), None);
    assert_eq!(ExportFormat::from_extension(Path::new("grid")), None);

    assert_eq!(
        ExportFormat::from_name("jpeg", Some(70)).unwrap(),
        ExportFormat::Jpeg { quality: 70 }
    );
    assert!(ExportFormat::from_name("gif", None).is_err());
    assert_eq!(ExportFormat::Png.mime(), "image/png");
    assert_eq!(ExportFormat::default().extension(), "jpg");
}

#[test]
fn write_export_creates_parent_dirs() {
    let dir = std::env::temp_dir().join(format!("photogrid_export_{}", std::process::id()));
    let path = dir.join("nested").join("grid.png");
    write_export(&path, &frame(), ExportFormat::Png).unwrap();
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (3, 1));
    let _ = std::fs::remove_dir_all(&dir);
}

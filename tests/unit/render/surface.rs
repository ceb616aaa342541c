use super::*;

#[test]
fn readback_before_render_fails() {
    let s = RasterSurface::new(SurfaceRole::Preview);
    assert_eq!(s.canvas(), None);
    let err = s.readback().unwrap_err();
    assert!(err.to_string().contains("Preview"));
}

#[test]
fn ensure_size_only_reallocates_on_change() {
    let mut s = RasterSurface::new(SurfaceRole::Export);
    let a = Canvas::new(4, 3).unwrap();
    assert!(s.ensure_size(a).unwrap());
    assert!(!s.ensure_size(a).unwrap());
    assert!(s.ensure_size(Canvas::new(3, 4).unwrap()).unwrap());

    let frame = s.readback().unwrap();
    assert_eq!((frame.width, frame.height), (3, 4));
    assert_eq!(frame.data.len(), 3 * 4 * 4);
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn frame_pixel_and_straight_conversion() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 64, 0, 0, 128],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([64, 0, 0, 128]));
    assert_eq!(frame.pixel(2, 0), None);
    assert_eq!(frame.to_straight_rgba8(), vec![255, 0, 0, 255, 128, 0, 0, 128]);
}

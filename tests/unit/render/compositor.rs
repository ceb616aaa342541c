use super::*;
use crate::render::surface::SurfaceRole;

const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);
const GREEN: Color = Color::rgb(0, 255, 0);

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn solid(w: u32, h: u32, c: Color) -> RasterImage {
    RasterImage::solid(w, h, c).unwrap()
}

fn photo(img: RasterImage) -> Option<SlotPhoto> {
    Some(SlotPhoto {
        image: img,
        transform: PhotoTransform::CENTERED,
    })
}

fn render(scene: &Scene) -> (CompositeReport, crate::render::surface::FrameRGBA) {
    let mut compositor = Compositor::new();
    let mut surface = RasterSurface::new(SurfaceRole::Preview);
    let report = compositor.composite(scene, &mut surface).unwrap();
    (report, surface.readback().unwrap())
}

#[track_caller]
fn assert_px(frame: &crate::render::surface::FrameRGBA, x: u32, y: u32, want: Color) {
    let got = frame.pixel(x, y).unwrap();
    let want = want.to_premul();
    for i in 0..4 {
        assert!(
            got[i].abs_diff(want[i]) <= 2,
            "pixel ({x},{y}) = {got:?}, want {want:?}"
        );
    }
}

#[test]
fn color_background_floods_the_canvas() {
    let mut scene = Scene::blank(canvas(16, 12));
    scene.background = BackgroundPaint::Color(RED);
    let (report, frame) = render(&scene);
    assert_eq!((frame.width, frame.height), (16, 12));
    assert_eq!(report.drawn, [false; 4]);
    assert!(report.warnings.is_empty());
    for (x, y) in [(0, 0), (15, 0), (0, 11), (15, 11), (7, 6)] {
        assert_px(&frame, x, y, RED);
    }
}

#[test]
fn photo_is_clipped_to_its_cell() {
    let mut scene = Scene::blank(canvas(20, 20));
    scene.background = BackgroundPaint::Color(RED);
    scene.slots[SlotPosition::TopLeft.index()] = photo(solid(4, 4, BLUE));

    let (report, frame) = render(&scene);
    assert_eq!(report.drawn, [true, false, false, false]);
    assert_px(&frame, 0, 0, BLUE);
    assert_px(&frame, 5, 5, BLUE);
    assert_px(&frame, 9, 9, BLUE);
    assert_px(&frame, 10, 9, RED);
    assert_px(&frame, 9, 10, RED);
    assert_px(&frame, 15, 15, RED);
}

#[test]
fn padding_and_margins_leave_background_visible() {
    let mut scene = Scene::blank(canvas(40, 40));
    scene.background = BackgroundPaint::Color(RED);
    scene.margins = Edges::uniform(4);
    scene.padding = Edges::uniform(2);
    for slot in SlotPosition::ALL {
        scene.slots[slot.index()] = photo(solid(3, 5, BLUE));
    }

    let (report, frame) = render(&scene);
    assert_eq!(report.drawn, [true; 4]);
    // Margin, then padding, then photo.
    assert_px(&frame, 2, 20, RED);
    assert_px(&frame, 5, 10, RED);
    assert_px(&frame, 7, 10, BLUE);
    // Gutter between the left and right cells: 20 +/- 2.
    assert_px(&frame, 19, 10, RED);
    assert_px(&frame, 20, 10, RED);
    assert_px(&frame, 23, 10, BLUE);
}

#[test]
fn overlay_is_stretched_and_drawn_last() {
    let mut scene = Scene::blank(canvas(20, 20));
    scene.background = BackgroundPaint::Color(RED);
    scene.slots[SlotPosition::TopLeft.index()] = photo(solid(4, 4, BLUE));
    // Left texel opaque green, right texel fully transparent.
    scene.overlay = Some(
        RasterImage::from_straight_rgba8(2, 1, vec![0, 255, 0, 255, 0, 0, 0, 0]).unwrap(),
    );

    let (_, frame) = render(&scene);
    // Green covers the photo on the left.
    assert_px(&frame, 2, 2, GREEN);
    assert_px(&frame, 2, 17, GREEN);
    // Transparent on the right lets the layers below through.
    assert_px(&frame, 17, 2, RED);
}

#[test]
fn image_background_is_cover_fitted() {
    let mut scene = Scene::blank(canvas(30, 10));
    scene.background = BackgroundPaint::Image(solid(5, 5, GREEN));
    let (_, frame) = render(&scene);
    for (x, y) in [(0, 0), (29, 0), (0, 9), (29, 9), (15, 5)] {
        assert_px(&frame, x, y, GREEN);
    }
}

#[test]
fn degenerate_grid_still_paints_background_and_overlay() {
    let mut scene = Scene::blank(canvas(20, 20));
    scene.background = BackgroundPaint::Color(RED);
    scene.margins = Edges::new(0, 0, 10, 10);
    scene.slots[0] = photo(solid(4, 4, BLUE));
    scene.overlay = Some(
        RasterImage::from_straight_rgba8(1, 2, vec![0, 255, 0, 255, 0, 0, 0, 0]).unwrap(),
    );

    let (report, frame) = render(&scene);
    assert!(report.grid.is_degenerate());
    assert_eq!(report.drawn, [false; 4]);
    assert!(matches!(
        report.warnings.as_slice(),
        [CompositeWarning::DegenerateGrid { .. }]
    ));
    assert_px(&frame, 10, 2, GREEN);
    assert_px(&frame, 10, 17, RED);
}

#[test]
fn padded_out_cell_is_reported_not_drawn() {
    let mut scene = Scene::blank(canvas(20, 20));
    scene.padding = Edges::new(5, 5, 0, 0);
    scene.slots[1] = photo(solid(4, 4, BLUE));
    let (report, _) = render(&scene);
    assert_eq!(report.drawn, [false; 4]);
    assert_eq!(
        report.warnings,
        vec![CompositeWarning::CellSkipped {
            slot: SlotPosition::TopRight
        }]
    );
}

#[test]
fn one_failing_photo_does_not_abort_the_frame() {
    let mut scene = Scene::blank(canvas(20, 20));
    scene.background = BackgroundPaint::Color(RED);
    // Wider than the raster backend can hold as a paint.
    scene.slots[0] = photo(solid(70_000, 1, GREEN));
    scene.slots[3] = photo(solid(2, 2, BLUE));

    let (report, frame) = render(&scene);
    assert_eq!(report.drawn, [false, false, false, true]);
    assert_eq!(report.warnings.len(), 1);
    let CompositeWarning::PhotoFailed { slot, message } = &report.warnings[0] else {
        panic!("unexpected warning {:?}", report.warnings[0]);
    };
    assert_eq!(*slot, SlotPosition::TopLeft);
    assert!(message.contains("u16"), "{message}");
    assert_px(&frame, 5, 5, RED);
    assert_px(&frame, 15, 15, BLUE);
}

#[test]
fn compositing_is_idempotent_and_clears_previous_content() {
    let mut scene = Scene::blank(canvas(24, 18));
    scene.background = BackgroundPaint::Color(RED);
    scene.margins = Edges::new(1, 2, 3, 1);
    scene.slots[0] = photo(solid(7, 3, BLUE));
    scene.slots[2] = Some(SlotPhoto {
        image: solid(3, 7, GREEN),
        transform: PhotoTransform::new(2.5, 10.0, 90.0),
    });

    let mut compositor = Compositor::new();
    let mut surface = RasterSurface::new(SurfaceRole::Export);
    compositor.composite(&scene, &mut surface).unwrap();
    let first = surface.readback().unwrap();

    // Paint something else in between, then the same scene again.
    let mut other = scene.clone();
    other.slots = Default::default();
    other.background = BackgroundPaint::Color(GREEN);
    compositor.composite(&other, &mut surface).unwrap();
    compositor.composite(&scene, &mut surface).unwrap();

    assert_eq!(surface.readback().unwrap(), first);
}

#[test]
fn paint_cache_keeps_only_rasters_in_use() {
    let mut scene = Scene::blank(canvas(10, 10));
    let a = solid(2, 2, BLUE);
    let b = solid(2, 2, GREEN);
    scene.slots[0] = photo(a.clone());
    scene.overlay = Some(b.clone());

    let mut compositor = Compositor::new();
    let mut surface = RasterSurface::new(SurfaceRole::Preview);
    compositor.composite(&scene, &mut surface).unwrap();
    assert_eq!(compositor.paints.len(), 2);

    scene.overlay = None;
    compositor.composite(&scene, &mut surface).unwrap();
    assert_eq!(compositor.paints.len(), 1);
    assert!(compositor.paints.contains_key(&a.id()));
    assert!(!compositor.paints.contains_key(&b.id()));
}

#[test]
fn surface_follows_canvas_size() {
    let mut compositor = Compositor::new();
    let mut surface = RasterSurface::new(SurfaceRole::Preview);
    compositor
        .composite(&Scene::blank(canvas(8, 8)), &mut surface)
        .unwrap();
    compositor
        .composite(&Scene::blank(canvas(12, 5)), &mut surface)
        .unwrap();
    assert_eq!(surface.canvas(), Some(canvas(12, 5)));
    let frame = surface.readback().unwrap();
    assert_px(&frame, 11, 4, Color::WHITE);
}

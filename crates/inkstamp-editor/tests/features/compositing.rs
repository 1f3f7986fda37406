use image::{Rgba, RgbaImage};
use inkstamp_core::BakeError;
use inkstamp_editor::{
    fit_page_to_limit, BlendMode, Compositor, InkColor, Placement, PlacementField,
    PlacementLimits, Point, SignatureImage, Size,
};

const WHITE: [u8; 4] = [255, 255, 255, 255];

fn white_page(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(WHITE))
}

fn stamp(page: Size, center: Point, width_ratio: f64) -> Placement {
    let image = SignatureImage::new(RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255])));
    Placement::new(image, center, width_ratio, page, &PlacementLimits::default()).unwrap()
}

fn is_dark(px: &Rgba<u8>) -> bool {
    px.0[0] < 8 && px.0[1] < 8 && px.0[2] < 8 && px.0[3] == 255
}

fn close(a: u8, b: u8) -> bool {
    a.abs_diff(b) <= 3
}

#[test]
fn test_bake_flips_normalized_y_to_raster_rows() {
    let size = Size::new(100.0, 100.0);
    let p = stamp(size, Point::new(0.5, 0.75), 0.2);
    let result = Compositor::default().bake(&white_page(100, 100), &[p]).unwrap();

    // upper quarter of the page, not the lower
    assert!(is_dark(result.image.get_pixel(50, 25)));
    assert_eq!(result.image.get_pixel(50, 75).0, WHITE);
}

#[test]
fn test_bake_rotates_about_box_center() {
    let size = Size::new(100.0, 100.0);
    let limits = PlacementLimits::default();
    let mut p = stamp(size, Point::new(0.5, 0.75), 0.2);
    p.apply(PlacementField::Rotation(90.0), size, &limits);

    let result = Compositor::default().bake(&white_page(100, 100), &[p]).unwrap();

    // a 20x10 box turned a quarter is 10 wide and 20 tall around (50, 25)
    assert!(is_dark(result.image.get_pixel(50, 17)));
    assert!(is_dark(result.image.get_pixel(50, 32)));
    assert_eq!(result.image.get_pixel(42, 25).0, WHITE);
    assert_eq!(result.image.get_pixel(57, 25).0, WHITE);
}

#[test]
fn test_bake_recolors_non_black_ink() {
    let size = Size::new(100.0, 100.0);
    let limits = PlacementLimits::default();
    let mut p = stamp(size, Point::new(0.5, 0.5), 0.2);
    p.apply(PlacementField::Color(InkColor::Red), size, &limits);

    let result = Compositor::default().bake(&white_page(100, 100), &[p]).unwrap();
    let px = result.image.get_pixel(50, 50).0;
    let [r, g, b] = InkColor::Red.rgb();
    assert!(close(px[0], r) && close(px[1], g) && close(px[2], b));

    // the record keeps the untinted source
    let restored = result.records[0].to_signature_image().unwrap();
    assert_eq!(restored.pixels().get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(result.records[0].color, InkColor::Red);
}

#[test]
fn test_multiply_darkens_page_color() {
    let size = Size::new(100.0, 100.0);
    let limits = PlacementLimits::default();
    let page = RgbaImage::from_pixel(100, 100, Rgba([100, 150, 200, 255]));
    let mut p = stamp(size, Point::new(0.5, 0.5), 0.2);
    p.apply(PlacementField::Color(InkColor::Blue), size, &limits);

    let normal = Compositor::new(BlendMode::Normal, 4096)
        .bake(&page, std::slice::from_ref(&p))
        .unwrap();
    let multiply = Compositor::new(BlendMode::Multiply, 4096)
        .bake(&page, &[p])
        .unwrap();

    let n = normal.image.get_pixel(50, 50).0;
    let m = multiply.image.get_pixel(50, 50).0;
    let [r, g, b] = InkColor::Blue.rgb();
    assert!(close(n[0], r) && close(n[1], g) && close(n[2], b));
    // ink times paper: 100*18/255, 150*62/255, 200*182/255
    assert!(close(m[0], 7) && close(m[1], 36) && close(m[2], 143));
}

#[test]
fn test_later_placements_draw_on_top() {
    let size = Size::new(100.0, 100.0);
    let limits = PlacementLimits::default();
    let below = stamp(size, Point::new(0.5, 0.5), 0.2);
    let mut above = stamp(size, Point::new(0.5, 0.5), 0.2);
    above.apply(PlacementField::Color(InkColor::Green), size, &limits);

    let result = Compositor::default()
        .bake(&white_page(100, 100), &[below, above])
        .unwrap();
    let px = result.image.get_pixel(50, 50).0;
    let [r, g, b] = InkColor::Green.rgb();
    assert!(close(px[0], r) && close(px[1], g) && close(px[2], b));
    assert_eq!(result.records.len(), 2);
}

#[test]
fn test_corrupt_placement_skipped_rest_stamped() {
    let size = Size::new(100.0, 100.0);
    let good = stamp(size, Point::new(0.3, 0.5), 0.2);
    let mut broken = stamp(size, Point::new(0.7, 0.5), 0.2);
    broken.source = SignatureImage::new(RgbaImage::new(0, 0));
    let broken_id = broken.id;

    let result = Compositor::default()
        .bake(&white_page(100, 100), &[broken, good])
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.omitted.len(), 1);
    assert_eq!(result.omitted[0].id, broken_id);
    assert!(is_dark(result.image.get_pixel(30, 50)));
    assert_eq!(result.image.get_pixel(70, 50).0, WHITE);
}

#[test]
fn test_bad_pages_rejected() {
    let p = stamp(Size::new(100.0, 100.0), Point::new(0.5, 0.5), 0.2);
    let err = Compositor::default()
        .bake(&RgbaImage::new(0, 0), std::slice::from_ref(&p))
        .unwrap_err();
    assert_eq!(err, BakeError::InvalidPage { width: 0, height: 0 });

    let err = Compositor::new(BlendMode::Normal, 100)
        .bake(&white_page(200, 50), &[p])
        .unwrap_err();
    assert_eq!(
        err,
        BakeError::PageTooLarge {
            width: 200,
            height: 50,
            max_edge: 100
        }
    );
}

#[test]
fn test_fit_page_then_bake() {
    let compositor = Compositor::new(BlendMode::Normal, 100);
    let page = fit_page_to_limit(&white_page(300, 150), compositor.max_render_edge());
    assert_eq!(page.dimensions(), (100, 50));
    assert!(compositor.bake(&page, &[]).is_ok());
}

#[test]
fn test_preview_matches_letterboxed_page() {
    let size = Size::new(600.0, 800.0);
    let p = stamp(size, Point::new(0.5, 0.5), 0.3);
    let page = white_page(600, 800);
    let compositor = Compositor::default();

    let preview = compositor
        .render_preview(&page, std::slice::from_ref(&p), Size::new(400.0, 400.0))
        .unwrap();
    assert_eq!(preview.dimensions(), (400, 400));
    // page occupies x 50..350; the stamp sits at the screen center
    assert!(is_dark(preview.get_pixel(200, 200)));
    assert!(preview.get_pixel(60, 20).0.iter().all(|c| *c >= 250));
    assert_eq!(preview.get_pixel(10, 200).0[3], 0);

    assert!(compositor
        .render_preview(&page, &[p], Size::new(0.0, 400.0))
        .is_none());
}

//! Tests for the built-in filters and chain planning.

use image::Rgb;
use renderer::filters::apply_all;
use renderer::{FilterRegistry, Raster};
use stitch_common::{parse_filter_spec, FilterContext, FilterInvocation, StitchError};
use test_utils::{assert_raster_eq, framed_raster, gradient_raster, solid_raster};

fn ctx(width: u32, height: u32) -> FilterContext {
    FilterContext {
        satellite: "goes-16".into(),
        sector: "full_disk".into(),
        product: "geocolor".into(),
        timestamp: 20240115123020,
        target_width: width,
        target_height: height,
    }
}

fn run(img: Raster, spec: &str, ctx: &FilterContext) -> Result<Raster, StitchError> {
    apply_all(img, &parse_filter_spec(spec), &FilterRegistry::builtin(), ctx)
}

// ============================================================================
// scale
// ============================================================================

#[test]
fn test_scale_is_idempotent_on_target_size() {
    let img = gradient_raster(64, 32);
    let once = run(img.clone(), "scale:64-32", &ctx(0, 0)).unwrap();
    assert_raster_eq!(once, img);

    let twice = run(once, "scale:64-32", &ctx(0, 0)).unwrap();
    assert_raster_eq!(twice, img);
}

#[test]
fn test_scale_letterboxes_square_into_wide_box() {
    let img = solid_raster(400, 400, [200, 100, 50]);
    let out = run(img, "scale:200-100", &ctx(0, 0)).unwrap();

    assert_eq!(out.dimensions(), (200, 100));
    // 100x100 content centered: 50px black bars left and right
    assert_eq!(out.get_pixel(10, 50), &Rgb([0, 0, 0]));
    assert_eq!(out.get_pixel(190, 50), &Rgb([0, 0, 0]));
    let center = out.get_pixel(100, 50).0;
    for (got, want) in center.iter().zip([200u8, 100, 50]) {
        assert!(got.abs_diff(want) <= 1, "center pixel {:?}", center);
    }
}

#[test]
fn test_scale_without_args_uses_request_size() {
    let img = solid_raster(256, 256, [9, 9, 9]);
    let out = run(img, "scale", &ctx(128, 64)).unwrap();
    assert_eq!(out.dimensions(), (128, 64));
}

#[test]
fn test_scale_rejects_upscaling() {
    let img = solid_raster(100, 100, [1, 1, 1]);
    let err = run(img, "scale:200-50", &ctx(0, 0)).unwrap_err();
    assert!(matches!(err, StitchError::FilterPreconditionFailed { ref filter, .. } if filter == "scale"));
}

// ============================================================================
// trim
// ============================================================================

#[test]
fn test_trim_uniform_image_is_identity() {
    let img = solid_raster(20, 10, [30, 60, 90]);
    let out = run(img.clone(), "trim", &ctx(0, 0)).unwrap();
    assert_raster_eq!(out, img);
}

#[test]
fn test_trim_crops_to_content() {
    let img = framed_raster(50, 40, (10, 5, 20, 15));
    let out = run(img, "trim", &ctx(0, 0)).unwrap();
    assert_eq!(out.dimensions(), (20, 15));
    assert!(out.pixels().all(|p| p == &Rgb([250, 200, 150])));
}

// ============================================================================
// padding and annotation
// ============================================================================

#[test]
fn test_add_px_top_and_add_22_px() {
    let img = solid_raster(8, 8, [5, 5, 5]);
    assert_eq!(run(img.clone(), "add_px_top:3", &ctx(0, 0)).unwrap().dimensions(), (8, 11));
    assert_eq!(run(img, "add_22_px", &ctx(0, 0)).unwrap().dimensions(), (8, 30));
}

#[test]
fn test_timestamp_keeps_size() {
    let img = Raster::new(640, 360);
    let out = run(img, "timestamp", &ctx(0, 0)).unwrap();
    assert_eq!(out.dimensions(), (640, 360));
    assert!(out.pixels().any(|p| p.0 != [0, 0, 0]));
}

#[test]
fn test_typical_chain() {
    let img = framed_raster(300, 300, (50, 50, 200, 200));
    let out = run(img, "trim,scale:100-50,add_22_px,timestamp", &ctx(0, 0)).unwrap();
    assert_eq!(out.dimensions(), (100, 72));
}

// ============================================================================
// planning errors
// ============================================================================

#[test]
fn test_unknown_filter() {
    let err = FilterRegistry::builtin()
        .plan(&[FilterInvocation::new("sharpen", vec![])])
        .unwrap_err();
    assert!(matches!(err, StitchError::UnknownFilter(ref name) if name == "sharpen"));
}

#[test]
fn test_arity_mismatch() {
    let registry = FilterRegistry::builtin();

    let err = registry.plan(&parse_filter_spec("scale:100")).unwrap_err();
    assert!(matches!(
        err,
        StitchError::FilterArityMismatch { ref filter, actual: 1, .. } if filter == "scale"
    ));

    assert!(registry.plan(&parse_filter_spec("add_px_top")).is_err());
    assert!(registry.plan(&parse_filter_spec("trim:5")).is_err());
}

#[test]
fn test_bad_argument_values() {
    let registry = FilterRegistry::builtin();
    for spec in ["scale:wide-100", "scale:0-100", "add_px_top:abc"] {
        let err = registry.plan(&parse_filter_spec(spec)).unwrap_err();
        assert!(
            matches!(err, StitchError::InvalidFilterArgument { .. }),
            "{} gave {:?}",
            spec,
            err
        );
    }
}

#[test]
fn test_errors_raised_before_any_filter_runs() {
    // First step would fail at apply time; the unknown filter must win
    let img = solid_raster(10, 10, [0, 0, 0]);
    let err = run(img, "scale:500-500,nope", &ctx(0, 0)).unwrap_err();
    assert!(matches!(err, StitchError::UnknownFilter(_)));
}

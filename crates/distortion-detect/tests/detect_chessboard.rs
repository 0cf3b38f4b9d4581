use distortion_core::{
    synthetic::{chessboard::ChessboardScene, noise::IntensityNoise},
    BrownConrady5, GrayImage, GridSpec, ImageSize, Point2D,
};
use distortion_detect::{ControlPointDetector, DetectError, DetectorParams};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn max_error(detected: &[Point2D], truth: &[Point2D]) -> f64 {
    detected
        .iter()
        .zip(truth)
        .map(|(d, t)| d.distance(t))
        .fold(0.0, f64::max)
}

#[test]
fn frontal_board_is_detected_in_row_major_order() {
    init_logger();
    let grid = GridSpec::new(9, 6, 10.0);
    let scene = ChessboardScene::new(grid, ImageSize::new(640, 480));
    let image = scene.render().unwrap();
    let truth = scene.corner_pixels().unwrap();

    let set = ControlPointDetector::default()
        .detect(&image.as_view(), &grid)
        .unwrap();
    assert_eq!(set.len(), 54);

    for (i, cp) in set.iter().enumerate() {
        assert_eq!(cp.grid_index, grid.logical_index(i));
    }
    let err = max_error(&set.pixels(), &truth);
    assert!(err < 0.25, "max corner error {err:.3} px");

    // Index 0 is top-left, columns advance along +x, rows along +y.
    let px = set.pixels();
    assert!(px[1].x > px[0].x);
    assert!(px[9].y > px[0].y);
}

#[test]
fn tilted_barrel_board_is_detected() {
    init_logger();
    let grid = GridSpec::new(9, 6, 10.0);
    let scene = ChessboardScene::new(grid, ImageSize::new(640, 480))
        .with_tilt(0.12, -0.08, 0.05)
        .with_distortion(BrownConrady5::radial(-0.25, 0.0));
    let image = scene.render().unwrap();
    let truth = scene.corner_pixels().unwrap();

    let set = ControlPointDetector::default()
        .detect(&image.as_view(), &grid)
        .unwrap();
    let err = max_error(&set.pixels(), &truth);
    assert!(err < 0.35, "max corner error {err:.3} px");
}

#[test]
fn noisy_board_is_detected() {
    init_logger();
    let grid = GridSpec::new(7, 5, 10.0);
    let scene = ChessboardScene::new(grid, ImageSize::new(480, 400));
    let mut image = scene.render().unwrap();
    IntensityNoise::new(11, 8.0).apply(&mut image);
    let truth = scene.corner_pixels().unwrap();

    let set = ControlPointDetector::default()
        .detect(&image.as_view(), &grid)
        .unwrap();
    let err = max_error(&set.pixels(), &truth);
    assert!(err < 0.4, "max corner error {err:.3} px");
}

#[test]
fn vertical_board_starts_at_the_top_left_corner() {
    init_logger();
    let grid = GridSpec::new(7, 5, 10.0);
    let scene = ChessboardScene::new(grid, ImageSize::new(480, 400))
        .with_tilt(0.0, 0.0, std::f64::consts::FRAC_PI_2);
    let image = scene.render().unwrap();
    let truth = scene.corner_pixels().unwrap();

    let set = ControlPointDetector::default()
        .detect(&image.as_view(), &grid)
        .unwrap();
    let px = set.pixels();
    assert_eq!(px.len(), 35);

    // Columns run down the image, rows across it.
    assert!((px[1].y - px[0].y) > (px[1].x - px[0].x).abs());
    assert!((px[7].x - px[0].x) > (px[7].y - px[0].y).abs());
    let nearest = px
        .iter()
        .map(|p| p.x + p.y)
        .fold(f64::INFINITY, f64::min);
    assert!((px[0].x + px[0].y - nearest).abs() < 1.0);

    for p in &px {
        let d = truth.iter().map(|t| t.distance(p)).fold(f64::INFINITY, f64::min);
        assert!(d < 0.35, "corner {p:?} is {d:.3} px from the nearest true corner");
    }
}

#[test]
fn blank_image_has_no_grid() {
    init_logger();
    let image = GrayImage::filled(320, 240, 128);
    let err = ControlPointDetector::default()
        .detect(&image.as_view(), &GridSpec::new(9, 6, 10.0))
        .unwrap_err();
    assert_eq!(
        err,
        DetectError::GridNotFound {
            found: 0,
            expected: 54
        }
    );
}

#[test]
fn too_many_requested_points_is_grid_not_found() {
    init_logger();
    let grid = GridSpec::new(9, 6, 10.0);
    let image = ChessboardScene::new(grid, ImageSize::new(640, 480))
        .render()
        .unwrap();

    match ControlPointDetector::default().detect(&image.as_view(), &GridSpec::new(10, 7, 10.0)) {
        Err(DetectError::GridNotFound { found, expected }) => {
            assert_eq!(expected, 70);
            assert!(found < 70);
        }
        other => panic!("expected GridNotFound, got {other:?}"),
    }
}

#[test]
fn sub_grid_of_a_larger_board_is_rejected() {
    init_logger();
    let grid = GridSpec::new(9, 6, 10.0);
    let image = ChessboardScene::new(grid, ImageSize::new(640, 480))
        .render()
        .unwrap();

    let err = ControlPointDetector::default()
        .detect(&image.as_view(), &GridSpec::new(5, 4, 10.0))
        .unwrap_err();
    assert!(matches!(
        err,
        DetectError::GridNotFound { expected: 20, .. }
    ));
}

#[test]
fn invalid_inputs_are_typed_errors() {
    let image = GrayImage::filled(16, 16, 0);
    let det = ControlPointDetector::default();
    assert!(matches!(
        det.detect(&image.as_view(), &GridSpec::new(1, 6, 10.0)),
        Err(DetectError::Grid(_))
    ));
    assert!(matches!(
        det.detect(&image.as_view(), &GridSpec::new(3, 3, 10.0)),
        Err(DetectError::ImageTooSmall { .. })
    ));
}

#[test]
fn params_fill_missing_fields_from_defaults() {
    let params: DetectorParams =
        serde_json::from_str(r#"{ "nms_radius": 4, "subpix": { "max_iters": 10 } }"#).unwrap();
    assert_eq!(params.nms_radius, 4);
    assert_eq!(params.subpix.max_iters, 10);
    assert_eq!(params.subpix.half_window, 5);
    assert_eq!(params.max_spacing_px, DetectorParams::default().max_spacing_px);
    assert!(!params.use_radius10);
}

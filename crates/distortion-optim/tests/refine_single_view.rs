use distortion_core::{
    synthetic::planar, BrownConrady5, FxFyCxCySkew, GridSpec, ImageSize, Iso3, PinholeCamera, Pt2,
};
use distortion_linear::{dlt_homography, estimate_planar_pose_from_h, SingleViewIntrinsics};
use distortion_optim::{
    single_view::{refine_single_view, DistortionTerms, SingleViewProblem},
    LmBackend, SolveOptions,
};
use nalgebra::{Translation3, UnitQuaternion};

#[test]
fn refine_recovers_barrel_distortion_from_one_view() {
    let size = ImageSize::new(640, 480);
    let grid = GridSpec::new(9, 6, 10.0);
    let k_gt = FxFyCxCySkew {
        fx: 800.0,
        fy: 800.0,
        cx: 320.0,
        cy: 240.0,
        skew: 0.0,
    };
    let cam_gt = PinholeCamera::new(k_gt, BrownConrady5::radial(-0.25, 0.0));
    let pose_gt = Iso3::from_parts(
        Translation3::new(-40.0, -25.0, 200.0),
        UnitQuaternion::from_euler_angles(0.2, -0.15, 0.03),
    );

    let pixels: Vec<Pt2> = planar::project_grid(&cam_gt, &pose_gt, &grid)
        .unwrap()
        .into_iter()
        .map(Pt2::from)
        .collect();
    let target: Vec<Pt2> = grid.target_points().into_iter().map(Pt2::from).collect();

    let h = dlt_homography(&target, &pixels).unwrap();
    let init = SingleViewIntrinsics::from_homography(&h, size).unwrap();
    let pose0 = estimate_planar_pose_from_h(&init.intrinsics.k_matrix(), &h).unwrap();
    let cam0 = PinholeCamera::new(init.intrinsics, BrownConrady5::zero());

    let problem = SingleViewProblem::new(
        grid.board_points(),
        pixels,
        Pt2::new(320.0, 240.0),
        DistortionTerms::default(),
    )
    .unwrap();
    let est = refine_single_view(&LmBackend, &problem, &cam0, &pose0, &SolveOptions::default());

    assert!(est.report.converged, "{:?}", est.report);
    assert!(est.rms_px.unwrap() < 1e-4, "rms {:?}", est.rms_px);
    assert!((est.camera.dist.k1 + 0.25).abs() < 1e-3, "{:?}", est.camera.dist);
    assert!((est.camera.k.fx - 800.0).abs() < 0.5, "{:?}", est.camera.k);

    // Distortion-free reprojection matches the undistorted ground truth.
    let ideal = planar::project_grid(&est.camera.without_distortion(), &est.cam_from_target, &grid)
        .unwrap();
    let truth = planar::project_grid(&cam_gt.without_distortion(), &pose_gt, &grid).unwrap();
    for (a, b) in ideal.iter().zip(&truth) {
        assert!(a.distance(b) < 1e-2, "{a:?} vs {b:?}");
    }
}

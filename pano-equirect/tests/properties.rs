use approx::assert_relative_eq;
use pano_core::{CameraPose, MaskedPixel, SlantDepth};
use pano_equirect::{project, PanoramaFrame};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

const EPSILON_APPROX: f64 = 1e-9;

fn frame() -> PanoramaFrame {
    PanoramaFrame::default()
}

#[quickcheck]
fn projection_is_deterministic(w: u16, h: u16, heading: i16, depth: u16) -> TestResult {
    let frame = frame();
    let pixel = MaskedPixel::new(u32::from(w) % frame.width(), u32::from(h) % frame.height());
    let depth = match SlantDepth::new(f64::from(depth) / 16.0) {
        Some(depth) => depth,
        None => return TestResult::discard(),
    };
    let pose = CameraPose::new(-12.5, 40.0, f64::from(heading) / 10.0);
    TestResult::from_bool(frame.project(pixel, depth, &pose) == frame.project(pixel, depth, &pose))
}

#[quickcheck]
fn horizontal_distance_never_exceeds_slant_depth(h: u16, depth: u16) -> bool {
    let frame = frame();
    let h = f64::from(u32::from(h) % frame.height());
    let depth = f64::from(depth);
    frame.horizontal_distance(h, depth) <= depth + EPSILON_APPROX
}

#[quickcheck]
fn bearing_from_north_is_a_compass_angle(w: u16, heading: i16) -> bool {
    let frame = frame();
    let w = f64::from(u32::from(w) % frame.width());
    let bearing = frame.bearing_from_north(w, f64::from(heading) / 10.0);
    (0.0..=360.0).contains(&bearing)
}

#[quickcheck]
fn bearing_from_north_matches_column_bearing(w: u16, heading: i16) -> bool {
    let frame = frame();
    let w = f64::from(u32::from(w) % frame.width());
    let heading = f64::from(heading) / 10.0;
    let a = frame.bearing_from_north(w, heading).rem_euclid(360.0);
    let b = frame.column_bearing(w, heading).rem_euclid(360.0);
    let diff = (a - b).abs();
    diff < 1e-6 || (360.0 - diff) < 1e-6
}

#[quickcheck]
fn column_for_bearing_inverts_bearing(w: u16, heading: i16) -> bool {
    let frame = frame();
    let w = f64::from(u32::from(w) % frame.width());
    let heading = f64::from(heading) / 10.0;
    let bearing = frame.bearing_from_north(w, heading);
    let back = frame.column_for_bearing(bearing, heading);
    let diff = (back - w).abs();
    diff < 1e-6 || (f64::from(frame.width()) - diff) < 1e-6
}

#[test]
fn free_function_matches_frame() {
    let frame = PanoramaFrame::new(2048, 1024, 1536.0).unwrap();
    let pose = CameraPose::new(100.0, 200.0, 33.0);
    let pixel = MaskedPixel::new(700, 300);
    let depth = SlantDepth::new(8.5).unwrap();
    let a = frame.project(pixel, depth, &pose);
    let b = project(700.0, 300.0, 2048, 1024, 1536.0, 33.0, 8.5, 100.0, 200.0).unwrap();
    assert_relative_eq!(a, b, epsilon = EPSILON_APPROX);
}

#[test]
fn free_function_rejects_empty_frame() {
    assert!(project(0.0, 0.0, 0, 1024, 0.0, 0.0, 1.0, 0.0, 0.0).is_err());
    assert!(project(0.0, 0.0, 2048, 0, 0.0, 0.0, 1.0, 0.0, 0.0).is_err());
}

#[test]
fn projected_ground_distance_matches_horizontal_distance() {
    let frame = frame();
    let pose = CameraPose::new(0.0, 0.0, 12.0);
    for h in [0u32, 100, 400, 512, 700, 1023] {
        let depth = SlantDepth::new(20.0).unwrap();
        let p = frame.project(MaskedPixel::new(250, h), depth, &pose);
        let ground = (p.x * p.x + p.y * p.y).sqrt();
        assert_relative_eq!(
            ground,
            frame.horizontal_distance(f64::from(h), 20.0),
            epsilon = EPSILON_APPROX
        );
    }
}

use pano_core::nalgebra::Point2;
use pano_core::BuildingFootprint;
use pano_snake::{
    active_contour, detect_corners, refine_footprints, ActiveContour, PointCloud2, SnakeSettings,
};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::f64::consts::TAU;

const HALF_SIDE: f64 = 5.0;

/// Points along the outline of a square of side 10 centered at the origin.
fn square_outline(spacing: f64) -> Vec<Point2<f64>> {
    let steps = (2.0 * HALF_SIDE / spacing).round() as usize;
    (0..steps)
        .flat_map(|i| {
            let t = -HALF_SIDE + i as f64 * spacing;
            [
                Point2::new(t, -HALF_SIDE),
                Point2::new(HALF_SIDE, t),
                Point2::new(-t, HALF_SIDE),
                Point2::new(-HALF_SIDE, -t),
            ]
        })
        .collect()
}

fn circle(radius: f64, vertices: usize) -> Vec<Point2<f64>> {
    (0..vertices)
        .map(|i| {
            let angle = TAU * i as f64 / vertices as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn distance_to_square(p: &Point2<f64>) -> f64 {
    let (x, y) = (p.x.abs(), p.y.abs());
    if x <= HALF_SIDE && y <= HALF_SIDE {
        (HALF_SIDE - x).min(HALF_SIDE - y)
    } else {
        let dx = (x - HALF_SIDE).max(0.0);
        let dy = (y - HALF_SIDE).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

fn mean_distance(points: &[Point2<f64>]) -> f64 {
    points.iter().map(distance_to_square).sum::<f64>() / points.len() as f64
}

fn settings() -> SnakeSettings {
    SnakeSettings {
        radius: 3.0,
        iterations: 200,
        ..SnakeSettings::default()
    }
}

#[test]
fn circle_grows_onto_square_cloud() {
    let cloud = PointCloud2::new(square_outline(0.25));
    let initial = circle(3.0, 64);
    let before = mean_distance(&initial);

    let refined = active_contour(&initial, &cloud, &settings()).unwrap();
    assert!(refined.is_closed());
    let after = mean_distance(&refined.exterior);
    assert!(
        after < before / 2.0,
        "mean distance went from {} to {}",
        before,
        after
    );
}

#[test]
fn every_iteration_is_applied() {
    let cloud = PointCloud2::new(square_outline(0.25));
    let initial = circle(3.0, 64);
    let short = SnakeSettings {
        iterations: 5,
        ..settings()
    };
    let mut snake = ActiveContour::new(&initial, &cloud, short).unwrap();
    let start = mean_distance(snake.contour());
    snake.run();
    let after_five = mean_distance(snake.contour());
    for _ in 0..195 {
        snake.step();
    }
    let after_all = mean_distance(snake.contour());
    assert!(after_five < start);
    assert!(after_all < after_five);
}

#[test]
fn buildings_refine_independently() {
    let mut rng = Pcg64::from_seed([3; 32]);
    // Two square clouds far apart, each with some scatter.
    let offsets = [Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)];
    let cloud: PointCloud2 = offsets
        .iter()
        .flat_map(|offset| {
            square_outline(0.25)
                .into_iter()
                .map(move |p| Point2::new(p.x + offset.x, p.y + offset.y))
        })
        .map(|p| {
            let jitter: f64 = rng.gen_range(-0.05..0.05);
            Point2::new(p.x + jitter, p.y - jitter)
        })
        .collect();
    let footprints: Vec<BuildingFootprint> = offsets
        .iter()
        .map(|offset| {
            BuildingFootprint::new(
                circle(3.0, 32)
                    .into_iter()
                    .map(|p| Point2::new(p.x + offset.x, p.y + offset.y))
                    .collect(),
            )
        })
        .collect();

    let refined = refine_footprints(&footprints, &cloud, &settings(), 3.0);
    assert_eq!(refined.len(), 2);
    for (footprint, offset) in refined.iter().zip(offsets) {
        let footprint = footprint.as_ref().unwrap();
        assert!(footprint.is_closed());
        let local: Vec<Point2<f64>> = footprint
            .exterior
            .iter()
            .map(|p| Point2::new(p.x - offset.x, p.y - offset.y))
            .collect();
        assert!(mean_distance(&local) < 1.5);
    }
}

#[quickcheck]
fn corner_thresholds_bound_the_flags(raw: Vec<(i8, i8)>) -> TestResult {
    if raw.is_empty() {
        return TestResult::discard();
    }
    let contour: Vec<Point2<f64>> = raw
        .iter()
        .map(|&(x, y)| Point2::new(f64::from(x), f64::from(y)))
        .collect();
    TestResult::from_bool(
        detect_corners(&contour, 0.0).len() == contour.len()
            && detect_corners(&contour, 1e9).is_empty(),
    )
}

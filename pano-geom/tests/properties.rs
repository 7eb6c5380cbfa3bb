use pano_core::nalgebra::Point2;
use pano_core::{BuildingFootprint, CameraPose, DepthResolver, MaskedPixel};
use pano_equirect::PanoramaFrame;
use pano_geom::{close_ring, perimeter, resample_ring, FootprintIndex, Ray, RayCastAgainstFootprints};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn to_points(raw: &[(i16, i16)]) -> Vec<Point2<f64>> {
    raw.iter()
        .map(|&(x, y)| Point2::new(f64::from(x) / 8.0, f64::from(y) / 8.0))
        .collect()
}

#[quickcheck]
fn closed_ring_starts_and_ends_alike(raw: Vec<(i16, i16)>) -> TestResult {
    if raw.is_empty() {
        return TestResult::discard();
    }
    let ring = close_ring(&to_points(&raw));
    TestResult::from_bool(ring.first() == ring.last())
}

#[quickcheck]
fn closing_twice_changes_nothing(raw: Vec<(i16, i16)>) -> bool {
    let once = close_ring(&to_points(&raw));
    close_ring(&once) == once
}

#[quickcheck]
fn resampling_respects_segment_length(raw: Vec<(i16, i16)>, length: u8) -> TestResult {
    let points = to_points(&raw);
    let segment_length = f64::from(length) / 16.0;
    let total = perimeter(&points);
    if segment_length <= 0.0 || total <= 0.0 || total / segment_length > 50_000.0 {
        return TestResult::discard();
    }
    let samples = resample_ring(&points, segment_length).unwrap();
    let expected = (total / segment_length).ceil() as usize;
    if samples.len() != expected {
        return TestResult::failed();
    }
    let closed = close_ring(&samples);
    let within = closed
        .windows(2)
        .all(|pair| (pair[1] - pair[0]).norm() <= segment_length + 1e-6);
    TestResult::from_bool(within)
}

#[quickcheck]
fn empty_collection_never_resolves(x: i16, y: i16, heading: i16, w: u16) -> bool {
    let index = FootprintIndex::new(&[]);
    let frame = PanoramaFrame::default();
    let resolver = RayCastAgainstFootprints::new(frame, &index);
    let pose = CameraPose::new(f64::from(x), f64::from(y), f64::from(heading));
    let pixel = MaskedPixel::new(u32::from(w) % frame.width(), 512);
    resolver.resolve(pixel, &pose).is_none()
}

#[quickcheck]
fn every_row_of_a_column_lands_on_the_facade(w: u16, h: u16, heading: i16) -> TestResult {
    // The camera stands inside a building, so every column hits a wall.
    let index = FootprintIndex::new(&[BuildingFootprint::new(vec![
        Point2::new(-20.0, -15.0),
        Point2::new(25.0, -15.0),
        Point2::new(25.0, 30.0),
        Point2::new(-20.0, 30.0),
    ])]);
    let frame = PanoramaFrame::default();
    let resolver = RayCastAgainstFootprints::new(frame, &index);
    let pose = CameraPose::new(1.0, 2.0, f64::from(heading));
    let pixel = MaskedPixel::new(
        u32::from(w) % frame.width(),
        u32::from(h) % frame.height(),
    );
    let hit = match resolver.hit(pixel.w, &pose) {
        Some(hit) => hit,
        None => return TestResult::failed(),
    };
    let depth = match resolver.resolve(pixel, &pose) {
        Some(depth) => depth,
        None => return TestResult::discard(),
    };
    let point = frame.project(pixel, depth, &pose);
    let ground = ((point.x - 1.0).powi(2) + (point.y - 2.0).powi(2)).sqrt();
    TestResult::from_bool((ground - hit.distance).abs() <= 1e-9 * hit.distance.max(1.0))
}

#[test]
fn index_agrees_with_exhaustive_search() {
    let mut rng = Pcg64::from_seed([7; 32]);
    let footprints: Vec<BuildingFootprint> = (0..40)
        .map(|_| {
            let cx = rng.gen_range(-200.0..200.0);
            let cy = rng.gen_range(-200.0..200.0);
            let hw = rng.gen_range(2.0..15.0);
            let hh = rng.gen_range(2.0..15.0);
            BuildingFootprint::new(vec![
                Point2::new(cx - hw, cy - hh),
                Point2::new(cx + hw, cy - hh),
                Point2::new(cx + hw, cy + hh),
                Point2::new(cx - hw, cy + hh),
            ])
        })
        .collect();
    let index = FootprintIndex::new(&footprints);
    for _ in 0..200 {
        let origin = Point2::new(rng.gen_range(-250.0..250.0), rng.gen_range(-250.0..250.0));
        let ray = Ray::from_bearing(origin, rng.gen_range(0.0..360.0));
        let expected = footprints
            .iter()
            .flat_map(|f| pano_geom::ring_segments(&f.exterior).collect::<Vec<_>>())
            .filter_map(|s| s.ray_intersection(ray.origin, ray.direction, ray.length))
            .fold(None, |best: Option<f64>, t| Some(best.map_or(t, |b| b.min(t))));
        let found = index.cast(&ray).map(|hit| hit.distance);
        match (expected, found) {
            (Some(e), Some(f)) => assert!((e - f).abs() < 1e-9, "{} != {}", e, f),
            (None, None) => {}
            other => panic!("index and exhaustive search disagree: {:?}", other),
        }
    }
}

use crate::{Error, Result};
use pano_core::nalgebra::{Point2, Vector2};

/// A directed line segment between two ring vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

impl Segment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vector2<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Intersects the ray `origin + t * direction` with this segment.
    ///
    /// `direction` must be a unit vector, so that the returned `t` is the distance from the
    /// origin to the intersection. Only hits with `0 <= t <= max_distance` are reported.
    /// A ray parallel to the segment never hits it, including when it runs along the segment.
    pub fn ray_intersection(
        &self,
        origin: Point2<f64>,
        direction: Vector2<f64>,
        max_distance: f64,
    ) -> Option<f64> {
        let seg = self.direction();
        let denominator = cross(direction, seg);
        if denominator.abs() <= f64::EPSILON * seg.norm() {
            return None;
        }
        let origin_to_start = self.start - origin;
        let t = cross(origin_to_start, seg) / denominator;
        let s = cross(origin_to_start, direction) / denominator;
        ((0.0..=max_distance).contains(&t) && (0.0..=1.0).contains(&s)).then(|| t)
    }
}

/// Returns the ring as an explicitly closed polygon.
///
/// If the last vertex differs from the first, the first is appended. Rings that are already
/// closed are returned unchanged, so the operation is idempotent.
///
/// ```
/// use pano_core::nalgebra::Point2;
/// use pano_geom::close_ring;
///
/// let open = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];
/// let closed = close_ring(&open);
/// assert_eq!(closed.len(), 4);
/// assert_eq!(closed.first(), closed.last());
/// assert_eq!(close_ring(&closed), closed);
/// ```
pub fn close_ring(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut ring = points.to_vec();
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// Iterates over the edges of the closed ring, including the closing edge of an open ring.
pub fn ring_segments(points: &[Point2<f64>]) -> impl Iterator<Item = Segment> + '_ {
    let closing = match (points.first(), points.last()) {
        (Some(&first), Some(&last)) if first != last => Some(Segment::new(last, first)),
        _ => None,
    };
    points
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .chain(closing)
}

/// The length of the closed ring.
pub fn perimeter(points: &[Point2<f64>]) -> f64 {
    ring_segments(points).map(|segment| segment.length()).sum()
}

/// Resamples a ring at uniform arc length.
///
/// The ring is walked as a closed polygon starting at its first vertex. The number of samples
/// is `ceil(perimeter / segment_length)` and they are spaced `perimeter / n` apart, so no two
/// successive samples (including the last and the first) are more than `segment_length` apart.
/// The returned ring is open: the first sample is not repeated at the end.
///
/// ```
/// use pano_core::nalgebra::Point2;
/// use pano_geom::resample_ring;
///
/// let square = [
///     Point2::new(0.0, 0.0),
///     Point2::new(4.0, 0.0),
///     Point2::new(4.0, 4.0),
///     Point2::new(0.0, 4.0),
/// ];
/// let samples = resample_ring(&square, 1.0).unwrap();
/// assert_eq!(samples.len(), 16);
/// assert_eq!(samples[1], Point2::new(1.0, 0.0));
/// ```
pub fn resample_ring(points: &[Point2<f64>], segment_length: f64) -> Result<Vec<Point2<f64>>> {
    if !(segment_length.is_finite() && segment_length > 0.0) {
        return Err(Error::InvalidSegmentLength(segment_length));
    }
    let segments: Vec<Segment> = ring_segments(points)
        .filter(|segment| segment.length() > 0.0)
        .collect();
    let total: f64 = segments.iter().map(Segment::length).sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(Error::DegenerateRing);
    }

    let count = (total / segment_length).ceil() as usize;
    let spacing = total / count as f64;

    let mut samples = Vec::with_capacity(count);
    let mut current = 0;
    let mut walked = 0.0;
    for k in 0..count {
        let target = k as f64 * spacing;
        while current + 1 < segments.len() && target > walked + segments[current].length() {
            walked += segments[current].length();
            current += 1;
        }
        let segment = segments[current];
        let t = ((target - walked) / segment.length()).clamp(0.0, 1.0);
        samples.push(segment.start + segment.direction() * t);
    }
    Ok(samples)
}

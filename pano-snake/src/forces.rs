use crate::PointCloud2;
use pano_core::nalgebra::{Point2, Vector2};

/// The neighbors of point `i` on a closed contour.
pub(crate) fn neighbors(contour: &[Point2<f64>], i: usize) -> (Point2<f64>, Point2<f64>) {
    let n = contour.len();
    (contour[(i + n - 1) % n], contour[(i + 1) % n])
}

/// Finds the high curvature points of a closed contour.
///
/// A point is flagged when the distance between its previous and next neighbor exceeds
/// `threshold`. The flags are taken once, before the contour moves, and are matched back to
/// the moving points by position. A `threshold` of zero or less flags every point and an
/// unreachable one flags none.
pub fn detect_corners(contour: &[Point2<f64>], threshold: f64) -> Vec<Point2<f64>> {
    (0..contour.len())
        .filter(|&i| {
            let (prev, next) = neighbors(contour, i);
            threshold <= 0.0 || (next - prev).norm() > threshold
        })
        .map(|i| contour[i])
        .collect()
}

/// The smoothing force on `point`.
///
/// `alpha` weighs the tension toward the neighbors and `beta` weighs the discrete second
/// derivative that resists bending.
pub fn internal_force(
    prev: Point2<f64>,
    point: Point2<f64>,
    next: Point2<f64>,
    alpha: f64,
    beta: f64,
) -> Vector2<f64> {
    alpha * (next - prev) + beta * (next.coords - 2.0 * point.coords + prev.coords)
}

/// The data force on `point`: toward the centroid of the cloud points within `radius`.
///
/// Zero when no cloud point is in range.
pub fn external_force(point: Point2<f64>, cloud: &PointCloud2, radius: f64) -> Vector2<f64> {
    cloud
        .centroid_within(point, radius)
        .map_or_else(Vector2::zeros, |centroid| centroid - point)
}

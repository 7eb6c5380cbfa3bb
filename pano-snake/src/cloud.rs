use pano_core::nalgebra::{Point2, Vector2};
use rstar::{RTree, AABB};

/// A ground-plane point cloud indexed for radius queries.
///
/// The solver only needs the `X` and `Y` of the reconstructed points. The index is built once
/// and never modified, so one cloud can be read by many solvers at the same time.
#[derive(Debug, Clone, Default)]
pub struct PointCloud2 {
    tree: RTree<[f64; 2]>,
}

impl PointCloud2 {
    pub fn new(points: impl IntoIterator<Item = Point2<f64>>) -> Self {
        Self {
            tree: RTree::bulk_load(points.into_iter().map(|p| [p.x, p.y]).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// All points within `radius` of `center`, boundary included.
    pub fn within(
        &self,
        center: Point2<f64>,
        radius: f64,
    ) -> impl Iterator<Item = Point2<f64>> + '_ {
        self.tree
            .locate_within_distance([center.x, center.y], radius * radius)
            .map(|&[x, y]| Point2::new(x, y))
    }

    /// The mean of the points within `radius` of `center`, if there are any.
    pub fn centroid_within(&self, center: Point2<f64>, radius: f64) -> Option<Point2<f64>> {
        let (sum, count) = self
            .within(center, radius)
            .fold((Vector2::zeros(), 0usize), |(sum, count), p| {
                (sum + p.coords, count + 1)
            });
        (count > 0).then(|| Point2::from(sum / count as f64))
    }

    /// The points inside the box `[min, max]` grown by `margin` on every side.
    pub fn around(&self, min: Point2<f64>, max: Point2<f64>, margin: f64) -> Self {
        let envelope = AABB::from_corners(
            [min.x - margin, min.y - margin],
            [max.x + margin, max.y + margin],
        );
        Self {
            tree: RTree::bulk_load(self.tree.locate_in_envelope(&envelope).copied().collect()),
        }
    }
}

impl FromIterator<Point2<f64>> for PointCloud2 {
    fn from_iter<I: IntoIterator<Item = Point2<f64>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

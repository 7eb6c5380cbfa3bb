use crate::ring::{ring_segments, Segment};
use float_ord::FloatOrd;
use pano_core::nalgebra::{Point2, Vector2};
use pano_core::BuildingFootprint;
use rstar::{RTree, RTreeObject, AABB};

/// Length of a cast ray, far beyond any building a street-level camera can see.
pub const RAY_LENGTH: f64 = 1e6;

/// Slack added around the clipped ray so rounding never drops a segment on the box edge.
const CORRIDOR_PADDING: f64 = 1e-6;

/// A horizontal ray leaving the camera along a compass bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point2<f64>,
    /// Unit direction.
    pub direction: Vector2<f64>,
    pub length: f64,
}

impl Ray {
    /// Creates a ray of [`RAY_LENGTH`] along a compass `bearing` in degrees.
    ///
    /// A bearing of `0` points to `+Y` (north) and `90` points to `+X` (east).
    pub fn from_bearing(origin: Point2<f64>, bearing: f64) -> Self {
        let bearing = bearing.rem_euclid(360.0).to_radians();
        Self {
            origin,
            direction: Vector2::new(bearing.sin(), bearing.cos()),
            length: RAY_LENGTH,
        }
    }

    pub fn at(&self, t: f64) -> Point2<f64> {
        self.origin + self.direction * t
    }

    /// The part of the ray inside an axis-aligned box as a `(t_enter, t_exit)` interval.
    fn clip(&self, min: [f64; 2], max: [f64; 2]) -> Option<(f64, f64)> {
        let mut enter = 0.0f64;
        let mut exit = self.length;
        for axis in 0..2 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            if direction.abs() < f64::EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
            } else {
                let a = (min[axis] - origin) / direction;
                let b = (max[axis] - origin) / direction;
                enter = enter.max(a.min(b));
                exit = exit.min(a.max(b));
            }
        }
        (enter <= exit).then(|| (enter, exit))
    }
}

/// The nearest boundary crossing found by a cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f64,
    pub point: Point2<f64>,
    /// Index of the footprint the boundary belongs to.
    pub footprint: usize,
}

/// A boundary segment stored in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedSegment {
    segment: Segment,
    footprint: usize,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let Segment { start, end } = self.segment;
        AABB::from_corners([start.x, start.y], [end.x, end.y])
    }
}

/// An immutable spatial index over the boundaries of a set of building footprints.
///
/// The index is built once and then only read, so a single instance can be shared by
/// reference across every worker of a batch.
///
/// ```
/// use pano_core::nalgebra::Point2;
/// use pano_core::BuildingFootprint;
/// use pano_geom::{FootprintIndex, Ray};
///
/// let building = BuildingFootprint::new(vec![
///     Point2::new(-5.0, 10.0),
///     Point2::new(5.0, 10.0),
///     Point2::new(5.0, 20.0),
///     Point2::new(-5.0, 20.0),
/// ]);
/// let index = FootprintIndex::new(&[building]);
/// let hit = index.cast(&Ray::from_bearing(Point2::origin(), 0.0)).unwrap();
/// assert!((hit.distance - 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct FootprintIndex {
    tree: RTree<IndexedSegment>,
    bounds: Option<([f64; 2], [f64; 2])>,
}

impl FootprintIndex {
    /// Indexes every ring (exterior and interiors) of every footprint.
    pub fn new(footprints: &[BuildingFootprint]) -> Self {
        let segments: Vec<IndexedSegment> = footprints
            .iter()
            .enumerate()
            .flat_map(|(footprint, building)| {
                building.rings().flat_map(move |ring| {
                    ring_segments(ring)
                        .filter(|segment| segment.length() > 0.0)
                        .map(move |segment| IndexedSegment { segment, footprint })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let bounds = segments.iter().fold(None, |bounds, indexed| {
            let Segment { start, end } = indexed.segment;
            let ([min_x, min_y], [max_x, max_y]) = bounds.unwrap_or((
                [f64::INFINITY, f64::INFINITY],
                [f64::NEG_INFINITY, f64::NEG_INFINITY],
            ));
            Some((
                [min_x.min(start.x).min(end.x), min_y.min(start.y).min(end.y)],
                [max_x.max(start.x).max(end.x), max_y.max(start.y).max(end.y)],
            ))
        });
        Self {
            tree: RTree::bulk_load(segments),
            bounds,
        }
    }

    /// Number of indexed boundary segments.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds the nearest boundary crossing along the ray.
    ///
    /// Every boundary the ray crosses is considered and the smallest distance is returned, so
    /// a nearer building occludes a farther one. Returns `None` when nothing is crossed, which
    /// is always the case for an empty index.
    pub fn cast(&self, ray: &Ray) -> Option<RayHit> {
        let (min, max) = self.bounds?;
        let (enter, exit) = ray.clip(min, max)?;
        let a = ray.at(enter);
        let b = ray.at(exit);
        let corridor = AABB::from_corners(
            [a.x.min(b.x) - CORRIDOR_PADDING, a.y.min(b.y) - CORRIDOR_PADDING],
            [a.x.max(b.x) + CORRIDOR_PADDING, a.y.max(b.y) + CORRIDOR_PADDING],
        );
        self.tree
            .locate_in_envelope_intersecting(&corridor)
            .filter_map(|indexed| {
                indexed
                    .segment
                    .ray_intersection(ray.origin, ray.direction, ray.length)
                    .map(|distance| (distance, indexed.footprint))
            })
            .min_by_key(|&(distance, _)| FloatOrd(distance))
            .map(|(distance, footprint)| RayHit {
                distance,
                point: ray.at(distance),
                footprint,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangle(min: (f64, f64), max: (f64, f64)) -> BuildingFootprint {
        BuildingFootprint::new(vec![
            Point2::new(min.0, min.1),
            Point2::new(max.0, min.1),
            Point2::new(max.0, max.1),
            Point2::new(min.0, max.1),
        ])
    }

    #[test]
    fn empty_index_never_hits() {
        let index = FootprintIndex::new(&[]);
        assert!(index.is_empty());
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0, 359.9] {
            assert!(index
                .cast(&Ray::from_bearing(Point2::new(3.0, -7.0), bearing))
                .is_none());
        }
    }

    #[test]
    fn nearer_building_occludes_farther() {
        let near = rectangle((-2.0, 5.0), (2.0, 8.0));
        let far = rectangle((-10.0, 30.0), (10.0, 40.0));
        let index = FootprintIndex::new(&[far, near]);
        let hit = index.cast(&Ray::from_bearing(Point2::origin(), 0.0)).unwrap();
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-9);
        assert_eq!(hit.footprint, 1);
        // From inside the far building only its own west wall is crossed.
        let hit = index.cast(&Ray::from_bearing(Point2::new(5.0, 35.0), 270.0)).unwrap();
        assert_relative_eq!(hit.distance, 15.0, epsilon = 1e-9);
        assert_eq!(hit.footprint, 0);
    }

    #[test]
    fn ray_leaving_the_area_misses() {
        let index = FootprintIndex::new(&[rectangle((10.0, 10.0), (20.0, 20.0))]);
        assert!(index
            .cast(&Ray::from_bearing(Point2::origin(), 180.0))
            .is_none());
    }

    #[test]
    fn camera_inside_courtyard_sees_interior_ring() {
        let building = rectangle((-20.0, -20.0), (20.0, 20.0)).with_interiors(vec![vec![
            Point2::new(-3.0, -3.0),
            Point2::new(3.0, -3.0),
            Point2::new(3.0, 3.0),
            Point2::new(-3.0, 3.0),
        ]]);
        let index = FootprintIndex::new(&[building]);
        let hit = index.cast(&Ray::from_bearing(Point2::origin(), 90.0)).unwrap();
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-9);
        assert_relative_eq!(hit.point, Point2::new(3.0, 0.0), epsilon = 1e-9);
    }
}

use alloc::vec::Vec;
use nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The ground-plane outline of one building.
///
/// The `exterior` ring is an ordered vertex sequence which may or may not repeat its first
/// vertex at the end. Courtyards and other holes are kept as `interiors`; they take part in
/// ray casting because their edges are visible facades too.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BuildingFootprint {
    pub exterior: Vec<Point2<f64>>,
    pub interiors: Vec<Vec<Point2<f64>>>,
}

impl BuildingFootprint {
    /// Creates a footprint without holes.
    pub fn new(exterior: Vec<Point2<f64>>) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_interiors(self, interiors: Vec<Vec<Point2<f64>>>) -> Self {
        Self { interiors, ..self }
    }

    /// All boundary rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &[Point2<f64>]> + '_ {
        core::iter::once(self.exterior.as_slice()).chain(self.interiors.iter().map(Vec::as_slice))
    }

    /// Returns `true` when the exterior repeats its first vertex at the end.
    pub fn is_closed(&self) -> bool {
        match (self.exterior.first(), self.exterior.last()) {
            (Some(first), Some(last)) => self.exterior.len() > 1 && first == last,
            _ => false,
        }
    }

    /// The axis-aligned bounds of the exterior as `(min, max)`.
    ///
    /// Returns `None` for an empty footprint.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = *self.exterior.first()?;
        Some(self.exterior.iter().fold((first, first), |(min, max), p| {
            (
                Point2::new(min.x.min(p.x), min.y.min(p.y)),
                Point2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        }))
    }
}

use crate::forces::{external_force, internal_force, neighbors};
use crate::{detect_corners, PointCloud2, Result, SnakeSettings};
use log::*;
use pano_core::nalgebra::{Point2, Vector2};
use pano_core::BuildingFootprint;
use pano_geom::{close_ring, resample_ring};

/// An active contour pulled toward the density of a point cloud.
///
/// The initial footprint is resampled to evenly spaced control points and its corners are
/// flagged once. Each [`step`](ActiveContour::step) computes the internal and external force
/// of every control point from the contour as it was before the step, then moves all of them
/// at once.
#[derive(Debug, Clone)]
pub struct ActiveContour<'a> {
    cloud: &'a PointCloud2,
    settings: SnakeSettings,
    contour: Vec<Point2<f64>>,
    corners: Vec<Point2<f64>>,
}

impl<'a> ActiveContour<'a> {
    /// Resamples `initial` at the configured segment length and flags its corners.
    ///
    /// Fails when the ring has no length or the segment length is not positive.
    pub fn new(
        initial: &[Point2<f64>],
        cloud: &'a PointCloud2,
        settings: SnakeSettings,
    ) -> Result<Self> {
        let contour = resample_ring(initial, settings.segment_length)?;
        let corners = detect_corners(&contour, settings.corner_threshold);
        debug!(
            "contour of {} control points with {} corners",
            contour.len(),
            corners.len()
        );
        Ok(Self {
            cloud,
            settings,
            contour,
            corners,
        })
    }

    pub fn contour(&self) -> &[Point2<f64>] {
        &self.contour
    }

    pub fn corners(&self) -> &[Point2<f64>] {
        &self.corners
    }

    pub fn settings(&self) -> &SnakeSettings {
        &self.settings
    }

    /// Whether `point` is still within tolerance of one of the flagged corners.
    pub fn is_corner(&self, point: Point2<f64>) -> bool {
        self.corners
            .iter()
            .any(|corner| (point - corner).norm() < self.settings.corner_tolerance)
    }

    fn force(&self, i: usize) -> Vector2<f64> {
        let SnakeSettings {
            alpha,
            beta,
            radius,
            corner_weight,
            ..
        } = self.settings;
        let point = self.contour[i];
        let (prev, next) = neighbors(&self.contour, i);
        let mut external = external_force(point, self.cloud, radius);
        if self.is_corner(point) {
            external *= corner_weight;
        }
        internal_force(prev, point, next, alpha, beta) + external
    }

    /// Moves every control point by `step` times its total force.
    pub fn step(&mut self) {
        let forces: Vec<Vector2<f64>> = (0..self.contour.len()).map(|i| self.force(i)).collect();
        let step = self.settings.step;
        for (point, force) in self.contour.iter_mut().zip(forces) {
            *point += force * step;
        }
    }

    /// Runs the configured number of steps.
    pub fn run(&mut self) {
        for iteration in 0..self.settings.iterations {
            self.step();
            trace!("iteration {} of {}", iteration + 1, self.settings.iterations);
        }
    }

    /// The current contour as an explicitly closed footprint.
    pub fn to_footprint(&self) -> BuildingFootprint {
        BuildingFootprint::new(close_ring(&self.contour))
    }
}

/// Refines one footprint ring: resample, iterate, close.
pub fn active_contour(
    initial: &[Point2<f64>],
    cloud: &PointCloud2,
    settings: &SnakeSettings,
) -> Result<BuildingFootprint> {
    let mut snake = ActiveContour::new(initial, cloud, *settings)?;
    snake.run();
    Ok(snake.to_footprint())
}

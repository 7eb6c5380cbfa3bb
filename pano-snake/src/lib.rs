//! # Footprint Snake
//!
//! Refines building footprints against the ground-plane density of a reconstructed point
//! cloud with an active contour ("snake").
//!
//! The initial footprint is resampled to evenly spaced control points. Every iteration each
//! control point feels two forces:
//!
//! * an internal force `alpha * (next - prev) + beta * (next - 2 * point + prev)` that keeps
//!   the contour smooth, and
//! * an external force toward the centroid of the cloud points within `radius`, multiplied by
//!   `corner_weight` at the corners flagged before the first iteration.
//!
//! All control points then move by `step` times their total force. Forces are always computed
//! from the contour as it was at the start of the iteration. There is no convergence check,
//! the solver runs for a fixed number of iterations and closes the result into a polygon.
//!
//! ```
//! use pano_core::nalgebra::Point2;
//! use pano_snake::{active_contour, PointCloud2, SnakeSettings};
//!
//! let cloud = PointCloud2::new((0..40).map(|i| Point2::new(f64::from(i) * 0.25 - 5.0, 5.0)));
//! let initial = [
//!     Point2::new(-3.0, -3.0),
//!     Point2::new(3.0, -3.0),
//!     Point2::new(3.0, 3.0),
//!     Point2::new(-3.0, 3.0),
//! ];
//! let refined = active_contour(&initial, &cloud, &SnakeSettings::default()).unwrap();
//! assert!(refined.is_closed());
//! ```

mod cloud;
mod forces;
mod refine;
mod settings;
mod solver;

pub use cloud::*;
pub use forces::{detect_corners, external_force, internal_force};
pub use refine::*;
pub use settings::*;
pub use solver::*;

/// Errors that prevent a footprint from being refined.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot build a contour: {0}")]
    Geometry(#[from] pano_geom::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The parameters of the active contour solver.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SnakeSettings {
    /// Weight of the tension term pulling each point toward its neighbors
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_alpha"))]
    pub alpha: f64,
    /// Weight of the rigidity term resisting sharp bends
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_beta"))]
    pub beta: f64,
    /// The arc length between control points after resampling the initial footprint
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_segment_length"))]
    pub segment_length: f64,
    /// Cloud points within this distance of a control point attract it
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_radius"))]
    pub radius: f64,
    /// The number of update steps, there is no convergence check
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_iterations"))]
    pub iterations: usize,
    /// The fraction of the total force applied per step
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_step"))]
    pub step: f64,
    /// Multiplier of the external force on corner points
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_corner_weight"))]
    pub corner_weight: f64,
    /// A point is a corner when its neighbors are farther apart than this.
    /// Zero or less makes every point a corner.
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_corner_threshold")
    )]
    pub corner_threshold: f64,
    /// How close a moving point must stay to a detected corner to keep the corner weight.
    ///
    /// Corners are found once, before the first iteration, and matched by position
    /// afterwards. A corner point that moves farther than this in total loses its corner
    /// weight for the rest of the run, so with the default only points the cloud barely
    /// pulls on stay corners after the first step. Raise it to keep the weight on corners
    /// that travel.
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_corner_tolerance")
    )]
    pub corner_tolerance: f64,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            segment_length: default_segment_length(),
            radius: default_radius(),
            iterations: default_iterations(),
            step: default_step(),
            corner_weight: default_corner_weight(),
            corner_threshold: default_corner_threshold(),
            corner_tolerance: default_corner_tolerance(),
        }
    }
}

fn default_alpha() -> f64 {
    0.05
}

fn default_beta() -> f64 {
    0.25
}

fn default_segment_length() -> f64 {
    1.0
}

fn default_radius() -> f64 {
    2.0
}

fn default_iterations() -> usize {
    100
}

fn default_step() -> f64 {
    0.1
}

fn default_corner_weight() -> f64 {
    2.0
}

fn default_corner_threshold() -> f64 {
    0.5
}

fn default_corner_tolerance() -> f64 {
    1e-3
}

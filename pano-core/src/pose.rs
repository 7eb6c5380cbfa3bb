use nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Height of the panoramic camera above the ground reference, in world units.
///
/// This is the mounting height of the capture vehicle's camera. It is applied to every
/// projected point as the `Z` of the horizon row.
pub const CAMERA_HEIGHT: f64 = 2.15;

/// The pose of one panorama capture.
///
/// The `heading` is a compass angle in degrees (0 is north, 90 is east) and describes the
/// direction the camera's forward column was facing when the panorama was taken.
/// A pose is immutable once the capture metadata is loaded.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraPose {
    pub position: Point2<f64>,
    pub heading: f64,
    pub height: f64,
}

impl CameraPose {
    /// Creates a pose at `(x, y)` with the given compass `heading` in degrees.
    ///
    /// The camera height is [`CAMERA_HEIGHT`].
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            heading,
            height: CAMERA_HEIGHT,
        }
    }

    /// Overrides the camera height above the ground reference.
    #[must_use]
    pub fn with_height(self, height: f64) -> Self {
        Self { height, ..self }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }
}

use crate::{MaskedPixel, SlantDepth};
use derive_more::{AsRef, Deref, From, Into};
use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// An 8-bit RGB color sampled from the panorama.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRef, Deref, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Rgb(pub [u8; 3]);

/// A reconstructed point in the world frame of the captures.
///
/// Every point traces back to exactly one masked pixel of one capture and the slant depth
/// that was resolved for it. `Z` is measured from the same ground reference as the camera
/// height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct WorldPoint {
    pub point: Point3<f64>,
    pub pixel: MaskedPixel,
    pub depth: SlantDepth,
    pub color: Option<Rgb>,
}

impl WorldPoint {
    pub fn new(point: Point3<f64>, pixel: MaskedPixel, depth: SlantDepth) -> Self {
        Self {
            point,
            pixel,
            depth,
            color: None,
        }
    }

    /// Attaches the color sampled at the source pixel.
    #[must_use]
    pub fn with_color(self, color: Rgb) -> Self {
        Self {
            color: Some(color),
            ..self
        }
    }
}

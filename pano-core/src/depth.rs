use crate::{CameraPose, MaskedPixel};
use derive_more::{AsRef, Deref, Into};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Straight-line distance from the optical center to a surface along a viewing ray.
///
/// A `SlantDepth` is always finite and strictly positive. Sources that produce zero,
/// negative or non-finite values have no estimate for that pixel, which is expressed by
/// [`SlantDepth::new`] returning `None`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsRef, Deref, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SlantDepth(f64);

impl SlantDepth {
    /// Wraps a distance, rejecting anything that is not finite and strictly positive.
    pub fn new(distance: f64) -> Option<Self> {
        (distance.is_finite() && distance > 0.0).then(|| Self(distance))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Supplies the slant depth of a masked pixel of one capture.
///
/// Implementors are the interchangeable depth strategies (depth map lookup, ray casting
/// against building footprints). The point cloud assembler only depends on this trait.
///
/// Returning `None` means there is no estimate for the pixel. This is not an error; the
/// pixel is simply not turned into a point.
pub trait DepthResolver {
    fn resolve(&self, pixel: MaskedPixel, pose: &CameraPose) -> Option<SlantDepth>;
}

impl<T> DepthResolver for &T
where
    T: DepthResolver + ?Sized,
{
    fn resolve(&self, pixel: MaskedPixel, pose: &CameraPose) -> Option<SlantDepth> {
        (**self).resolve(pixel, pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slant_depth_rejects_non_positive() {
        assert!(SlantDepth::new(0.0).is_none());
        assert!(SlantDepth::new(-3.0).is_none());
        assert!(SlantDepth::new(f64::NAN).is_none());
        assert!(SlantDepth::new(f64::INFINITY).is_none());
        assert_eq!(SlantDepth::new(10.5).map(SlantDepth::get), Some(10.5));
    }
}

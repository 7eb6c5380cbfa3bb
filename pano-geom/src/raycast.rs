use crate::{FootprintIndex, Ray, RayHit};
use pano_core::{CameraPose, DepthResolver, MaskedPixel, SlantDepth};
use pano_equirect::PanoramaFrame;

/// Resolves depth by casting the pixel's bearing against building footprints.
///
/// This is the strategy for captures without a depth sensor. Each pixel column is turned into
/// a compass bearing relative to north (wrapping around the panorama seam), a ray is cast from
/// the camera position along it. The distance to the nearest footprint boundary is the ground
/// distance to the facade, and the pixel row turns it into the slant depth along that pixel's
/// own viewing ray. Every pixel of a column shares one ray and so one facade.
///
/// The resolver only borrows the index, so any number of resolvers on any number of threads
/// can share one [`FootprintIndex`].
#[derive(Debug, Clone, Copy)]
pub struct RayCastAgainstFootprints<'a> {
    frame: PanoramaFrame,
    index: &'a FootprintIndex,
}

impl<'a> RayCastAgainstFootprints<'a> {
    pub fn new(frame: PanoramaFrame, index: &'a FootprintIndex) -> Self {
        Self { frame, index }
    }

    pub fn frame(&self) -> &PanoramaFrame {
        &self.frame
    }

    /// The ray cast for column `w` of a capture taken at `pose`.
    pub fn ray(&self, w: u32, pose: &CameraPose) -> Ray {
        let bearing = self.frame.bearing_from_north(f64::from(w), pose.heading);
        Ray::from_bearing(pose.position, bearing)
    }

    /// The nearest footprint hit for column `w`, if any.
    pub fn hit(&self, w: u32, pose: &CameraPose) -> Option<RayHit> {
        self.index.cast(&self.ray(w, pose))
    }
}

impl DepthResolver for RayCastAgainstFootprints<'_> {
    /// A hit exactly at the camera position has zero distance and yields no estimate, as do
    /// rows looking straight up or down.
    fn resolve(&self, pixel: MaskedPixel, pose: &CameraPose) -> Option<SlantDepth> {
        let hit = self.hit(pixel.w, pose)?;
        let slant = self.frame.slant_depth(f64::from(pixel.h), hit.distance)?;
        SlantDepth::new(slant)
    }
}

use image::RgbImage;
use log::*;
use pano_core::{CameraPose, DepthResolver, MaskedPixel, Rgb, WorldPoint};
use pano_equirect::PanoramaFrame;

/// Counts of what happened to the masked pixels of one capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Masked pixels offered to the assembler.
    pub masked: usize,
    /// Points emitted.
    pub emitted: usize,
    /// Pixels that had no depth estimate.
    pub no_depth: usize,
    /// Pixels outside the panorama frame.
    pub outside: usize,
}

impl AssemblyStats {
    pub fn dropped(&self) -> usize {
        self.no_depth + self.outside
    }
}

/// Builds the point set of one capture.
///
/// The assembler does not know which depth strategy is in use: every masked pixel is handed
/// to the resolver and whatever slant depth comes back is projected through the frame. Pixels
/// without an estimate are dropped and counted. When a color image is attached, each point
/// takes the color of its pixel.
///
/// ```
/// use pano_core::{CameraPose, DepthResolver, MaskedPixel, SlantDepth};
/// use pano_equirect::PanoramaFrame;
/// use pano_pointclouds::PointCloudAssembler;
///
/// struct TenMeters;
///
/// impl DepthResolver for TenMeters {
///     fn resolve(&self, _: MaskedPixel, _: &CameraPose) -> Option<SlantDepth> {
///         SlantDepth::new(10.0)
///     }
/// }
///
/// let assembler = PointCloudAssembler::new(PanoramaFrame::default(), TenMeters);
/// let (points, stats) = assembler.assemble(
///     &CameraPose::new(0.0, 0.0, 0.0),
///     [MaskedPixel::new(1536, 512)],
/// );
/// assert_eq!(stats.emitted, 1);
/// assert!((points[0].point.y - 10.0).abs() < 1e-9);
/// ```
pub struct PointCloudAssembler<'a, R> {
    frame: PanoramaFrame,
    resolver: R,
    colors: Option<&'a RgbImage>,
}

impl<'a, R> PointCloudAssembler<'a, R>
where
    R: DepthResolver,
{
    pub fn new(frame: PanoramaFrame, resolver: R) -> Self {
        Self {
            frame,
            resolver,
            colors: None,
        }
    }

    /// Attaches the panorama so that points carry the color of their pixel.
    #[must_use]
    pub fn with_colors(self, colors: &'a RgbImage) -> Self {
        Self {
            colors: Some(colors),
            ..self
        }
    }

    pub fn frame(&self) -> &PanoramaFrame {
        &self.frame
    }

    fn color(&self, pixel: MaskedPixel) -> Option<Rgb> {
        let colors = self.colors?;
        (pixel.w < colors.width() && pixel.h < colors.height())
            .then(|| Rgb(colors.get_pixel(pixel.w, pixel.h).0))
    }

    /// Projects one masked pixel, if it has a depth estimate.
    pub fn point(&self, pixel: MaskedPixel, pose: &CameraPose) -> Option<WorldPoint> {
        let depth = self.resolver.resolve(pixel, pose)?;
        let point = WorldPoint::new(self.frame.project(pixel, depth, pose), pixel, depth);
        Some(match self.color(pixel) {
            Some(color) => point.with_color(color),
            None => point,
        })
    }

    /// Projects every masked pixel of a capture taken at `pose`.
    pub fn assemble(
        &self,
        pose: &CameraPose,
        pixels: impl IntoIterator<Item = MaskedPixel>,
    ) -> (Vec<WorldPoint>, AssemblyStats) {
        let mut stats = AssemblyStats::default();
        let mut points = vec![];
        for pixel in pixels {
            stats.masked += 1;
            if !self.frame.contains(pixel) {
                stats.outside += 1;
                continue;
            }
            match self.point(pixel, pose) {
                Some(point) => points.push(point),
                None => stats.no_depth += 1,
            }
        }
        stats.emitted = points.len();
        debug!(
            "assembled {} points from {} masked pixels ({} without depth, {} outside the frame)",
            stats.emitted, stats.masked, stats.no_depth, stats.outside
        );
        (points, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DepthMapLookup, DepthRaster};
    use approx::assert_relative_eq;
    use pano_core::CAMERA_HEIGHT;

    fn raster_with(width: u32, height: u32, cells: &[(u32, u32, f64)]) -> DepthRaster {
        let mut values = vec![0.0; (width * height) as usize];
        for &(w, h, depth) in cells {
            values[(h * width + w) as usize] = depth;
        }
        DepthRaster::new(width, height, values).unwrap()
    }

    #[test]
    fn north_facing_pixel_lands_in_front_of_camera() {
        let frame = PanoramaFrame::default();
        let lookup = DepthMapLookup::new(raster_with(2048, 1024, &[(1536, 512, 10.0)]));
        let assembler = PointCloudAssembler::new(frame, lookup);
        let (points, stats) = assembler.assemble(
            &CameraPose::new(0.0, 0.0, 0.0),
            vec![MaskedPixel::new(1536, 512)],
        );
        assert_eq!(stats.emitted, 1);
        assert_relative_eq!(points[0].point.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(points[0].point.y, 10.0, epsilon = 1e-9);
        assert_relative_eq!(points[0].point.z, CAMERA_HEIGHT, epsilon = 1e-9);
        assert_eq!(points[0].depth.get(), 10.0);
        assert_eq!(points[0].pixel, MaskedPixel::new(1536, 512));
        assert!(points[0].color.is_none());
    }

    #[test]
    fn pixels_without_depth_are_counted_not_emitted() {
        let frame = PanoramaFrame::new(4, 2, 0.0).unwrap();
        let lookup = DepthMapLookup::new(raster_with(4, 2, &[(0, 1, 3.0), (2, 1, -1.0)]));
        let assembler = PointCloudAssembler::new(frame, lookup);
        let pixels = vec![
            MaskedPixel::new(0, 1),
            MaskedPixel::new(1, 1),
            MaskedPixel::new(2, 1),
            MaskedPixel::new(9, 0),
        ];
        let (points, stats) = assembler.assemble(&CameraPose::new(1.0, 1.0, 0.0), pixels);
        assert_eq!(points.len(), 1);
        assert_eq!(
            stats,
            AssemblyStats {
                masked: 4,
                emitted: 1,
                no_depth: 2,
                outside: 1,
            }
        );
        assert_eq!(stats.dropped(), 3);
    }

    #[test]
    fn colors_follow_pixels() {
        let frame = PanoramaFrame::new(4, 2, 0.0).unwrap();
        let lookup = DepthMapLookup::new(raster_with(4, 2, &[(3, 0, 1.0)]));
        let mut colors = RgbImage::new(4, 2);
        colors.put_pixel(3, 0, image::Rgb([10, 20, 30]));
        let assembler = PointCloudAssembler::new(frame, lookup).with_colors(&colors);
        let (points, _) =
            assembler.assemble(&CameraPose::new(0.0, 0.0, 0.0), [MaskedPixel::new(3, 0)]);
        assert_eq!(points[0].color, Some(Rgb([10, 20, 30])));
    }
}

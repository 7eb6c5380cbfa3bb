use crate::{Error, Result};
use pano_core::nalgebra::Point3;
use pano_core::{CameraPose, MaskedPixel, SlantDepth};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Width of the panoramas produced by the capture vehicles.
pub const DEFAULT_WIDTH: u32 = 2048;
/// Height of the panoramas produced by the capture vehicles.
pub const DEFAULT_HEIGHT: u32 = 1024;
/// Column of a default panorama which looks along the camera's forward direction.
pub const DEFAULT_YAW_OFFSET: f64 = 1536.0;

/// Rows whose elevation cosine falls below this look too steeply to turn a ground distance
/// into a slant depth.
const MIN_ELEVATION_COS: f64 = 1e-6;

/// The pixel geometry of an equirectangular panorama.
///
/// A frame is validated on construction: both dimensions are positive and even, and the yaw
/// offset is a column of the panorama. After that every method is a total function.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PanoramaFrame {
    width: u32,
    height: u32,
    yaw_offset: f64,
}

impl PanoramaFrame {
    /// Creates a frame, validating its dimensions and yaw offset.
    ///
    /// ```
    /// use pano_equirect::{Error, PanoramaFrame};
    ///
    /// assert!(PanoramaFrame::new(2048, 1024, 1536.0).is_ok());
    /// assert_eq!(
    ///     PanoramaFrame::new(0, 1024, 0.0),
    ///     Err(Error::InvalidGeometry { width: 0, height: 1024 })
    /// );
    /// assert!(PanoramaFrame::new(2048, 1024, 2048.0).is_err());
    /// ```
    pub fn new(width: u32, height: u32, yaw_offset: f64) -> Result<Self> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(Error::InvalidGeometry { width, height });
        }
        if !(0.0..f64::from(width)).contains(&yaw_offset) {
            return Err(Error::InvalidYawOffset { yaw_offset, width });
        }
        Ok(Self::new_unchecked(width, height, yaw_offset))
    }

    /// Creates a frame without validation. Dimensions must still be non-zero for the
    /// results to be finite.
    pub(crate) fn new_unchecked(width: u32, height: u32, yaw_offset: f64) -> Self {
        Self {
            width,
            height,
            yaw_offset,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn yaw_offset(&self) -> f64 {
        self.yaw_offset
    }

    /// Returns `true` if the pixel lies inside the frame.
    pub fn contains(&self, pixel: MaskedPixel) -> bool {
        pixel.w < self.width && pixel.h < self.height
    }

    fn degrees_per_column(&self) -> f64 {
        360.0 / f64::from(self.width)
    }

    fn degrees_per_row(&self) -> f64 {
        180.0 / f64::from(self.height)
    }

    fn horizon_row(&self) -> f64 {
        f64::from(self.height) / 2.0
    }

    /// The elevation magnitude of row `h` in degrees.
    ///
    /// This is zero on the horizon row and reaches 90 degrees on the first and last rows.
    pub fn elevation(&self, h: f64) -> f64 {
        self.degrees_per_row() * (h - self.horizon_row()).abs()
    }

    /// Converts a slant depth seen on row `h` into its ground-plane component.
    pub fn horizontal_distance(&self, h: f64, slant_depth: f64) -> f64 {
        slant_depth * self.elevation(h).to_radians().cos()
    }

    /// Converts a ground-plane distance seen on row `h` back into the slant depth along that
    /// row's viewing ray.
    ///
    /// Returns `None` when the row looks (almost) straight up or down, where no horizontal
    /// distance corresponds to a finite slant depth.
    ///
    /// ```
    /// use pano_equirect::PanoramaFrame;
    ///
    /// let frame = PanoramaFrame::default();
    /// let slant = frame.slant_depth(256.0, 10.0).unwrap();
    /// assert!((frame.horizontal_distance(256.0, slant) - 10.0).abs() < 1e-9);
    /// assert!(frame.slant_depth(0.0, 10.0).is_none());
    /// ```
    pub fn slant_depth(&self, h: f64, horizontal_distance: f64) -> Option<f64> {
        let cos = self.elevation(h).to_radians().cos();
        if cos < MIN_ELEVATION_COS {
            return None;
        }
        Some(horizontal_distance / cos)
    }

    /// The compass bearing in degrees that column `w` looks at, given the capture heading.
    ///
    /// The result is not wrapped into `[0, 360)`.
    pub fn column_bearing(&self, w: f64, heading: f64) -> f64 {
        (w - self.yaw_offset) * self.degrees_per_column() + heading
    }

    /// The column that looks due north for a capture with the given heading, in `[0, W)`.
    pub fn north_column(&self, heading: f64) -> f64 {
        let width = f64::from(self.width);
        (self.yaw_offset - heading * width / 360.0).rem_euclid(width)
    }

    /// The bearing of column `w` measured clockwise from north, in `[0, 360]`.
    ///
    /// Columns left of the north column wrap around the panorama seam.
    ///
    /// ```
    /// use pano_equirect::PanoramaFrame;
    ///
    /// let frame = PanoramaFrame::default();
    /// // With a zero heading the yaw offset column (1536) looks north.
    /// assert_eq!(frame.bearing_from_north(1536.0, 0.0), 0.0);
    /// assert_eq!(frame.bearing_from_north(0.0, 0.0), 90.0);
    /// assert_eq!(frame.bearing_from_north(1024.0, 0.0), 270.0);
    /// ```
    pub fn bearing_from_north(&self, w: f64, heading: f64) -> f64 {
        let north = self.north_column(heading);
        if w >= north {
            (w - north) * self.degrees_per_column()
        } else {
            360.0 - (north - w) * self.degrees_per_column()
        }
    }

    /// The (fractional) column that looks at compass `bearing`, in `[0, W)`.
    ///
    /// This inverts [`PanoramaFrame::bearing_from_north`].
    pub fn column_for_bearing(&self, bearing: f64, heading: f64) -> f64 {
        let width = f64::from(self.width);
        (self.north_column(heading) + bearing / self.degrees_per_column()).rem_euclid(width)
    }

    /// Projects a masked pixel with a resolved slant depth into the world frame of `pose`.
    pub fn project(&self, pixel: MaskedPixel, depth: SlantDepth, pose: &CameraPose) -> Point3<f64> {
        self.project_raw(
            f64::from(pixel.w),
            f64::from(pixel.h),
            pose.heading,
            depth.get(),
            pose.x(),
            pose.y(),
            pose.height,
        )
    }

    /// Projection on raw scalars.
    ///
    /// The horizontal bearing comes from the column and heading, the ground-plane distance
    /// from the slant depth and the row's elevation. Rows below the horizon look down, so the
    /// elevation is subtracted from the camera height; rows above add it.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn project_raw(
        &self,
        w: f64,
        h: f64,
        heading: f64,
        slant_depth: f64,
        cam_x: f64,
        cam_y: f64,
        cam_height: f64,
    ) -> Point3<f64> {
        let bearing = self.column_bearing(w, heading).to_radians();
        let elevation = self.elevation(h).to_radians();
        let distance = slant_depth * elevation.cos();
        let rise = distance * elevation.tan();
        let z = if h > self.horizon_row() {
            cam_height - rise
        } else {
            cam_height + rise
        };
        Point3::new(
            cam_x + distance * bearing.sin(),
            cam_y + distance * bearing.cos(),
            z,
        )
    }
}

impl Default for PanoramaFrame {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_YAW_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pano_core::CAMERA_HEIGHT;

    fn depth(d: f64) -> SlantDepth {
        SlantDepth::new(d).unwrap()
    }

    #[test]
    fn horizon_keeps_slant_depth() {
        let frame = PanoramaFrame::default();
        assert_eq!(frame.elevation(512.0), 0.0);
        assert_relative_eq!(frame.horizontal_distance(512.0, 17.25), 17.25);
    }

    #[test]
    fn slant_depth_undoes_horizontal_distance() {
        let frame = PanoramaFrame::default();
        // 45 degrees above and below the horizon.
        for h in [256.0, 768.0] {
            let slant = frame.slant_depth(h, 10.0).unwrap();
            assert_relative_eq!(slant, 10.0 * 2.0f64.sqrt(), epsilon = 1e-9);
            assert_relative_eq!(frame.horizontal_distance(h, slant), 10.0, epsilon = 1e-9);
        }
        assert_eq!(frame.slant_depth(512.0, 4.0), Some(4.0));
        assert!(frame.slant_depth(0.0, 4.0).is_none());
        assert!(frame.slant_depth(1024.0, 4.0).is_none());
    }

    #[test]
    fn zero_heading_zero_yaw_looks_north() {
        let frame = PanoramaFrame::new(2048, 1024, 0.0).unwrap();
        let pose = CameraPose::new(3.0, -4.0, 0.0);
        let p = frame.project(MaskedPixel::new(0, 512), depth(12.0), &pose);
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, -4.0 + 12.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, CAMERA_HEIGHT, epsilon = 1e-9);
    }

    #[test]
    fn capture_scenario_at_yaw_offset() {
        let frame = PanoramaFrame::new(2048, 1024, 1536.0).unwrap();
        let pose = CameraPose::new(0.0, 0.0, 0.0);
        let p = frame.project(MaskedPixel::new(1536, 512), depth(10.0), &pose);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, CAMERA_HEIGHT, epsilon = 1e-9);
    }

    #[test]
    fn rows_below_horizon_look_down() {
        let frame = PanoramaFrame::default();
        let pose = CameraPose::new(0.0, 0.0, 0.0);
        // 45 degrees below the horizon: 256 rows of 180/1024 degrees each.
        let below = frame.project(MaskedPixel::new(1536, 768), depth(2.0f64.sqrt()), &pose);
        assert_relative_eq!(below.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(below.z, CAMERA_HEIGHT - 1.0, epsilon = 1e-9);
        let above = frame.project(MaskedPixel::new(1536, 256), depth(2.0f64.sqrt()), &pose);
        assert_relative_eq!(above.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(above.z, CAMERA_HEIGHT + 1.0, epsilon = 1e-9);
    }

    #[test]
    fn heading_rotates_bearing() {
        let frame = PanoramaFrame::default();
        let pose = CameraPose::new(10.0, 20.0, 90.0);
        let p = frame.project(MaskedPixel::new(1536, 512), depth(5.0), &pose);
        assert_relative_eq!(p.x, 15.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn north_column_wraps() {
        let frame = PanoramaFrame::default();
        assert_relative_eq!(frame.north_column(0.0), 1536.0);
        assert_relative_eq!(frame.north_column(90.0), 1024.0);
        // 1536 - 300 * 2048 / 360 is negative and wraps onto the seam.
        let north = frame.north_column(300.0);
        assert!((0.0..2048.0).contains(&north));
        assert_relative_eq!(north, 1536.0 - 300.0 * 2048.0 / 360.0 + 2048.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_odd_dimensions() {
        assert!(matches!(
            PanoramaFrame::new(2047, 1024, 0.0),
            Err(Error::InvalidGeometry { .. })
        ));
        assert!(matches!(
            PanoramaFrame::new(2048, 1024, -1.0),
            Err(Error::InvalidYawOffset { .. })
        ));
    }
}

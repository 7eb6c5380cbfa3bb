//! This crate plugs into `pano-core` and provides the equirectangular camera model used by
//! street-level panoramas. It converts a pixel plus a slant depth into a point in the world
//! frame of the capture, and it exposes the column/bearing conventions the depth resolvers
//! need to cast rays in the direction a pixel is looking.
//!
//! ## Conventions
//!
//! * Columns map linearly to bearings: one column spans `360 / W` degrees.
//! * Rows map linearly to elevation: one row spans `180 / H` degrees, the horizon is row `H / 2`.
//! * Bearings are compass angles in degrees, clockwise from north, so a bearing `θ` points
//!   along `(sin θ, cos θ)` in world `X`/`Y`.
//! * The yaw offset is the column that looks along the camera's own forward direction.
//!   Adding the capture heading turns a column angle into a compass bearing.
//! * Rows below the horizon look down and rows above look up; the elevation angle is always
//!   taken as a magnitude and its sign is applied when computing `Z`.

mod frame;

pub use frame::*;

use pano_core::nalgebra::Point3;
use pano_core::CAMERA_HEIGHT;

/// Errors produced when a panorama frame is not usable for projection.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("panorama dimensions must be positive and even, got {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },
    #[error("yaw offset {yaw_offset} is outside of the panorama columns [0, {width})")]
    InvalidYawOffset { yaw_offset: f64, width: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Projects pixel `(w, h)` of a `width` x `height` panorama out to the world.
///
/// This is the free-standing form of [`PanoramaFrame::project`] for callers that carry the raw
/// capture parameters around. The camera is at `(cam_x, cam_y)` with compass `heading` in
/// degrees and is [`CAMERA_HEIGHT`] above the ground reference.
///
/// Only the panorama dimensions are validated; everything else is a total function of its
/// inputs.
///
/// ```
/// use pano_equirect::project;
///
/// // The yaw offset column at the horizon looks straight north for a heading of zero.
/// let p = project(1536.0, 512.0, 2048, 1024, 1536.0, 0.0, 10.0, 0.0, 0.0).unwrap();
/// assert!(p.x.abs() < 1e-9);
/// assert!((p.y - 10.0).abs() < 1e-9);
/// assert!((p.z - 2.15).abs() < 1e-9);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn project(
    w: f64,
    h: f64,
    width: u32,
    height: u32,
    yaw_offset: f64,
    heading: f64,
    slant_depth: f64,
    cam_x: f64,
    cam_y: f64,
) -> Result<Point3<f64>> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidGeometry { width, height });
    }
    let frame = PanoramaFrame::new_unchecked(width, height, yaw_offset);
    Ok(frame.project_raw(w, h, heading, slant_depth, cam_x, cam_y, CAMERA_HEIGHT))
}

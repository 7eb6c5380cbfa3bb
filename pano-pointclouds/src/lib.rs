//! # Panorama Point Clouds
//!
//! Turns masked panorama captures into geo-referenced point clouds.
//!
//! For one capture, [`masked_pixels`] selects the pixels of interest from the semantic mask,
//! a [`DepthResolver`](pano_core::DepthResolver) gives each of them a slant depth, and the
//! [`PointCloudAssembler`] projects them through the equirectangular camera model. Two
//! resolvers are available: [`DepthMapLookup`] for captures with a depth raster and
//! [`pano_geom::RayCastAgainstFootprints`] for captures that only have building footprints.
//!
//! The [`batch`] module drives whole directories of captures in parallel and writes the
//! per-capture point files and a status report with the writers of [`export`].

pub mod batch;
pub mod export;
mod assembler;
mod depth_map;
mod mask;
mod pose_table;

pub use assembler::*;
pub use depth_map::*;
pub use mask::*;
pub use export::read_planar_points;
pub use pose_table::*;

use std::path::PathBuf;

/// Errors raised while loading the inputs of a capture or writing its outputs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("required input {path:?} does not exist")]
    MissingInput { path: PathBuf },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid panorama geometry: {0}")]
    Geometry(#[from] pano_equirect::Error),
    #[error("depth raster of {width}x{height} cannot hold {len} values")]
    RasterShape {
        width: u32,
        height: u32,
        len: usize,
    },
    #[error("depth raster must be a single channel gray image, got {0:?}")]
    UnsupportedRaster(image::ColorType),
    #[error("pose table has no {0:?} column")]
    MissingColumn(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

//! This crate contains the computational geometry used to turn panoramas into building geometry.
//!
//! ## Rings
//!
//! Footprints come from vector map data as rings of vertices which may or may not repeat their
//! first vertex. [`close_ring`] normalizes them into explicitly closed polygons and
//! [`resample_ring`] walks a ring at uniform arc length, which is what the footprint solver
//! uses to get evenly spaced control points.
//!
//! ## Ray casting
//!
//! When a capture has no depth sensor, the distance to a facade is recovered by casting a
//! horizontal ray from the camera along the bearing of a pixel column and intersecting it with
//! every footprint boundary. The nearest intersection wins.
//!
//! ```text
//!            +-----------+
//!            |           |
//!     O ---->x           |      O  the camera position
//!            |           |      x  nearest boundary hit, its distance is the depth
//!            +-----------+
//! ```
//!
//! [`FootprintIndex`] stores the boundary segments in an R-tree so each ray only tests the
//! segments near its path, and [`RayCastAgainstFootprints`] exposes it as a
//! [`pano_core::DepthResolver`].

pub mod geojson;
mod index;
mod raycast;
mod ring;

pub use index::*;
pub use raycast::*;
pub use ring::*;

/// Errors raised by geometry construction and footprint I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ring has no length, it needs at least two distinct vertices")]
    DegenerateRing,
    #[error("segment length must be finite and positive, got {0}")]
    InvalidSegmentLength(f64),
    #[error("coordinate needs at least two components, got {0}")]
    InvalidCoordinate(usize),
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! # Panorama Core
//!
//! Common types shared by every crate that turns street-level panoramas into geometry.
//! The crate is `#![no_std]` (with `alloc` for footprint rings) and contains no algorithms
//! beyond trivial accessors, so that the camera model, the depth resolvers, the point cloud
//! assembler and the footprint solver can all speak the same language.
//!
//! ## Panorama capture
//!
//! A capture is one equirectangular panorama taken from a known [`CameraPose`]. Columns of the
//! panorama map linearly to compass bearings and rows map linearly to elevation angles. An
//! external semantic mask selects the [`MaskedPixel`]s that belong to the class of interest
//! (typically building facades). For each of those pixels a [`DepthResolver`] supplies a
//! [`SlantDepth`], the straight-line distance along the viewing ray, and the camera model turns
//! the triple (pose, pixel, depth) into a [`WorldPoint`].
//!
//! ```text
//!          bearing (column)  ->
//!     +--------------------------------+  row 0      (looking straight up)
//!     |                                |
//!     |~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~|  row H / 2  (horizon, zero elevation)
//!     |                                |
//!     +--------------------------------+  row H      (looking straight down)
//!                 ^
//!                 yaw offset column (camera forward before heading correction)
//! ```
//!
//! ## Footprints
//!
//! A [`BuildingFootprint`] is a ground-plane polygon from vector map data. It is read-only
//! input to ray casting and the working output of footprint refinement.

#![no_std]

extern crate alloc;

mod depth;
mod footprint;
mod pixel;
mod point;
mod pose;

pub use depth::*;
pub use footprint::*;
pub use nalgebra;
pub use pixel::*;
pub use point::*;
pub use pose::*;

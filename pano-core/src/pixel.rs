#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A pixel selected by a semantic mask.
///
/// `w` is the column (bearing axis) and `h` is the row (elevation axis), both counted from
/// the top-left corner of the panorama.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MaskedPixel {
    pub w: u32,
    pub h: u32,
}

impl MaskedPixel {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

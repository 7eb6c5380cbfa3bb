use crate::{Error, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use pano_core::{CameraPose, DepthResolver, MaskedPixel, SlantDepth};

/// Divisor turning a 16-bit depth encoding into metric depth.
pub const DEPTH_SCALE: f64 = 256.0;

/// A dense metric depth raster aligned with a panorama.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthRaster {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl DepthRaster {
    /// Wraps row-major metric depth values.
    pub fn new(width: u32, height: u32, values: Vec<f64>) -> Result<Self> {
        if values.len() as u64 != u64::from(width) * u64::from(height) {
            return Err(Error::RasterShape {
                width,
                height,
                len: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Decodes a 16-bit depth image, dividing every raw value by [`DEPTH_SCALE`].
    pub fn from_luma16(image: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            values: image
                .pixels()
                .map(|&Luma([raw])| f64::from(raw) / DEPTH_SCALE)
                .collect(),
        }
    }

    /// Decodes a depth image of either 8 or 16 bit gray.
    ///
    /// 8-bit rasters go through the same scale as 16-bit ones. Color images are rejected
    /// since their channels have no agreed depth meaning.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageLuma16(image) => Ok(Self::from_luma16(image)),
            DynamicImage::ImageLuma8(image) => Ok(Self::from_luma8(image)),
            other => Err(Error::UnsupportedRaster(other.color())),
        }
    }

    fn from_luma8(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            values: image
                .pixels()
                .map(|&Luma([raw])| f64::from(raw) / DEPTH_SCALE)
                .collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The metric depth at column `w`, row `h`, or `None` outside the raster.
    pub fn get(&self, w: u32, h: u32) -> Option<f64> {
        if w >= self.width || h >= self.height {
            return None;
        }
        self.values
            .get(h as usize * self.width as usize + w as usize)
            .copied()
    }
}

/// Resolves depth by reading a depth raster at the pixel.
///
/// The raster already holds line-of-sight distances in world units, so no geometry is
/// involved. Pixels outside the raster and non-positive values give no estimate.
#[derive(Debug, Clone)]
pub struct DepthMapLookup {
    raster: DepthRaster,
}

impl DepthMapLookup {
    pub fn new(raster: DepthRaster) -> Self {
        Self { raster }
    }

    pub fn raster(&self) -> &DepthRaster {
        &self.raster
    }
}

impl DepthResolver for DepthMapLookup {
    fn resolve(&self, pixel: MaskedPixel, _pose: &CameraPose) -> Option<SlantDepth> {
        self.raster
            .get(pixel.w, pixel.h)
            .and_then(SlantDepth::new)
    }
}

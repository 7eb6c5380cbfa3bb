use image::{Rgb, RgbImage};
use pano_core::MaskedPixel;

/// The mask color that selects a pixel.
pub const MASK_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Selects every pixel of the mask that is exactly [`MASK_COLOR`].
///
/// Pixels are returned in row-major order: row by row from the top, left to right within a
/// row. Anti-aliased edges (anything short of pure white) are not selected.
pub fn masked_pixels(mask: &RgbImage) -> Vec<MaskedPixel> {
    mask.enumerate_pixels()
        .filter(|(_, _, pixel)| **pixel == MASK_COLOR)
        .map(|(w, h, _)| MaskedPixel::new(w, h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pure_white_is_selected() {
        let mut mask = RgbImage::new(3, 2);
        mask.put_pixel(2, 0, MASK_COLOR);
        mask.put_pixel(0, 1, MASK_COLOR);
        mask.put_pixel(1, 1, Rgb([255, 255, 254]));
        mask.put_pixel(1, 0, MASK_COLOR);
        assert_eq!(
            masked_pixels(&mask),
            vec![
                MaskedPixel::new(1, 0),
                MaskedPixel::new(2, 0),
                MaskedPixel::new(0, 1),
            ]
        );
    }

    #[test]
    fn empty_mask_selects_nothing() {
        assert!(masked_pixels(&RgbImage::new(4, 4)).is_empty());
    }
}

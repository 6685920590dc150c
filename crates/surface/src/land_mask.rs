use crate::blur::gaussian_blur;
use crate::decode::LumaImage;
use crate::plane::Plane;

pub const DEFAULT_MASK_BLUR_PX: f32 = 6.0;
pub const DEFAULT_MASK_THRESHOLD: u8 = 80;

/// Turns a luminance land image into a bold binary coastline.
///
/// The image is blurred first so thin features thicken before the cut.
/// Samples strictly brighter than `threshold` become land.
pub fn binarize_land_mask(image: &LumaImage, blur_px: f32, threshold: u8) -> Plane {
    let mut plane = image.to_plane_raw();
    gaussian_blur(&mut plane, blur_px);
    plane.threshold(threshold as f32);
    plane
}

#[cfg(test)]
mod tests {
    use super::binarize_land_mask;
    use crate::decode::LumaImage;

    #[test]
    fn threshold_splits_land_and_ocean() {
        let pixels = vec![0, 80, 81, 255];
        let img = LumaImage::new(4, 1, pixels).unwrap();
        let mask = binarize_land_mask(&img, 0.0, 80);
        assert_eq!(mask.data(), &[0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn blur_widens_coasts_and_drops_specks() {
        let (w, h) = (64u32, 16u32);
        let mut pixels = vec![0u8; (w * h) as usize];
        for y in 0..h {
            for x in 26..38 {
                pixels[(y * w + x) as usize] = 255;
            }
            pixels[(y * w + 5) as usize] = 255;
        }
        let img = LumaImage::new(w, h, pixels).unwrap();
        let mask = binarize_land_mask(&img, 6.0, 80);
        let land_cols = (0..w).filter(|x| mask.get(*x, 8) == 1.0).count();
        assert!(land_cols > 12, "land columns {land_cols}");
        assert_eq!(mask.get(5, 8), 0.0);
    }
}

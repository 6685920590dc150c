use std::io::Cursor;

use crate::error::SurfaceError;
use crate::plane::Plane;

/// 8-bit single-channel image, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LumaImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::EmptyImage);
        }
        if pixels.len() != width as usize * height as usize {
            return Err(SurfaceError::InvalidDimensions {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Samples mapped from `0..=255` to `0.0..=255.0` (not normalized).
    pub fn to_plane_raw(&self) -> Plane {
        let data = self.pixels.iter().map(|v| *v as f32).collect();
        Plane::from_vec(self.width, self.height, data).unwrap_or_else(|| Plane::new(0, 0))
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Decodes an encoded image (PNG) into its luminance channel.
pub fn decode_luma(bytes: &[u8]) -> Result<LumaImage, SurfaceError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SurfaceError::Decode(format!("failed to guess format: {e}")))?;
    let img = reader
        .decode()
        .map_err(|e| SurfaceError::Decode(format!("failed to decode image: {e}")))?
        .to_luma8();
    let (width, height) = img.dimensions();
    tracing::debug!(width, height, "decoded surface image");
    LumaImage::new(width, height, img.into_raw())
}

/// Encodes a luminance image as PNG.
pub fn encode_luma_png(image: &LumaImage) -> Result<Vec<u8>, SurfaceError> {
    let buffer = image::GrayImage::from_raw(image.width, image.height, image.pixels.clone())
        .ok_or(SurfaceError::InvalidDimensions {
            width: image.width,
            height: image.height,
            len: image.pixels.len(),
        })?;
    let mut out = Cursor::new(Vec::new());
    buffer
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| SurfaceError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{LumaImage, decode_luma, encode_luma_png};
    use crate::error::SurfaceError;

    #[test]
    fn png_round_trip_keeps_pixels() {
        let img = LumaImage::new(3, 2, vec![0, 64, 128, 160, 200, 255]).unwrap();
        let png = encode_luma_png(&img).unwrap();
        let back = decode_luma(&png).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_luma(b"definitely not a png").unwrap_err();
        assert!(matches!(err, SurfaceError::Decode(_)));
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let err = LumaImage::new(4, 4, vec![0; 3]).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidDimensions { .. }));
    }
}

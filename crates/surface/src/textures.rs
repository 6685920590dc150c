use crate::blur::gaussian_blur;
use crate::error::SurfaceError;
use crate::plane::{Plane, unit_to_u8};
use crate::strategy::TextureStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Repeat,
    ClampToEdge,
}

/// Sampler settings a backend must honor for a surface texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    pub wrap_u: AddressMode,
    pub wrap_v: AddressMode,
    pub mipmaps: bool,
}

impl Sampling {
    /// Longitude wraps, latitude clamps at the poles.
    pub const EQUIRECT: Sampling = Sampling {
        wrap_u: AddressMode::Repeat,
        wrap_v: AddressMode::ClampToEdge,
        mipmaps: true,
    };
}

/// Tightly packed RGBA8 image ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub color_space: ColorSpace,
    pub sampling: Sampling,
}

impl TextureImage {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTextures {
    /// Land color clipped to the land alpha.
    pub color: TextureImage,
    /// White with land alpha.
    pub mask: TextureImage,
    /// Heavily blurred land alpha, grey levels.
    pub bump: TextureImage,
}

impl SurfaceTextures {
    pub fn byte_len(&self) -> usize {
        self.color.byte_len() + self.mask.byte_len() + self.bump.byte_len()
    }
}

fn rgba_from(alpha: &Plane, rgb: [u8; 3], color_space: ColorSpace) -> TextureImage {
    let mut pixels = Vec::with_capacity(alpha.data().len() * 4);
    for a in alpha.data() {
        pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], unit_to_u8(*a)]);
    }
    TextureImage {
        width: alpha.width(),
        height: alpha.height(),
        pixels,
        color_space,
        sampling: Sampling::EQUIRECT,
    }
}

/// Expands a land alpha plane into the color, mask and bump textures.
pub fn textures_from_alpha(alpha: &Plane, land_rgb: [u8; 3], bump_sigma_px: f32) -> SurfaceTextures {
    let color = rgba_from(alpha, land_rgb, ColorSpace::Srgb);
    let mask = rgba_from(alpha, [255, 255, 255], ColorSpace::Srgb);

    let mut height = alpha.clone();
    gaussian_blur(&mut height, bump_sigma_px);
    let mut pixels = Vec::with_capacity(height.data().len() * 4);
    for h in height.data() {
        let v = unit_to_u8(*h);
        pixels.extend_from_slice(&[v, v, v, 255]);
    }
    let bump = TextureImage {
        width: height.width(),
        height: height.height(),
        pixels,
        color_space: ColorSpace::Linear,
        sampling: Sampling::EQUIRECT,
    };

    SurfaceTextures { color, mask, bump }
}

/// Runs `strategy` end to end.
///
/// `source_bytes` is the fetched image for image-backed strategies and is
/// ignored by the procedural one.
pub fn synthesize(
    strategy: &TextureStrategy,
    source_bytes: Option<&[u8]>,
    land_rgb: [u8; 3],
) -> Result<SurfaceTextures, SurfaceError> {
    let alpha = strategy.land_alpha(source_bytes)?;
    if alpha.width() == 0 || alpha.height() == 0 {
        return Err(SurfaceError::EmptyImage);
    }
    let textures = textures_from_alpha(&alpha, land_rgb, strategy.bump_sigma_px());
    tracing::debug!(
        strategy = strategy.name(),
        width = alpha.width(),
        height = alpha.height(),
        "synthesized surface textures"
    );
    Ok(textures)
}

#[cfg(test)]
mod tests {
    use super::{AddressMode, ColorSpace, synthesize, textures_from_alpha};
    use crate::decode::{LumaImage, encode_luma_png};
    use crate::plane::Plane;
    use crate::strategy::TextureStrategy;

    const LAND: [u8; 3] = [0x9a, 0xe1, 0x4a];

    fn column_zero_land(w: u32, h: u32) -> Plane {
        let mut p = Plane::new(w, h);
        for y in 0..h {
            p.set(0, y, 1.0);
        }
        p
    }

    #[test]
    fn color_is_clipped_by_mask() {
        let t = textures_from_alpha(&column_zero_land(32, 8), LAND, 4.0);
        assert_eq!(t.color.pixel(0, 4), [0x9a, 0xe1, 0x4a, 255]);
        assert_eq!(t.color.pixel(16, 4)[3], 0);
        assert_eq!(t.mask.pixel(0, 4), [255, 255, 255, 255]);
        assert_eq!(t.mask.pixel(16, 4), [255, 255, 255, 0]);
    }

    #[test]
    fn bump_bleeds_across_antimeridian() {
        let t = textures_from_alpha(&column_zero_land(32, 8), LAND, 2.0);
        assert!(t.bump.pixel(31, 4)[0] > 0);
        assert_eq!(t.bump.pixel(31, 4)[3], 255);
    }

    #[test]
    fn sampling_and_color_spaces() {
        let t = textures_from_alpha(&column_zero_land(8, 4), LAND, 1.0);
        for tex in [&t.color, &t.mask, &t.bump] {
            assert_eq!(tex.sampling.wrap_u, AddressMode::Repeat);
            assert_eq!(tex.sampling.wrap_v, AddressMode::ClampToEdge);
            assert!(tex.sampling.mipmaps);
        }
        assert_eq!(t.color.color_space, ColorSpace::Srgb);
        assert_eq!(t.bump.color_space, ColorSpace::Linear);
    }

    #[test]
    fn procedural_synthesis_is_deterministic() {
        let strategy = TextureStrategy::Procedural {
            seed: 5,
            width: 128,
            height: 64,
            blobs: 12,
            blur_px: 2.0,
        };
        let a = synthesize(&strategy, None, LAND).unwrap();
        let b = synthesize(&strategy, None, LAND).unwrap();
        assert_eq!(a.mask.pixels, b.mask.pixels);
        assert_eq!(a.byte_len(), 3 * 128 * 64 * 4);
    }

    #[test]
    fn sdf_strategy_from_png_bytes() {
        let img = LumaImage::new(4, 2, vec![200, 200, 40, 40, 200, 200, 40, 40]).unwrap();
        let png = encode_luma_png(&img).unwrap();
        let strategy = TextureStrategy::Sdf {
            source: "sdf.png".into(),
            max_distance: 32.0,
        };
        let t = synthesize(&strategy, Some(&png), LAND).unwrap();
        assert_eq!(t.mask.pixel(0, 0)[3], 255);
        assert_eq!(t.mask.pixel(3, 0)[3], 0);
    }
}

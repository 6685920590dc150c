use serde::{Deserialize, Serialize};

use crate::decode::decode_luma;
use crate::error::SurfaceError;
use crate::land_mask::{DEFAULT_MASK_BLUR_PX, DEFAULT_MASK_THRESHOLD, binarize_land_mask};
use crate::plane::Plane;
use crate::procedural::{BlobParams, generate_blob_mask};
use crate::sdf::{DEFAULT_MAX_DISTANCE, check_max_distance, decode_sdf};

const SDF_BUMP_SIGMA_PX: f32 = 12.0;
const MASK_BUMP_SIGMA_PX: f32 = 18.0;

/// Where the land/ocean alpha comes from.
///
/// Image-backed variants name their `source` (URL on the web, file path
/// natively); the caller fetches the bytes and hands them to
/// [`TextureStrategy::land_alpha`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureStrategy {
    Procedural {
        #[serde(default = "default_seed")]
        seed: u64,
        #[serde(default = "default_width")]
        width: u32,
        #[serde(default = "default_height")]
        height: u32,
        #[serde(default = "default_blobs")]
        blobs: u32,
        #[serde(default = "default_mask_blur")]
        blur_px: f32,
    },
    LandMask {
        source: String,
        #[serde(default = "default_mask_blur")]
        blur_px: f32,
        #[serde(default = "default_threshold")]
        threshold: u8,
    },
    Sdf {
        source: String,
        #[serde(default = "default_max_distance")]
        max_distance: f32,
    },
}

fn default_seed() -> u64 {
    BlobParams::default().seed
}
fn default_width() -> u32 {
    BlobParams::default().width
}
fn default_height() -> u32 {
    BlobParams::default().height
}
fn default_blobs() -> u32 {
    BlobParams::default().blobs
}
fn default_mask_blur() -> f32 {
    DEFAULT_MASK_BLUR_PX
}
fn default_threshold() -> u8 {
    DEFAULT_MASK_THRESHOLD
}
fn default_max_distance() -> f32 {
    DEFAULT_MAX_DISTANCE
}

fn check_blur(blur_px: f32) -> Result<(), SurfaceError> {
    if blur_px < 0.0 || !blur_px.is_finite() {
        return Err(SurfaceError::InvalidParameter(format!(
            "blur radius must be non-negative, got {blur_px}"
        )));
    }
    Ok(())
}

fn check_source(kind: &'static str, source: &str) -> Result<(), SurfaceError> {
    if source.trim().is_empty() {
        return Err(SurfaceError::MissingSource(kind));
    }
    Ok(())
}

impl Default for TextureStrategy {
    fn default() -> Self {
        let p = BlobParams::default();
        Self::Procedural {
            seed: p.seed,
            width: p.width,
            height: p.height,
            blobs: p.blobs,
            blur_px: p.blur_px,
        }
    }
}

impl TextureStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Procedural { .. } => "procedural",
            Self::LandMask { .. } => "land_mask",
            Self::Sdf { .. } => "sdf",
        }
    }

    /// Image location the caller must fetch, if any.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Procedural { .. } => None,
            Self::LandMask { source, .. } | Self::Sdf { source, .. } => Some(source),
        }
    }

    /// Standard deviation of the bump-map blur.
    pub fn bump_sigma_px(&self) -> f32 {
        match self {
            Self::Sdf { .. } => SDF_BUMP_SIGMA_PX,
            _ => MASK_BUMP_SIGMA_PX,
        }
    }

    /// Rejects parameters that could only fail once synthesis runs.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        match self {
            Self::Procedural {
                width,
                height,
                blur_px,
                ..
            } => {
                if *width == 0 || *height == 0 {
                    return Err(SurfaceError::InvalidParameter(format!(
                        "procedural texture size {width}x{height} is empty"
                    )));
                }
                check_blur(*blur_px)
            }
            Self::LandMask {
                source, blur_px, ..
            } => {
                check_source(self.name(), source)?;
                check_blur(*blur_px)
            }
            Self::Sdf {
                source,
                max_distance,
            } => {
                check_source(self.name(), source)?;
                check_max_distance(*max_distance)
            }
        }
    }

    /// Produces the land alpha plane (`1.0` land, `0.0` ocean).
    pub fn land_alpha(&self, source_bytes: Option<&[u8]>) -> Result<Plane, SurfaceError> {
        match self {
            Self::Procedural {
                seed,
                width,
                height,
                blobs,
                blur_px,
            } => Ok(generate_blob_mask(&BlobParams {
                seed: *seed,
                width: *width,
                height: *height,
                blobs: *blobs,
                blur_px: *blur_px,
            })),
            Self::LandMask {
                blur_px, threshold, ..
            } => {
                let bytes = source_bytes.ok_or(SurfaceError::MissingSource(self.name()))?;
                let image = decode_luma(bytes)?;
                Ok(binarize_land_mask(&image, *blur_px, *threshold))
            }
            Self::Sdf { max_distance, .. } => {
                let bytes = source_bytes.ok_or(SurfaceError::MissingSource(self.name()))?;
                decode_sdf(&decode_luma(bytes)?, *max_distance)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TextureStrategy;
    use crate::error::SurfaceError;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_procedural() {
        let s = TextureStrategy::default();
        assert_eq!(s.name(), "procedural");
        assert_eq!(s.source(), None);
        assert_eq!(s.bump_sigma_px(), 18.0);
    }

    #[test]
    fn parses_tagged_json_with_defaults() {
        let s: TextureStrategy =
            serde_json::from_str(r#"{"kind":"sdf","source":"/textures/land-sdf.png"}"#).unwrap();
        assert_eq!(
            s,
            TextureStrategy::Sdf {
                source: "/textures/land-sdf.png".into(),
                max_distance: 32.0,
            }
        );
        assert_eq!(s.bump_sigma_px(), 12.0);

        let s: TextureStrategy = serde_json::from_str(r#"{"kind":"procedural","seed":3}"#).unwrap();
        assert_eq!(
            s,
            TextureStrategy::Procedural {
                seed: 3,
                width: 1024,
                height: 512,
                blobs: 28,
                blur_px: 6.0,
            }
        );
    }

    #[test]
    fn image_strategies_need_bytes() {
        let s = TextureStrategy::LandMask {
            source: "mask.png".into(),
            blur_px: 6.0,
            threshold: 80,
        };
        assert_eq!(
            s.land_alpha(None).unwrap_err(),
            SurfaceError::MissingSource("land_mask")
        );
    }

    #[test]
    fn validate_catches_unusable_parameters() {
        assert_eq!(TextureStrategy::default().validate(), Ok(()));

        let empty = TextureStrategy::Procedural {
            seed: 1,
            width: 0,
            height: 512,
            blobs: 28,
            blur_px: 6.0,
        };
        assert!(matches!(
            empty.validate(),
            Err(SurfaceError::InvalidParameter(_))
        ));

        let no_source = TextureStrategy::LandMask {
            source: " ".into(),
            blur_px: 6.0,
            threshold: 80,
        };
        assert_eq!(
            no_source.validate(),
            Err(SurfaceError::MissingSource("land_mask"))
        );

        let flat = TextureStrategy::Sdf {
            source: "sdf.png".into(),
            max_distance: 0.0,
        };
        assert!(matches!(
            flat.validate(),
            Err(SurfaceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn sdf_strategy_decodes_with_its_own_distance() {
        let png = crate::decode::encode_luma_png(
            &crate::decode::LumaImage::new(4, 181, vec![144; 4 * 181]).unwrap(),
        )
        .unwrap();
        let alpha_at = |max_distance| {
            TextureStrategy::Sdf {
                source: "sdf.png".into(),
                max_distance,
            }
            .land_alpha(Some(&png))
            .unwrap()
            .get(0, 90)
        };
        assert!(alpha_at(4.0) < 0.95);
        assert_eq!(alpha_at(32.0), 1.0);
    }

    #[test]
    fn undecodable_bytes_surface_as_decode_errors() {
        let s = TextureStrategy::Sdf {
            source: "sdf.png".into(),
            max_distance: 32.0,
        };
        assert!(matches!(
            s.land_alpha(Some(b"nope")),
            Err(SurfaceError::Decode(_))
        ));
    }
}

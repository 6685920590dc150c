//! Offline helpers for the route globe's surface assets.
//!
//! Everything here works on bytes so the CLI stays a thin shell around it.

use airports::AirportDirectory;
use serde::Serialize;
use surface::SurfaceError;
use surface::decode::{LumaImage, decode_luma, encode_luma_png};
use surface::procedural::{BlobParams, generate_blob_mask};
use surface::sdf::bake_sdf;

/// What a command wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReport {
    pub width: u32,
    pub height: u32,
    /// Share of pixels classified as land.
    pub land_coverage: f64,
    pub blake3: String,
}

impl ImageReport {
    fn new(image: &LumaImage, png: &[u8]) -> Self {
        let land = image.pixels.iter().filter(|v| **v > 127).count();
        Self {
            width: image.width,
            height: image.height,
            land_coverage: land as f64 / image.pixels.len().max(1) as f64,
            blake3: blake3::hash(png).to_hex().to_string(),
        }
    }
}

/// Turns a land mask PNG (luma above 127 is land) into an SDF PNG.
pub fn bake_sdf_png(mask_png: &[u8], max_distance: f32) -> Result<(Vec<u8>, ImageReport), SurfaceError> {
    let mask = decode_luma(mask_png)?;
    let sdf = bake_sdf(&mask, max_distance)?;
    let png = encode_luma_png(&sdf)?;
    // Coverage is reported for the mask; the SDF encodes the same split at 128.
    let report = ImageReport::new(&mask, &png);
    Ok((png, report))
}

/// Renders the procedural land mask for `params` as a PNG.
pub fn preview_mask_png(params: &BlobParams) -> Result<(Vec<u8>, ImageReport), SurfaceError> {
    if params.width == 0 || params.height == 0 {
        return Err(SurfaceError::EmptyImage);
    }
    let mask = generate_blob_mask(params);
    let image = LumaImage::new(mask.width(), mask.height(), mask.to_u8())?;
    let png = encode_luma_png(&image)?;
    let report = ImageReport::new(&image, &png);
    Ok((png, report))
}

/// The built-in airport table as pretty JSON, the format `AIRPORTS_PATH`
/// expects.
pub fn airports_json() -> Result<String, serde_json::Error> {
    let directory = AirportDirectory::builtin();
    let airports: Vec<_> = directory.iter().collect();
    serde_json::to_string_pretty(&airports)
}

#[cfg(test)]
mod tests {
    use super::{airports_json, bake_sdf_png, preview_mask_png};
    use airports::AirportDirectory;
    use pretty_assertions::assert_eq;
    use surface::decode::{LumaImage, decode_luma, encode_luma_png};
    use surface::procedural::BlobParams;

    fn half_land_png() -> Vec<u8> {
        let (w, h) = (64u32, 8u32);
        let pixels = (0..w * h).map(|i| if i % w < w / 2 { 255 } else { 0 }).collect();
        encode_luma_png(&LumaImage::new(w, h, pixels).unwrap()).unwrap()
    }

    #[test]
    fn bake_keeps_size_and_splits_at_the_coast() {
        let (png, report) = bake_sdf_png(&half_land_png(), 8.0).unwrap();
        let sdf = decode_luma(&png).unwrap();
        assert_eq!((sdf.width, sdf.height), (64, 8));
        assert_eq!(report.land_coverage, 0.5);
        assert!(sdf.get(16, 4) > 128);
        assert!(sdf.get(48, 4) < 128);
        assert_eq!(report.blake3.len(), 64);
    }

    #[test]
    fn bake_rejects_garbage_and_bad_distance() {
        assert!(bake_sdf_png(b"not a png", 32.0).is_err());
        assert!(bake_sdf_png(&half_land_png(), 0.0).is_err());
    }

    #[test]
    fn preview_is_deterministic() {
        let params = BlobParams {
            width: 128,
            height: 64,
            ..BlobParams::default()
        };
        let (a, report) = preview_mask_png(&params).unwrap();
        let (b, _) = preview_mask_png(&params).unwrap();
        assert_eq!(a, b);
        assert!(report.land_coverage > 0.0 && report.land_coverage < 1.0);
    }

    #[test]
    fn exported_airports_load_back() {
        let json = airports_json().unwrap();
        let loaded = AirportDirectory::from_json(&json).unwrap();
        assert_eq!(loaded, AirportDirectory::builtin());
    }
}

//! Seeded random-blob continents.
//!
//! A handful of large rotated ellipses plus many small ones are rasterized
//! onto an equirectangular plane, softened with a blur and thresholded back
//! to a binary mask. The same seed always yields the same bytes.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::blur::gaussian_blur;
use crate::plane::Plane;

// "globe" namespace so the same user seed drives other generators differently.
const SEED_NAMESPACE: u64 = 0x676c_6f62_65;
const LARGE_BLOB_SHARE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobParams {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub blobs: u32,
    pub blur_px: f32,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            seed: 7,
            width: 1024,
            height: 512,
            blobs: 28,
            blur_px: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Blob {
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    rotation: f32,
}

fn scatter_blobs(p: &BlobParams) -> Vec<Blob> {
    let mut rng = StdRng::seed_from_u64(p.seed ^ SEED_NAMESPACE);
    let w = p.width as f32;
    let h = p.height as f32;
    let large = ((p.blobs as f32) * LARGE_BLOB_SHARE).ceil() as u32;

    (0..p.blobs)
        .map(|i| {
            let (min_r, max_r) = if i < large {
                (0.07 * w, 0.14 * w)
            } else {
                (0.015 * w, 0.05 * w)
            };
            let rx: f32 = rng.gen_range(min_r..=max_r);
            let aspect: f32 = rng.gen_range(0.45..=1.0);
            Blob {
                cx: rng.gen_range(0.0..w),
                // Keep blobs away from the poles where equirect stretching is worst.
                cy: rng.gen_range(0.15 * h..=0.85 * h),
                rx,
                ry: rx * aspect * 0.5,
                rotation: rng.gen_range(0.0..PI),
            }
        })
        .collect()
}

fn rasterize(plane: &mut Plane, blob: &Blob) {
    let w = plane.width() as i64;
    let h = plane.height() as i64;
    let (sin, cos) = blob.rotation.sin_cos();
    let reach = blob.rx.max(blob.ry).ceil() as i64;

    let y0 = ((blob.cy as i64) - reach).max(0);
    let y1 = ((blob.cy as i64) + reach).min(h - 1);
    for y in y0..=y1 {
        for xo in -reach..=reach {
            let x = blob.cx as i64 + xo;
            let dx = x as f32 + 0.5 - blob.cx;
            let dy = y as f32 + 0.5 - blob.cy;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            let inside = (u / blob.rx).powi(2) + (v / blob.ry).powi(2) <= 1.0;
            if inside {
                plane.set(x.rem_euclid(w) as u32, y as u32, 1.0);
            }
        }
    }
}

/// Generates a binary land mask (`1.0` land, `0.0` ocean).
pub fn generate_blob_mask(params: &BlobParams) -> Plane {
    let mut plane = Plane::new(params.width, params.height);
    if params.width == 0 || params.height == 0 {
        return plane;
    }
    let blobs = scatter_blobs(params);
    for blob in &blobs {
        rasterize(&mut plane, blob);
    }
    gaussian_blur(&mut plane, params.blur_px);
    plane.threshold(0.5);
    tracing::debug!(
        seed = params.seed,
        blobs = blobs.len(),
        coverage = plane.coverage(),
        "generated procedural land mask"
    );
    plane
}

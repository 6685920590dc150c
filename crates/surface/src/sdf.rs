//! 8-bit signed distance fields for coastlines.
//!
//! Encoding: `128` is the coastline, values above are land. A full step of
//! `127` corresponds to `max_distance` texels (`32` in shipped assets).

use foundation::math::row_latitude;

use crate::decode::LumaImage;
use crate::error::SurfaceError;
use crate::plane::Plane;

pub const DEFAULT_MAX_DISTANCE: f32 = 32.0;

const COAST: f32 = 128.0;
const STEP: f32 = 127.0;
const FAR: f64 = 1e20;

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Latitude-dependent `(edge_softness, outward_bias)` for a raster row.
///
/// Both grow toward the poles so the stretched polar rows stay smooth.
pub fn row_softness(y: u32, height: u32) -> (f32, f32) {
    let t = (row_latitude(y, height).abs() / 90.0) as f32;
    (0.9 + 2.2 * t * t, 0.9 * t * t * t)
}

pub fn check_max_distance(max_distance: f32) -> Result<(), SurfaceError> {
    if max_distance <= 0.0 || !max_distance.is_finite() {
        return Err(SurfaceError::InvalidParameter(format!(
            "max distance must be positive, got {max_distance}"
        )));
    }
    Ok(())
}

/// Decodes an SDF image into a land alpha plane in `[0, 1]`.
///
/// `max_distance` must match the value the field was baked with.
pub fn decode_sdf(sdf: &LumaImage, max_distance: f32) -> Result<Plane, SurfaceError> {
    check_max_distance(max_distance)?;
    let mut alpha = Plane::new(sdf.width, sdf.height);
    for y in 0..sdf.height {
        let (soft, bias) = row_softness(y, sdf.height);
        for x in 0..sdf.width {
            let v = sdf.get(x, y) as f32;
            let d = (v - COAST) / STEP * max_distance + bias;
            alpha.set(x, y, smoothstep(-soft, soft, d));
        }
    }
    Ok(alpha)
}

/// Bakes a binary land mask (luma above 127 is land) into an SDF image.
///
/// Distances wrap horizontally and do not cross the poles.
pub fn bake_sdf(mask: &LumaImage, max_distance: f32) -> Result<LumaImage, SurfaceError> {
    check_max_distance(max_distance)?;
    let w = mask.width as usize;
    let h = mask.height as usize;
    let land: Vec<bool> = mask.pixels.iter().map(|v| *v > 127).collect();
    let ocean: Vec<bool> = land.iter().map(|l| !l).collect();

    let pad = (max_distance.ceil() as usize + 1).min(w);
    let to_ocean = distance_field(&ocean, w, h, pad);
    let to_land = distance_field(&land, w, h, pad);

    let pixels = land
        .iter()
        .enumerate()
        .map(|(i, is_land)| {
            // Pixel centres sit half a texel from the boundary between them.
            let d = if *is_land {
                to_ocean[i] - 0.5
            } else {
                0.5 - to_land[i]
            };
            let v = COAST + (d / max_distance).clamp(-1.0, 1.0) * STEP;
            v.round().clamp(0.0, 255.0) as u8
        })
        .collect();
    LumaImage::new(mask.width, mask.height, pixels)
}

/// Euclidean distance from each pixel to the nearest feature pixel.
fn distance_field(features: &[bool], w: usize, h: usize, pad: usize) -> Vec<f32> {
    let we = w + 2 * pad;
    let mut grid = vec![FAR; we * h];
    for y in 0..h {
        for xe in 0..we {
            let x = (xe as i64 - pad as i64).rem_euclid(w as i64) as usize;
            if features[y * w + x] {
                grid[y * we + xe] = 0.0;
            }
        }
    }

    let n = we.max(h);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    for xe in 0..we {
        for y in 0..h {
            f[y] = grid[y * we + xe];
        }
        edt_1d(&f[..h], &mut d[..h], &mut v[..h], &mut z[..h + 1]);
        for y in 0..h {
            grid[y * we + xe] = d[y];
        }
    }
    for y in 0..h {
        let row = &mut grid[y * we..(y + 1) * we];
        f[..we].copy_from_slice(row);
        edt_1d(&f[..we], &mut d[..we], &mut v[..we], &mut z[..we + 1]);
        row.copy_from_slice(&d[..we]);
    }

    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            out.push(grid[y * we + x + pad].sqrt() as f32);
        }
    }
    out
}

/// One-dimensional squared distance transform (lower envelope of parabolas).
fn edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    let mut k = 0usize;
    v[0] = 0;
    z[0] = -FAR;
    z[1] = FAR;
    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = FAR;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX_DISTANCE, bake_sdf, decode_sdf, distance_field, row_softness};
    use crate::decode::LumaImage;

    fn uniform_row_image(height: u32, value: u8) -> LumaImage {
        LumaImage::new(4, height, vec![value; 4 * height as usize]).unwrap()
    }

    #[test]
    fn coastline_at_equator_is_half_opaque() {
        // 181 rows puts row 90 exactly on the equator.
        let alpha = decode_sdf(&uniform_row_image(181, 128), DEFAULT_MAX_DISTANCE).unwrap();
        assert!((alpha.get(0, 90) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn far_values_saturate() {
        for height in [2, 64, 181] {
            let land = decode_sdf(&uniform_row_image(height, 160), DEFAULT_MAX_DISTANCE).unwrap();
            let ocean = decode_sdf(&uniform_row_image(height, 96), DEFAULT_MAX_DISTANCE).unwrap();
            assert!(land.data().iter().all(|a| *a == 1.0));
            assert!(ocean.data().iter().all(|a| *a == 0.0));
        }
    }

    #[test]
    fn softness_grows_toward_poles() {
        let (soft_eq, bias_eq) = row_softness(90, 181);
        let (soft_pole, bias_pole) = row_softness(0, 181);
        assert!((soft_eq - 0.9).abs() < 1e-6);
        assert!(bias_eq.abs() < 1e-6);
        assert!(soft_pole > 3.0);
        assert!(bias_pole > 0.85);
    }

    #[test]
    fn distance_field_wraps_horizontally() {
        let w = 16;
        let h = 4;
        let mut features = vec![false; w * h];
        for y in 0..h {
            features[y * w] = true;
        }
        let d = distance_field(&features, w, h, 4);
        assert_eq!(d[w - 1], 1.0);
        assert_eq!(d[1], 1.0);
        assert_eq!(d[8], 8.0);
    }

    #[test]
    fn bake_marks_coast_and_saturates_inland() {
        let (w, h) = (256u32, 8u32);
        let pixels = (0..h)
            .flat_map(|_| (0..w).map(|x| if x < 128 { 255 } else { 0 }))
            .collect();
        let mask = LumaImage::new(w, h, pixels).unwrap();
        let sdf = bake_sdf(&mask, 32.0).unwrap();

        assert!(sdf.get(127, 4) > 128 && sdf.get(127, 4) < 134);
        assert!(sdf.get(128, 4) < 128 && sdf.get(128, 4) > 122);
        assert_eq!(sdf.get(64, 4), 255);
        assert_eq!(sdf.get(192, 4), 0);
        // Column 0 borders the ocean at column 255 across the antimeridian.
        assert!(sdf.get(0, 4) < 134);
    }

    #[test]
    fn baked_field_decodes_back_to_the_mask() {
        let (w, h) = (64u32, 181u32);
        let pixels = (0..h)
            .flat_map(|_| (0..w).map(|x| if (8..40).contains(&x) { 255 } else { 0 }))
            .collect();
        let mask = LumaImage::new(w, h, pixels).unwrap();
        let alpha = decode_sdf(&bake_sdf(&mask, 32.0).unwrap(), 32.0).unwrap();
        assert!(alpha.get(24, 90) > 0.99);
        assert!(alpha.get(56, 90) < 0.01);
    }

    #[test]
    fn rejects_non_positive_distance() {
        let mask = uniform_row_image(4, 0);
        assert!(bake_sdf(&mask, 0.0).is_err());
        assert!(decode_sdf(&mask, -1.0).is_err());
        assert!(decode_sdf(&mask, f32::NAN).is_err());
    }

    #[test]
    fn max_distance_scales_the_decoded_edge() {
        // 144 is 16/127 of a step inland: about 0.5 texels at 4, 4 texels at 32.
        let image = uniform_row_image(181, 144);
        let narrow = decode_sdf(&image, 4.0).unwrap().get(0, 90);
        let wide = decode_sdf(&image, 32.0).unwrap().get(0, 90);
        assert!(narrow > 0.5 && narrow < 0.95, "narrow = {narrow}");
        assert_eq!(wide, 1.0);
    }

    #[test]
    fn bake_and_decode_agree_at_small_distances() {
        let (w, h) = (64u32, 181u32);
        let pixels = (0..h)
            .flat_map(|_| (0..w).map(|x| if (8..40).contains(&x) { 255 } else { 0 }))
            .collect();
        let mask = LumaImage::new(w, h, pixels).unwrap();
        let sdf = bake_sdf(&mask, 8.0).unwrap();
        let alpha = decode_sdf(&sdf, 8.0).unwrap();
        assert!(alpha.get(24, 90) > 0.99);
        assert!(alpha.get(56, 90) < 0.01);
        // Column 39 is the last land column; its centre is half a texel inland.
        assert!(alpha.get(39, 90) > 0.5 && alpha.get(39, 90) < 0.99);
    }
}

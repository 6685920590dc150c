//! Separable Gaussian approximation (three box passes).
//!
//! Horizontal passes wrap around the antimeridian and vertical passes clamp
//! at the poles, matching how the textures are sampled on the sphere.

use crate::plane::Plane;

const PASSES: usize = 3;

/// Blurs `plane` in place with a Gaussian of standard deviation `sigma_px`.
///
/// `sigma_px` has the same meaning as the CSS `blur(<length>)` filter.
pub fn gaussian_blur(plane: &mut Plane, sigma_px: f32) {
    if sigma_px <= 0.0 || plane.width() == 0 || plane.height() == 0 {
        return;
    }
    for size in box_sizes_for_gauss(sigma_px, PASSES) {
        let radius = (size - 1) / 2;
        if radius == 0 {
            continue;
        }
        box_blur_horizontal(plane, radius);
        box_blur_vertical(plane, radius);
    }
}

/// Box widths whose successive application approximates a Gaussian.
fn box_sizes_for_gauss(sigma: f32, n: usize) -> Vec<u32> {
    let sigma = sigma as f64;
    let nf = n as f64;
    let w_ideal = (12.0 * sigma * sigma / nf + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wl = wl.max(1);
    let wu = wl + 2;
    let wlf = wl as f64;
    let m_ideal =
        (12.0 * sigma * sigma - nf * wlf * wlf - 4.0 * nf * wlf - 3.0 * nf) / (-4.0 * wlf - 4.0);
    let m = m_ideal.round().max(0.0) as usize;
    (0..n)
        .map(|i| if i < m { wl as u32 } else { wu as u32 })
        .collect()
}

fn box_blur_horizontal(plane: &mut Plane, radius: u32) {
    let w = plane.width() as i64;
    let h = plane.height();
    let r = radius as i64;
    let norm = 1.0 / (2 * r + 1) as f32;
    let mut out = vec![0.0f32; w as usize];

    for y in 0..h {
        let row = plane.row(y).to_vec();
        let at = |x: i64| row[x.rem_euclid(w) as usize];

        let mut sum: f32 = (-r..=r).map(at).sum();
        for x in 0..w {
            out[x as usize] = sum * norm;
            sum += at(x + r + 1) - at(x - r);
        }
        for (x, v) in out.iter().enumerate() {
            plane.set(x as u32, y, *v);
        }
    }
}

fn box_blur_vertical(plane: &mut Plane, radius: u32) {
    let w = plane.width();
    let h = plane.height() as i64;
    let r = radius as i64;
    let norm = 1.0 / (2 * r + 1) as f32;
    let mut column = vec![0.0f32; h as usize];
    let mut out = vec![0.0f32; h as usize];

    for x in 0..w {
        for y in 0..h {
            column[y as usize] = plane.get(x, y as u32);
        }
        let at = |y: i64| column[y.clamp(0, h - 1) as usize];

        let mut sum: f32 = (-r..=r).map(at).sum();
        for y in 0..h {
            out[y as usize] = sum * norm;
            sum += at(y + r + 1) - at(y - r);
        }
        for (y, v) in out.iter().enumerate() {
            plane.set(x, y as u32, *v);
        }
    }
}

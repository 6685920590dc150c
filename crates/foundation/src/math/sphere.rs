//! Equirectangular (lat/lon) to sphere mapping.
//!
//! One mapping is shared by the markers, the arc endpoints and the UV sphere
//! mesh, so that anything placed with [`project`] lands on the texel the
//! surface texture shows for that coordinate.
//!
//! Axis convention: `+Y` is north. Longitude 0° sits on `+X`, longitude ±180°
//! on `−X`, longitude 90°E on `−Z`.

use super::Vec3;

/// Wraps a longitude in degrees into `[-180, 180]`.
pub fn normalize_longitude(lon_deg: f64) -> f64 {
    if !lon_deg.is_finite() {
        return 0.0;
    }
    if (-180.0..=180.0).contains(&lon_deg) {
        return lon_deg;
    }
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the sign the caller asked for.
    if wrapped == -180.0 && lon_deg > 0.0 { 180.0 } else { wrapped }
}

/// Clamps a latitude in degrees into `[-90, 90]`.
pub fn clamp_latitude(lat_deg: f64) -> f64 {
    if lat_deg.is_nan() {
        return 0.0;
    }
    lat_deg.clamp(-90.0, 90.0)
}

/// Projects a geographic coordinate onto a sphere of `radius`.
///
/// Colatitude `φ = (90 − lat)·π/180`, azimuth `θ = (lon + 180)·π/180`,
/// result `(−r·sinφ·cosθ, r·cosφ, r·sinφ·sinθ)`.
pub fn project(lat_deg: f64, lon_deg: f64, radius: f64) -> Vec3 {
    let lat = clamp_latitude(lat_deg);
    // Poles collapse to a single point whatever the longitude.
    if lat >= 90.0 {
        return Vec3::new(0.0, radius, 0.0);
    }
    if lat <= -90.0 {
        return Vec3::new(0.0, -radius, 0.0);
    }

    let lon = normalize_longitude(lon_deg);
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vec3::new(
        -radius * sin_phi * cos_theta,
        radius * cos_phi,
        radius * sin_phi * sin_theta,
    )
}

/// Texture coordinate of a geographic coordinate in an equirectangular image.
///
/// `u` runs west to east from −180°, `v` runs north to south from +90°.
pub fn equirect_uv(lat_deg: f64, lon_deg: f64) -> [f64; 2] {
    let lat = clamp_latitude(lat_deg);
    let lon = normalize_longitude(lon_deg);
    [(lon + 180.0) / 360.0, (90.0 - lat) / 180.0]
}

/// Latitude in degrees at the centre of image row `y` of `height` rows.
pub fn row_latitude(y: u32, height: u32) -> f64 {
    90.0 - ((y as f64 + 0.5) * 180.0) / height.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::{equirect_uv, normalize_longitude, project, row_latitude};
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn projected_points_lie_on_the_sphere() {
        for radius in [0.5, 0.75, 1.0, 6_371.0] {
            let mut lat = -90.0;
            while lat <= 90.0 {
                let mut lon = -180.0;
                while lon <= 180.0 {
                    let p = project(lat, lon, radius);
                    assert_close(p.length(), radius, 1e-9 * radius.max(1.0));
                    lon += 7.5;
                }
                lat += 5.0;
            }
        }
    }

    #[test]
    fn poles_ignore_longitude() {
        let north = project(90.0, 0.0, 2.0);
        let south = project(-90.0, 0.0, 2.0);
        for lon in [-180.0, -97.3, 0.0, 45.0, 179.9, 180.0] {
            assert_eq!(project(90.0, lon, 2.0), north);
            assert_eq!(project(-90.0, lon, 2.0), south);
        }
        assert_eq!(north, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(south, Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn axis_convention() {
        let p = project(0.0, 0.0, 1.0);
        assert_close(p.x, 1.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 0.0, 1e-12);

        let east = project(0.0, 90.0, 1.0);
        assert_close(east.z, -1.0, 1e-12);
    }

    #[test]
    fn out_of_range_longitude_wraps() {
        assert_close(normalize_longitude(190.0), -170.0, 1e-12);
        assert_close(normalize_longitude(-190.0), 170.0, 1e-12);
        assert_close(normalize_longitude(540.0), 180.0, 1e-12);
        assert_close(normalize_longitude(720.0), 0.0, 1e-12);

        let a = project(12.0, 190.0, 1.0);
        let b = project(12.0, -170.0, 1.0);
        assert_close(a.x, b.x, 1e-12);
        assert_close(a.y, b.y, 1e-12);
        assert_close(a.z, b.z, 1e-12);
    }

    #[test]
    fn uv_matches_image_layout() {
        assert_eq!(equirect_uv(90.0, -180.0), [0.0, 0.0]);
        assert_eq!(equirect_uv(0.0, 0.0), [0.5, 0.5]);
        assert_eq!(equirect_uv(-90.0, 180.0), [1.0, 1.0]);
    }

    #[test]
    fn row_latitude_is_row_centre() {
        assert_close(row_latitude(0, 180), 89.5, 1e-12);
        assert_close(row_latitude(179, 180), -89.5, 1e-12);
    }
}

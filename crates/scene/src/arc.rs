use foundation::math::{QuadraticBezier, Vec3};

use crate::mesh::{MeshData, tube};

/// Shape of the route arc relative to the globe radius.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcStyle {
    /// Control point height above the sphere, as a fraction of the radius.
    pub lift: f64,
    /// Tube radius as a fraction of the sphere radius.
    pub tube_radius: f64,
    pub tubular_segments: u32,
    pub radial_segments: u32,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            lift: 0.35,
            tube_radius: 0.003,
            tubular_segments: 64,
            radial_segments: 8,
        }
    }
}

/// Quadratic Bézier from `start` to `end` bowed away from the origin.
///
/// The control point is the endpoints' mean direction pushed out to
/// `radius · (1 + lift)`. For antipodal endpoints any direction perpendicular
/// to the chord is used.
pub fn arc_curve(start: Vec3, end: Vec3, radius: f64, lift: f64) -> QuadraticBezier {
    let dir = (start + end).try_normalize().unwrap_or_else(|| {
        let chord = end - start;
        if chord.try_normalize().is_some() {
            chord.any_orthogonal()
        } else {
            start.try_normalize().unwrap_or(Vec3::Y)
        }
    });
    let control = dir * (radius * (1.0 + lift));
    QuadraticBezier::new(start, control, end)
}

/// Tube mesh for the arc between two surface points.
pub fn arc_mesh(start: Vec3, end: Vec3, radius: f64, style: &ArcStyle) -> MeshData {
    let curve = arc_curve(start, end, radius, style.lift);
    tube(
        &curve,
        style.tubular_segments.max(64),
        style.tube_radius * radius,
        style.radial_segments.max(8),
    )
}

#[cfg(test)]
mod tests {
    use super::{ArcStyle, arc_curve, arc_mesh};
    use foundation::math::project;

    const R: f64 = 0.75;

    #[test]
    fn control_point_sits_at_lifted_radius() {
        let a = project(43.6777, -79.6248, R);
        let b = project(51.47, -0.4543, R);
        let curve = arc_curve(a, b, R, 0.35);
        assert!((curve.control.length() - R * 1.35).abs() < 1e-12);
        assert_eq!(curve.start, a);
        assert_eq!(curve.end, b);
    }

    #[test]
    fn transatlantic_arc_stays_above_the_surface() {
        let a = project(43.6777, -79.6248, R);
        let b = project(51.47, -0.4543, R);
        let curve = arc_curve(a, b, R, 0.35);
        for i in 1..64 {
            let t = i as f64 / 64.0;
            assert!(curve.point(t).length() > R, "t={t}");
        }
    }

    #[test]
    fn antipodal_endpoints_still_lift() {
        let a = project(0.0, 0.0, R);
        let b = project(0.0, 180.0, R);
        let curve = arc_curve(a, b, R, 0.35);
        assert!((curve.control.length() - R * 1.35).abs() < 1e-9);
        assert!(curve.point(0.5).length() > 0.5 * R);
        assert!(curve.point(0.5).length().is_finite());
    }

    #[test]
    fn identical_endpoints_do_not_panic() {
        let a = project(45.0, 45.0, R);
        let curve = arc_curve(a, a, R, 0.35);
        assert!(curve.control.dot(a) > 0.0);
    }

    #[test]
    fn mesh_respects_minimum_resolution() {
        let style = ArcStyle {
            tubular_segments: 4,
            radial_segments: 3,
            ..ArcStyle::default()
        };
        let mesh = arc_mesh(project(0.0, 0.0, R), project(0.0, 90.0, R), R, &style);
        assert_eq!(mesh.vertex_count(), 65 * 9);
    }
}

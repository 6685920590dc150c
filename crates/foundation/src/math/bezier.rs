use super::Vec3;

/// Quadratic Bézier curve `start → control → end`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadraticBezier {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl QuadraticBezier {
    pub fn new(start: Vec3, control: Vec3, end: Vec3) -> Self {
        Self {
            start,
            control,
            end,
        }
    }

    pub fn point(&self, t: f64) -> Vec3 {
        let u = 1.0 - t;
        self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
    }

    /// First derivative at `t` (not normalized).
    pub fn derivative(&self, t: f64) -> Vec3 {
        (self.control - self.start) * (2.0 * (1.0 - t)) + (self.end - self.control) * (2.0 * t)
    }

    pub fn tangent(&self, t: f64) -> Vec3 {
        self.derivative(t)
            .try_normalize()
            .unwrap_or_else(|| (self.end - self.start).normalize_or_zero())
    }

    /// `segments + 1` evenly spaced (in `t`) samples including both ends.
    pub fn sample(&self, segments: u32) -> Vec<Vec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point(i as f64 / segments as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::QuadraticBezier;
    use crate::math::Vec3;

    #[test]
    fn passes_through_endpoints() {
        let c = QuadraticBezier::new(Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(c.point(0.0), Vec3::X);
        assert_eq!(c.point(1.0), Vec3::Y);
    }

    #[test]
    fn midpoint_is_pulled_toward_control() {
        let c = QuadraticBezier::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let mid = c.point(0.5);
        assert_eq!(mid, Vec3::new(0.5, 1.0, 0.0));
    }

    #[test]
    fn sample_count() {
        let c = QuadraticBezier::new(Vec3::ZERO, Vec3::Y, Vec3::X);
        assert_eq!(c.sample(64).len(), 65);
    }
}

use foundation::math::{Mat4, Vec3, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f64, near: f64, far: f64, position: Vec3) -> Self {
        Self {
            fov_y_deg,
            aspect: 1.0,
            near,
            far,
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    /// Updates the aspect ratio; non-finite or non-positive values are ignored.
    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn distance_to_target(&self) -> f64 {
        self.position.distance(self.target)
    }

    pub fn view(&self) -> Mat4 {
        mat4_look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        mat4_perspective_rh_z0(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        mat4_mul(self.projection(), self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::PerspectiveCamera;
    use foundation::math::{Vec3, mat4_transform_point};

    #[test]
    fn target_projects_to_screen_centre() {
        let mut cam = PerspectiveCamera::new(45.0, 0.1, 100.0, Vec3::new(0.0, 0.0, 3.2));
        cam.set_aspect(16.0 / 9.0);
        let clip = mat4_transform_point(cam.view_proj(), Vec3::ZERO);
        assert!((clip[0] / clip[3]).abs() < 1e-6);
        assert!((clip[1] / clip[3]).abs() < 1e-6);
        let depth = clip[2] / clip[3];
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn rejects_degenerate_aspect() {
        let mut cam = PerspectiveCamera::new(45.0, 0.1, 100.0, Vec3::new(0.0, 0.0, 3.2));
        cam.set_aspect(0.0);
        cam.set_aspect(f64::NAN);
        assert_eq!(cam.aspect, 1.0);
        cam.set_aspect(2.0);
        assert_eq!(cam.aspect, 2.0);
    }
}

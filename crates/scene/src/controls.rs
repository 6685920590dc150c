//! Orbit controls around the globe centre.
//!
//! The camera lives on a sphere around `target` described by a radius, an
//! azimuth `theta` (around +Y, zero toward +Z) and a polar angle `phi`
//! (zero at +Y). Input accumulates angular deltas; `update` applies them:
//! - drag rotates by `2π · Δpx / viewport_height`
//! - wheel dollies exponentially, clamped to `[min_distance, max_distance]`
//! - with damping on, only `damping_factor` of each pending delta is applied
//!   per update and the remainder decays by `1 − damping_factor`
//! - auto-rotation advances azimuth while no drag is in progress
//!
//! There is no panning; the target stays at the globe centre.

use std::f64::consts::{PI, TAU};

use foundation::math::Vec3;
use runtime::{Frame, NOMINAL_DT_S};

use crate::camera::PerspectiveCamera;

/// Polar angle margin that keeps the camera off the poles.
const POLAR_EPSILON: f64 = 1e-6;

/// Base dolly factor per wheel notch.
const ZOOM_STEP: f64 = 0.95;

/// Residual deltas smaller than this are dropped.
const DELTA_EPSILON: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitSettings {
    pub damping: bool,
    pub damping_factor: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub auto_rotate: bool,
    /// `1.0` is one revolution per minute at 60 fps.
    pub auto_rotate_speed: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            damping: true,
            damping_factor: 0.05,
            min_distance: 2.4,
            max_distance: 5.0,
            auto_rotate: true,
            auto_rotate_speed: 0.5,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Spherical {
    radius: f64,
    theta: f64,
    phi: f64,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: PI / 2.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    settings: OrbitSettings,
    target: Vec3,
    spherical: Spherical,
    delta_theta: f64,
    delta_phi: f64,
    pending_scale: f64,
    viewport_height: f64,
    dragging: bool,
    last_pos_px: [f64; 2],
    disposed: bool,
}

impl OrbitControls {
    /// Starts orbiting from the camera's current placement.
    pub fn new(camera: &PerspectiveCamera, settings: OrbitSettings) -> Self {
        let mut spherical = Spherical::from_offset(camera.position - camera.target);
        spherical.radius = spherical
            .radius
            .clamp(settings.min_distance, settings.max_distance);
        Self {
            settings,
            target: camera.target,
            spherical,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pending_scale: 1.0,
            viewport_height: 1.0,
            dragging: false,
            last_pos_px: [0.0, 0.0],
            disposed: false,
        }
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn set_viewport_height(&mut self, height_px: f64) {
        self.viewport_height = height_px.max(1.0);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn distance(&self) -> f64 {
        self.spherical.radius
    }

    pub fn azimuth(&self) -> f64 {
        self.spherical.theta
    }

    pub fn polar(&self) -> f64 {
        self.spherical.phi
    }

    pub fn camera_position(&self) -> Vec3 {
        self.target + self.spherical.to_offset()
    }

    pub fn on_pointer_down(&mut self, pos_px: [f64; 2]) {
        if self.disposed {
            return;
        }
        self.dragging = true;
        self.last_pos_px = pos_px;
    }

    pub fn on_pointer_move(&mut self, pos_px: [f64; 2]) {
        if self.disposed || !self.dragging {
            return;
        }
        let dx = pos_px[0] - self.last_pos_px[0];
        let dy = pos_px[1] - self.last_pos_px[1];
        self.last_pos_px = pos_px;

        let k = TAU * self.settings.rotate_speed / self.viewport_height;
        self.delta_theta -= k * dx;
        self.delta_phi -= k * dy;
    }

    pub fn on_pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Positive `delta_y` (scrolling down) moves the camera away.
    pub fn on_wheel(&mut self, delta_y: f64) {
        if self.disposed || delta_y == 0.0 {
            return;
        }
        let step = ZOOM_STEP.powf(self.settings.zoom_speed);
        if delta_y > 0.0 {
            self.pending_scale /= step;
        } else {
            self.pending_scale *= step;
        }
    }

    /// Auto-rotation angle for a frame of `dt_s` seconds.
    fn auto_rotation_angle(&self, dt_s: f64) -> f64 {
        TAU / 60.0 / 60.0 * self.settings.auto_rotate_speed * (dt_s / NOMINAL_DT_S)
    }

    /// Applies pending input and auto-rotation. Returns whether the camera moved.
    pub fn update(&mut self, frame: &Frame) -> bool {
        if self.disposed {
            return false;
        }
        let before = self.spherical;

        if self.settings.auto_rotate && !self.dragging {
            self.delta_theta -= self.auto_rotation_angle(frame.dt_s);
        }

        let factor = if self.settings.damping {
            self.settings.damping_factor
        } else {
            1.0
        };
        self.spherical.theta += self.delta_theta * factor;
        self.spherical.phi += self.delta_phi * factor;
        self.spherical.phi = self.spherical.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.spherical.theta = self.spherical.theta.rem_euclid(TAU);

        self.spherical.radius = (self.spherical.radius * self.pending_scale)
            .clamp(self.settings.min_distance, self.settings.max_distance);
        self.pending_scale = 1.0;

        if self.settings.damping {
            self.delta_theta *= 1.0 - self.settings.damping_factor;
            self.delta_phi *= 1.0 - self.settings.damping_factor;
            if self.delta_theta.abs() < DELTA_EPSILON {
                self.delta_theta = 0.0;
            }
            if self.delta_phi.abs() < DELTA_EPSILON {
                self.delta_phi = 0.0;
            }
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }

        self.spherical != before
    }

    pub fn apply(&self, camera: &mut PerspectiveCamera) {
        camera.position = self.camera_position();
        camera.target = self.target;
    }

    /// Stops reacting to input and updates.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.dragging = false;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.pending_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::{OrbitControls, OrbitSettings};
    use crate::camera::PerspectiveCamera;
    use foundation::math::Vec3;
    use runtime::{Frame, NOMINAL_DT_S};

    fn frame() -> Frame {
        Frame {
            index: 0,
            dt_s: NOMINAL_DT_S,
            time_s: 0.0,
        }
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(45.0, 0.1, 100.0, Vec3::new(0.0, 0.0, 3.2))
    }

    fn still() -> OrbitSettings {
        OrbitSettings {
            auto_rotate: false,
            damping: false,
            ..OrbitSettings::default()
        }
    }

    #[test]
    fn starts_at_camera_position() {
        let controls = OrbitControls::new(&camera(), OrbitSettings::default());
        assert!((controls.distance() - 3.2).abs() < 1e-12);
        assert!(controls.camera_position().distance(Vec3::new(0.0, 0.0, 3.2)) < 1e-12);
    }

    #[test]
    fn auto_rotation_turns_one_revolution_in_two_minutes() {
        let mut controls = OrbitControls::new(
            &camera(),
            OrbitSettings {
                damping: false,
                ..OrbitSettings::default()
            },
        );
        let f = frame();
        for _ in 0..1800 {
            controls.update(&f);
        }
        // 30 s of 120 s: a quarter turn, clockwise seen from above.
        let expected = std::f64::consts::TAU * 0.75;
        assert!((controls.azimuth() - expected).abs() < 1e-6);
    }

    #[test]
    fn auto_rotation_pauses_while_dragging() {
        let mut controls = OrbitControls::new(
            &camera(),
            OrbitSettings {
                damping: false,
                ..OrbitSettings::default()
            },
        );
        controls.on_pointer_down([10.0, 10.0]);
        assert!(!controls.update(&frame()));
        controls.on_pointer_up();
        assert!(controls.update(&frame()));
    }

    #[test]
    fn drag_across_full_height_is_a_full_turn() {
        let mut controls = OrbitControls::new(&camera(), still());
        controls.set_viewport_height(400.0);
        controls.on_pointer_down([0.0, 200.0]);
        controls.on_pointer_move([100.0, 200.0]);
        controls.on_pointer_up();
        controls.update(&frame());
        // 100 px of a 400 px viewport is a quarter turn.
        let expected = std::f64::consts::TAU * 0.75;
        assert!((controls.azimuth() - expected).abs() < 1e-9);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut controls = OrbitControls::new(&camera(), still());
        controls.set_viewport_height(100.0);
        controls.on_pointer_down([0.0, 0.0]);
        controls.on_pointer_move([0.0, 1000.0]);
        controls.update(&frame());
        assert!(controls.polar() > 0.0);
        assert!(controls.camera_position().y > 3.19);
    }

    #[test]
    fn wheel_dolly_is_clamped() {
        let mut controls = OrbitControls::new(&camera(), still());
        for _ in 0..100 {
            controls.on_wheel(120.0);
        }
        controls.update(&frame());
        assert_eq!(controls.distance(), 5.0);
        for _ in 0..100 {
            controls.on_wheel(-120.0);
        }
        controls.update(&frame());
        assert_eq!(controls.distance(), 2.4);
    }

    #[test]
    fn damping_spreads_a_drag_over_frames() {
        let settings = OrbitSettings {
            auto_rotate: false,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(&camera(), settings);
        controls.set_viewport_height(400.0);
        controls.on_pointer_down([0.0, 0.0]);
        controls.on_pointer_move([-10.0, 0.0]);
        controls.on_pointer_up();

        controls.update(&frame());
        let first = controls.azimuth();
        controls.update(&frame());
        let second = controls.azimuth() - first;
        assert!(first > 0.0);
        assert!((second - first * 0.95).abs() < 1e-12);
    }

    #[test]
    fn disposed_controls_ignore_input() {
        let mut controls = OrbitControls::new(&camera(), OrbitSettings::default());
        controls.dispose();
        controls.on_pointer_down([0.0, 0.0]);
        controls.on_wheel(100.0);
        assert!(!controls.is_dragging());
        assert!(!controls.update(&frame()));
    }

    #[test]
    fn drags_and_dollies_never_move_the_target() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&cam, still());
        controls.set_viewport_height(400.0);
        controls.on_pointer_down([0.0, 0.0]);
        controls.on_pointer_move([150.0, -80.0]);
        controls.on_pointer_up();
        controls.on_wheel(-240.0);
        controls.update(&frame());
        controls.apply(&mut cam);
        assert_eq!(cam.target.length(), 0.0);
        assert!((cam.distance_to_target() - controls.distance()).abs() < 1e-12);
    }

    #[test]
    fn apply_moves_camera() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(&cam, still());
        controls.on_wheel(120.0);
        controls.update(&frame());
        controls.apply(&mut cam);
        assert!(cam.distance_to_target() > 3.2);
    }
}

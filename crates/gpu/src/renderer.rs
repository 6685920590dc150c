use foundation::math::{Mat4, Vec3};
use scene::{Color, Light, PerspectiveCamera};

use crate::backend::{GeometryId, MaterialId};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCommand {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub model: Mat4,
    pub transparent: bool,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub clear: Color,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub lights: Vec<Light>,
    pub draws: Vec<DrawCommand>,
}

pub struct Renderer;

impl Renderer {
    /// Opaque draws come first, then transparent ones; order within each
    /// group is preserved.
    pub fn collect(
        camera: &PerspectiveCamera,
        clear: Color,
        lights: &[Light],
        draws: &[DrawCommand],
    ) -> RenderFrame {
        let mut ordered: Vec<DrawCommand> = draws.iter().filter(|d| !d.transparent).copied().collect();
        ordered.extend(draws.iter().filter(|d| d.transparent).copied());
        RenderFrame {
            clear,
            view: camera.view(),
            projection: camera.projection(),
            view_proj: camera.view_proj(),
            camera_position: camera.position,
            lights: lights.to_vec(),
            draws: ordered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawCommand, Renderer};
    use crate::backend::{GeometryId, MaterialId};
    use foundation::Handle;
    use foundation::math::{MAT4_IDENTITY, Vec3};
    use scene::{Color, Light, PerspectiveCamera};

    fn draw(i: u32, transparent: bool) -> DrawCommand {
        DrawCommand {
            geometry: GeometryId(Handle::new(i, 0)),
            material: MaterialId(Handle::new(i, 0)),
            model: MAT4_IDENTITY,
            transparent,
        }
    }

    #[test]
    fn transparent_draws_go_last() {
        let camera = PerspectiveCamera::new(45.0, 0.1, 100.0, Vec3::new(0.0, 0.0, 3.2));
        let frame = Renderer::collect(
            &camera,
            Color::WHITE,
            &[Light::ambient(0.9)],
            &[draw(0, false), draw(1, true), draw(2, false)],
        );
        let order: Vec<u32> = frame.draws.iter().map(|d| d.geometry.0.index()).collect();
        assert_eq!(order, vec![0, 2, 1]);
        assert_eq!(frame.lights.len(), 1);
        assert_eq!(frame.camera_position, Vec3::new(0.0, 0.0, 3.2));
    }
}

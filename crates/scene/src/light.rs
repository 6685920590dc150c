use foundation::math::Vec3;

use crate::material::Color;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Shines from `position` toward the origin.
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
    },
}

impl Light {
    pub fn ambient(intensity: f32) -> Self {
        Light::Ambient {
            color: Color::WHITE,
            intensity,
        }
    }

    pub fn directional(intensity: f32, position: Vec3) -> Self {
        Light::Directional {
            color: Color::WHITE,
            intensity,
            position,
        }
    }

    /// Unit vector from the origin toward the light, `None` for ambient light.
    pub fn direction(&self) -> Option<Vec3> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional { position, .. } => position.try_normalize(),
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. } | Light::Directional { intensity, .. } => *intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Light;
    use foundation::math::Vec3;

    #[test]
    fn directional_light_points_from_origin() {
        let key = Light::directional(1.3, Vec3::new(5.0, 4.0, 6.0));
        let dir = key.direction().unwrap();
        assert!((dir.length() - 1.0).abs() < 1e-12);
        assert!(dir.x > 0.0 && dir.y > 0.0 && dir.z > 0.0);
        assert_eq!(Light::ambient(0.9).direction(), None);
    }
}

//! JSON configuration for the route globe.
//!
//! Every field is optional; an empty object yields the stock look. The
//! config is validated once when turned into a [`GlobeStyle`], so a bad
//! color string fails the component up front rather than a cycle later.

use foundation::math::Vec3;
use runtime::HostSize;
use scene::{ArcStyle, Color, DirectionalLightStyle, GlobeStyle, OrbitSettings, PerspectiveCamera};
use serde::{Deserialize, Serialize};
use surface::TextureStrategy;

use crate::error::GlobeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Prefix for `/api/airports/{iata}`; empty means same origin.
    pub api_base: String,
    pub sphere: SphereConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub colors: ColorConfig,
    pub lights: LightConfig,
    pub markers: MarkerConfig,
    pub arc: ArcConfig,
    pub host: HostConfig,
    pub texture: TextureStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: f64,
    pub surface_offset: f64,
    pub width_segments: u32,
    pub height_segments: u32,
    pub ocean_roughness: f32,
    pub ocean_metalness: f32,
    pub land_roughness: f32,
    pub land_metalness: f32,
    pub bump_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub damping: bool,
    pub damping_factor: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
}

/// Hex colors, `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub background: String,
    pub ocean: String,
    pub land: String,
    pub origin_marker: String,
    pub destination_marker: String,
    pub arc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub ambient_intensity: f32,
    pub key_intensity: f32,
    pub key_position: [f64; 3],
    pub fill_intensity: f32,
    pub fill_position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Fraction of the globe radius.
    pub radius: f64,
    pub segments: u32,
    pub roughness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcConfig {
    pub lift: f64,
    pub tube_radius: f64,
    pub tubular_segments: u32,
    pub radial_segments: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Used when the host element reports a zero or unknown size.
    pub fallback_width: f64,
    pub fallback_height: f64,
    pub antialias: bool,
    pub alpha: bool,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            sphere: SphereConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            colors: ColorConfig::default(),
            lights: LightConfig::default(),
            markers: MarkerConfig::default(),
            arc: ArcConfig::default(),
            host: HostConfig::default(),
            texture: TextureStrategy::default(),
        }
    }
}

impl Default for SphereConfig {
    fn default() -> Self {
        let style = GlobeStyle::default();
        Self {
            radius: style.radius,
            surface_offset: style.surface_offset,
            width_segments: style.width_segments,
            height_segments: style.height_segments,
            ocean_roughness: style.ocean_roughness,
            ocean_metalness: style.ocean_metalness,
            land_roughness: style.land_roughness,
            land_metalness: style.land_metalness,
            bump_scale: style.bump_scale,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 0.0, 3.2],
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        let s = OrbitSettings::default();
        Self {
            damping: s.damping,
            damping_factor: s.damping_factor,
            min_distance: s.min_distance,
            max_distance: s.max_distance,
            auto_rotate: s.auto_rotate,
            auto_rotate_speed: s.auto_rotate_speed,
            rotate_speed: s.rotate_speed,
            zoom_speed: s.zoom_speed,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        let style = GlobeStyle::default();
        Self {
            background: style.background.to_hex_string(),
            ocean: style.ocean.to_hex_string(),
            land: "#9ae14a".into(),
            origin_marker: style.origin_marker.to_hex_string(),
            destination_marker: style.destination_marker.to_hex_string(),
            arc: style.arc_color.to_hex_string(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        let style = GlobeStyle::default();
        Self {
            ambient_intensity: style.ambient_intensity,
            key_intensity: style.key_light.intensity,
            key_position: style.key_light.position.as_array(),
            fill_intensity: style.fill_light.intensity,
            fill_position: style.fill_light.position.as_array(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        let style = GlobeStyle::default();
        Self {
            radius: style.marker_radius,
            segments: style.marker_segments,
            roughness: style.marker_roughness,
        }
    }
}

impl Default for ArcConfig {
    fn default() -> Self {
        let a = ArcStyle::default();
        Self {
            lift: a.lift,
            tube_radius: a.tube_radius,
            tubular_segments: a.tubular_segments,
            radial_segments: a.radial_segments,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            fallback_width: 420.0,
            fallback_height: 420.0,
            antialias: true,
            alpha: true,
        }
    }
}

fn color(field: &str, value: &str) -> Result<Color, GlobeError> {
    Color::parse(value)
        .ok_or_else(|| GlobeError::Config(format!("colors.{field}: {value:?} is not #rrggbb")))
}

fn vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

impl GlobeConfig {
    pub fn from_json(json: &str) -> Result<Self, GlobeError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GlobeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything that would otherwise fail later in a cycle.
    pub fn validate(&self) -> Result<(), GlobeError> {
        self.style()?;
        self.land_color()?;
        let s = &self.sphere;
        if !(s.radius.is_finite() && s.radius > 0.0) {
            return Err(GlobeError::Config(format!(
                "sphere.radius must be positive, got {}",
                s.radius
            )));
        }
        if s.width_segments < 3 || s.height_segments < 2 {
            return Err(GlobeError::Config(
                "sphere needs at least 3 width and 2 height segments".into(),
            ));
        }
        let c = &self.controls;
        if !(c.min_distance > 0.0 && c.min_distance <= c.max_distance) {
            return Err(GlobeError::Config(format!(
                "controls distance range {}..{} is empty",
                c.min_distance, c.max_distance
            )));
        }
        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.near < cam.far && cam.fov_deg > 0.0 && cam.fov_deg < 180.0) {
            return Err(GlobeError::Config("camera frustum is degenerate".into()));
        }
        self.texture
            .validate()
            .map_err(|e| GlobeError::Config(format!("texture: {e}")))
    }

    pub fn style(&self) -> Result<GlobeStyle, GlobeError> {
        let c = &self.colors;
        let s = &self.sphere;
        let l = &self.lights;
        Ok(GlobeStyle {
            radius: s.radius,
            surface_offset: s.surface_offset,
            width_segments: s.width_segments,
            height_segments: s.height_segments,
            background: color("background", &c.background)?,
            ocean: color("ocean", &c.ocean)?,
            ocean_roughness: s.ocean_roughness,
            ocean_metalness: s.ocean_metalness,
            land_roughness: s.land_roughness,
            land_metalness: s.land_metalness,
            bump_scale: s.bump_scale,
            origin_marker: color("origin_marker", &c.origin_marker)?,
            destination_marker: color("destination_marker", &c.destination_marker)?,
            marker_roughness: self.markers.roughness,
            marker_radius: self.markers.radius,
            marker_segments: self.markers.segments,
            arc_color: color("arc", &c.arc)?,
            arc: ArcStyle {
                lift: self.arc.lift,
                tube_radius: self.arc.tube_radius,
                tubular_segments: self.arc.tubular_segments,
                radial_segments: self.arc.radial_segments,
            },
            ambient_intensity: l.ambient_intensity,
            key_light: DirectionalLightStyle {
                intensity: l.key_intensity,
                position: vec3(l.key_position),
            },
            fill_light: DirectionalLightStyle {
                intensity: l.fill_intensity,
                position: vec3(l.fill_position),
            },
        })
    }

    /// RGB baked into the land color texture.
    pub fn land_color(&self) -> Result<Color, GlobeError> {
        color("land", &self.colors.land)
    }

    pub fn orbit_settings(&self) -> OrbitSettings {
        let c = &self.controls;
        OrbitSettings {
            damping: c.damping,
            damping_factor: c.damping_factor,
            min_distance: c.min_distance,
            max_distance: c.max_distance,
            auto_rotate: c.auto_rotate,
            auto_rotate_speed: c.auto_rotate_speed,
            rotate_speed: c.rotate_speed,
            zoom_speed: c.zoom_speed,
        }
    }

    pub fn camera(&self) -> PerspectiveCamera {
        let c = &self.camera;
        PerspectiveCamera::new(c.fov_deg, c.near, c.far, vec3(c.position))
    }

    pub fn fallback_size(&self) -> HostSize {
        HostSize::new(self.host.fallback_width, self.host.fallback_height)
    }
}

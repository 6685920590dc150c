use foundation::math::{Vec3, project};

use crate::arc::{ArcStyle, arc_mesh};
use crate::graph::{Node, SceneGraph, Transform};
use crate::light::Light;
use crate::material::{Color, Material};
use crate::mesh::uv_sphere;

pub const OCEAN: &str = "ocean";
pub const LAND: &str = "land";
pub const ORIGIN_MARKER: &str = "origin-marker";
pub const DESTINATION_MARKER: &str = "destination-marker";
pub const ROUTE_ARC: &str = "route-arc";

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLightStyle {
    pub intensity: f32,
    pub position: Vec3,
}

/// Everything about the route globe that is not the route itself.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeStyle {
    pub radius: f64,
    /// Land overlay and markers sit at `radius · (1 + surface_offset)`.
    pub surface_offset: f64,
    pub width_segments: u32,
    pub height_segments: u32,
    pub background: Color,
    pub ocean: Color,
    pub ocean_roughness: f32,
    pub ocean_metalness: f32,
    pub land_roughness: f32,
    pub land_metalness: f32,
    pub bump_scale: f32,
    pub origin_marker: Color,
    pub destination_marker: Color,
    pub marker_roughness: f32,
    /// Marker sphere radius as a fraction of the globe radius.
    pub marker_radius: f64,
    pub marker_segments: u32,
    pub arc_color: Color,
    pub arc: ArcStyle,
    pub ambient_intensity: f32,
    pub key_light: DirectionalLightStyle,
    pub fill_light: DirectionalLightStyle,
}

impl Default for GlobeStyle {
    fn default() -> Self {
        Self {
            radius: 0.75,
            surface_offset: 0.02,
            width_segments: 96,
            height_segments: 96,
            background: Color::from_hex(0xf7f9ff),
            ocean: Color::from_hex(0x2f8bff),
            ocean_roughness: 0.25,
            ocean_metalness: 0.05,
            land_roughness: 0.6,
            land_metalness: 0.02,
            bump_scale: 0.08,
            origin_marker: Color::from_hex(0xff7b7b),
            destination_marker: Color::from_hex(0x6ee7ff),
            marker_roughness: 0.4,
            marker_radius: 0.015,
            marker_segments: 16,
            arc_color: Color::from_hex(0xffff00),
            arc: ArcStyle::default(),
            ambient_intensity: 0.9,
            key_light: DirectionalLightStyle {
                intensity: 1.3,
                position: Vec3::new(5.0, 4.0, 6.0),
            },
            fill_light: DirectionalLightStyle {
                intensity: 0.6,
                position: Vec3::new(-5.0, -2.0, 4.0),
            },
        }
    }
}

impl GlobeStyle {
    pub fn surface_radius(&self) -> f64 {
        self.radius * (1.0 + self.surface_offset)
    }
}

/// Builds the ocean sphere, textured land overlay, both markers and the arc.
///
/// The land overlay samples the surface maps named by
/// [`Material::land`]; the textures themselves are supplied by the backend.
pub fn build_route_scene(style: &GlobeStyle, origin: LatLon, destination: LatLon) -> SceneGraph {
    let mut graph = SceneGraph::new(style.background);
    graph.add_light(Light::ambient(style.ambient_intensity));
    graph.add_light(Light::directional(
        style.key_light.intensity,
        style.key_light.position,
    ));
    graph.add_light(Light::directional(
        style.fill_light.intensity,
        style.fill_light.position,
    ));

    let sphere = uv_sphere(style.radius, style.width_segments, style.height_segments);
    graph.add(Node::mesh(
        OCEAN,
        sphere.clone(),
        Material::standard(style.ocean, style.ocean_roughness, style.ocean_metalness),
    ));
    graph.add(
        Node::mesh(
            LAND,
            sphere,
            Material::land(style.land_roughness, style.land_metalness, style.bump_scale),
        )
        .with_transform(Transform::uniform_scale(1.0 + style.surface_offset)),
    );

    let surface = style.surface_radius();
    let start = project(origin.lat, origin.lon, surface);
    let end = project(destination.lat, destination.lon, surface);

    let marker = uv_sphere(
        style.radius * style.marker_radius,
        style.marker_segments,
        style.marker_segments,
    );
    graph.add(
        Node::mesh(
            ORIGIN_MARKER,
            marker.clone(),
            Material::standard(style.origin_marker, style.marker_roughness, 0.0),
        )
        .with_transform(Transform::translate(start)),
    );
    graph.add(
        Node::mesh(
            DESTINATION_MARKER,
            marker,
            Material::standard(style.destination_marker, style.marker_roughness, 0.0),
        )
        .with_transform(Transform::translate(end)),
    );

    graph.add(Node::mesh(
        ROUTE_ARC,
        arc_mesh(start, end, style.radius, &style.arc),
        Material::unlit(style.arc_color),
    ));
    graph
}

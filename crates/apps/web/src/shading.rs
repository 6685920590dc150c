//! CPU-side data the wgpu backend uploads: uniform blocks, vertex layout and
//! mip chains. Nothing here touches a device.

use bytemuck::{Pod, Zeroable};
use foundation::math::Mat4;
use gpu::RenderFrame;
use scene::{Color, Light, Material, MeshData};
use surface::TextureImage;

/// Directional lights beyond this are ignored.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Per-draw uniforms live at multiples of this in one dynamic buffer.
pub const DRAW_UNIFORM_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: Mat4,
    pub camera_pos: [f32; 4],
    /// Summed ambient light, already scaled by intensity.
    pub ambient: [f32; 4],
    /// xyz toward the light, w is 1 for a used slot.
    pub light_dirs: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    pub light_colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    /// roughness, metalness, bump scale, unlit flag.
    pub params: [f32; 4],
    /// color map, alpha map, bump map, transparent.
    pub maps: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniform {
    pub model: Mat4,
}

/// sRGB channel in `[0, 1]` to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Shader-space RGB for `color`; linear when the target applies the sRGB
/// encode itself.
pub fn shader_rgb(color: Color, linear_target: bool) -> [f32; 3] {
    let c = color.to_unit_f32();
    if linear_target {
        c.map(srgb_to_linear)
    } else {
        c
    }
}

pub fn clear_color(color: Color, linear_target: bool) -> [f64; 4] {
    let [r, g, b] = shader_rgb(color, linear_target);
    [r as f64, g as f64, b as f64, 1.0]
}

pub fn globals(frame: &RenderFrame, linear_target: bool) -> Globals {
    let mut out = Globals {
        view_proj: frame.view_proj,
        camera_pos: [
            frame.camera_position.x as f32,
            frame.camera_position.y as f32,
            frame.camera_position.z as f32,
            1.0,
        ],
        ..Globals::zeroed()
    };

    let mut slot = 0;
    for light in &frame.lights {
        let [r, g, b] = match light {
            Light::Ambient { color, .. } | Light::Directional { color, .. } => {
                shader_rgb(*color, linear_target)
            }
        };
        let i = light.intensity();
        match light.direction() {
            None => {
                out.ambient[0] += r * i;
                out.ambient[1] += g * i;
                out.ambient[2] += b * i;
            }
            Some(dir) if slot < MAX_DIRECTIONAL_LIGHTS => {
                out.light_dirs[slot] = [dir.x as f32, dir.y as f32, dir.z as f32, 1.0];
                out.light_colors[slot] = [r * i, g * i, b * i, 1.0];
                slot += 1;
            }
            Some(_) => {
                tracing::debug!("directional light dropped, {MAX_DIRECTIONAL_LIGHTS} already bound");
            }
        }
    }
    out
}

pub fn material_uniform(material: &Material, linear_target: bool) -> MaterialUniform {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    match material {
        Material::Standard {
            color,
            roughness,
            metalness,
            map,
            alpha_map,
            bump_map,
            bump_scale,
            transparent,
        } => {
            let [r, g, b] = shader_rgb(*color, linear_target);
            MaterialUniform {
                color: [r, g, b, 1.0],
                params: [*roughness, *metalness, *bump_scale, 0.0],
                maps: [
                    flag(map.is_some()),
                    flag(alpha_map.is_some()),
                    flag(bump_map.is_some()),
                    flag(*transparent),
                ],
            }
        }
        Material::Unlit { color } => {
            let [r, g, b] = shader_rgb(*color, linear_target);
            MaterialUniform {
                color: [r, g, b, 1.0],
                params: [1.0, 0.0, 0.0, 1.0],
                maps: [0.0; 4],
            }
        }
    }
}

pub fn vertices(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: *p,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// One image per mip level, level 0 first.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Box-filtered RGBA8 mip chain down to 1x1, or just level 0 when the image
/// does not want mipmaps.
pub fn mip_chain(image: &TextureImage) -> Vec<MipLevel> {
    let mut levels = vec![MipLevel {
        width: image.width,
        height: image.height,
        pixels: image.pixels.clone(),
    }];
    if !image.sampling.mipmaps {
        return levels;
    }
    while let Some(prev) = levels.last() {
        if prev.width == 1 && prev.height == 1 {
            break;
        }
        let next = downsample(prev);
        levels.push(next);
    }
    levels
}

fn downsample(src: &MipLevel) -> MipLevel {
    let width = (src.width / 2).max(1);
    let height = (src.height / 2).max(1);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let mut sum = [0u32; 4];
            let mut n = 0;
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let sx = (x * 2 + dx).min(src.width - 1);
                let sy = (y * 2 + dy).min(src.height - 1);
                let i = ((sy * src.width + sx) * 4) as usize;
                for c in 0..4 {
                    sum[c] += src.pixels[i + c] as u32;
                }
                n += 1;
            }
            pixels.extend(sum.map(|s| ((s + n / 2) / n) as u8));
        }
    }
    MipLevel {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DRAW_UNIFORM_STRIDE, DrawUniform, Globals, MAX_DIRECTIONAL_LIGHTS, globals,
        material_uniform, mip_chain, srgb_to_linear, vertices,
    };
    use foundation::math::{MAT4_IDENTITY, Vec3};
    use gpu::Renderer;
    use scene::{Color, Light, Material, PerspectiveCamera, uv_sphere};
    use surface::{ColorSpace, Sampling, TextureImage};

    fn image(width: u32, height: u32, mipmaps: bool) -> TextureImage {
        TextureImage {
            width,
            height,
            pixels: (0..width * height).flat_map(|i| [(i % 256) as u8, 0, 255, 255]).collect(),
            color_space: ColorSpace::Srgb,
            sampling: Sampling {
                mipmaps,
                ..Sampling::EQUIRECT
            },
        }
    }

    #[test]
    fn uniform_blocks_fit_their_bindings() {
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
        assert!(std::mem::size_of::<DrawUniform>() as u64 <= DRAW_UNIFORM_STRIDE);
    }

    #[test]
    fn srgb_decode_hits_the_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.25);
    }

    #[test]
    fn lights_split_into_ambient_and_directional_slots() {
        let camera = PerspectiveCamera::new(45.0, 0.1, 100.0, Vec3::new(0.0, 0.0, 3.2));
        let mut lights = vec![Light::ambient(0.5), Light::ambient(0.25)];
        for _ in 0..MAX_DIRECTIONAL_LIGHTS + 1 {
            lights.push(Light::directional(2.0, Vec3::new(0.0, 0.0, 5.0)));
        }
        let frame = Renderer::collect(&camera, Color::WHITE, &lights, &[]);
        let g = globals(&frame, false);
        assert_eq!(g.ambient[..3], [0.75, 0.75, 0.75]);
        assert!(g.light_dirs.iter().all(|d| d[3] == 1.0));
        assert_eq!(g.light_dirs[0][..3], [0.0, 0.0, 1.0]);
        assert_eq!(g.light_colors[0][..3], [2.0, 2.0, 2.0]);
        assert_eq!(g.camera_pos, [0.0, 0.0, 3.2, 1.0]);
    }

    #[test]
    fn land_material_flags_every_map() {
        let u = material_uniform(&Material::land(0.6, 0.02, 0.08), false);
        assert_eq!(u.maps, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.params, [0.6, 0.02, 0.08, 0.0]);

        let unlit = material_uniform(&Material::unlit(Color::from_hex(0xffff00)), false);
        assert_eq!(unlit.params[3], 1.0);
        assert_eq!(unlit.color, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn interleaves_sphere_vertices() {
        let mesh = uv_sphere(1.0, 8, 4);
        let v = vertices(&mesh);
        assert_eq!(v.len(), mesh.positions.len());
        assert_eq!(v[3].uv, mesh.uvs[3]);
        assert_eq!(v[3].normal, mesh.normals[3]);
    }

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let levels = mip_chain(&image(8, 2, true));
        let sizes: Vec<(u32, u32)> = levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert!(levels.iter().all(|l| l.pixels.len() == (l.width * l.height * 4) as usize));
        assert_eq!(levels[1].pixels[2], 255);

        assert_eq!(mip_chain(&image(8, 2, false)).len(), 1);
    }

    #[test]
    fn identity_model_is_uploaded_as_is() {
        let u = DrawUniform {
            model: MAT4_IDENTITY,
        };
        assert_eq!(bytemuck::bytes_of(&u).len(), 64);
    }
}

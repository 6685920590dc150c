/// Linear-agnostic 8-bit RGB color; conversion to shader space is the
/// backend's job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_hex(0xffffff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self::from_hex)
    }

    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// sRGB channels in `[0, 1]`.
    pub fn to_unit_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Which of the synthesized surface textures a material samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceMap {
    Color,
    Mask,
    Bump,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Physically based surface lit by the scene lights.
    Standard {
        color: Color,
        roughness: f32,
        metalness: f32,
        map: Option<SurfaceMap>,
        alpha_map: Option<SurfaceMap>,
        bump_map: Option<SurfaceMap>,
        bump_scale: f32,
        transparent: bool,
    },
    /// Flat color, ignores lighting.
    Unlit { color: Color },
}

impl Material {
    pub fn standard(color: Color, roughness: f32, metalness: f32) -> Self {
        Material::Standard {
            color,
            roughness,
            metalness,
            map: None,
            alpha_map: None,
            bump_map: None,
            bump_scale: 0.0,
            transparent: false,
        }
    }

    /// Land overlay: color clipped by the mask alpha, with bump relief.
    pub fn land(roughness: f32, metalness: f32, bump_scale: f32) -> Self {
        Material::Standard {
            color: Color::WHITE,
            roughness,
            metalness,
            map: Some(SurfaceMap::Color),
            alpha_map: Some(SurfaceMap::Mask),
            bump_map: Some(SurfaceMap::Bump),
            bump_scale,
            transparent: true,
        }
    }

    pub fn unlit(color: Color) -> Self {
        Material::Unlit { color }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(
            self,
            Material::Standard {
                transparent: true,
                ..
            }
        )
    }

    /// Surface textures this material samples, without duplicates.
    pub fn surface_maps(&self) -> Vec<SurfaceMap> {
        let mut maps = Vec::new();
        if let Material::Standard {
            map,
            alpha_map,
            bump_map,
            ..
        } = self
        {
            for m in [map, alpha_map, bump_map].into_iter().flatten() {
                if !maps.contains(m) {
                    maps.push(*m);
                }
            }
        }
        maps
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Material, SurfaceMap};

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::parse("#9ae14a"), Some(Color::rgb(0x9a, 0xe1, 0x4a)));
        assert_eq!(Color::parse("2f8bff"), Some(Color::from_hex(0x2f8bff)));
        assert_eq!(Color::parse("#fff"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
        assert_eq!(Color::from_hex(0xf7f9ff).to_hex_string(), "#f7f9ff");
    }

    #[test]
    fn land_material_samples_all_surface_maps() {
        let m = Material::land(0.6, 0.02, 0.08);
        assert!(m.is_transparent());
        assert_eq!(
            m.surface_maps(),
            vec![SurfaceMap::Color, SurfaceMap::Mask, SurfaceMap::Bump]
        );
        assert!(Material::unlit(Color::from_hex(0xffff00)).surface_maps().is_empty());
    }
}

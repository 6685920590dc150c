use foundation::math::{QuadraticBezier, Vec3, equirect_uv, project};

/// Indexed triangle mesh in `f32`, ready for vertex buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn byte_len(&self) -> usize {
        self.positions.len() * 12 + self.normals.len() * 12 + self.uvs.len() * 8 + self.indices.len() * 4
    }
}

/// Latitude/longitude sphere whose UVs line up with [`project`].
///
/// Vertex `(ix, iy)` sits at `u = ix / width_segments`,
/// `v = iy / height_segments`, i.e. the geographic coordinate
/// `lat = 90 − 180·v`, `lon = 360·u − 180`. Triangles wind counter-clockwise
/// seen from outside.
pub fn uv_sphere(radius: f64, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let row = ws + 1;

    let mut mesh = MeshData::default();
    for iy in 0..=hs {
        let v = iy as f64 / hs as f64;
        let lat = 90.0 - 180.0 * v;
        for ix in 0..=ws {
            let u = ix as f64 / ws as f64;
            let p = project(lat, 360.0 * u - 180.0, radius);
            mesh.positions.push(p.to_f32());
            mesh.normals.push(p.normalize_or_zero().to_f32());
            mesh.uvs.push([u as f32, v as f32]);
        }
    }

    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Texture coordinate of a geographic point on a [`uv_sphere`].
pub fn sphere_uv_of(lat_deg: f64, lon_deg: f64) -> [f32; 2] {
    let [u, v] = equirect_uv(lat_deg, lon_deg);
    [u as f32, v as f32]
}

/// Orthonormal frame along a curve.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurveFrame {
    pub point: Vec3,
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Parallel-transported frames at `segments + 1` evenly spaced parameters.
pub fn curve_frames(curve: &QuadraticBezier, segments: u32) -> Vec<CurveFrame> {
    let segments = segments.max(1);
    let mut frames: Vec<CurveFrame> = Vec::with_capacity(segments as usize + 1);
    for i in 0..=segments {
        let t = i as f64 / segments as f64;
        let point = curve.point(t);
        let tangent = curve.tangent(t);
        let normal = match frames.last() {
            None => tangent.any_orthogonal(),
            Some(prev) => {
                let projected = prev.normal - tangent * prev.normal.dot(tangent);
                projected
                    .try_normalize()
                    .unwrap_or_else(|| tangent.any_orthogonal())
            }
        };
        let binormal = tangent.cross(normal);
        frames.push(CurveFrame {
            point,
            tangent,
            normal,
            binormal,
        });
    }
    frames
}

/// Open tube of constant `radius` swept along `curve`.
pub fn tube(
    curve: &QuadraticBezier,
    tubular_segments: u32,
    radius: f64,
    radial_segments: u32,
) -> MeshData {
    let radial = radial_segments.max(3);
    let frames = curve_frames(curve, tubular_segments);
    let tubular = frames.len() as u32 - 1;

    let mut mesh = MeshData::default();
    for (i, frame) in frames.iter().enumerate() {
        for j in 0..=radial {
            let angle = j as f64 / radial as f64 * std::f64::consts::TAU;
            let (sin, cos) = angle.sin_cos();
            let n = (frame.normal * -cos + frame.binormal * sin).normalize_or_zero();
            mesh.positions.push((frame.point + n * radius).to_f32());
            mesh.normals.push(n.to_f32());
            mesh.uvs
                .push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    let row = radial + 1;
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::{curve_frames, sphere_uv_of, tube, uv_sphere};
    use foundation::math::{QuadraticBezier, Vec3, project};

    fn v(p: [f32; 3]) -> Vec3 {
        Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    #[test]
    fn sphere_counts() {
        let mesh = uv_sphere(0.75, 96, 96);
        assert_eq!(mesh.vertex_count(), 97 * 97);
        // Pole rows contribute one triangle per segment instead of two.
        assert_eq!(mesh.triangle_count(), 96 * 2 * 96 - 2 * 96);
        assert!(mesh.indices.iter().all(|i| (*i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn vertices_sit_on_radius() {
        let mesh = uv_sphere(2.0, 16, 8);
        for p in &mesh.positions {
            assert!((v(*p).length() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn uv_and_projection_agree() {
        let (ws, hs) = (36u32, 18u32);
        let mesh = uv_sphere(1.0, ws, hs);
        // lat 40, lon 20 is exactly on the grid: iy = 5, ix = 20.
        let idx = (5 * (ws + 1) + 20) as usize;
        assert_eq!(mesh.uvs[idx], sphere_uv_of(40.0, 20.0));
        let expected = project(40.0, 20.0, 1.0);
        assert!(v(mesh.positions[idx]).distance(expected) < 1e-6);
    }

    #[test]
    fn triangles_face_outward() {
        let mesh = uv_sphere(1.0, 24, 12);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| v(mesh.positions[i as usize]));
            let n = (b - a).cross(c - a);
            let centroid = (a + b + c) * (1.0 / 3.0);
            assert!(n.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn frames_stay_orthonormal() {
        let curve = QuadraticBezier::new(Vec3::X, Vec3::new(1.0, 1.0, 1.0), Vec3::Z);
        for f in curve_frames(&curve, 32) {
            assert!(f.tangent.dot(f.normal).abs() < 1e-9);
            assert!((f.normal.length() - 1.0).abs() < 1e-9);
            assert!((f.binormal.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn tube_counts_and_radius() {
        let curve = QuadraticBezier::new(Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y);
        let mesh = tube(&curve, 64, 0.01, 8);
        assert_eq!(mesh.vertex_count(), 65 * 9);
        assert_eq!(mesh.triangle_count(), 64 * 8 * 2);
        let start = curve.point(0.0);
        for p in &mesh.positions[..9] {
            assert!((v(*p).distance(start) - 0.01).abs() < 1e-6);
        }
    }
}

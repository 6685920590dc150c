use foundation::math::{MAT4_IDENTITY, Mat4, Vec3, mat4_mul, mat4_translate_scale};

use crate::light::Light;
use crate::material::{Color, Material};
use crate::mesh::MeshData;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub scale: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn translate(translation: Vec3) -> Self {
        Self {
            translation,
            scale: 1.0,
        }
    }

    pub fn uniform_scale(scale: f64) -> Self {
        Self {
            translation: Vec3::ZERO,
            scale,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        mat4_translate_scale(self.translation, self.scale)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: MeshData,
        material: Material,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: MeshData, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            kind: NodeKind::Mesh { geometry, material },
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

/// Node tree plus lighting and clear color for one globe.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub background: Color,
    pub lights: Vec<Light>,
    pub root: Node,
}

impl SceneGraph {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            lights: Vec::new(),
            root: Node::group("root"),
        }
    }

    pub fn add(&mut self, node: Node) {
        self.root.children.push(node);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Depth-first, parents before children, with each node's world matrix.
    pub fn traverse(&self, mut visit: impl FnMut(&Node, Mat4)) {
        fn walk(node: &Node, parent: Mat4, visit: &mut dyn FnMut(&Node, Mat4)) {
            let world = mat4_mul(parent, node.transform.matrix());
            visit(node, world);
            for child in &node.children {
                walk(child, world, visit);
            }
        }
        walk(&self.root, MAT4_IDENTITY, &mut visit);
    }

    pub fn find(&self, name: &str) -> Option<&Node> {
        fn search<'a>(node: &'a Node, name: &str) -> Option<&'a Node> {
            if node.name == name {
                return Some(node);
            }
            node.children.iter().find_map(|c| search(c, name))
        }
        search(&self.root, name)
    }

    pub fn mesh_count(&self) -> usize {
        let mut n = 0;
        self.traverse(|node, _| {
            if matches!(node.kind, NodeKind::Mesh { .. }) {
                n += 1;
            }
        });
        n
    }
}

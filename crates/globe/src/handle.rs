//! One route's worth of graphics resources.
//!
//! A [`SceneHandle`] is built for a single origin/destination pair and owns
//! everything that cycle allocated: the renderer and its canvas, the three
//! surface textures, one geometry and material per mesh, the orbit
//! controls, the resize observer and the frame loop.
//!
//! - Disposal is explicit ([`SceneHandle::dispose`]) and also runs on drop.
//! - Every step checks what was actually allocated, so a handle that failed
//!   halfway through [`SceneHandle::build`] tears down cleanly.
//! - Frame and resize callbacks hold a `Weak` to the handle; once it is
//!   gone they do nothing.

use std::cell::RefCell;
use std::rc::Rc;

use gpu::{
    DrawCommand, GeometryId, GraphicsBackend, MaterialId, Renderer, RendererId, RendererOptions,
    SurfaceBindings, TextureId, Viewport,
};
use runtime::{Frame, FrameCallback, FrameLoop, HostSize, LoopId, ObserverId, ResizeCallback, ResizeObserver};
use scene::{
    Color, GlobeStyle, LatLon, Light, Material, MeshData, NodeKind, OrbitControls,
    PerspectiveCamera, build_route_scene,
};
use surface::{SurfaceTextures, TextureImage};

use crate::config::GlobeConfig;
use crate::error::GlobeError;

/// Platform services a handle allocates from.
pub(crate) struct Host<B> {
    pub backend: Rc<RefCell<B>>,
    pub frame_loop: Rc<dyn FrameLoop>,
    pub resize: Rc<dyn ResizeObserver>,
}

impl<B> Clone for Host<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            frame_loop: self.frame_loop.clone(),
            resize: self.resize.clone(),
        }
    }
}

#[derive(Debug)]
struct MeshSlot {
    name: String,
    geometry: GeometryId,
    material: Option<MaterialId>,
}

pub struct SceneHandle<B: GraphicsBackend> {
    cycle: u64,
    host: Host<B>,
    fallback: HostSize,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    background: Color,
    lights: Vec<Light>,
    renderer: Option<RendererId>,
    textures: Vec<TextureId>,
    meshes: Vec<MeshSlot>,
    draws: Vec<DrawCommand>,
    frame_loop: Option<LoopId>,
    observer: Option<ObserverId>,
    render_failures: u64,
    disposed: bool,
}

impl<B: GraphicsBackend> SceneHandle<B> {
    /// Allocates the renderer, uploads the surface textures and every mesh
    /// of the route scene. Callbacks are not registered yet; see
    /// [`SceneHandle::attach`].
    pub(crate) fn build(
        cycle: u64,
        host: &Host<B>,
        config: &GlobeConfig,
        style: &GlobeStyle,
        origin: LatLon,
        destination: LatLon,
        surface: &SurfaceTextures,
    ) -> Result<Self, GlobeError> {
        let graph = build_route_scene(style, origin, destination);
        let camera = config.camera();
        let controls = OrbitControls::new(&camera, config.orbit_settings());
        let mut handle = Self {
            cycle,
            host: host.clone(),
            fallback: config.fallback_size(),
            camera,
            controls,
            background: graph.background,
            lights: graph.lights.clone(),
            renderer: None,
            textures: Vec::with_capacity(3),
            meshes: Vec::with_capacity(graph.mesh_count()),
            draws: Vec::with_capacity(graph.mesh_count()),
            frame_loop: None,
            observer: None,
            render_failures: 0,
            disposed: false,
        };

        let viewport = handle.measure(None);
        handle.camera.set_aspect(viewport.aspect());
        handle.controls.set_viewport_height(viewport.css.height);
        let options = RendererOptions {
            antialias: config.host.antialias,
            alpha: config.host.alpha,
            viewport,
        };
        let renderer = handle.host.backend.borrow_mut().create_renderer(&options);
        handle.renderer = Some(renderer?);

        let bindings = SurfaceBindings {
            color: Some(handle.upload_texture(&surface.color)?),
            mask: Some(handle.upload_texture(&surface.mask)?),
            bump: Some(handle.upload_texture(&surface.bump)?),
        };

        let mut failure = None;
        graph.traverse(|node, world| {
            if failure.is_some() {
                return;
            }
            if let NodeKind::Mesh { geometry, material } = &node.kind {
                let uploaded = handle.upload_mesh(&node.name, geometry, material, &bindings);
                match uploaded {
                    Ok((geometry, material_id)) => handle.draws.push(DrawCommand {
                        geometry,
                        material: material_id,
                        model: world,
                        transparent: material.is_transparent(),
                    }),
                    Err(e) => failure = Some(e),
                }
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }

        tracing::debug!(
            cycle,
            meshes = handle.meshes.len(),
            width = viewport.physical_width,
            height = viewport.physical_height,
            "scene built"
        );
        Ok(handle)
    }

    /// Registers the resize observer, applies the current host size once and
    /// starts the frame loop.
    pub(crate) fn attach(this: &Rc<RefCell<Self>>)
    where
        B: 'static,
    {
        let weak = Rc::downgrade(this);
        let on_resize: ResizeCallback = Box::new(move |size| {
            if let Some(handle) = weak.upgrade() {
                if let Ok(mut handle) = handle.try_borrow_mut() {
                    handle.on_resize(size);
                }
            }
        });
        let weak = Rc::downgrade(this);
        let on_frame: FrameCallback = Box::new(move |frame| {
            if let Some(handle) = weak.upgrade() {
                if let Ok(mut handle) = handle.try_borrow_mut() {
                    handle.on_frame(frame);
                }
            }
        });

        let mut handle = this.borrow_mut();
        if handle.disposed {
            return;
        }
        let resize = handle.host.resize.clone();
        handle.observer = Some(resize.observe(on_resize));
        let measured = handle.host.backend.borrow().host_size();
        if let Some(size) = measured {
            handle.on_resize(size);
        } else {
            let fallback = handle.fallback;
            handle.on_resize(fallback);
        }
        let frame_loop = handle.host.frame_loop.clone();
        handle.frame_loop = Some(frame_loop.start(on_frame));
    }

    fn measure(&self, size: Option<HostSize>) -> Viewport {
        let measured = size.or_else(|| self.host.backend.borrow().host_size());
        let css = measured.unwrap_or(self.fallback).or_fallback(self.fallback);
        Viewport::new(css, self.host.backend.borrow().device_pixel_ratio())
    }

    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureId, GlobeError> {
        let uploaded = self.host.backend.borrow_mut().upload_texture(image);
        let id = uploaded?;
        self.textures.push(id);
        Ok(id)
    }

    fn upload_mesh(
        &mut self,
        name: &str,
        mesh: &MeshData,
        material: &Material,
        bindings: &SurfaceBindings,
    ) -> Result<(GeometryId, MaterialId), GlobeError> {
        let uploaded = self.host.backend.borrow_mut().upload_geometry(mesh);
        let geometry = uploaded?;
        self.meshes.push(MeshSlot {
            name: name.to_string(),
            geometry,
            material: None,
        });
        let created = self.host.backend.borrow_mut().create_material(material, bindings);
        let material = created?;
        if let Some(slot) = self.meshes.last_mut() {
            slot.material = Some(material);
        }
        Ok((geometry, material))
    }

    pub(crate) fn on_resize(&mut self, size: HostSize) {
        if self.disposed {
            return;
        }
        let viewport = self.measure(Some(size));
        self.camera.set_aspect(viewport.aspect());
        self.controls.set_viewport_height(viewport.css.height);
        let Some(renderer) = self.renderer else {
            return;
        };
        let resized = self.host.backend.borrow_mut().resize(renderer, viewport);
        if let Err(e) = resized {
            tracing::warn!(cycle = self.cycle, error = %e, "resize failed");
        }
    }

    pub(crate) fn on_frame(&mut self, frame: Frame) {
        if self.disposed {
            return;
        }
        self.controls.update(&frame);
        self.controls.apply(&mut self.camera);
        let Some(renderer) = self.renderer else {
            return;
        };
        let render_frame = Renderer::collect(&self.camera, self.background, &self.lights, &self.draws);
        let rendered = self.host.backend.borrow_mut().render(renderer, &render_frame);
        if let Err(e) = rendered {
            // A broken context fails every frame; only the first is worth a warning.
            if self.render_failures == 0 {
                tracing::warn!(cycle = self.cycle, error = %e, "frame render failed");
            }
            self.render_failures += 1;
        }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Names of the meshes this handle uploaded, in scene order.
    pub fn mesh_names(&self) -> Vec<&str> {
        self.meshes.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Releases everything in reverse dependency order. Safe to call more
    /// than once and on a partially built handle.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        if let Some(id) = self.frame_loop.take() {
            self.host.frame_loop.cancel(id);
        }
        if let Some(id) = self.observer.take() {
            self.host.resize.disconnect(id);
        }
        self.controls.dispose();

        let mut backend = self.host.backend.borrow_mut();
        for texture in self.textures.drain(..) {
            backend.dispose_texture(texture);
        }
        for mesh in self.meshes.drain(..) {
            backend.dispose_geometry(mesh.geometry);
            if let Some(material) = mesh.material {
                backend.dispose_material(material);
            }
        }
        self.draws.clear();
        if let Some(renderer) = self.renderer.take() {
            backend.dispose_renderer(renderer);
        }
        backend.clear_host();
        tracing::debug!(cycle = self.cycle, "scene disposed");
    }
}

impl<B: GraphicsBackend> Drop for SceneHandle<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

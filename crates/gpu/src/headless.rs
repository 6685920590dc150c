use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::{Handle, HandleAllocator};
use runtime::HostSize;
use scene::{Material, MeshData};
use surface::TextureImage;

use crate::backend::{
    GeometryId, GraphicsBackend, MaterialId, RendererId, RendererOptions, SurfaceBindings,
    TextureId,
};
use crate::error::GpuError;
use crate::renderer::RenderFrame;
use crate::viewport::Viewport;

/// Operations that can be made to fail on purpose.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailPoint {
    CreateRenderer,
    UploadGeometry,
    UploadTexture,
    CreateMaterial,
    Render,
}

#[derive(Default)]
struct HeadlessState {
    renderers: HandleAllocator,
    geometries: HandleAllocator,
    textures: HandleAllocator,
    materials: HandleAllocator,
    host_children: usize,
    host_size: Option<HostSize>,
    device_pixel_ratio: f64,
    last_viewport: Option<Viewport>,
    frames_rendered: u64,
    uploaded_bytes: usize,
    calls: BTreeMap<FailPoint, usize>,
    failures: BTreeMap<FailPoint, usize>,
    log: Vec<&'static str>,
}

impl HeadlessState {
    /// Counts the call and reports whether it was scheduled to fail.
    fn trip(&mut self, point: FailPoint) -> bool {
        let n = self.calls.entry(point).or_insert(0);
        let this_call = *n;
        *n += 1;
        let fail = self.failures.get(&point) == Some(&this_call);
        if fail {
            tracing::warn!(?point, call = this_call, "injecting backend failure");
        }
        fail
    }
}

fn release(alloc: &mut HandleAllocator, kind: &'static str, handle: Handle) -> bool {
    let released = alloc.release(handle);
    if !released {
        tracing::debug!(kind, ?handle, "dispose ignored, resource not live");
    }
    released
}

/// In-memory backend that tracks live resources.
///
/// Cloning shares state, so a test can keep one clone for inspection while
/// the component owns another.
#[derive(Clone)]
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        let state = HeadlessState {
            device_pixel_ratio: 1.0,
            ..HeadlessState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn with_host_size(self, size: HostSize) -> Self {
        self.state.borrow_mut().host_size = Some(size);
        self
    }

    pub fn with_device_pixel_ratio(self, dpr: f64) -> Self {
        self.state.borrow_mut().device_pixel_ratio = dpr;
        self
    }

    pub fn set_host_size(&self, size: Option<HostSize>) {
        self.state.borrow_mut().host_size = size;
    }

    /// Makes the `nth` (0-based) call of `point` fail.
    pub fn fail_at(&self, point: FailPoint, nth: usize) {
        self.state.borrow_mut().failures.insert(point, nth);
    }

    pub fn live_renderers(&self) -> usize {
        self.state.borrow().renderers.live_count()
    }

    pub fn live_geometries(&self) -> usize {
        self.state.borrow().geometries.live_count()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.live_count()
    }

    pub fn live_materials(&self) -> usize {
        self.state.borrow().materials.live_count()
    }

    /// Total of every live resource kind.
    pub fn live_resources(&self) -> usize {
        self.live_renderers() + self.live_geometries() + self.live_textures() + self.live_materials()
    }

    /// Canvases currently attached to the host element.
    pub fn host_children(&self) -> usize {
        self.state.borrow().host_children
    }

    pub fn frames_rendered(&self) -> u64 {
        self.state.borrow().frames_rendered
    }

    pub fn last_viewport(&self) -> Option<Viewport> {
        self.state.borrow().last_viewport
    }

    pub fn uploaded_bytes(&self) -> usize {
        self.state.borrow().uploaded_bytes
    }

    /// Names of backend operations in call order.
    pub fn log(&self) -> Vec<&'static str> {
        self.state.borrow().log.clone()
    }

    fn injected(point: FailPoint) -> GpuError {
        match point {
            FailPoint::CreateRenderer => GpuError::Context("injected failure".into()),
            FailPoint::UploadGeometry => GpuError::resource("geometry", "injected failure"),
            FailPoint::UploadTexture => GpuError::resource("texture", "injected failure"),
            FailPoint::CreateMaterial => GpuError::resource("material", "injected failure"),
            FailPoint::Render => GpuError::Render("injected failure".into()),
        }
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_renderer(&mut self, options: &RendererOptions) -> Result<RendererId, GpuError> {
        let mut s = self.state.borrow_mut();
        s.log.push("create_renderer");
        if s.trip(FailPoint::CreateRenderer) {
            return Err(Self::injected(FailPoint::CreateRenderer));
        }
        s.host_children += 1;
        s.last_viewport = Some(options.viewport);
        Ok(RendererId(s.renderers.allocate()))
    }

    fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryId, GpuError> {
        let mut s = self.state.borrow_mut();
        s.log.push("upload_geometry");
        if s.trip(FailPoint::UploadGeometry) {
            return Err(Self::injected(FailPoint::UploadGeometry));
        }
        s.uploaded_bytes += mesh.byte_len();
        Ok(GeometryId(s.geometries.allocate()))
    }

    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureId, GpuError> {
        let mut s = self.state.borrow_mut();
        s.log.push("upload_texture");
        if s.trip(FailPoint::UploadTexture) {
            return Err(Self::injected(FailPoint::UploadTexture));
        }
        s.uploaded_bytes += image.byte_len();
        Ok(TextureId(s.textures.allocate()))
    }

    fn create_material(
        &mut self,
        material: &Material,
        surfaces: &SurfaceBindings,
    ) -> Result<MaterialId, GpuError> {
        let mut s = self.state.borrow_mut();
        s.log.push("create_material");
        if s.trip(FailPoint::CreateMaterial) {
            return Err(Self::injected(FailPoint::CreateMaterial));
        }
        for map in material.surface_maps() {
            let bound = surfaces
                .get(map)
                .is_some_and(|id| s.textures.is_live(id.0));
            if !bound {
                return Err(GpuError::resource(
                    "material",
                    format!("surface map {map:?} is not bound to a live texture"),
                ));
            }
        }
        Ok(MaterialId(s.materials.allocate()))
    }

    fn resize(&mut self, renderer: RendererId, viewport: Viewport) -> Result<(), GpuError> {
        let mut s = self.state.borrow_mut();
        s.log.push("resize");
        if !s.renderers.is_live(renderer.0) {
            return Err(GpuError::Render("resize on a disposed renderer".into()));
        }
        s.last_viewport = Some(viewport);
        Ok(())
    }

    fn render(&mut self, renderer: RendererId, frame: &RenderFrame) -> Result<(), GpuError> {
        let mut s = self.state.borrow_mut();
        if s.trip(FailPoint::Render) {
            return Err(Self::injected(FailPoint::Render));
        }
        if !s.renderers.is_live(renderer.0) {
            return Err(GpuError::Render("render on a disposed renderer".into()));
        }
        for draw in &frame.draws {
            if !s.geometries.is_live(draw.geometry.0) || !s.materials.is_live(draw.material.0) {
                return Err(GpuError::Render("draw references a disposed resource".into()));
            }
        }
        s.frames_rendered += 1;
        Ok(())
    }

    fn dispose_geometry(&mut self, id: GeometryId) {
        let mut s = self.state.borrow_mut();
        s.log.push("dispose_geometry");
        release(&mut s.geometries, "geometry", id.0);
    }

    fn dispose_texture(&mut self, id: TextureId) {
        let mut s = self.state.borrow_mut();
        s.log.push("dispose_texture");
        release(&mut s.textures, "texture", id.0);
    }

    fn dispose_material(&mut self, id: MaterialId) {
        let mut s = self.state.borrow_mut();
        s.log.push("dispose_material");
        release(&mut s.materials, "material", id.0);
    }

    fn dispose_renderer(&mut self, id: RendererId) {
        let mut s = self.state.borrow_mut();
        s.log.push("dispose_renderer");
        if release(&mut s.renderers, "renderer", id.0) {
            s.host_children = s.host_children.saturating_sub(1);
        }
    }

    fn clear_host(&mut self) {
        let mut s = self.state.borrow_mut();
        s.log.push("clear_host");
        s.host_children = 0;
    }

    fn host_size(&self) -> Option<HostSize> {
        self.state.borrow().host_size
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.state.borrow().device_pixel_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::{FailPoint, HeadlessBackend};
    use crate::backend::{GraphicsBackend, RendererOptions, SurfaceBindings};
    use crate::error::GpuError;
    use crate::viewport::Viewport;
    use runtime::HostSize;
    use scene::{Color, Material, MeshData};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        buffer.text()
    }

    fn options() -> RendererOptions {
        RendererOptions {
            antialias: true,
            alpha: true,
            viewport: Viewport::new(HostSize::new(420.0, 420.0), 1.0),
        }
    }

    #[test]
    fn tracks_live_resources() {
        let mut backend = HeadlessBackend::new();
        let observer = backend.clone();
        let r = backend.create_renderer(&options()).unwrap();
        let g = backend.upload_geometry(&MeshData::default()).unwrap();
        assert_eq!(observer.live_resources(), 2);
        assert_eq!(observer.host_children(), 1);

        backend.dispose_geometry(g);
        backend.dispose_geometry(g);
        backend.dispose_renderer(r);
        backend.dispose_renderer(r);
        assert_eq!(observer.live_resources(), 0);
        assert_eq!(observer.host_children(), 0);
    }

    #[test]
    fn injected_failure_hits_the_nth_call() {
        let mut backend = HeadlessBackend::new();
        backend.fail_at(FailPoint::UploadGeometry, 1);
        assert!(backend.upload_geometry(&MeshData::default()).is_ok());
        assert!(matches!(
            backend.upload_geometry(&MeshData::default()),
            Err(GpuError::Resource { kind: "geometry", .. })
        ));
        assert!(backend.upload_geometry(&MeshData::default()).is_ok());
        assert_eq!(backend.live_geometries(), 2);
    }

    #[test]
    fn faults_and_stale_disposals_are_logged() {
        let logs = capture_logs(|| {
            let mut backend = HeadlessBackend::new();
            backend.fail_at(FailPoint::UploadGeometry, 0);
            let r = backend.create_renderer(&options()).unwrap();
            assert!(backend.upload_geometry(&MeshData::default()).is_err());
            backend.dispose_renderer(r);
            backend.dispose_renderer(r);
        });
        assert!(logs.contains("injecting backend failure"), "{logs}");
        assert!(logs.contains("UploadGeometry"), "{logs}");
        assert_eq!(logs.matches("dispose ignored").count(), 1, "{logs}");
        assert!(logs.contains("renderer"), "{logs}");
    }

    #[test]
    fn material_needs_its_surface_maps() {
        let mut backend = HeadlessBackend::new();
        let land = Material::land(0.6, 0.02, 0.08);
        assert!(backend.create_material(&land, &SurfaceBindings::default()).is_err());
        assert!(
            backend
                .create_material(&Material::unlit(Color::WHITE), &SurfaceBindings::default())
                .is_ok()
        );
    }
}

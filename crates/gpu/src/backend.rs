use foundation::Handle;
use runtime::HostSize;
use scene::{Material, MeshData, SurfaceMap};
use surface::TextureImage;

use crate::error::GpuError;
use crate::renderer::RenderFrame;
use crate::viewport::Viewport;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RendererId(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GeometryId(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialId(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RendererOptions {
    pub antialias: bool,
    /// Transparent canvas background where the clear color is not drawn.
    pub alpha: bool,
    pub viewport: Viewport,
}

/// Uploaded surface textures a material may sample.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SurfaceBindings {
    pub color: Option<TextureId>,
    pub mask: Option<TextureId>,
    pub bump: Option<TextureId>,
}

impl SurfaceBindings {
    pub fn get(&self, map: SurfaceMap) -> Option<TextureId> {
        match map {
            SurfaceMap::Color => self.color,
            SurfaceMap::Mask => self.mask,
            SurfaceMap::Bump => self.bump,
        }
    }
}

/// Everything the globe allocates on the graphics side.
///
/// Every `create_*`/`upload_*` has a matching `dispose_*`. Disposing an id
/// that is unknown or already disposed must be a no-op so teardown can run
/// unconditionally after a partial build.
pub trait GraphicsBackend {
    /// Creates a renderer and attaches its canvas to the host element.
    fn create_renderer(&mut self, options: &RendererOptions) -> Result<RendererId, GpuError>;
    fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryId, GpuError>;
    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureId, GpuError>;
    /// `surfaces` must hold every map `material` samples.
    fn create_material(
        &mut self,
        material: &Material,
        surfaces: &SurfaceBindings,
    ) -> Result<MaterialId, GpuError>;

    fn resize(&mut self, renderer: RendererId, viewport: Viewport) -> Result<(), GpuError>;
    fn render(&mut self, renderer: RendererId, frame: &RenderFrame) -> Result<(), GpuError>;

    fn dispose_geometry(&mut self, id: GeometryId);
    fn dispose_texture(&mut self, id: TextureId);
    fn dispose_material(&mut self, id: MaterialId);
    /// Releases the context and detaches the canvas.
    fn dispose_renderer(&mut self, id: RendererId);
    /// Removes anything left in the host element.
    fn clear_host(&mut self);

    /// Current CSS size of the host element, if it can be measured.
    fn host_size(&self) -> Option<HostSize>;
    fn device_pixel_ratio(&self) -> f64;
}

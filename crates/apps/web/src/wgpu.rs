//! wgpu implementation of [`gpu::GraphicsBackend`] for the browser.
//!
//! One canvas and one device serve every renderer the globe creates. The
//! canvas is appended to the host element by `create_renderer` and removed
//! again by `dispose_renderer`; WebGL binds its context to the canvas, so
//! the canvas is kept and reused rather than recreated.

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::borrow::Cow;
    use std::collections::BTreeMap;
    use std::num::NonZeroU64;

    use ::wgpu::util::DeviceExt;
    use foundation::{Handle, HandleAllocator};
    use gpu::{
        GeometryId, GpuError, GraphicsBackend, MaterialId, RenderFrame, RendererId,
        RendererOptions, SurfaceBindings, TextureId, Viewport,
    };
    use runtime::HostSize;
    use scene::{Material, MeshData, SurfaceMap};
    use surface::{AddressMode, ColorSpace, TextureImage};
    use wasm_bindgen::JsCast;

    use crate::shading::{self, DRAW_UNIFORM_STRIDE, DrawUniform, Globals, MaterialUniform, Vertex};

    const DEPTH_FORMAT: ::wgpu::TextureFormat = ::wgpu::TextureFormat::Depth24Plus;
    const MSAA_SAMPLES: u32 = 4;
    const INITIAL_DRAW_CAPACITY: u64 = 8;

    const SURFACE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    light_dirs: array<vec4<f32>, 4>,
    light_colors: array<vec4<f32>, 4>,
};

struct MaterialParams {
    color: vec4<f32>,
    // roughness, metalness, bump scale, unlit
    params: vec4<f32>,
    // color map, alpha map, bump map, transparent
    maps: vec4<f32>,
};

struct Draw {
    model: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;
@group(1) @binding(0) var<uniform> material: MaterialParams;
@group(1) @binding(1) var color_tex: texture_2d<f32>;
@group(1) @binding(2) var mask_tex: texture_2d<f32>;
@group(1) @binding(3) var bump_tex: texture_2d<f32>;
@group(1) @binding(4) var surface_sampler: sampler;
@group(2) @binding(0) var<uniform> draw: Draw;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    let world = draw.model * vec4<f32>(in.position, 1.0);
    out.clip = globals.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = normalize((draw.model * vec4<f32>(in.normal, 0.0)).xyz);
    out.uv = in.uv;
    return out;
}

// Screen-space bump mapping from height derivatives.
fn perturb_normal(p: vec3<f32>, n: vec3<f32>, h: f32, scale: f32) -> vec3<f32> {
    let dp_dx = dpdx(p);
    let dp_dy = dpdy(p);
    let dh_dx = dpdx(h) * scale;
    let dh_dy = dpdy(h) * scale;
    let r1 = cross(dp_dy, n);
    let r2 = cross(n, dp_dx);
    let det = dot(dp_dx, r1);
    if (abs(det) < 1e-12) {
        return n;
    }
    let grad = sign(det) * (dh_dx * r1 + dh_dy * r2);
    return normalize(abs(det) * n - grad);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let texel = textureSample(color_tex, surface_sampler, in.uv);
    let mask = textureSample(mask_tex, surface_sampler, in.uv);
    let height = textureSample(bump_tex, surface_sampler, in.uv).r;
    let n = perturb_normal(
        in.world_pos,
        normalize(in.normal),
        height,
        material.params.z * material.maps.z,
    );

    if (material.params.w > 0.5) {
        return vec4<f32>(material.color.rgb, 1.0);
    }

    let base = material.color.rgb * mix(vec3<f32>(1.0), texel.rgb, material.maps.x);
    let alpha = mix(1.0, texel.a, material.maps.x) * mix(1.0, mask.a, material.maps.y);

    let roughness = clamp(material.params.x, 0.04, 1.0);
    let metalness = clamp(material.params.y, 0.0, 1.0);
    let shininess = mix(256.0, 4.0, roughness);
    let spec_strength = mix(0.04, 1.0, metalness) * (1.0 - roughness);
    let diffuse = base * (1.0 - metalness);
    let spec_color = mix(vec3<f32>(1.0), base, metalness);
    let v = normalize(globals.camera_pos.xyz - in.world_pos);

    var lit = globals.ambient.rgb * diffuse;
    for (var i = 0u; i < 4u; i = i + 1u) {
        let d = globals.light_dirs[i];
        if (d.w < 0.5) {
            continue;
        }
        let l = normalize(d.xyz);
        let ndl = max(dot(n, l), 0.0);
        let h = normalize(l + v);
        let specular = pow(max(dot(n, h), 0.0), shininess) * spec_strength;
        lit = lit + globals.light_colors[i].rgb * (diffuse + spec_color * specular) * ndl;
    }
    return vec4<f32>(lit, alpha);
}
"#;

    struct GpuGeometry {
        vertex_buffer: ::wgpu::Buffer,
        index_buffer: ::wgpu::Buffer,
        index_count: u32,
    }

    struct GpuTexture {
        texture: ::wgpu::Texture,
        view: ::wgpu::TextureView,
        sampler: ::wgpu::Sampler,
    }

    struct GpuMaterial {
        bind_group: ::wgpu::BindGroup,
        uniform: ::wgpu::Buffer,
        transparent: bool,
    }

    /// Everything tied to the attached canvas and its current size.
    struct Target {
        id: RendererId,
        config: ::wgpu::SurfaceConfiguration,
        sample_count: u32,
        depth_view: ::wgpu::TextureView,
        msaa_view: Option<::wgpu::TextureView>,
        opaque: ::wgpu::RenderPipeline,
        blended: ::wgpu::RenderPipeline,
        globals_buffer: ::wgpu::Buffer,
        globals_bind_group: ::wgpu::BindGroup,
        draw_buffer: ::wgpu::Buffer,
        draw_bind_group: ::wgpu::BindGroup,
        draw_capacity: u64,
        clear_alpha: f64,
    }

    pub struct WebGpuBackend {
        host: web_sys::HtmlElement,
        canvas: web_sys::HtmlCanvasElement,
        surface: ::wgpu::Surface<'static>,
        adapter: ::wgpu::Adapter,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        format: ::wgpu::TextureFormat,
        alpha_modes: Vec<::wgpu::CompositeAlphaMode>,
        shader: ::wgpu::ShaderModule,
        pipeline_layout: ::wgpu::PipelineLayout,
        globals_layout: ::wgpu::BindGroupLayout,
        material_layout: ::wgpu::BindGroupLayout,
        draw_layout: ::wgpu::BindGroupLayout,
        blank: GpuTexture,
        handles: HandleAllocator,
        target: Option<Target>,
        geometries: BTreeMap<Handle, GpuGeometry>,
        textures: BTreeMap<Handle, GpuTexture>,
        materials: BTreeMap<Handle, GpuMaterial>,
    }

    impl WebGpuBackend {
        /// Creates the device for a fresh canvas destined for `host`.
        ///
        /// The canvas is not attached until a renderer is created.
        pub async fn create(host: web_sys::HtmlElement) -> Result<Self, GpuError> {
            let document = host
                .owner_document()
                .ok_or_else(|| GpuError::Host("host element has no document".into()))?;
            let canvas = document
                .create_element("canvas")
                .map_err(|e| GpuError::Host(format!("create canvas: {e:?}")))?
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .map_err(|_| GpuError::Host("created element is not a canvas".into()))?;
            let style = canvas.style();
            for (property, value) in [("display", "block"), ("width", "100%"), ("height", "100%")] {
                style
                    .set_property(property, value)
                    .map_err(|e| GpuError::Host(format!("canvas style: {e:?}")))?;
            }

            // A surface must not outlive its instance; the instance lives for the page.
            let instance: &'static ::wgpu::Instance =
                Box::leak(Box::new(::wgpu::Instance::new(&::wgpu::InstanceDescriptor {
                    backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                    ..Default::default()
                })));

            let surface = instance
                .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
                .map_err(|e| GpuError::Context(format!("surface: {e}")))?;

            let adapter = instance
                .request_adapter(&::wgpu::RequestAdapterOptions {
                    power_preference: ::wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| GpuError::Context(format!("adapter: {e}")))?;

            let (device, queue) = adapter
                .request_device(&::wgpu::DeviceDescriptor {
                    label: Some("globe-device"),
                    required_features: ::wgpu::Features::empty(),
                    required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                    ..Default::default()
                })
                .await
                .map_err(|e| GpuError::Context(format!("device: {e}")))?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| f.is_srgb())
                .or_else(|| caps.formats.first().copied())
                .ok_or_else(|| GpuError::Context("surface reports no formats".into()))?;

            let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
                label: Some("globe-surface-shader"),
                source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(SURFACE_SHADER)),
            });

            let globals_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-globals-layout"),
                entries: &[uniform_entry(0, false)],
            });
            let material_layout =
                device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                    label: Some("globe-material-layout"),
                    entries: &[
                        uniform_entry(0, false),
                        texture_entry(1),
                        texture_entry(2),
                        texture_entry(3),
                        ::wgpu::BindGroupLayoutEntry {
                            binding: 4,
                            visibility: ::wgpu::ShaderStages::FRAGMENT,
                            ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });
            let draw_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-draw-layout"),
                entries: &[uniform_entry(0, true)],
            });

            let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
                label: Some("globe-pipeline-layout"),
                bind_group_layouts: &[&globals_layout, &material_layout, &draw_layout],
                immediate_size: 0,
            });

            let blank_image = TextureImage {
                width: 1,
                height: 1,
                pixels: vec![255, 255, 255, 255],
                color_space: ColorSpace::Linear,
                sampling: surface::Sampling {
                    wrap_u: AddressMode::ClampToEdge,
                    wrap_v: AddressMode::ClampToEdge,
                    mipmaps: false,
                },
            };
            let blank = create_texture(&device, &queue, &blank_image)?;

            tracing::info!(?format, backend = ?adapter.get_info().backend, "graphics device ready");

            Ok(Self {
                host,
                canvas,
                surface,
                adapter,
                device,
                queue,
                format,
                alpha_modes: caps.alpha_modes,
                shader,
                pipeline_layout,
                globals_layout,
                material_layout,
                draw_layout,
                blank,
                handles: HandleAllocator::new(),
                target: None,
                geometries: BTreeMap::new(),
                textures: BTreeMap::new(),
                materials: BTreeMap::new(),
            })
        }

        fn linear_target(&self) -> bool {
            self.format.is_srgb()
        }

        fn target_mut(&mut self, id: RendererId) -> Result<&mut Target, GpuError> {
            match &mut self.target {
                Some(target) if target.id == id => Ok(target),
                _ => Err(GpuError::Render("renderer is not attached".into())),
            }
        }

        fn build_pipeline(&self, sample_count: u32, transparent: bool) -> ::wgpu::RenderPipeline {
            let label = if transparent {
                "globe-blended-pipeline"
            } else {
                "globe-opaque-pipeline"
            };
            let blend = if transparent {
                ::wgpu::BlendState::ALPHA_BLENDING
            } else {
                ::wgpu::BlendState::REPLACE
            };
            self.device
                .create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(&self.pipeline_layout),
                    vertex: ::wgpu::VertexState {
                        module: &self.shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &[::wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<Vertex>() as ::wgpu::BufferAddress,
                            step_mode: ::wgpu::VertexStepMode::Vertex,
                            attributes: &[
                                ::wgpu::VertexAttribute {
                                    format: ::wgpu::VertexFormat::Float32x3,
                                    offset: 0,
                                    shader_location: 0,
                                },
                                ::wgpu::VertexAttribute {
                                    format: ::wgpu::VertexFormat::Float32x3,
                                    offset: 12,
                                    shader_location: 1,
                                },
                                ::wgpu::VertexAttribute {
                                    format: ::wgpu::VertexFormat::Float32x2,
                                    offset: 24,
                                    shader_location: 2,
                                },
                            ],
                        }],
                    },
                    fragment: Some(::wgpu::FragmentState {
                        module: &self.shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(::wgpu::ColorTargetState {
                            format: self.format,
                            blend: Some(blend),
                            write_mask: ::wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: ::wgpu::PrimitiveState {
                        topology: ::wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: ::wgpu::FrontFace::Ccw,
                        // Sphere and tube winding is not normalized; rely on depth instead.
                        cull_mode: None,
                        polygon_mode: ::wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(::wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: ::wgpu::CompareFunction::Less,
                        stencil: ::wgpu::StencilState::default(),
                        bias: ::wgpu::DepthBiasState::default(),
                    }),
                    multisample: ::wgpu::MultisampleState {
                        count: sample_count,
                        ..Default::default()
                    },
                    multiview_mask: None,
                    cache: None,
                })
        }

        fn draw_buffer(&self, capacity: u64) -> (::wgpu::Buffer, ::wgpu::BindGroup) {
            let buffer = self.device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("globe-draw-uniforms"),
                size: capacity * DRAW_UNIFORM_STRIDE,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-draw-bind-group"),
                layout: &self.draw_layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::Buffer(::wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                    }),
                }],
            });
            (buffer, bind_group)
        }

        fn sized_views(
            &self,
            config: &::wgpu::SurfaceConfiguration,
            sample_count: u32,
        ) -> (::wgpu::TextureView, Option<::wgpu::TextureView>) {
            let size = ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            };
            let attachment = |label, format| {
                self.device
                    .create_texture(&::wgpu::TextureDescriptor {
                        label: Some(label),
                        size,
                        mip_level_count: 1,
                        sample_count,
                        dimension: ::wgpu::TextureDimension::D2,
                        format,
                        usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
                        view_formats: &[],
                    })
                    .create_view(&::wgpu::TextureViewDescriptor::default())
            };
            let depth = attachment("globe-depth", DEPTH_FORMAT);
            let msaa = (sample_count > 1).then(|| attachment("globe-msaa", self.format));
            (depth, msaa)
        }

        /// The texture bound for `map`, or the blank texture when the
        /// material does not sample it.
        fn bound_texture(
            &self,
            sampled: &[SurfaceMap],
            surfaces: &SurfaceBindings,
            map: SurfaceMap,
        ) -> Result<&GpuTexture, GpuError> {
            if !sampled.contains(&map) {
                return Ok(&self.blank);
            }
            surfaces
                .get(map)
                .and_then(|id| self.textures.get(&id.0))
                .ok_or_else(|| {
                    GpuError::resource(
                        "material",
                        format!("surface map {map:?} is not bound to a live texture"),
                    )
                })
        }

        fn apply_viewport(&self, viewport: &Viewport) {
            self.canvas.set_width(viewport.physical_width);
            self.canvas.set_height(viewport.physical_height);
        }
    }

    fn uniform_entry(binding: u32, dynamic: bool) -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding,
            visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: ::wgpu::BindingType::Buffer {
                ty: ::wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn texture_entry(binding: u32) -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding,
            visibility: ::wgpu::ShaderStages::FRAGMENT,
            ty: ::wgpu::BindingType::Texture {
                sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: ::wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }
    }

    fn address_mode(mode: AddressMode) -> ::wgpu::AddressMode {
        match mode {
            AddressMode::Repeat => ::wgpu::AddressMode::Repeat,
            AddressMode::ClampToEdge => ::wgpu::AddressMode::ClampToEdge,
        }
    }

    fn create_texture(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        image: &TextureImage,
    ) -> Result<GpuTexture, GpuError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
            return Err(GpuError::resource(
                "texture",
                format!(
                    "{}x{} image with {} bytes",
                    image.width,
                    image.height,
                    image.pixels.len()
                ),
            ));
        }

        let levels = shading::mip_chain(image);
        let format = match image.color_space {
            ColorSpace::Srgb => ::wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => ::wgpu::TextureFormat::Rgba8Unorm,
        };
        let texture = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-surface-texture"),
            size: ::wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format,
            usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                ::wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: ::wgpu::Origin3d::ZERO,
                    aspect: ::wgpu::TextureAspect::All,
                },
                &level.pixels,
                ::wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width),
                    rows_per_image: Some(level.height),
                },
                ::wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("globe-surface-sampler"),
            address_mode_u: address_mode(image.sampling.wrap_u),
            address_mode_v: address_mode(image.sampling.wrap_v),
            address_mode_w: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            mipmap_filter: if image.sampling.mipmaps {
                ::wgpu::MipmapFilterMode::Linear
            } else {
                ::wgpu::MipmapFilterMode::Nearest
            },
            ..Default::default()
        });
        Ok(GpuTexture {
            texture,
            view,
            sampler,
        })
    }

    impl GraphicsBackend for WebGpuBackend {
        fn create_renderer(&mut self, options: &RendererOptions) -> Result<RendererId, GpuError> {
            if self.target.is_some() {
                return Err(GpuError::Context("a renderer is already attached".into()));
            }
            self.host
                .append_child(&self.canvas)
                .map_err(|e| GpuError::Host(format!("attach canvas: {e:?}")))?;

            let viewport = options.viewport;
            self.apply_viewport(&viewport);
            let premultiplied = ::wgpu::CompositeAlphaMode::PreMultiplied;
            let alpha_mode = if options.alpha && self.alpha_modes.contains(&premultiplied) {
                premultiplied
            } else {
                self.alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(::wgpu::CompositeAlphaMode::Auto)
            };
            let config = ::wgpu::SurfaceConfiguration {
                usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: self.format,
                width: viewport.physical_width,
                height: viewport.physical_height,
                desired_maximum_frame_latency: 2,
                present_mode: ::wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
            };
            self.surface.configure(&self.device, &config);

            let msaa_supported = self
                .adapter
                .get_texture_format_features(self.format)
                .flags
                .sample_count_supported(MSAA_SAMPLES);
            let sample_count = if options.antialias && msaa_supported {
                MSAA_SAMPLES
            } else {
                1
            };
            let (depth_view, msaa_view) = self.sized_views(&config, sample_count);

            let globals_buffer = self.device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("globe-globals"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let globals_bind_group = self.device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-globals-bind-group"),
                layout: &self.globals_layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });
            let (draw_buffer, draw_bind_group) = self.draw_buffer(INITIAL_DRAW_CAPACITY);

            let id = RendererId(self.handles.allocate());
            self.target = Some(Target {
                id,
                opaque: self.build_pipeline(sample_count, false),
                blended: self.build_pipeline(sample_count, true),
                config,
                sample_count,
                depth_view,
                msaa_view,
                globals_buffer,
                globals_bind_group,
                draw_buffer,
                draw_bind_group,
                draw_capacity: INITIAL_DRAW_CAPACITY,
                clear_alpha: if options.alpha { 0.0 } else { 1.0 },
            });
            tracing::debug!(
                width = viewport.physical_width,
                height = viewport.physical_height,
                sample_count,
                "renderer attached"
            );
            Ok(id)
        }

        fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryId, GpuError> {
            if mesh.indices.is_empty() || mesh.positions.is_empty() {
                return Err(GpuError::resource("geometry", "mesh has no triangles"));
            }
            let vertices = shading::vertices(mesh);
            let vertex_buffer = self
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("globe-vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: ::wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("globe-indices"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: ::wgpu::BufferUsages::INDEX,
                });
            let handle = self.handles.allocate();
            self.geometries.insert(
                handle,
                GpuGeometry {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                },
            );
            Ok(GeometryId(handle))
        }

        fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureId, GpuError> {
            let texture = create_texture(&self.device, &self.queue, image)?;
            let handle = self.handles.allocate();
            self.textures.insert(handle, texture);
            Ok(TextureId(handle))
        }

        fn create_material(
            &mut self,
            material: &Material,
            surfaces: &SurfaceBindings,
        ) -> Result<MaterialId, GpuError> {
            let sampled = material.surface_maps();
            let color = self.bound_texture(&sampled, surfaces, SurfaceMap::Color)?;
            let mask = self.bound_texture(&sampled, surfaces, SurfaceMap::Mask)?;
            let bump = self.bound_texture(&sampled, surfaces, SurfaceMap::Bump)?;
            let sampler = sampled
                .first()
                .and_then(|map| surfaces.get(*map))
                .and_then(|id| self.textures.get(&id.0))
                .map_or(&self.blank.sampler, |t| &t.sampler);

            let params: MaterialUniform = shading::material_uniform(material, self.linear_target());
            let uniform = self
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("globe-material-uniform"),
                    contents: bytemuck::bytes_of(&params),
                    usage: ::wgpu::BufferUsages::UNIFORM,
                });
            let bind_group = self.device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-material-bind-group"),
                layout: &self.material_layout,
                entries: &[
                    ::wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform.as_entire_binding(),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 1,
                        resource: ::wgpu::BindingResource::TextureView(&color.view),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 2,
                        resource: ::wgpu::BindingResource::TextureView(&mask.view),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 3,
                        resource: ::wgpu::BindingResource::TextureView(&bump.view),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 4,
                        resource: ::wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });
            let handle = self.handles.allocate();
            self.materials.insert(
                handle,
                GpuMaterial {
                    bind_group,
                    uniform,
                    transparent: material.is_transparent(),
                },
            );
            Ok(MaterialId(handle))
        }

        fn resize(&mut self, renderer: RendererId, viewport: Viewport) -> Result<(), GpuError> {
            self.target_mut(renderer)?;
            self.apply_viewport(&viewport);
            let Some(mut target) = self.target.take() else {
                return Err(GpuError::Render("renderer is not attached".into()));
            };
            target.config.width = viewport.physical_width;
            target.config.height = viewport.physical_height;
            self.surface.configure(&self.device, &target.config);
            let (depth_view, msaa_view) = self.sized_views(&target.config, target.sample_count);
            target.depth_view = depth_view;
            target.msaa_view = msaa_view;
            self.target = Some(target);
            Ok(())
        }

        fn render(&mut self, renderer: RendererId, frame: &RenderFrame) -> Result<(), GpuError> {
            self.target_mut(renderer)?;
            let linear = self.linear_target();

            let needed = frame.draws.len().max(1) as u64;
            let grow = self
                .target
                .as_ref()
                .is_some_and(|t| t.draw_capacity < needed);
            if grow {
                let capacity = needed.next_power_of_two();
                let (buffer, bind_group) = self.draw_buffer(capacity);
                let target = self.target_mut(renderer)?;
                target.draw_buffer = buffer;
                target.draw_bind_group = bind_group;
                target.draw_capacity = capacity;
            }

            let Some(target) = self.target.as_ref() else {
                return Err(GpuError::Render("renderer is not attached".into()));
            };

            let globals = shading::globals(frame, linear);
            self.queue
                .write_buffer(&target.globals_buffer, 0, bytemuck::bytes_of(&globals));

            let stride = DRAW_UNIFORM_STRIDE as usize;
            let mut draw_bytes = vec![0u8; frame.draws.len() * stride];
            for (i, draw) in frame.draws.iter().enumerate() {
                let uniform = DrawUniform { model: draw.model };
                let bytes = bytemuck::bytes_of(&uniform);
                draw_bytes[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
            }
            if !draw_bytes.is_empty() {
                self.queue.write_buffer(&target.draw_buffer, 0, &draw_bytes);
            }

            let surface_texture = self
                .surface
                .get_current_texture()
                .map_err(|e| GpuError::Render(format!("surface acquire failed: {e}")))?;
            let view = surface_texture
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());
            let (color_view, resolve_target) = match &target.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };

            let [r, g, b, _] = shading::clear_color(frame.clear, linear);
            let mut encoder = self
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("globe-frame-encoder"),
                });
            {
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("globe-frame-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: color_view,
                        resolve_target,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                                r,
                                g,
                                b,
                                a: target.clear_alpha,
                            }),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &target.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

                rpass.set_bind_group(0, &target.globals_bind_group, &[]);
                for (i, draw) in frame.draws.iter().enumerate() {
                    let (Some(geometry), Some(material)) = (
                        self.geometries.get(&draw.geometry.0),
                        self.materials.get(&draw.material.0),
                    ) else {
                        tracing::debug!(
                            geometry = ?draw.geometry,
                            material = ?draw.material,
                            "draw skipped, resource disposed"
                        );
                        continue;
                    };
                    let pipeline = if material.transparent {
                        &target.blended
                    } else {
                        &target.opaque
                    };
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(1, &material.bind_group, &[]);
                    let offset = (i * stride) as u32;
                    rpass.set_bind_group(2, &target.draw_bind_group, &[offset]);
                    rpass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                    rpass.set_index_buffer(geometry.index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..geometry.index_count, 0, 0..1);
                }
            }

            self.queue.submit(Some(encoder.finish()));
            surface_texture.present();
            Ok(())
        }

        fn dispose_geometry(&mut self, id: GeometryId) {
            if let Some(geometry) = self.geometries.remove(&id.0) {
                geometry.vertex_buffer.destroy();
                geometry.index_buffer.destroy();
                self.handles.release(id.0);
            }
        }

        fn dispose_texture(&mut self, id: TextureId) {
            if let Some(texture) = self.textures.remove(&id.0) {
                texture.texture.destroy();
                self.handles.release(id.0);
            }
        }

        fn dispose_material(&mut self, id: MaterialId) {
            if let Some(material) = self.materials.remove(&id.0) {
                material.uniform.destroy();
                self.handles.release(id.0);
            }
        }

        fn dispose_renderer(&mut self, id: RendererId) {
            let attached = self.target.as_ref().is_some_and(|t| t.id == id);
            if !attached {
                return;
            }
            if let Some(target) = self.target.take() {
                target.globals_buffer.destroy();
                target.draw_buffer.destroy();
            }
            self.canvas.remove();
            self.handles.release(id.0);
            tracing::debug!("renderer detached");
        }

        fn clear_host(&mut self) {
            self.host.set_inner_html("");
        }

        fn host_size(&self) -> Option<HostSize> {
            let (w, h) = (self.host.client_width(), self.host.client_height());
            Some(HostSize::new(w as f64, h as f64))
        }

        fn device_pixel_ratio(&self) -> f64 {
            web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::{
        GeometryId, GpuError, GraphicsBackend, MaterialId, RenderFrame, RendererId,
        RendererOptions, SurfaceBindings, TextureId, Viewport,
    };
    use runtime::HostSize;
    use scene::{Material, MeshData};
    use surface::TextureImage;

    fn unavailable() -> GpuError {
        GpuError::Context("wgpu rendering is only available on wasm32 targets".into())
    }

    /// Stand-in so the crate builds natively; every allocation fails.
    pub struct WebGpuBackend;

    impl WebGpuBackend {
        pub async fn create(_host: web_sys::HtmlElement) -> Result<Self, GpuError> {
            Err(unavailable())
        }
    }

    impl GraphicsBackend for WebGpuBackend {
        fn create_renderer(&mut self, _options: &RendererOptions) -> Result<RendererId, GpuError> {
            Err(unavailable())
        }

        fn upload_geometry(&mut self, _mesh: &MeshData) -> Result<GeometryId, GpuError> {
            Err(unavailable())
        }

        fn upload_texture(&mut self, _image: &TextureImage) -> Result<TextureId, GpuError> {
            Err(unavailable())
        }

        fn create_material(
            &mut self,
            _material: &Material,
            _surfaces: &SurfaceBindings,
        ) -> Result<MaterialId, GpuError> {
            Err(unavailable())
        }

        fn resize(&mut self, _renderer: RendererId, _viewport: Viewport) -> Result<(), GpuError> {
            Err(unavailable())
        }

        fn render(&mut self, _renderer: RendererId, _frame: &RenderFrame) -> Result<(), GpuError> {
            Err(unavailable())
        }

        fn dispose_geometry(&mut self, _id: GeometryId) {}
        fn dispose_texture(&mut self, _id: TextureId) {}
        fn dispose_material(&mut self, _id: MaterialId) {}
        fn dispose_renderer(&mut self, _id: RendererId) {}
        fn clear_host(&mut self) {}

        fn host_size(&self) -> Option<HostSize> {
            None
        }

        fn device_pixel_ratio(&self) -> f64 {
            1.0
        }
    }
}

pub use imp::WebGpuBackend;

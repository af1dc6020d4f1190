use std::cell::RefCell;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use glyphon::cosmic_text::{Align, Wrap};
use glyphon::{
    Buffer, Cache, Color, FontSystem, Metrics, Resolution, Shaping, SwashCache, TextArea,
    TextAtlas, TextBounds, TextRenderer, Viewport,
};
use textspot_core::{
    HighlightUniforms, MeshAnchor, MeshGeometry, MeshLayout, TextAlign, TextMesh, TextScene,
};
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;
use wgpu::util::DeviceExt;

use crate::fonts::FontLoader;

const TEXT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const TEXT_PADDING: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    pos: [f32; 2],
}

impl Vertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        }
    }
}

const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { pos: [-0.5, -0.5] },
    Vertex { pos: [0.5, -0.5] },
    Vertex { pos: [0.5, 0.5] },
    Vertex { pos: [-0.5, 0.5] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[repr(C, align(16))]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneGlobals {
    viewport_px: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C, align(16))]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadUniforms {
    position: [f32; 2],
    size: [f32; 2],
    anchor: [f32; 2],
    _pad: [f32; 2],
}

struct TextEngine {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    renderer: TextRenderer,
    viewport: Viewport,
}

struct MeshGpu {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    highlight_buffer: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,
    size_px: [u32; 2],
}

struct MeshState {
    text: String,
    layout: Option<MeshLayout>,
    position: [f32; 2],
    uniforms: HighlightUniforms,
    geometry: Option<MeshGeometry>,
    /// Texture padding around the text, in CSS px.
    padding: f32,
    dirty: bool,
    gpu: Option<MeshGpu>,
}

/// Handle to a text mesh owned by [`GpuScene`]. Clones refer to the same
/// mesh.
#[derive(Clone)]
pub(crate) struct GpuTextMesh {
    state: Rc<RefCell<MeshState>>,
    fonts: FontLoader,
}

impl GpuTextMesh {
    fn new(fonts: FontLoader) -> Self {
        Self {
            state: Rc::new(RefCell::new(MeshState {
                text: String::new(),
                layout: None,
                position: [0.0, 0.0],
                uniforms: HighlightUniforms::zeroed(),
                geometry: None,
                padding: 0.0,
                dirty: true,
                gpu: None,
            })),
            fonts,
        }
    }

    fn same_mesh(&self, other: &GpuTextMesh) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl TextMesh for GpuTextMesh {
    fn set_text(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        if state.text != text {
            state.text = text.to_string();
            state.dirty = true;
        }
    }

    fn apply_layout(&mut self, layout: &MeshLayout) {
        self.fonts.request(&layout.font_path);
        let mut state = self.state.borrow_mut();
        if state.layout.as_ref() != Some(layout) {
            state.layout = Some(layout.clone());
            state.dirty = true;
        }
    }

    fn set_position(&mut self, position: [f32; 2]) {
        self.state.borrow_mut().position = position;
    }

    fn set_uniforms(&mut self, uniforms: &HighlightUniforms) {
        self.state.borrow_mut().uniforms = *uniforms;
    }

    fn geometry(&self) -> Option<MeshGeometry> {
        self.state.borrow().geometry
    }
}

/// The shared scene every text element draws into: one canvas, one pipeline
/// and one glyph engine.
///
/// Scene space is centred on the viewport with y up and one unit per CSS
/// pixel. Each mesh is rasterized into its own texture when its text or
/// layout changes and drawn as a single quad lit by `text_highlight.wgsl`.
pub(crate) struct GpuScene {
    canvas: HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    mesh_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    text: TextEngine,
    fonts: FontLoader,
    meshes: Vec<GpuTextMesh>,
    viewport_css: [f32; 2],
    render_scale: f32,
    max_texture_dim: u32,
}

impl GpuScene {
    pub(crate) async fn new(
        canvas: HtmlCanvasElement,
        fonts: FontLoader,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Result<Self, JsValue> {
        let css_width = viewport_width.max(1.0);
        let css_height = viewport_height.max(1.0);
        let render_scale = device_pixel_ratio();
        let canvas_width = (css_width * render_scale).max(1.0).ceil() as u32;
        let canvas_height = (css_height * render_scale).max(1.0).ceil() as u32;
        canvas.set_width(canvas_width);
        canvas.set_height(canvas_height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|err| JsValue::from_str(&format!("create_surface failed: {err:?}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| JsValue::from_str(&format!("request_adapter failed: {err:?}")))?;
        log::debug!("gpu backend: {:?}", adapter.get_info().backend);
        let limits = wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());
        let max_texture_dim = limits.max_texture_dimension_2d;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("textspot-device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                ..Default::default()
            })
            .await
            .map_err(|err| JsValue::from_str(&format!("request_device failed: {err:?}")))?;

        let mut config = surface
            .get_default_config(&adapter, canvas_width, canvas_height)
            .ok_or_else(|| JsValue::from_str("surface config failed"))?;
        let caps = surface.get_capabilities(&adapter);
        if caps
            .alpha_modes
            .iter()
            .any(|mode| *mode == wgpu::CompositeAlphaMode::PreMultiplied)
        {
            config.alpha_mode = wgpu::CompositeAlphaMode::PreMultiplied;
        }
        surface.configure(&device, &config);

        let globals = SceneGlobals {
            viewport_px: [css_width, css_height],
            _pad: [0.0, 0.0],
        };
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene-globals"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene-globals-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: uniform_binding(),
                    count: None,
                }],
            });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-globals-bind-group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let mesh_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("text-mesh-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: uniform_binding(),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: uniform_binding(),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("text-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("text-highlight-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("text_highlight.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text-highlight-pipeline-layout"),
            bind_group_layouts: &[&globals_bind_group_layout, &mesh_bind_group_layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("text-highlight-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad-vertex-buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad-index-buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(&device);
        let mut atlas = TextAtlas::new(&device, &queue, &cache, TEXT_FORMAT);
        let viewport = Viewport::new(&device, &cache);
        let renderer =
            TextRenderer::new(&mut atlas, &device, wgpu::MultisampleState::default(), None);

        Ok(Self {
            canvas,
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            globals_bind_group,
            mesh_bind_group_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            text: TextEngine {
                font_system,
                swash_cache,
                atlas,
                renderer,
                viewport,
            },
            fonts,
            meshes: Vec::new(),
            viewport_css: [css_width, css_height],
            render_scale,
            max_texture_dim,
        })
    }

    /// Matches the drawing buffer to a new CSS viewport size.
    pub(crate) fn resize(&mut self, viewport_width: f32, viewport_height: f32) {
        let css_width = viewport_width.max(1.0);
        let css_height = viewport_height.max(1.0);
        let render_scale = device_pixel_ratio();
        if (render_scale - self.render_scale).abs() > f32::EPSILON {
            self.render_scale = render_scale;
            for mesh in &self.meshes {
                mesh.state.borrow_mut().dirty = true;
            }
        }
        self.viewport_css = [css_width, css_height];
        let width = (css_width * render_scale).max(1.0).ceil() as u32;
        let height = (css_height * render_scale).max(1.0).ceil() as u32;
        if self.config.width != width || self.config.height != height {
            self.config.width = width;
            self.config.height = height;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.surface.configure(&self.device, &self.config);
        }
        let globals = SceneGlobals {
            viewport_px: self.viewport_css,
            _pad: [0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    pub(crate) fn render(&mut self) {
        self.fonts.install(&mut self.text.font_system);
        let meshes = self.meshes.clone();
        for mesh in &meshes {
            let mut state = mesh.state.borrow_mut();
            if state.dirty {
                self.rasterize(&mut state);
            }
            self.write_mesh_uniforms(&state);
        }
        self.text.atlas.trim();

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(_) => return,
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("text-scene-encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("text-scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            let states: Vec<_> = meshes.iter().map(|mesh| mesh.state.borrow()).collect();
            for state in &states {
                let (Some(gpu), Some(_)) = (state.gpu.as_ref(), state.geometry) else {
                    continue;
                };
                render_pass.set_bind_group(1, &gpu.bind_group, &[]);
                render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }

    fn rasterize(&mut self, state: &mut MeshState) {
        let Some(layout) = state.layout.clone() else {
            return;
        };
        let Some(face) = self.fonts.face(&layout.font_path) else {
            if self.fonts.is_unavailable(&layout.font_path) {
                log::warn!("no font available for {}; mesh stays empty", layout.font_path);
                state.dirty = false;
            }
            return;
        };

        let scale = self.render_scale;
        let font_px = (layout.font_size * scale).max(1.0);
        let line_px = (layout.line_height_px() * scale).max(font_px * 0.5);
        let pad_px = (TEXT_PADDING * scale).ceil();
        let font_system = &mut self.text.font_system;
        let mut buffer = Buffer::new(font_system, Metrics::new(font_px, line_px));
        let wrap_width = (layout.white_space.wraps() && layout.max_width > 0.0)
            .then(|| layout.max_width * scale);
        buffer.set_wrap(
            font_system,
            if wrap_width.is_some() {
                Wrap::WordOrGlyph
            } else {
                Wrap::None
            },
        );
        buffer.set_size(font_system, wrap_width, None);
        let text = layout.white_space.collapse(&state.text);
        let attrs = face.attrs().letter_spacing(layout.letter_spacing);
        let align = text_align(layout.text_align);
        buffer.set_text(font_system, &text, &attrs, Shaping::Advanced, Some(align));
        buffer.shape_until_scroll(font_system, false);

        let (text_w, text_h) = measure_text_bounds(&buffer);
        let content_w = wrap_width.unwrap_or(text_w).max(text_w);
        // Width fixed, so alignment applies inside the texture.
        buffer.set_size(font_system, Some(content_w), None);
        buffer.shape_until_scroll(font_system, false);

        let limit = self.max_texture_dim.max(1);
        let tex_w = ((content_w + pad_px * 2.0).ceil().max(1.0) as u32).min(limit);
        let tex_h = ((text_h.max(line_px) + pad_px * 2.0).ceil().max(1.0) as u32).min(limit);

        let needs_new_gpu = state
            .gpu
            .as_ref()
            .map(|gpu| gpu.size_px != [tex_w, tex_h])
            .unwrap_or(true);
        if needs_new_gpu {
            state.gpu = Some(self.create_mesh_gpu(tex_w, tex_h));
        }
        let Some(gpu) = state.gpu.as_ref() else {
            return;
        };

        self.text.viewport.update(
            &self.queue,
            Resolution {
                width: tex_w,
                height: tex_h,
            },
        );
        let text_area = TextArea {
            buffer: &buffer,
            left: pad_px,
            top: pad_px,
            scale: 1.0,
            bounds: TextBounds {
                left: 0,
                top: 0,
                right: tex_w as i32,
                bottom: tex_h as i32,
            },
            default_color: Color::rgba(255, 255, 255, 255),
            custom_glyphs: &[],
        };
        if let Err(err) = self.text.renderer.prepare(
            &self.device,
            &self.queue,
            &mut self.text.font_system,
            &mut self.text.atlas,
            &self.text.viewport,
            [text_area],
            &mut self.text.swash_cache,
        ) {
            log::warn!("text prepare failed: {err:?}");
            return;
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("text-raster-encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("text-raster-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            if let Err(err) =
                self.text
                    .renderer
                    .render(&self.text.atlas, &self.text.viewport, &mut render_pass)
            {
                log::warn!("text render failed: {err:?}");
            }
        }
        self.queue.submit(Some(encoder.finish()));

        state.geometry = Some(MeshGeometry {
            width: tex_w as f32 / scale,
            height: tex_h as f32 / scale,
        });
        state.padding = pad_px / scale;
        state.dirty = false;
    }

    fn create_mesh_gpu(&self, width: u32, height: u32) -> MeshGpu {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("text-mesh-texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let highlight_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("text-highlight-uniforms"),
            contents: bytemuck::bytes_of(&HighlightUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let quad_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("text-quad-uniforms"),
            contents: bytemuck::bytes_of(&QuadUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("text-mesh-bind-group"),
            layout: &self.mesh_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: highlight_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: quad_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        MeshGpu {
            texture,
            view,
            bind_group,
            highlight_buffer,
            quad_buffer,
            size_px: [width, height],
        }
    }

    fn write_mesh_uniforms(&self, state: &MeshState) {
        let (Some(gpu), Some(geometry)) = (state.gpu.as_ref(), state.geometry) else {
            return;
        };
        let anchor = state
            .layout
            .as_ref()
            .map(|layout| layout.anchor)
            .unwrap_or(MeshAnchor { x: 0.0, y: 0.5 });
        let quad = QuadUniforms {
            position: anchor.padded_position(state.position, state.padding),
            size: [geometry.width, geometry.height],
            anchor: [anchor.x, anchor.y],
            _pad: [0.0, 0.0],
        };
        self.queue
            .write_buffer(&gpu.quad_buffer, 0, bytemuck::bytes_of(&quad));
        self.queue
            .write_buffer(&gpu.highlight_buffer, 0, bytemuck::bytes_of(&state.uniforms));
    }
}

impl TextScene for GpuScene {
    type Mesh = GpuTextMesh;

    fn create_mesh(&mut self) -> GpuTextMesh {
        GpuTextMesh::new(self.fonts.clone())
    }

    fn add(&mut self, mesh: &GpuTextMesh) {
        if self.meshes.iter().any(|existing| existing.same_mesh(mesh)) {
            return;
        }
        self.meshes.push(mesh.clone());
    }

    fn remove(&mut self, mesh: &GpuTextMesh) {
        self.meshes.retain(|existing| !existing.same_mesh(mesh));
        let mut state = mesh.state.borrow_mut();
        if let Some(gpu) = state.gpu.take() {
            gpu.texture.destroy();
        }
        state.geometry = None;
    }
}

fn uniform_binding() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

fn device_pixel_ratio() -> f32 {
    web_sys::window()
        .map(|window| window.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0) as f32
}

fn text_align(align: TextAlign) -> Align {
    match align {
        TextAlign::Left => Align::Left,
        TextAlign::Center => Align::Center,
        TextAlign::Right => Align::Right,
        TextAlign::Justify => Align::Justified,
    }
}

fn measure_text_bounds(buffer: &Buffer) -> (f32, f32) {
    let mut max_width = 0.0;
    let mut max_height = 0.0;
    for run in buffer.layout_runs() {
        if run.line_w > max_width {
            max_width = run.line_w;
        }
        let bottom = run.line_top + run.line_height;
        if bottom > max_height {
            max_height = bottom;
        }
    }
    (max_width, max_height)
}

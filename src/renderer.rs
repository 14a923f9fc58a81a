use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::mesh::{Mesh, ShadingType};
use crate::point_cloud::PointCloud;
use crate::texture::{TextureImage, TextureType};
use crate::transform::normal_matrix;
use crate::types::{FrameUniform, MeshVertex, ObjectUniform, PointVertex};
use crate::viewer::Viewer;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Stand-in for a texture slot with nothing bound
const BLANK_TEXTURE_GREY: f32 = 0.7;
const AXIS_LENGTH: f32 = 1.0;

/// GPU buffers of an uploaded mesh
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    object: ObjectBinding,
    material: wgpu::BindGroup,
}

/// GPU buffers of an uploaded point cloud
pub struct GpuPointCloud {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    object: ObjectBinding,
}

/// Per-object uniform buffer and its bind group (group 1)
struct ObjectBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    shading: ShadingType,
    cull: bool,
    wireframe: bool,
}

/// Rasterizer for meshes, point clouds, axes and the egui overlay
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_view: wgpu::TextureView,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    blank_view: wgpu::TextureView,

    mesh_pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    wireframe_supported: bool,
    warned_wireframe: bool,

    axes: PointCloud,

    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let wireframe_supported = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let (device, queue) = Self::request_device(&adapter, wireframe_supported).await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &surface_config);
        let depth_view = Self::create_depth_view(&device, size);

        let info = adapter.get_info();
        log::info!("Using {} ({:?})", info.name, info.backend);
        if !wireframe_supported {
            log::warn!("Adapter lacks POLYGON_MODE_LINE, wireframe mode is unavailable");
        }

        let frame_layout = Self::uniform_layout(&device, "frame_bind_group_layout");
        let object_layout = Self::uniform_layout(&device, "object_bind_group_layout");
        let material_layout = Self::create_material_layout(&device);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let blank_view = Self::create_texture_view(
            &device,
            &queue,
            &TextureImage::solid(Vec3::splat(BLANK_TEXTURE_GREY)),
            "Blank Texture",
        );

        let format = surface_config.format;
        let mesh_pipelines = Self::create_mesh_pipelines(
            &device,
            &[&frame_layout, &object_layout, &material_layout],
            format,
            wireframe_supported,
        );
        let (point_pipeline, line_pipeline) =
            Self::create_point_pipelines(&device, &[&frame_layout, &object_layout], format);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&device, format, egui_wgpu::RendererOptions::default());

        let mut renderer = Self {
            device,
            queue,
            surface,
            surface_config,
            size,
            depth_view,
            frame_buffer,
            frame_bind_group,
            object_layout,
            material_layout,
            sampler,
            blank_view,
            mesh_pipelines,
            point_pipeline,
            line_pipeline,
            wireframe_supported,
            warned_wireframe: false,
            axes: axes_lines(),
            egui_renderer,
            egui_state,
            egui_ctx,
        };
        let mut axes = std::mem::replace(&mut renderer.axes, PointCloud::new(0));
        renderer.upload_point_cloud(&mut axes);
        renderer.axes = axes;

        log::info!("Renderer initialized: {}x{} {:?}", size.width, size.height, format);
        Ok(renderer)
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
        wireframe: bool,
    ) -> Result<(wgpu::Device, wgpu::Queue)> {
        let required_features = if wireframe {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    /// Non-sRGB formats are preferred so colours reach the screen unchanged
    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8Unorm);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(
        device: &wgpu::Device,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_texture_view(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        label: &str,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some(label),
        })
    }

    fn create_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                // Binding 0: diffuse map
                texture_entry(0),
                // Binding 1: specular map
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("material_bind_group_layout"),
        })
    }

    fn depth_stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// One pipeline per shading type, culling and fill mode
    fn create_mesh_pipelines(
        device: &wgpu::Device,
        layouts: &[&wgpu::BindGroupLayout; 3],
        format: wgpu::TextureFormat,
        wireframe_supported: bool,
    ) -> HashMap<PipelineKey, wgpu::RenderPipeline> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let vertex_color_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Vertex Color Pipeline Layout"),
            bind_group_layouts: &layouts[..2],
            push_constant_ranges: &[],
        });
        let texture_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Texture Pipeline Layout"),
            bind_group_layouts: &layouts[..],
            push_constant_ranges: &[],
        });

        let fill_modes: &[bool] = if wireframe_supported { &[false, true] } else { &[false] };
        let mut pipelines = HashMap::new();
        for shading in [ShadingType::Vertex, ShadingType::Texture] {
            let (layout, fs_entry) = match shading {
                ShadingType::Vertex => (&vertex_color_layout, "fs_vertex_color"),
                ShadingType::Texture => (&texture_layout, "fs_texture"),
            };
            for cull in [true, false] {
                for &wireframe in fill_modes {
                    let key = PipelineKey { shading, cull, wireframe };
                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Mesh Pipeline"),
                        layout: Some(layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[MeshVertex::layout()],
                            compilation_options: Default::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &shader,
                            entry_point: Some(fs_entry),
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: Default::default(),
                        }),
                        primitive: wgpu::PrimitiveState {
                            topology: wgpu::PrimitiveTopology::TriangleList,
                            strip_index_format: None,
                            front_face: wgpu::FrontFace::Ccw,
                            cull_mode: cull.then_some(wgpu::Face::Back),
                            polygon_mode: if wireframe {
                                wgpu::PolygonMode::Line
                            } else {
                                wgpu::PolygonMode::Fill
                            },
                            unclipped_depth: false,
                            conservative: false,
                        },
                        depth_stencil: Some(Self::depth_stencil_state()),
                        multisample: wgpu::MultisampleState::default(),
                        multiview: None,
                        cache: None,
                    });
                    pipelines.insert(key, pipeline);
                }
            }
        }
        pipelines
    }

    /// Point (instanced quad) and line pipelines
    fn create_point_pipelines(
        device: &wgpu::Device,
        layouts: &[&wgpu::BindGroupLayout; 2],
        format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, wgpu::RenderPipeline) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &layouts[..],
            push_constant_ranges: &[],
        });

        let build = |label: &str, vs_entry: &str, step_mode, topology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs_entry),
                    buffers: &[PointVertex::layout(step_mode)],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    ..Default::default()
                },
                depth_stencil: Some(Self::depth_stencil_state()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let points = build(
            "Point Pipeline",
            "vs_point",
            wgpu::VertexStepMode::Instance,
            wgpu::PrimitiveTopology::TriangleList,
        );
        let lines = build(
            "Line Pipeline",
            "vs_line",
            wgpu::VertexStepMode::Vertex,
            wgpu::PrimitiveTopology::LineList,
        );
        (points, lines)
    }

    fn create_object_binding(&self, uniform: &ObjectUniform) -> ObjectBinding {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("object_bind_group"),
        });
        ObjectBinding { buffer, bind_group }
    }

    fn create_material(&self, mesh: &Mesh) -> wgpu::BindGroup {
        let max_dim = self.device.limits().max_texture_dimension_2d;
        let views: Vec<Option<wgpu::TextureView>> = TextureType::ALL
            .iter()
            .map(|&ty| {
                let image = mesh.active_texture(ty)?.decode();
                if image.width == 0 || image.height == 0 {
                    return None;
                }
                let fitted = image.fit_within(max_dim);
                let image = fitted.as_ref().unwrap_or(image);
                Some(Self::create_texture_view(&self.device, &self.queue, image, ty.name()))
            })
            .collect();
        let view = |i: usize| views[i].as_ref().unwrap_or(&self.blank_view);

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view(0)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view(1)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("material_bind_group"),
        })
    }

    /// Rebuild GPU buffers from the mesh's current data
    pub(crate) fn upload_mesh(&self, mesh: &mut Mesh) {
        mesh.dirty = false;
        mesh.refresh_normals();
        let (vertices, indices) = match mesh.vertex_data() {
            Ok(data) => data,
            Err(e) => {
                log::error!("Skipping mesh upload: {}", e);
                mesh.gpu = None;
                return;
            }
        };
        if vertices.is_empty() || indices.is_empty() {
            mesh.gpu = None;
            return;
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let object = self.create_object_binding(&object_uniform(&mesh.transform, mesh.shininess, 1.0));
        // Geometry edits keep the existing textures on the GPU
        let material = match mesh.gpu.take() {
            Some(old) if !mesh.material_dirty => old.material,
            _ => self.create_material(mesh),
        };
        mesh.material_dirty = false;

        log::debug!("Uploaded mesh: {} vertices, {} indices", vertices.len(), indices.len());
        mesh.gpu = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            object,
            material,
        });
    }

    pub(crate) fn upload_point_cloud(&self, cloud: &mut PointCloud) {
        cloud.dirty = false;
        let vertices = cloud.vertex_data();
        if vertices.is_empty() {
            cloud.gpu = None;
            return;
        }
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let object = self.create_object_binding(&object_uniform(&cloud.transform, 0.0, cloud.point_size));
        cloud.gpu = Some(GpuPointCloud {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            object,
        });
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth_view = Self::create_depth_view(&self.device, new_size);
        }
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    /// Pass a window event to egui; the response says whether it was consumed
    pub fn handle_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Draw one frame. Returns true when egui asks for another frame right away.
    pub fn render(
        &mut self,
        viewer: &mut Viewer,
        window: &Window,
    ) -> std::result::Result<bool, wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // GUI callbacks run before uploads so their edits land this frame
        let raw_input = self.egui_state.take_egui_input(window);
        let mut gui_changed = false;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            gui_changed |= viewer.run_gui(ctx);
        });
        if gui_changed {
            viewer.mark_all_dirty();
        }
        let repaint = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());
        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        for mesh in viewer.meshes.iter_mut().filter(|m| m.needs_upload()) {
            self.upload_mesh(mesh);
        }
        for cloud in viewer.point_clouds.iter_mut().filter(|c| c.needs_upload()) {
            self.upload_point_cloud(cloud);
        }

        let frame_uniform =
            viewer
                .camera
                .to_uniform(&viewer.lighting(), self.size.width, self.size.height);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame_uniform]));
        for mesh in viewer.meshes.iter().filter(|m| m.enabled) {
            if let Some(gpu) = &mesh.gpu {
                let uniform = object_uniform(&mesh.transform, mesh.shininess, 1.0);
                self.queue
                    .write_buffer(&gpu.object.buffer, 0, bytemuck::cast_slice(&[uniform]));
            }
        }
        for cloud in viewer.point_clouds.iter().filter(|c| c.enabled) {
            if let Some(gpu) = &cloud.gpu {
                let uniform = object_uniform(&cloud.transform, 0.0, cloud.point_size);
                self.queue
                    .write_buffer(&gpu.object.buffer, 0, bytemuck::cast_slice(&[uniform]));
            }
        }

        let wireframe = viewer.wireframe && self.wireframe_supported;
        if viewer.wireframe && !self.wireframe_supported && !self.warned_wireframe {
            log::warn!("Wireframe requested but not supported by this adapter");
            self.warned_wireframe = true;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        // Scene pass
        {
            let bg = viewer.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.x as f64,
                            g: bg.y as f64,
                            b: bg.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            if viewer.draw_axes {
                self.draw_point_cloud(&mut render_pass, &self.axes);
            }

            for mesh in viewer.meshes.iter().filter(|m| m.enabled) {
                let Some(gpu) = &mesh.gpu else { continue };
                let key = PipelineKey {
                    shading: mesh.shading_type,
                    cull: viewer.cull_face,
                    wireframe,
                };
                let Some(pipeline) = self.mesh_pipelines.get(&key) else { continue };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &gpu.object.bind_group, &[]);
                if mesh.shading_type == ShadingType::Texture {
                    render_pass.set_bind_group(2, &gpu.material, &[]);
                }
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }

            for cloud in viewer.point_clouds.iter().filter(|c| c.enabled) {
                self.draw_point_cloud(&mut render_pass, cloud);
            }
        }

        // egui pass - UI overlay
        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        let egui_commands = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(
            egui_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();
        Ok(repaint)
    }

    fn draw_point_cloud(&self, render_pass: &mut wgpu::RenderPass<'_>, cloud: &PointCloud) {
        let Some(gpu) = &cloud.gpu else { return };
        render_pass.set_bind_group(1, &gpu.object.bind_group, &[]);
        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        if cloud.lines {
            render_pass.set_pipeline(&self.line_pipeline);
            // Odd trailing vertex has no partner
            render_pass.draw(0..gpu.vertex_count & !1, 0..1);
        } else {
            render_pass.set_pipeline(&self.point_pipeline);
            render_pass.draw(0..6, 0..gpu.vertex_count);
        }
    }
}

fn object_uniform(model: &Mat4, shininess: f32, point_size: f32) -> ObjectUniform {
    ObjectUniform {
        model: model.to_cols_array_2d(),
        normal_matrix: normal_matrix(model).to_cols_array_2d(),
        material: [shininess, point_size, 0.0, 0.0],
    }
}

/// X, Y and Z axes as red, green and blue line segments from the origin
pub(crate) fn axes_lines() -> PointCloud {
    let mut axes = PointCloud::new(6);
    let ends = [Vec3::X, Vec3::Y, Vec3::Z];
    for (i, end) in ends.into_iter().enumerate() {
        axes.verts_pos_mut()[2 * i + 1] = end * AXIS_LENGTH;
        axes.verts_rgb_mut()[2 * i] = end;
        axes.verts_rgb_mut()[2 * i + 1] = end;
    }
    axes.draw_lines(true);
    axes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_are_three_colored_segments() {
        let axes = axes_lines();
        assert!(axes.lines);
        assert_eq!(axes.n_verts(), 6);
        assert_eq!(axes.verts_pos()[3], Vec3::Y * AXIS_LENGTH);
        assert_eq!(axes.verts_rgb()[4], Vec3::Z);
        assert_eq!(axes.verts_pos()[4], Vec3::ZERO);
    }

    #[test]
    fn test_object_uniform_packs_material() {
        let uniform = object_uniform(&Mat4::from_scale(Vec3::splat(2.0)), 32.0, 4.0);
        assert_eq!(uniform.material, [32.0, 4.0, 0.0, 0.0]);
        assert!((uniform.normal_matrix[0][0] - 0.5).abs() < 1e-6);
    }
}

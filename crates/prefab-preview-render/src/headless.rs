//! Headless wgpu renderer.
//!
//! Renders into pooled offscreen textures and reads the result back to the
//! CPU. No window or surface is involved.

use std::collections::HashMap;
use std::num::NonZeroU64;

use glam::{Vec3, Vec4};
use prefab_preview_core::Scene;
use wgpu::util::DeviceExt;

use crate::camera::PreviewCamera;
use crate::error::{RenderError, RenderResult};
use crate::pixels::PixelBuffer;
use crate::renderer::{visible_renderers, DrawItem, OffscreenRenderer};
use crate::target::{TargetDescriptor, TargetId, TargetPool};

/// Color format of every preview target.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Camera uniforms for the preview mesh shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_dir: [f32; 4],
}

impl CameraUniforms {
    fn from_camera(camera: &PreviewCamera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light_dir: camera.forward.extend(0.0).to_array(),
        }
    }
}

/// World-space vertex with a flat normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 4],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Maps requested depth precision to a texture format.
#[must_use]
pub fn depth_format(depth_bits: u32) -> Option<wgpu::TextureFormat> {
    match depth_bits {
        0 => None,
        1..=16 => Some(wgpu::TextureFormat::Depth16Unorm),
        32 => Some(wgpu::TextureFormat::Depth32Float),
        _ => Some(wgpu::TextureFormat::Depth24Plus),
    }
}

/// Bytes per row of an RGBA8 readback, padded to the copy alignment.
fn aligned_bytes_per_row(width: u32) -> u32 {
    let bytes_per_pixel = 4u32; // RGBA8
    let unaligned = width * bytes_per_pixel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Appends the triangles of one draw item, transformed to world space.
fn push_item_vertices(item: &DrawItem<'_>, out: &mut Vec<MeshVertex>) {
    let mesh = &item.renderer.mesh;
    let world: Vec<Vec3> = mesh
        .positions
        .iter()
        .map(|p| item.local_to_world.transform_point3(*p))
        .collect();
    let color: Vec4 = item.renderer.color;

    for tri in &mesh.triangles {
        let corner = |i: u32| world.get(i as usize).copied();
        let (Some(a), Some(b), Some(c)) = (corner(tri[0]), corner(tri[1]), corner(tri[2])) else {
            continue;
        };
        let normal = (b - a).cross(c - a).normalize_or_zero();
        for p in [a, b, c] {
            out.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
                color: color.to_array(),
            });
        }
    }
}

/// GPU resources of one pooled target.
#[derive(Debug)]
struct GpuTarget {
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: Option<wgpu::TextureView>,
    depth_format: Option<wgpu::TextureFormat>,
    readback_buffer: wgpu::Buffer,
    bytes_per_row: u32,
}

impl GpuTarget {
    fn new(device: &wgpu::Device, desc: &TargetDescriptor) -> Self {
        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("preview color target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_format = depth_format(desc.depth_bits);
        let depth_view = depth_format.map(|format| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("preview depth target"),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        let bytes_per_row = aligned_bytes_per_row(desc.width);
        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("preview readback buffer"),
            size: u64::from(bytes_per_row) * u64::from(desc.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            color_texture,
            color_view,
            depth_view,
            depth_format,
            readback_buffer,
            bytes_per_row,
        }
    }
}

/// Offscreen renderer backed by a wgpu device.
pub struct HeadlessRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    /// Mesh pipelines keyed by depth format.
    pipelines: HashMap<Option<wgpu::TextureFormat>, wgpu::RenderPipeline>,
    targets: TargetPool<GpuTarget>,
}

impl HeadlessRenderer {
    /// Creates a renderer on the best available adapter.
    pub async fn new() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "preview renderer using {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prefab preview device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        Ok(Self::from_device(device, queue, adapter_info))
    }

    /// Creates a renderer on an existing device.
    #[must_use]
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, adapter_info: wgpu::AdapterInfo) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("preview mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/preview_mesh.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("preview camera bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(96),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("preview mesh pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("preview camera uniforms"),
            contents: bytemuck::cast_slice(&[CameraUniforms::from_camera(&PreviewCamera::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("preview camera bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Self {
            device,
            queue,
            adapter_info,
            shader,
            pipeline_layout,
            camera_buffer,
            camera_bind_group,
            pipelines: HashMap::new(),
            targets: TargetPool::new(),
        }
    }

    /// Information about the adapter in use.
    #[must_use]
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Number of released targets kept for reuse.
    #[must_use]
    pub fn pooled_targets(&self) -> usize {
        self.targets.pooled()
    }

    fn create_mesh_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("preview mesh pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

impl OffscreenRenderer for HeadlessRenderer {
    fn acquire_target(&mut self, desc: &TargetDescriptor) -> RenderResult<TargetId> {
        let device = &self.device;
        self.targets.acquire(desc, |d| Ok(GpuTarget::new(device, d)))
    }

    fn render(&mut self, target: TargetId, scene: &Scene, camera: &PreviewCamera) -> RenderResult<()> {
        let (_, gpu_target) = self.targets.get(target)?;

        let mut vertices = Vec::new();
        for item in visible_renderers(scene, camera) {
            push_item_vertices(&item, &mut vertices);
        }
        log::trace!("preview draw: {} triangles", vertices.len() / 3);

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniforms::from_camera(camera)]),
        );

        let pipeline = self
            .pipelines
            .entry(gpu_target.depth_format)
            .or_insert_with(|| {
                Self::create_mesh_pipeline(
                    &self.device,
                    &self.pipeline_layout,
                    &self.shader,
                    gpu_target.depth_format,
                )
            });

        let vertex_buffer = (!vertices.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("preview vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("preview render encoder"),
            });

        {
            let bg = camera.background_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("preview render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu_target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(bg.x),
                            g: f64::from(bg.y),
                            b: f64::from(bg.z),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: gpu_target.depth_view.as_ref().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                ..Default::default()
            });

            if let Some(buffer) = &vertex_buffer {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                #[allow(clippy::cast_possible_truncation)]
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn read_pixels(&mut self, target: TargetId) -> RenderResult<PixelBuffer> {
        let (desc, gpu_target) = self.targets.get(target)?;
        let (width, height) = (desc.width, desc.height);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("preview readback encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu_target.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &gpu_target.readback_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(gpu_target.bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = gpu_target.readback_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        // Copy data, removing row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = (width * 4) as usize;
        let mut result = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height {
            let start = (row * gpu_target.bytes_per_row) as usize;
            result.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        gpu_target.readback_buffer.unmap();

        PixelBuffer::new(width, height, result)
    }

    fn release_target(&mut self, target: TargetId) {
        if !self.targets.release(target) {
            log::debug!("release of unknown render target {}", target.raw());
        }
    }

    fn targets_in_use(&self) -> usize {
        self.targets.in_use()
    }
}

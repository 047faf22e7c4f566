//! wgpu render engine
//!
//! One frame is a single render pass over the editor state:
//! lit meshes (floor, walls, placed objects), depth tested line lists (grid
//! and skirting), then the selection outline and gizmo handles drawn on top
//! of everything. The UI is rendered by a callback into the same target.

use std::sync::Arc;

use anyhow::Context;
use wgpu::{CompareFunction, Device, TextureFormat};

use crate::editor::Editor;
use crate::gfx::{
    resources::{update_global_ubo, GlobalBindings, GlobalUBO, LightRig, TextureResource},
    scene::{
        object::DrawMesh,
        room::BACKGROUND_COLOR,
        vertex::{hex_color, LineVertex},
    },
};
use crate::wgpu_utils::{UniformBuffer, VertexArrayBuffer};

use super::pipeline_manager::{PipelineConfig, PipelineManager, VertexKind};

const MESH_PIPELINE: &str = "Mesh";
const LINE_PIPELINE: &str = "Lines";
const OVERLAY_PIPELINE: &str = "Overlay";

/// Layout of the per-mesh uniform block (group 1 of the mesh pipeline)
pub fn mesh_bind_group_layout(device: &Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Mesh Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn clear_color() -> wgpu::Color {
    let [r, g, b] = hex_color(BACKGROUND_COLOR);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Surface, device and pipelines, plus GPU copies of the editor's line lists
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    mesh_layout: wgpu::BindGroupLayout,
    light_rig: LightRig,
    grid_lines: VertexArrayBuffer<LineVertex>,
    skirting_lines: VertexArrayBuffer<LineVertex>,
    overlay_lines: VertexArrayBuffer<LineVertex>,
    room_revision: Option<u64>,
}

impl RenderEngine {
    /// Creates the surface, device and pipelines for `window`
    ///
    /// # Arguments
    /// * `window` - Surface target, usually an `Arc<Window>`
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `vsync` - Selects `AutoVsync` over `AutoNoVsync`
    ///
    /// # Returns
    /// The engine, or an error if no adapter or device is available
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no texture formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = UniformBuffer::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let mesh_layout = mesh_bind_group_layout(&device);

        let grid_lines = VertexArrayBuffer::new(&device, 256);
        let skirting_lines = VertexArrayBuffer::new(&device, 16);
        let overlay_lines = VertexArrayBuffer::new(&device, 256);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("mesh", include_str!("mesh.wgsl"));
        pipeline_manager.load_shader("lines", include_str!("lines.wgsl"));

        pipeline_manager.register_pipeline(
            MESH_PIPELINE,
            PipelineConfig::default()
                .with_label("MESH")
                .with_shader("mesh")
                .with_color_format(format, Some(wgpu::BlendState::REPLACE))
                .with_depth(TextureResource::DEPTH_FORMAT, true, CompareFunction::Less)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    mesh_layout.clone(),
                ]),
        );

        pipeline_manager.register_pipeline(
            LINE_PIPELINE,
            PipelineConfig::default()
                .with_label("LINES")
                .with_shader("lines")
                .with_vertex_kind(VertexKind::Line)
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_color_format(format, Some(wgpu::BlendState::REPLACE))
                .with_depth(TextureResource::DEPTH_FORMAT, true, CompareFunction::LessEqual)
                .with_bind_group_layouts(vec![global_bindings.bind_group_layout().clone()]),
        );

        pipeline_manager.register_pipeline(
            OVERLAY_PIPELINE,
            PipelineConfig::default()
                .with_label("OVERLAY")
                .with_shader("lines")
                .with_vertex_kind(VertexKind::Line)
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_color_format(format, Some(wgpu::BlendState::REPLACE))
                .with_depth(TextureResource::DEPTH_FORMAT, false, CompareFunction::Always)
                .with_bind_group_layouts(vec![global_bindings.bind_group_layout().clone()]),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            anyhow::bail!("Failed to create pipelines: {}", errors.join("; "));
        }

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            mesh_layout,
            light_rig: LightRig::default(),
            grid_lines,
            skirting_lines,
            overlay_lines,
            room_revision: None,
        })
    }

    /// Uploads new meshes and writes this frame's uniforms and line lists
    pub fn prepare(&mut self, editor: &mut Editor) {
        let camera = editor.camera_mut();
        camera.update_view_proj();
        let camera_uniform = camera.uniform;
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            &camera_uniform,
            &self.light_rig,
        );

        let room = editor.room_mut();
        room.init_gpu_resources(&self.device, &self.mesh_layout);
        room.update_gpu(&self.queue);
        if self.room_revision != Some(room.revision()) {
            self.grid_lines
                .update_data(&self.device, &self.queue, room.grid());
            self.skirting_lines
                .update_data(&self.device, &self.queue, room.skirting());
            self.room_revision = Some(room.revision());
        }

        let selected = editor.selected();
        let scene = editor.scene_mut();
        scene.init_gpu_resources(&self.device, &self.mesh_layout);
        scene.update_gpu(&self.queue, selected);

        let overlay = editor.overlay_lines();
        self.overlay_lines
            .update_data(&self.device, &self.queue, &overlay);
    }

    /// Draws the editor state, then the UI callback on top, and presents
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    ///
    /// # Arguments
    /// * `editor` - Camera, room, scene and overlay source
    /// * `ui_callback` - Records UI draw commands into the same encoder
    ///
    /// # Returns
    /// Ok after presenting or skipping, or the surface error that stopped the frame
    pub fn render_frame<F>(
        &mut self,
        editor: &Editor,
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for a surface texture");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            let room = editor.room();
            if let Some(pipeline) = self.pipeline_manager.pipeline(MESH_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.draw_mesh(room.floor());
                if room.walls_visible() {
                    for wall in room.walls() {
                        render_pass.draw_mesh(&wall.mesh);
                    }
                }
                for object in editor.scene().objects() {
                    render_pass.draw_object(object);
                }
            }

            if let Some(pipeline) = self.pipeline_manager.pipeline(LINE_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                if room.grid_visible() {
                    draw_lines(&mut render_pass, &self.grid_lines);
                }
                if room.walls_visible() {
                    draw_lines(&mut render_pass, &self.skirting_lines);
                }
            }

            if let Some(pipeline) = self.pipeline_manager.pipeline(OVERLAY_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                draw_lines(&mut render_pass, &self.overlay_lines);
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and recreates the depth buffer
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn draw_lines(render_pass: &mut wgpu::RenderPass<'_>, lines: &VertexArrayBuffer<LineVertex>) {
    if lines.is_empty() {
        return;
    }
    render_pass.set_vertex_buffer(0, lines.buffer().slice(..));
    render_pass.draw(0..lines.len() as u32, 0..1);
}

//! Global uniform bindings for camera and lighting
//!
//! Bound at group 0 by every pipeline. The layout of [`GlobalUniform`] must
//! match the `Globals` struct in the WGSL shaders.

use crate::{
    gfx::{
        camera::camera_utils::CameraUniform,
        scene::{room::BACKGROUND_COLOR, vertex::hex_color},
    },
    wgpu_utils::uniform_buffer::UniformBuffer,
};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// rgb color, w intensity
    ambient: [f32; 4],
    /// xyz direction towards the light
    sun_direction: [f32; 4],
    sun_color: [f32; 4],
    /// xyz position, w range
    fill_position: [f32; 4],
    fill_color: [f32; 4],
    /// rgb color, w exponential density
    fog: [f32; 4],
}

/// Light setup of the room: ambient, one directional key light, one point fill
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightRig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub sun_position: [f32; 3],
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub fill_position: [f32; 3],
    pub fill_color: [f32; 3],
    pub fill_intensity: f32,
    pub fill_range: f32,
    pub fog_color: [f32; 3],
    pub fog_density: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.5,
            sun_position: [10.0, 20.0, 10.0],
            sun_color: hex_color(0xffeedd),
            sun_intensity: 1.2,
            fill_position: [-8.0, 5.0, -8.0],
            fill_color: hex_color(0x5b8cff),
            fill_intensity: 0.4,
            fill_range: 50.0,
            fog_color: hex_color(BACKGROUND_COLOR),
            fog_density: 0.012,
        }
    }
}

impl GlobalUniform {
    pub fn new(camera: &CameraUniform, lights: &LightRig) -> Self {
        let [sx, sy, sz] = lights.sun_position;
        let length = (sx * sx + sy * sy + sz * sz).sqrt().max(f32::EPSILON);
        let rgb_w = |rgb: [f32; 3], w: f32| [rgb[0], rgb[1], rgb[2], w];

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient: rgb_w(lights.ambient_color, lights.ambient_intensity),
            sun_direction: [sx / length, sy / length, sz / length, 0.0],
            sun_color: rgb_w(lights.sun_color, lights.sun_intensity),
            fill_position: rgb_w(lights.fill_position, lights.fill_range),
            fill_color: rgb_w(lights.fill_color, lights.fill_intensity),
            fog: rgb_w(lights.fog_color, lights.fog_density),
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Writes camera and light data for the coming frame
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: &CameraUniform,
    lights: &LightRig,
) {
    ubo.update_content(queue, GlobalUniform::new(camera, lights));
}

/// Layout and bind group of the global uniform block
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
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
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

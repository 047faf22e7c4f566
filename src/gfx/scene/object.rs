//! Placed objects and their meshes
//!
//! A [`PlacedObject`] is one furniture item in the room: a list of colored
//! meshes in model space plus a position / Euler rotation / scale transform.
//! Geometry stays on the CPU for picking and bounds; GPU buffers are created
//! lazily once a device is available.

use std::ops::Range;

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3};
use wgpu::Device;

use super::vertex::Vertex3D;
use crate::gfx::{
    geometry::{generate_box, GeometryData},
    picking::{intersect_triangle, Aabb, Ray},
};
use crate::wgpu_utils::uniform_buffer::UniformBuffer;

/// Stable identifier of a placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Position, Euler rotation (radians, X then Y then Z) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotation part of the transform
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(cgmath::Rad(self.rotation.x))
            * Matrix4::from_angle_y(cgmath::Rad(self.rotation.y))
            * Matrix4::from_angle_z(cgmath::Rad(self.rotation.z))
    }

    /// Model matrix, T * R * S
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation_matrix()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Per-mesh uniform block, bound at group 1 of the mesh pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for non-uniform scale
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub emissive: [f32; 4],
}

impl MeshUniform {
    pub fn new(model: Matrix4<f32>, color: [f32; 3], emissive: [f32; 3]) -> Self {
        let normal = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: model.into(),
            normal: normal.into(),
            color: [color[0], color[1], color[2], 1.0],
            emissive: [emissive[0], emissive[1], emissive[2], 0.0],
        }
    }
}

/// GPU side of a mesh
pub struct MeshGpuResources {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform: UniformBuffer<MeshUniform>,
    bind_group: wgpu::BindGroup,
}

/// Indexed triangle mesh with a flat base color
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    color: [f32; 3],
    bounds: Aabb,
    gpu: Option<MeshGpuResources>,
}

impl Mesh {
    /// Builds a mesh, computing smooth normals when none (or the wrong number)
    /// are supplied
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        indices: Vec<u32>,
        color: [f32; 3],
    ) -> Self {
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            Self::calculate_normals(&positions, &indices)
        };

        let bounds = Aabb::from_points(&positions);
        let vertices = positions
            .into_iter()
            .zip(normals)
            .map(|(position, normal)| Vertex3D::new(position, normal))
            .collect();

        Self {
            vertices,
            indices,
            color,
            bounds,
            gpu: None,
        }
    }

    pub fn from_geometry(geometry: GeometryData, color: [f32; 3]) -> Self {
        Self::new(geometry.vertices, geometry.normals, geometry.indices, color)
    }

    /// Axis-aligned box of the given size centred at the origin
    pub fn cuboid(size: [f32; 3], color: [f32; 3]) -> Self {
        Self::from_geometry(generate_box(size[0], size[1], size[2]), color)
    }

    /// Area-weighted vertex normals
    pub fn calculate_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
        let position = |i: u32| positions.get(i as usize).map(|p| Vector3::from(*p));

        for triangle in indices.chunks_exact(3) {
            let (Some(v0), Some(v1), Some(v2)) =
                (position(triangle[0]), position(triangle[1]), position(triangle[2]))
            else {
                continue;
            };
            let face_normal = (v1 - v0).cross(v2 - v0);
            for &i in triangle {
                normals[i as usize] += face_normal;
            }
        }

        normals
            .into_iter()
            .map(|n| {
                let length = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
                if length > 0.0 {
                    [n.x / length, n.y / length, n.z / length]
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect()
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    /// Bounds in model space
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Nearest triangle hit of a model space ray
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let vertex = |i: u32| {
            self.vertices
                .get(i as usize)
                .map(|v| Vector3::from(v.position))
        };

        self.indices
            .chunks_exact(3)
            .filter_map(|triangle| {
                let a = vertex(triangle[0])?;
                let b = vertex(triangle[1])?;
                let c = vertex(triangle[2])?;
                intersect_triangle(ray, a, b, c)
            })
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Creates vertex, index and uniform buffers
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        if self.gpu.is_some() || self.indices.is_empty() {
            return;
        }

        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let uniform = UniformBuffer::new_with_data(
            device,
            &MeshUniform::new(Matrix4::identity(), self.color, [0.0; 3]),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.binding_resource(),
            }],
        });

        self.gpu = Some(MeshGpuResources {
            vertex_buffer,
            index_buffer,
            uniform,
            bind_group,
        });
    }

    /// Writes the model matrix and highlight color to the uniform buffer
    pub fn update_uniform(&mut self, queue: &wgpu::Queue, model: Matrix4<f32>, emissive: [f32; 3]) {
        let color = self.color;
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.uniform
                .update_content(queue, MeshUniform::new(model, color, emissive));
        }
    }
}

/// One furniture item in the room
pub struct PlacedObject {
    pub id: ObjectId,
    pub name: String,
    /// Catalog file the object was created from
    pub file: String,
    pub transform: Transform,
    /// True when the model failed to load and a box stands in for it
    pub placeholder: bool,
    meshes: Vec<Mesh>,
}

impl PlacedObject {
    pub fn new(id: ObjectId, name: String, file: String, meshes: Vec<Mesh>) -> Self {
        Self {
            id,
            name,
            file,
            transform: Transform::default(),
            placeholder: false,
            meshes,
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Bounds of all meshes in model space
    pub fn local_bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .fold(Aabb::empty(), |acc, mesh| acc.union(&mesh.bounds()))
    }

    /// Tight world bounds over every vertex under the model matrix
    pub fn world_bounds(&self) -> Aabb {
        let matrix = self.transform.matrix();
        let mut bounds = Aabb::empty();
        for vertex in self.meshes.iter().flat_map(|mesh| mesh.vertices()) {
            let world = matrix * Vector3::from(vertex.position).extend(1.0);
            bounds.extend(world.truncate());
        }
        bounds
    }

    /// Moves the object so its world bounding box rests on y = 0
    pub fn snap_to_floor(&mut self) {
        let bounds = self.world_bounds();
        if !bounds.is_empty() {
            self.transform.position.y -= bounds.min.y;
        }
    }

    /// Moves the object so its world bounding box is centred on the origin
    pub fn center_on_origin(&mut self) {
        let bounds = self.world_bounds();
        if !bounds.is_empty() {
            self.transform.position -= bounds.center();
        }
    }

    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device, layout);
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.meshes.iter().all(|mesh| mesh.is_uploaded() || mesh.indices.is_empty())
    }

    pub fn update_gpu(&mut self, queue: &wgpu::Queue, emissive: [f32; 3]) {
        let model = self.transform.matrix();
        for mesh in &mut self.meshes {
            mesh.update_uniform(queue, model, emissive);
        }
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    fn draw_object(&mut self, object: &'a PlacedObject);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        // Skip drawing if not uploaded
        let Some(gpu) = &mesh.gpu else {
            return;
        };

        self.set_bind_group(1, &gpu.bind_group, &[]);
        self.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        self.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.indices.len() as u32, 0, instances);
    }

    fn draw_object(&mut self, object: &'b PlacedObject) {
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }
}

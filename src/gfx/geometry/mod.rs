//! # Procedural Geometry Generation
//!
//! Boxes and planes for the room and placeholder objects, plus line lists for
//! the reference grid, the skirting outline and selection boxes.
//!
//! ## Usage
//!
//! ```rust
//! use room_arranger::gfx::geometry::{generate_box, generate_plane, grid_lines};
//!
//! let placeholder = generate_box(0.8, 0.9, 0.9);
//! assert_eq!(placeholder.triangle_count(), 12);
//!
//! let wall = generate_plane(10.0, 3.0);
//! assert_eq!(wall.vertex_count(), 4);
//!
//! let grid = grid_lines(20.0, 20, [0.2; 3], [0.1; 3]);
//! assert_eq!(grid.len(), 21 * 4);
//! ```

pub mod primitives;

pub use primitives::*;

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3, Vector4};

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends a quad given its corners in counter-clockwise order
    fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 4]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Bakes a transform into positions and normals
    pub fn transformed(mut self, matrix: Matrix4<f32>) -> Self {
        let normal_matrix = matrix
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);

        for position in &mut self.vertices {
            let p = matrix * Vector4::new(position[0], position[1], position[2], 1.0);
            *position = [p.x / p.w, p.y / p.w, p.z / p.w];
        }
        for normal in &mut self.normals {
            let n = (normal_matrix * Vector4::new(normal[0], normal[1], normal[2], 0.0)).truncate();
            let length = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
            let n: Vector3<f32> = if length > 0.0 { n / length } else { n };
            *normal = n.into();
        }

        self
    }
}

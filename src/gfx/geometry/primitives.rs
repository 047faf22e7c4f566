//! # Primitive Shape Generation
//!
//! Y-up primitives with outward facing, counter-clockwise triangles, and
//! line list builders.

use super::GeometryData;
use crate::gfx::{picking::Aabb, scene::vertex::LineVertex};

/// Generate a box centred at the origin
///
/// Each face has its own four vertices so normals stay flat.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
    let mut data = GeometryData::new();

    // +Z
    data.push_quad(
        [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]],
        [0.0, 0.0, 1.0],
    );
    // -Z
    data.push_quad(
        [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]],
        [0.0, 0.0, -1.0],
    );
    // +X
    data.push_quad(
        [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]],
        [1.0, 0.0, 0.0],
    );
    // -X
    data.push_quad(
        [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]],
        [-1.0, 0.0, 0.0],
    );
    // +Y
    data.push_quad(
        [[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]],
        [0.0, 1.0, 0.0],
    );
    // -Y
    data.push_quad(
        [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]],
        [0.0, -1.0, 0.0],
    );

    data
}

/// Generate a plane in the XY plane facing +Z, centred at the origin
///
/// Rotate it -90° about X for a floor, or about Y to face a wall inward.
pub fn generate_plane(width: f32, height: f32) -> GeometryData {
    let (x, y) = (width * 0.5, height * 0.5);
    let mut data = GeometryData::new();
    data.push_quad(
        [[-x, -y, 0.0], [x, -y, 0.0], [x, y, 0.0], [-x, y, 0.0]],
        [0.0, 0.0, 1.0],
    );
    data
}

/// Square reference grid on the XZ plane as a line list
///
/// The two centre lines use `center_color`, all others `line_color`.
pub fn grid_lines(
    size: f32,
    divisions: u32,
    center_color: [f32; 3],
    line_color: [f32; 3],
) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let step = size / divisions as f32;
    let half = size * 0.5;
    let center = divisions / 2;

    let mut lines = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == center { center_color } else { line_color };
        lines.push(LineVertex::new([-half, 0.0, k], color));
        lines.push(LineVertex::new([half, 0.0, k], color));
        lines.push(LineVertex::new([k, 0.0, -half], color));
        lines.push(LineVertex::new([k, 0.0, half], color));
    }
    lines
}

/// Closed polyline through `points` as a line list
pub fn line_loop(points: &[[f32; 3]], color: [f32; 3]) -> Vec<LineVertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .flat_map(|(a, b)| [LineVertex::new(*a, color), LineVertex::new(*b, color)])
        .collect()
}

/// Twelve box edges as a line list
pub fn box_outline(bounds: &Aabb, color: [f32; 3]) -> Vec<LineVertex> {
    if bounds.is_empty() {
        return Vec::new();
    }

    bounds
        .edges()
        .iter()
        .flat_map(|(a, b)| [LineVertex::new((*a).into(), color), LineVertex::new((*b).into(), color)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    fn triangle_normal(data: &GeometryData, triangle: &[u32]) -> Vector3<f32> {
        let p = |i: u32| Vector3::from(data.vertices[i as usize]);
        let (a, b, c) = (p(triangle[0]), p(triangle[1]), p(triangle[2]));
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn test_box_winding_matches_normals() {
        let data = generate_box(1.0, 2.0, 3.0);
        assert_eq!(data.vertex_count(), 24);
        assert_eq!(data.triangle_count(), 12);

        for triangle in data.indices.chunks(3) {
            let geometric = triangle_normal(&data, triangle);
            let stored = Vector3::from(data.normals[triangle[0] as usize]);
            assert!(geometric.dot(stored) > 0.99);
        }
    }

    #[test]
    fn test_plane_faces_forward() {
        let data = generate_plane(4.0, 2.0);
        let n = triangle_normal(&data, &data.indices[0..3]);
        assert!(n.dot(Vector3::unit_z()) > 0.99);
    }

    #[test]
    fn test_grid_line_count_and_colors() {
        let lines = grid_lines(4.0, 4, [1.0; 3], [0.5; 3]);
        assert_eq!(lines.len(), 5 * 4);
        // i == 2 is the centre row
        assert_eq!(lines[8].color, [1.0; 3]);
        assert_eq!(lines[0].color, [0.5; 3]);
        assert_eq!(lines[0].position, [-2.0, 0.0, -2.0]);
    }

    #[test]
    fn test_line_loop_closes() {
        let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]];
        let lines = line_loop(&corners, [1.0; 3]);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5].position, corners[0]);
    }
}

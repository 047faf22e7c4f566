//! Room shell: floor, four inward facing walls, skirting outline and grid

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};
use wgpu::Device;

use super::{
    object::Mesh,
    vertex::{hex_color, LineVertex},
};
use crate::config::RoomDimensions;
use crate::gfx::geometry::{generate_plane, grid_lines, line_loop};

pub const BACKGROUND_COLOR: u32 = 0x0a0a0e;
pub const FLOOR_COLOR: u32 = 0x1a1a20;
pub const WALL_COLOR: u32 = 0x252530;
pub const GRID_CENTER_COLOR: u32 = 0x2e2e38;
pub const GRID_LINE_COLOR: u32 = 0x222228;
pub const SKIRTING_COLOR: u32 = 0x3a3a50;

const GRID_LIFT: f32 = 0.001;
const SKIRTING_LIFT: f32 = 0.002;

/// Which side of the room a wall closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Back,
    Front,
    Left,
    Right,
}

pub struct Wall {
    pub side: WallSide,
    pub mesh: Mesh,
}

/// Floor, walls, skirting and grid for one set of dimensions
pub struct Room {
    dimensions: RoomDimensions,
    floor: Mesh,
    walls: Vec<Wall>,
    grid: Vec<LineVertex>,
    skirting: Vec<LineVertex>,
    grid_visible: bool,
    walls_visible: bool,
    revision: u64,
}

impl Room {
    pub fn new(dimensions: RoomDimensions) -> Self {
        let mut room = Self {
            dimensions,
            floor: Mesh::new(Vec::new(), Vec::new(), Vec::new(), [0.0; 3]),
            walls: Vec::new(),
            grid: Vec::new(),
            skirting: Vec::new(),
            grid_visible: true,
            walls_visible: true,
            revision: 0,
        };
        room.rebuild(dimensions);
        room
    }

    /// Replaces every room piece; visibility toggles are kept
    pub fn rebuild(&mut self, dimensions: RoomDimensions) {
        let RoomDimensions {
            width: w,
            length: l,
            height: h,
        } = dimensions;

        self.dimensions = dimensions;
        self.floor = Mesh::from_geometry(
            generate_plane(w, l).transformed(Matrix4::from_angle_x(Rad(-FRAC_PI_2))),
            hex_color(FLOOR_COLOR),
        );

        let wall_defs = [
            (WallSide::Back, Vector3::new(0.0, h / 2.0, -l / 2.0), 0.0, w),
            (WallSide::Front, Vector3::new(0.0, h / 2.0, l / 2.0), PI, w),
            (WallSide::Left, Vector3::new(-w / 2.0, h / 2.0, 0.0), FRAC_PI_2, l),
            (WallSide::Right, Vector3::new(w / 2.0, h / 2.0, 0.0), -FRAC_PI_2, l),
        ];
        self.walls = wall_defs
            .into_iter()
            .map(|(side, position, yaw, span)| {
                let placement = Matrix4::from_translation(position) * Matrix4::from_angle_y(Rad(yaw));
                Wall {
                    side,
                    mesh: Mesh::from_geometry(
                        generate_plane(span, h).transformed(placement),
                        hex_color(WALL_COLOR),
                    ),
                }
            })
            .collect();

        let cells = dimensions.largest_side().ceil() * 2.0;
        self.grid = grid_lines(
            cells,
            cells as u32,
            hex_color(GRID_CENTER_COLOR),
            hex_color(GRID_LINE_COLOR),
        );
        for vertex in &mut self.grid {
            vertex.position[1] = GRID_LIFT;
        }

        let corners = [
            [-w / 2.0, SKIRTING_LIFT, -l / 2.0],
            [w / 2.0, SKIRTING_LIFT, -l / 2.0],
            [w / 2.0, SKIRTING_LIFT, l / 2.0],
            [-w / 2.0, SKIRTING_LIFT, l / 2.0],
        ];
        self.skirting = line_loop(&corners, hex_color(SKIRTING_COLOR));

        self.revision += 1;
        log::info!("Room built: {}m x {}m x {}m", w, l, h);
    }

    pub fn dimensions(&self) -> RoomDimensions {
        self.dimensions
    }

    /// Bumped on every rebuild so GPU copies of the line lists can be refreshed
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn floor(&self) -> &Mesh {
        &self.floor
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn grid(&self) -> &[LineVertex] {
        &self.grid
    }

    pub fn skirting(&self) -> &[LineVertex] {
        &self.skirting
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    pub fn walls_visible(&self) -> bool {
        self.walls_visible
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.grid_visible = !self.grid_visible;
        self.grid_visible
    }

    /// Toggles the walls together with the skirting outline
    pub fn toggle_walls(&mut self) -> bool {
        self.walls_visible = !self.walls_visible;
        self.walls_visible
    }

    /// Uploads meshes created since the last call
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        self.floor.init_gpu_resources(device, layout);
        for wall in &mut self.walls {
            wall.mesh.init_gpu_resources(device, layout);
        }
    }

    pub fn update_gpu(&mut self, queue: &wgpu::Queue) {
        self.floor
            .update_uniform(queue, Matrix4::identity(), [0.0; 3]);
        for wall in &mut self.walls {
            wall.mesh.update_uniform(queue, Matrix4::identity(), [0.0; 3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn face_normal(mesh: &Mesh) -> Vector3<f32> {
        let p = |i: u32| Vector3::from(mesh.vertices()[i as usize].position);
        let idx = mesh.indices();
        (p(idx[1]) - p(idx[0])).cross(p(idx[2]) - p(idx[0])).normalize()
    }

    #[test]
    fn test_floor_spans_room() {
        let room = Room::new(RoomDimensions::DEFAULT);
        let bounds = room.floor().bounds();
        assert!((bounds.size().x - 10.0).abs() < 1e-4);
        assert!((bounds.size().z - 8.0).abs() < 1e-4);
        assert!(bounds.max.y.abs() < 1e-5);
        assert!(face_normal(room.floor()).y > 0.99);
    }

    #[test]
    fn test_walls_face_inward() {
        let room = Room::new(RoomDimensions::DEFAULT);
        assert_eq!(room.walls().len(), 4);

        for wall in room.walls() {
            let center = wall.mesh.bounds().center();
            let normal = face_normal(&wall.mesh);
            // Pointing from the wall towards the room centre
            assert!(normal.dot(-Vector3::new(center.x, 0.0, center.z)) > 0.0, "{:?}", wall.side);
            assert!((center.y - 1.5).abs() < 1e-4);
            assert!((wall.mesh.bounds().size().y - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_grid_size_and_lift() {
        let room = Room::new(RoomDimensions {
            width: 7.5,
            length: 4.0,
            height: 2.5,
        });
        // ceil(7.5) * 2 = 16 divisions, 17 rows of two lines
        assert_eq!(room.grid().len(), 17 * 4);
        assert!(room.grid().iter().all(|v| v.position[1] == GRID_LIFT));
        assert!(room.grid().iter().any(|v| v.position[0] == 8.0));
        assert_eq!(room.skirting().len(), 8);
        assert!(room.skirting().iter().all(|v| v.position[1] == SKIRTING_LIFT));
    }

    #[test]
    fn test_rebuild_keeps_toggles() {
        let mut room = Room::new(RoomDimensions::DEFAULT);
        assert!(!room.toggle_grid());
        assert!(!room.toggle_walls());
        let revision = room.revision();

        room.rebuild(RoomDimensions {
            width: 4.0,
            length: 4.0,
            height: 2.0,
        });
        assert!(!room.grid_visible());
        assert!(!room.walls_visible());
        assert_eq!(room.revision(), revision + 1);
        assert!((room.floor().bounds().size().x - 4.0).abs() < 1e-4);
    }
}

//! # Transform Gizmo
//!
//! Axis handles for moving, rotating and scaling the selected object with the
//! pointer. The gizmo keeps no GPU state: it hit-tests its handles in screen
//! space, turns pointer motion into [`Transform`] edits, and emits a line list
//! the renderer draws on top of the scene.
//!
//! Handles are sized from the camera distance so they keep roughly the same
//! on-screen size while zooming.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};

use crate::gfx::{
    camera::OrbitCamera,
    picking::{screen_to_ray, world_to_screen, Aabb, Ray},
    scene::{
        object::{ObjectId, Transform},
        vertex::LineVertex,
    },
};

/// Handle length as a fraction of the eye to pivot distance
const HANDLE_SCALE: f32 = 0.15;
/// Pointer distance in pixels that still grabs a handle
const PICK_TOLERANCE: f32 = 10.0;
const RING_SEGMENTS: usize = 48;
/// Smallest scale component a drag can produce
pub const MIN_SCALE: f32 = 0.01;

const HIGHLIGHT_COLOR: [f32; 3] = [1.0, 0.85, 0.2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl GizmoMode {
    pub const ALL: [GizmoMode; 3] = [GizmoMode::Translate, GizmoMode::Rotate, GizmoMode::Scale];

    pub fn label(&self) -> &'static str {
        match self {
            GizmoMode::Translate => "Move",
            GizmoMode::Rotate => "Rotate",
            GizmoMode::Scale => "Scale",
        }
    }

    /// Keyboard shortcut shown next to the toolbar button
    pub fn shortcut(&self) -> char {
        match self {
            GizmoMode::Translate => 'W',
            GizmoMode::Rotate => 'E',
            GizmoMode::Scale => 'R',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(&self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::unit_x(),
            Axis::Y => Vector3::unit_y(),
            Axis::Z => Vector3::unit_z(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn color(&self) -> [f32; 3] {
        match self {
            Axis::X => [0.95, 0.3, 0.3],
            Axis::Y => [0.35, 0.85, 0.35],
            Axis::Z => [0.3, 0.5, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    axis: Axis,
    direction: Vector3<f32>,
    start: Transform,
    /// Axis parameter (translate / scale) or plane angle (rotate) at grab time
    start_value: f32,
}

/// Pointer driven move / rotate / scale handles for one attached object
#[derive(Debug, Default)]
pub struct TransformGizmo {
    mode: GizmoMode,
    attached: Option<ObjectId>,
    hovered: Option<Axis>,
    drag: Option<ActiveDrag>,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Switching mode mid-drag ends the drag
    pub fn set_mode(&mut self, mode: GizmoMode) {
        if self.mode != mode {
            self.drag = None;
            self.mode = mode;
        }
    }

    pub fn attach(&mut self, id: ObjectId) {
        if self.attached != Some(id) {
            self.drag = None;
            self.hovered = None;
        }
        self.attached = Some(id);
    }

    pub fn detach(&mut self) {
        self.attached = None;
        self.hovered = None;
        self.drag = None;
    }

    pub fn attached(&self) -> Option<ObjectId> {
        self.attached
    }

    pub fn hovered(&self) -> Option<Axis> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_axis(&self) -> Option<Axis> {
        self.drag.map(|drag| drag.axis)
    }

    /// World length of a handle for the given camera
    pub fn handle_length(&self, pivot: Vector3<f32>, camera: &OrbitCamera) -> f32 {
        (camera.eye - pivot).magnitude() * HANDLE_SCALE
    }

    /// Axis direction in world space; scale handles follow the object's rotation
    fn axis_direction(&self, axis: Axis, transform: &Transform) -> Vector3<f32> {
        match self.mode {
            GizmoMode::Scale => (transform.rotation_matrix() * axis.unit().extend(0.0))
                .truncate()
                .normalize(),
            _ => axis.unit(),
        }
    }

    /// Closest handle under the cursor, within the pick tolerance
    pub fn hit_test(
        &self,
        cursor: (f32, f32),
        viewport: (f32, f32),
        camera: &OrbitCamera,
        transform: &Transform,
    ) -> Option<Axis> {
        self.attached?;
        let pivot = transform.position;
        let length = self.handle_length(pivot, camera);

        Axis::ALL
            .into_iter()
            .filter_map(|axis| {
                let distance = self
                    .handle_polyline(axis, pivot, length, transform)
                    .windows(2)
                    .filter_map(|segment| {
                        let a = world_to_screen(segment[0], viewport, camera)?;
                        let b = world_to_screen(segment[1], viewport, camera)?;
                        Some(point_segment_distance(cursor, a, b))
                    })
                    .min_by(|a, b| a.total_cmp(b))?;
                (distance <= PICK_TOLERANCE).then_some((axis, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }

    /// Updates the hover highlight; returns true when it changed
    pub fn hover(
        &mut self,
        cursor: (f32, f32),
        viewport: (f32, f32),
        camera: &OrbitCamera,
        transform: &Transform,
    ) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let hovered = self.hit_test(cursor, viewport, camera, transform);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    /// Grabs the handle under the cursor, if any
    pub fn begin_drag(
        &mut self,
        cursor: (f32, f32),
        viewport: (f32, f32),
        camera: &OrbitCamera,
        transform: &Transform,
    ) -> bool {
        let Some(axis) = self.hit_test(cursor, viewport, camera, transform) else {
            return false;
        };

        let ray = screen_to_ray(cursor, viewport, camera);
        let direction = self.axis_direction(axis, transform);
        let start_value = match self.mode {
            GizmoMode::Translate | GizmoMode::Scale => {
                closest_axis_parameter(&ray, transform.position, direction)
            }
            GizmoMode::Rotate => plane_angle(&ray, transform.position, direction),
        };
        let Some(start_value) = start_value else {
            return false;
        };

        self.drag = Some(ActiveDrag {
            axis,
            direction,
            start: *transform,
            start_value,
        });
        self.hovered = Some(axis);
        true
    }

    /// Applies pointer motion to `transform`; returns true when it changed
    pub fn drag_to(
        &mut self,
        cursor: (f32, f32),
        viewport: (f32, f32),
        camera: &OrbitCamera,
        transform: &mut Transform,
    ) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let ray = screen_to_ray(cursor, viewport, camera);
        let pivot = drag.start.position;
        let index = drag.axis.index();

        let updated = match self.mode {
            GizmoMode::Translate => {
                closest_axis_parameter(&ray, pivot, drag.direction).map(|t| Transform {
                    position: drag.start.position + drag.direction * (t - drag.start_value),
                    ..*transform
                })
            }
            GizmoMode::Rotate => plane_angle(&ray, pivot, drag.direction).map(|angle| {
                let mut rotation = drag.start.rotation;
                rotation[index] = drag.start.rotation[index] + wrap_angle(angle - drag.start_value);
                Transform {
                    rotation,
                    ..*transform
                }
            }),
            GizmoMode::Scale => closest_axis_parameter(&ray, pivot, drag.direction)
                .filter(|_| drag.start_value.abs() > f32::EPSILON)
                .map(|t| {
                    let mut scale = drag.start.scale;
                    scale[index] = (drag.start.scale[index] * t / drag.start_value).max(MIN_SCALE);
                    Transform { scale, ..*transform }
                }),
        };

        match updated {
            Some(updated) if updated != *transform => {
                *transform = updated;
                true
            }
            _ => false,
        }
    }

    /// Releases the handle; returns true if a drag was active
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Handle geometry as a line list for the overlay pass
    pub fn lines(&self, camera: &OrbitCamera, transform: &Transform) -> Vec<LineVertex> {
        if self.attached.is_none() {
            return Vec::new();
        }
        let pivot = transform.position;
        let length = self.handle_length(pivot, camera);
        let highlighted = self.active_axis().or(self.hovered);

        let mut lines = Vec::new();
        for axis in Axis::ALL {
            let color = if highlighted == Some(axis) {
                HIGHLIGHT_COLOR
            } else {
                axis.color()
            };
            let points = self.handle_polyline(axis, pivot, length, transform);
            lines.extend(points.windows(2).flat_map(|segment| {
                [
                    LineVertex::new(segment[0].into(), color),
                    LineVertex::new(segment[1].into(), color),
                ]
            }));

            let tip = pivot + self.axis_direction(axis, transform) * length;
            match self.mode {
                GizmoMode::Translate => {
                    let head = length * 0.12;
                    let side = perpendicular(self.axis_direction(axis, transform));
                    let back = tip - self.axis_direction(axis, transform) * head;
                    for offset in [side * head * 0.5, -side * head * 0.5] {
                        lines.push(LineVertex::new(tip.into(), color));
                        lines.push(LineVertex::new((back + offset).into(), color));
                    }
                }
                GizmoMode::Scale => {
                    let half = length * 0.05;
                    let cube = Aabb::new(
                        tip - Vector3::new(half, half, half),
                        tip + Vector3::new(half, half, half),
                    );
                    lines.extend(crate::gfx::geometry::box_outline(&cube, color));
                }
                GizmoMode::Rotate => {}
            }
        }
        lines
    }

    /// World space points of a handle: a straight shaft or a ring
    fn handle_polyline(
        &self,
        axis: Axis,
        pivot: Vector3<f32>,
        length: f32,
        transform: &Transform,
    ) -> Vec<Vector3<f32>> {
        let direction = self.axis_direction(axis, transform);
        match self.mode {
            GizmoMode::Translate | GizmoMode::Scale => vec![pivot, pivot + direction * length],
            GizmoMode::Rotate => {
                let u = perpendicular(direction);
                let w = direction.cross(u);
                (0..=RING_SEGMENTS)
                    .map(|i| {
                        let angle = i as f32 / RING_SEGMENTS as f32 * TAU;
                        pivot + (u * angle.cos() + w * angle.sin()) * length
                    })
                    .collect()
            }
        }
    }
}

/// Unit vector perpendicular to `n`
fn perpendicular(n: Vector3<f32>) -> Vector3<f32> {
    let helper = if n.y.abs() < 0.9 {
        Vector3::unit_y()
    } else {
        Vector3::unit_x()
    };
    helper.cross(n).normalize()
}

/// Parameter along the axis line of the point closest to the ray
fn closest_axis_parameter(ray: &Ray, origin: Vector3<f32>, axis: Vector3<f32>) -> Option<f32> {
    let b = axis.dot(ray.direction);
    let denominator = 1.0 - b * b;
    if denominator.abs() < 1e-6 {
        return None;
    }
    let w = origin - ray.origin;
    Some((b * ray.direction.dot(w) - axis.dot(w)) / denominator)
}

/// Angle of the ray's hit on the plane through `pivot` with normal `axis`
///
/// Positive angles turn counter-clockwise looking down the axis.
fn plane_angle(ray: &Ray, pivot: Vector3<f32>, axis: Vector3<f32>) -> Option<f32> {
    let denominator = ray.direction.dot(axis);
    if denominator.abs() < 1e-6 {
        return None;
    }
    let t = (pivot - ray.origin).dot(axis) / denominator;
    if t < 0.0 {
        return None;
    }

    let offset = ray.point_at(t) - pivot;
    let u = perpendicular(axis);
    let w = axis.cross(u);
    Some(offset.dot(w).atan2(offset.dot(u)))
}

/// Maps an angle difference into (-π, π]
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + std::f32::consts::PI).rem_euclid(TAU) - std::f32::consts::PI;
    if wrapped <= -std::f32::consts::PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

fn point_segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let length2 = abx * abx + aby * aby;
    let t = if length2 > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / length2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

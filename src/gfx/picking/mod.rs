//! # Object Picking System
//!
//! Mouse ray-casting against placed objects and the room floor.
//!
//! ## How it works
//!
//! 1. **Pointer to Ray**: pixel coordinates go to NDC, then through the inverse
//!    view-projection matrix into a world space ray
//! 2. **Broad phase**: the ray is tested against every part's world bounding box
//! 3. **Narrow phase**: parts whose box is hit are tested triangle by triangle in
//!    object space
//! 4. **Selection**: the nearest hit resolves to the placed object owning the part
//!
//! ## Usage
//!
//! ```no_run
//! use room_arranger::gfx::camera::OrbitCamera;
//! use room_arranger::gfx::picking::{pick_object, screen_to_ray};
//! use room_arranger::gfx::scene::Scene;
//!
//! let camera = OrbitCamera::new(16.0 / 9.0);
//! let scene = Scene::new();
//! let ray = screen_to_ray((640.0, 360.0), (1280.0, 720.0), &camera);
//! if let Some(hit) = pick_object(&ray, scene.objects()) {
//!     println!("Picked object {:?} at {:.2}", hit.object_id, hit.distance);
//! }
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::{
    camera::OrbitCamera,
    scene::object::{ObjectId, PlacedObject},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Ray expressed in the space of `matrix`'s inverse
    ///
    /// The direction is not re-normalized, so distances measured along the
    /// returned ray are still world space distances.
    fn to_local(self, inverse: &Matrix4<f32>) -> Self {
        let origin = inverse * self.origin.extend(1.0);
        let direction = inverse * self.direction.extend(0.0);
        Self {
            origin: origin.truncate() / origin.w,
            direction: direction.truncate(),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// A box containing nothing; extending it with any point yields that point
    pub fn empty() -> Self {
        Self::new(
            Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Create AABB from a set of vertices
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.extend(Vector3::new(p[0], p[1], p[2]));
        }
        aabb
    }

    pub fn extend(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut result = *self;
        result.extend(other.min);
        result.extend(other.max);
        result
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn corners(&self) -> [Vector3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, a.y, a.z),
            Vector3::new(b.x, a.y, b.z),
            Vector3::new(a.x, a.y, b.z),
            Vector3::new(a.x, b.y, a.z),
            Vector3::new(b.x, b.y, a.z),
            Vector3::new(b.x, b.y, b.z),
            Vector3::new(a.x, b.y, b.z),
        ]
    }

    /// The twelve edges of the box as corner pairs, for outline drawing
    pub fn edges(&self) -> [(Vector3<f32>, Vector3<f32>); 12] {
        let c = self.corners();
        [
            (c[0], c[1]),
            (c[1], c[2]),
            (c[2], c[3]),
            (c[3], c[0]),
            (c[4], c[5]),
            (c[5], c[6]),
            (c[6], c[7]),
            (c[7], c[4]),
            (c[0], c[4]),
            (c[1], c[5]),
            (c[2], c[6]),
            (c[3], c[7]),
        ]
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    ///
    /// Transforms all eight corners and boxes the result.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        if self.is_empty() {
            return *self;
        }

        let mut result = Self::empty();
        for corner in self.corners() {
            let transformed = matrix * Vector4::new(corner.x, corner.y, corner.z, 1.0);
            result.extend(transformed.truncate() / transformed.w);
        }
        result
    }
}

/// Möller–Trumbore ray/triangle test, both faces
pub fn intersect_triangle(
    ray: &Ray,
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Result of an object picking operation
#[derive(Debug, Clone, Copy)]
pub struct PickResult {
    /// The placed object owning the hit part
    pub object_id: ObjectId,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

/// Convert screen coordinates to a world-space ray
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    camera: &OrbitCamera,
) -> Ray {
    let (mouse_x, mouse_y) = screen_pos;
    let (screen_width, screen_height) = (screen_size.0.max(1.0), screen_size.1.max(1.0));

    let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height;

    let inv_view_proj = camera
        .build_view_projection_matrix()
        .invert()
        .unwrap_or_else(Matrix4::identity);

    // wgpu clip space depth runs from 0 (near) to 1 (far)
    let unproject = |depth: f32| {
        let world = inv_view_proj * Vector4::new(ndc_x, ndc_y, depth, 1.0);
        world.truncate() / world.w
    };
    let near = unproject(0.0);
    let far = unproject(1.0);

    Ray::new(near, far - near)
}

/// Nearest placed object under the ray
pub fn pick_object(ray: &Ray, objects: &[PlacedObject]) -> Option<PickResult> {
    let mut closest: Option<PickResult> = None;

    for object in objects {
        let matrix = object.transform.matrix();
        let Some(inverse) = matrix.invert() else {
            continue;
        };
        let local_ray = ray.to_local(&inverse);

        for mesh in object.meshes() {
            let Some(box_distance) = mesh.bounds().transform(&matrix).intersect_ray(ray) else {
                continue;
            };
            if closest.is_some_and(|c| box_distance > c.distance) {
                continue;
            }

            if let Some(distance) = mesh.intersect_ray(&local_ray) {
                if closest.map_or(true, |c| distance < c.distance) {
                    closest = Some(PickResult {
                        object_id: object.id,
                        distance,
                        point: ray.point_at(distance),
                    });
                }
            }
        }
    }

    closest
}

/// Where the ray crosses the floor rectangle centred at the origin, if it does
pub fn intersect_floor(ray: &Ray, width: f32, length: f32) -> Option<Vector3<f32>> {
    if ray.direction.y.abs() < 1e-6 {
        return None;
    }

    let t = -ray.origin.y / ray.direction.y;
    if t < 0.0 {
        return None;
    }

    let point = ray.point_at(t);
    (point.x.abs() <= width * 0.5 && point.z.abs() <= length * 0.5).then_some(point)
}

/// Project a world point to pixel coordinates; `None` behind the camera
pub fn world_to_screen(
    point: Vector3<f32>,
    screen_size: (f32, f32),
    camera: &OrbitCamera,
) -> Option<(f32, f32)> {
    let clip = camera.build_view_projection_matrix() * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    Some((
        (ndc_x + 1.0) * 0.5 * screen_size.0,
        (1.0 - ndc_y) * 0.5 * screen_size.1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::object::{Mesh, PlacedObject, Transform};

    fn unit_box_object(id: u64, position: Vector3<f32>) -> PlacedObject {
        let mut object = PlacedObject::new(
            ObjectId(id),
            "Box".to_string(),
            "box.glb".to_string(),
            vec![Mesh::cuboid([1.0, 1.0, 1.0], [0.5, 0.5, 0.5])],
        );
        object.transform = Transform::at(position);
        object
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = Aabb::from_points(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert!(Aabb::from_points(&Vec::<[f32; 3]>::new()).is_empty());
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_aabb_transform() {
        let aabb = Aabb::new(Vector3::new(-1.0, 0.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let moved = aabb.transform(&Matrix4::from_translation(Vector3::new(2.0, 3.0, 0.0)));
        assert_eq!(moved.min, Vector3::new(1.0, 3.0, -1.0));
        assert_eq!(moved.max, Vector3::new(3.0, 4.0, 1.0));
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let a = Vector3::new(-1.0, 0.0, -1.0);
        let b = Vector3::new(1.0, 0.0, -1.0);
        let c = Vector3::new(0.0, 0.0, 1.0);

        let down = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let t = intersect_triangle(&down, a, b, c).unwrap();
        assert!((t - 2.0).abs() < 1e-5);

        let beside = Ray::new(Vector3::new(3.0, 2.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(intersect_triangle(&beside, a, b, c).is_none());

        let away = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(intersect_triangle(&away, a, b, c).is_none());
    }

    #[test]
    fn test_pick_nearest_object() {
        let objects = vec![
            unit_box_object(1, Vector3::new(0.0, 0.0, -3.0)),
            unit_box_object(2, Vector3::new(0.0, 0.0, 0.0)),
            unit_box_object(3, Vector3::new(5.0, 0.0, 0.0)),
        ];

        let ray = Ray::new(Vector3::new(0.0, 0.25, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = pick_object(&ray, &objects).unwrap();
        assert_eq!(hit.object_id, ObjectId(2));
        assert!((hit.distance - 9.5).abs() < 1e-4);

        let miss = Ray::new(Vector3::new(0.0, 5.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(pick_object(&miss, &objects).is_none());
    }

    #[test]
    fn test_pick_respects_rotation_and_scale() {
        let mut object = unit_box_object(7, Vector3::new(0.0, 0.0, 0.0));
        object.transform.scale = Vector3::new(4.0, 1.0, 1.0);
        let objects = vec![object];

        // Only the stretched box reaches x = 1.5
        let ray = Ray::new(Vector3::new(1.5, 0.25, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(pick_object(&ray, &objects).unwrap().object_id, ObjectId(7));

        let mut objects = objects;
        objects[0].transform.rotation.y = std::f32::consts::FRAC_PI_2;
        assert!(pick_object(&ray, &objects).is_none());
    }

    #[test]
    fn test_floor_rectangle() {
        let ray = Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.3, -1.0, 0.2));
        assert!(intersect_floor(&ray, 10.0, 8.0).is_some());

        let outside = Ray::new(Vector3::new(20.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(intersect_floor(&outside, 10.0, 8.0).is_none());

        let upward = Ray::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(intersect_floor(&upward, 10.0, 8.0).is_none());
    }

    #[test]
    fn test_screen_center_ray_points_at_target() {
        let camera = OrbitCamera::new(1.5);
        let ray = screen_to_ray((600.0, 400.0), (1200.0, 800.0), &camera);
        let to_target = (camera.target - camera.eye).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = OrbitCamera::new(1.5);
        let (x, y) = world_to_screen(camera.target, (1200.0, 800.0), &camera).unwrap();
        assert!((x - 600.0).abs() < 0.5);
        assert!((y - 400.0).abs() < 0.5);

        let behind = camera.eye + (camera.eye - camera.target);
        assert!(world_to_screen(behind, (1200.0, 800.0), &camera).is_none());
    }
}

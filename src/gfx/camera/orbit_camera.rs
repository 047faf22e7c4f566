use std::f32::consts::FRAC_PI_2;

use super::camera_utils::CameraUniform;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub const DEFAULT_AZIMUTH: f32 = 0.7;
pub const DEFAULT_POLAR: f32 = 0.9;
pub const DEFAULT_RADIUS: f32 = 18.0;
pub const TOP_VIEW_POLAR: f32 = 0.06;
/// Reset radius as a multiple of the longest room side
pub const RESET_RADIUS_FACTOR: f32 = 1.4;

/// Camera orbiting a target on a sphere
///
/// `azimuth` turns around the world Y axis, `polar` is measured down from
/// straight overhead.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub azimuth: f32,
    pub polar: f32,
    pub radius: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            azimuth: DEFAULT_AZIMUTH,
            polar: DEFAULT_POLAR,
            radius: DEFAULT_RADIUS,
            eye: Vector3::zero(), // Calculated in `update()`
            target: Vector3::zero(),
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(55.0).into(),
            znear: 0.1,
            zfar: 500.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// Frames a room whose longest side is `largest_side`
    pub fn reset(&mut self, largest_side: f32) {
        self.azimuth = DEFAULT_AZIMUTH;
        self.polar = DEFAULT_POLAR;
        self.radius = largest_side * RESET_RADIUS_FACTOR;
        self.target = Vector3::zero();
        self.update();
    }

    /// Looks almost straight down, keeping azimuth and radius
    pub fn top_view(&mut self) {
        self.set_polar(TOP_VIEW_POLAR);
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
        self.update();
    }

    /// Multiplicative zoom; `factor` above one moves away
    pub fn scale_radius(&mut self, factor: f32) {
        self.set_radius(self.radius * factor);
    }

    pub fn set_polar(&mut self, polar: f32) {
        self.polar = polar;
        self.update();
    }

    pub fn set_azimuth(&mut self, azimuth: f32) {
        self.azimuth = azimuth;
        self.update();
    }

    /// Rotates around the target by `speed` radians per pixel
    pub fn orbit(&mut self, dx: f32, dy: f32, speed: f32) {
        self.azimuth -= dx * speed;
        self.polar -= dy * speed;
        self.update();
    }

    /// Pans the target by a pixel delta
    ///
    /// Horizontal motion follows the camera right vector, vertical motion the
    /// world Y axis; both scale with distance.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let speed = self.radius * 0.001;
        let right = self.right();
        self.target += right * (-dx * speed);
        self.target.y += dy * speed;
        self.update();
    }

    /// Camera right vector projected from the current view direction
    pub fn right(&self) -> Vector3<f32> {
        let forward = self.target - self.eye;
        let right = forward.cross(self.up);
        if right.magnitude2() > f32::EPSILON {
            right.normalize()
        } else {
            Vector3::unit_x()
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.eye).normalize()
    }

    /// Distance from eye to target
    pub fn distance(&self) -> f32 {
        (self.target - self.eye).magnitude()
    }

    /// Clamps polar angle and radius, then recomputes the eye position
    pub fn update(&mut self) {
        self.polar = self.polar.clamp(self.bounds.min_polar, self.bounds.max_polar);
        self.radius = self
            .radius
            .clamp(self.bounds.min_radius, self.bounds.max_radius);
        self.eye = calculate_cartesian_eye_position(self.polar, self.azimuth, self.radius, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = self.build_view_projection_matrix().into();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_radius: 1.0,
            max_radius: 80.0,
            min_polar: 0.05,
            max_polar: FRAC_PI_2 - 0.02,
        }
    }
}

fn calculate_cartesian_eye_position(
    polar: f32,
    azimuth: f32,
    radius: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        radius * polar.sin() * azimuth.sin(),
        radius * polar.cos(),
        radius * polar.sin() * azimuth.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_default_eye_position() {
        let camera = OrbitCamera::new(1.0);
        let expected = Vector3::new(
            18.0 * 0.9f32.sin() * 0.7f32.sin(),
            18.0 * 0.9f32.cos(),
            18.0 * 0.9f32.sin() * 0.7f32.cos(),
        );
        assert!(close(camera.eye.x, expected.x));
        assert!(close(camera.eye.y, expected.y));
        assert!(close(camera.eye.z, expected.z));
        assert!(close(camera.distance(), 18.0));
    }

    #[test]
    fn test_polar_and_radius_clamped() {
        let mut camera = OrbitCamera::new(1.0);
        camera.set_polar(-1.0);
        assert!(close(camera.polar, 0.05));
        camera.set_polar(3.0);
        assert!(close(camera.polar, FRAC_PI_2 - 0.02));
        assert!(camera.eye.y > 0.0);

        camera.set_radius(0.1);
        assert!(close(camera.radius, 1.0));
        camera.scale_radius(1000.0);
        assert!(close(camera.radius, 80.0));
    }

    #[test]
    fn test_orbit_direction() {
        let mut camera = OrbitCamera::new(1.0);
        camera.orbit(100.0, 50.0, 0.004);
        assert!(close(camera.azimuth, 0.7 - 0.4));
        assert!(close(camera.polar, 0.9 - 0.2));
    }

    #[test]
    fn test_pan_moves_target_only() {
        let mut camera = OrbitCamera::new(1.0);
        let right = camera.right();
        camera.pan(-100.0, 50.0);

        let speed = 18.0 * 0.001;
        assert!(close(camera.target.x, right.x * 100.0 * speed));
        assert!(close(camera.target.z, right.z * 100.0 * speed));
        assert!(close(camera.target.y, 50.0 * speed));
        assert!(close(camera.distance(), 18.0));
    }

    #[test]
    fn test_reset_and_top_view() {
        let mut camera = OrbitCamera::new(1.0);
        camera.pan(30.0, 30.0);
        camera.orbit(40.0, 10.0, 0.004);
        camera.reset(10.0);
        assert_eq!(camera.target, Vector3::zero());
        assert!(close(camera.radius, 14.0));
        assert!(close(camera.azimuth, DEFAULT_AZIMUTH));

        camera.top_view();
        assert!(close(camera.polar, TOP_VIEW_POLAR));
        assert!(close(camera.radius, 14.0));
    }
}

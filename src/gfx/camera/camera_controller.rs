use std::collections::HashMap;

use winit::{
    dpi::PhysicalPosition,
    event::{MouseButton, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Pixels per wheel notch when the platform reports line deltas
const PIXELS_PER_LINE: f32 = 100.0;
/// Per-event motion above which a secondary drag counts as orbiting
const ORBIT_DRAG_THRESHOLD: f32 = 2.0;
/// Total finger travel below which a touch is a tap
const TAP_SLOP: f32 = 8.0;

/// What a pointer or touch event meant for the rest of the editor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// Event consumed by the camera, or nothing to report
    None,
    /// Primary click (or single finger tap) at a pixel position
    Click { x: f32, y: f32 },
}

/// Wheel delta in pixels, positive when scrolling towards the user
pub fn wheel_delta_pixels(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => -lines * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => -*y as f32,
    }
}

#[derive(Debug, Clone, Copy)]
struct TouchTrack {
    start: (f32, f32),
    last: (f32, f32),
    moved: bool,
}

/// Maps mouse, wheel and touch input onto an [`OrbitCamera`]
pub struct CameraController {
    pub rotate_speed: f32,
    pub touch_rotate_speed: f32,
    pub zoom_speed: f32,
    /// Cleared while a gizmo drag owns the pointer
    pub enabled: bool,
    cursor: Option<(f32, f32)>,
    is_orbiting: bool,
    is_panning: bool,
    is_orbit_dragging: bool,
    touches: HashMap<u64, TouchTrack>,
    pinch_distance: Option<f32>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.004, 0.001)
    }
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            touch_rotate_speed: 0.005,
            zoom_speed,
            enabled: true,
            cursor: None,
            is_orbiting: false,
            is_panning: false,
            is_orbit_dragging: false,
            touches: HashMap::new(),
            pinch_distance: None,
        }
    }

    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.cursor
    }

    pub fn is_orbiting(&self) -> bool {
        self.is_orbiting
    }

    pub fn is_panning(&self) -> bool {
        self.is_panning
    }

    /// True once the current secondary drag has moved far enough
    pub fn is_orbit_dragging(&self) -> bool {
        self.is_orbit_dragging
    }

    /// Drops any orbit or pan in progress
    pub fn cancel_drag(&mut self) {
        self.is_orbiting = false;
        self.is_panning = false;
        self.is_orbit_dragging = false;
    }

    pub fn button_pressed(&mut self, button: MouseButton) {
        match button {
            MouseButton::Right => {
                self.is_orbiting = true;
                self.is_orbit_dragging = false;
            }
            MouseButton::Middle => self.is_panning = true,
            _ => {}
        }
    }

    /// Returns a click for a primary release that did not end an orbit drag
    pub fn button_released(&mut self, button: MouseButton) -> PointerOutcome {
        match button {
            MouseButton::Right => {
                self.is_orbiting = false;
                self.is_orbit_dragging = false;
                PointerOutcome::None
            }
            MouseButton::Middle => {
                self.is_panning = false;
                PointerOutcome::None
            }
            MouseButton::Left if !self.is_orbit_dragging => match self.cursor {
                Some((x, y)) => PointerOutcome::Click { x, y },
                None => PointerOutcome::None,
            },
            _ => PointerOutcome::None,
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32, camera: &mut OrbitCamera) {
        let previous = self.cursor.replace((x, y));
        let Some((px, py)) = previous else {
            return;
        };
        if !self.enabled {
            return;
        }

        let (dx, dy) = (x - px, y - py);
        if self.is_orbiting {
            if dx.abs() + dy.abs() > ORBIT_DRAG_THRESHOLD {
                self.is_orbit_dragging = true;
            }
            camera.orbit(dx, dy, self.rotate_speed);
        }
        if self.is_panning {
            camera.pan(dx, dy);
        }
    }

    /// `delta_y` in pixels, positive when scrolling towards the user
    pub fn wheel(&mut self, delta_y: f32, camera: &mut OrbitCamera) {
        camera.scale_radius(1.0 + delta_y * self.zoom_speed);
    }

    pub fn touch_start(&mut self, id: u64, position: (f32, f32)) {
        self.touches.insert(
            id,
            TouchTrack {
                start: position,
                last: position,
                moved: false,
            },
        );
        if self.touches.len() != 2 {
            self.pinch_distance = None;
        }
    }

    pub fn touch_move(&mut self, id: u64, position: (f32, f32), camera: &mut OrbitCamera) {
        let Some(track) = self.touches.get_mut(&id) else {
            return;
        };
        let (dx, dy) = (position.0 - track.last.0, position.1 - track.last.1);
        track.last = position;
        if (position.0 - track.start.0).abs() + (position.1 - track.start.1).abs() > TAP_SLOP {
            track.moved = true;
        }

        if !self.enabled {
            return;
        }

        match self.touches.len() {
            1 => camera.orbit(dx, dy, self.touch_rotate_speed),
            2 => {
                let mut points = self.touches.values().map(|t| t.last);
                let (Some(a), Some(b)) = (points.next(), points.next()) else {
                    return;
                };
                let distance = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
                if let Some(previous) = self.pinch_distance {
                    if distance > 0.0 {
                        camera.scale_radius(previous / distance);
                    }
                }
                self.pinch_distance = Some(distance);
            }
            _ => {}
        }
    }

    /// Returns a click when a lone finger lifts without having moved
    pub fn touch_end(&mut self, id: u64) -> PointerOutcome {
        let was_single = self.touches.len() == 1;
        let track = self.touches.remove(&id);
        self.pinch_distance = None;

        match track {
            Some(track) if was_single && !track.moved => PointerOutcome::Click {
                x: track.last.0,
                y: track.last.1,
            },
            _ => PointerOutcome::None,
        }
    }

    pub fn touch_cancel(&mut self) {
        self.touches.clear();
        self.pinch_distance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_secondary_drag_orbits_and_suppresses_click() {
        let mut camera = OrbitCamera::new(1.0);
        let mut controller = CameraController::default();

        controller.cursor_moved(100.0, 100.0, &mut camera);
        controller.button_pressed(MouseButton::Right);
        controller.cursor_moved(150.0, 100.0, &mut camera);
        assert!(controller.is_orbit_dragging());
        assert!(close(camera.azimuth, 0.7 - 50.0 * 0.004));

        // A primary release mid-drag is not a click
        assert_eq!(controller.button_released(MouseButton::Left), PointerOutcome::None);

        controller.button_released(MouseButton::Right);
        assert!(!controller.is_orbit_dragging());
        assert_eq!(
            controller.button_released(MouseButton::Left),
            PointerOutcome::Click { x: 150.0, y: 100.0 }
        );
    }

    #[test]
    fn test_small_motion_is_not_orbit_drag() {
        let mut camera = OrbitCamera::new(1.0);
        let mut controller = CameraController::default();
        controller.cursor_moved(10.0, 10.0, &mut camera);
        controller.button_pressed(MouseButton::Right);
        controller.cursor_moved(11.0, 11.0, &mut camera);
        assert!(!controller.is_orbit_dragging());
    }

    #[test]
    fn test_disabled_controller_ignores_motion() {
        let mut camera = OrbitCamera::new(1.0);
        let mut controller = CameraController::default();
        controller.enabled = false;
        controller.cursor_moved(0.0, 0.0, &mut camera);
        controller.button_pressed(MouseButton::Middle);
        controller.cursor_moved(40.0, 40.0, &mut camera);
        assert_eq!(camera.target, cgmath::Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_wheel_delta_direction() {
        assert_eq!(wheel_delta_pixels(&MouseScrollDelta::LineDelta(0.0, 1.0)), -100.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -30.0));
        assert_eq!(wheel_delta_pixels(&pixels), 30.0);
    }

    #[test]
    fn test_wheel_zoom() {
        let mut camera = OrbitCamera::new(1.0);
        let mut controller = CameraController::default();
        controller.wheel(100.0, &mut camera);
        assert!(close(camera.radius, 18.0 * 1.1));
    }

    #[test]
    fn test_pinch_zoom_and_reset() {
        let mut camera = OrbitCamera::new(1.0);
        let mut controller = CameraController::default();
        controller.touch_start(1, (0.0, 0.0));
        controller.touch_start(2, (100.0, 0.0));

        // First move only records the reference distance
        controller.touch_move(2, (100.0, 0.0), &mut camera);
        assert!(close(camera.radius, 18.0));
        controller.touch_move(2, (200.0, 0.0), &mut camera);
        assert!(close(camera.radius, 9.0));

        assert_eq!(controller.touch_end(2), PointerOutcome::None);
        controller.touch_start(2, (50.0, 0.0));
        controller.touch_move(2, (60.0, 0.0), &mut camera);
        assert!(close(camera.radius, 9.0));
    }

    #[test]
    fn test_single_finger_orbit_and_tap() {
        let mut camera = OrbitCamera::new(1.0);
        let mut controller = CameraController::default();

        controller.touch_start(7, (10.0, 10.0));
        assert_eq!(controller.touch_end(7), PointerOutcome::Click { x: 10.0, y: 10.0 });

        controller.touch_start(7, (10.0, 10.0));
        controller.touch_move(7, (30.0, 10.0), &mut camera);
        assert!(close(camera.azimuth, 0.7 - 20.0 * 0.005));
        assert_eq!(controller.touch_end(7), PointerOutcome::None);
    }
}

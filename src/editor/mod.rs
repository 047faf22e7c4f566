//! # Editor State
//!
//! Everything the user manipulates, independent of the GPU: the room, the
//! placed objects, the orbit camera, selection and the transform gizmo.
//! Window events are routed here by the app; the renderer only reads back.
//!
//! Pointer input goes to the gizmo first. A press on a gizmo handle starts a
//! drag and disables the camera until release; anything else drives the
//! camera, and a click that was not the end of an orbit drag becomes a pick.

pub mod input;
pub mod placement;
pub mod properties;
pub mod selection;

#[cfg(test)]
mod tests;

use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};

use crate::assets::{AssetError, AssetSource, ModelData};
use crate::catalog::CatalogEntry;
use crate::config::{CatalogSource, RoomDimensions};
use crate::gfx::{
    camera::{wheel_delta_pixels, CameraController, CameraManager, OrbitCamera, PointerOutcome},
    geometry::box_outline,
    gizmos::{GizmoMode, TransformGizmo},
    picking::{intersect_floor, pick_object, screen_to_ray},
    scene::{
        object::{ObjectId, PlacedObject},
        room::Room,
        scene::Scene,
        vertex::LineVertex,
    },
};

use input::EditorCommand;
use properties::{PropertyError, PropertyField, PropertyForm};
use selection::Selection;

/// Outline color of the selected object's bounding box
pub const SELECTION_OUTLINE_COLOR: [f32; 3] = [0.36, 0.55, 1.0];

pub fn room_updated_message(dimensions: &RoomDimensions) -> String {
    format!(
        "Room updated: {}m × {}m × {}m",
        dimensions.width, dimensions.length, dimensions.height
    )
}

pub struct Editor {
    scene: Scene,
    room: Room,
    camera: CameraManager,
    gizmo: TransformGizmo,
    selection: Selection,
    catalog_source: CatalogSource,
    status: String,
    viewport: (f32, f32),
    /// Finger currently dragging a gizmo handle
    gizmo_touch: Option<u64>,
    /// The primary button went down on a gizmo handle
    gizmo_pointer: bool,
}

impl Editor {
    pub fn new(room: RoomDimensions, catalog_source: CatalogSource, viewport: (f32, f32)) -> Self {
        let mut camera = OrbitCamera::new(viewport.0 / viewport.1.max(1.0));
        camera.reset(room.largest_side());

        Self {
            scene: Scene::new(),
            room: Room::new(room),
            camera: CameraManager::new(camera, CameraController::default()),
            gizmo: TransformGizmo::new(),
            selection: Selection::default(),
            catalog_source,
            status: selection::IDLE_HINT.to_string(),
            viewport,
            gizmo_touch: None,
            gizmo_pointer: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn room_mut(&mut self) -> &mut Room {
        &mut self.room
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera.camera
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selection.get()
    }

    pub fn selected_object(&self) -> Option<&PlacedObject> {
        self.selection.get().and_then(|id| self.scene.get(id))
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width as f32, height as f32);
        self.camera.camera.resize_projection(width, height);
    }

    // --- room and camera ---

    /// Rebuilds the room and reframes the camera on it
    pub fn apply_room(&mut self, dimensions: RoomDimensions) {
        self.room.rebuild(dimensions);
        self.camera.camera.reset(dimensions.largest_side());
        self.status = room_updated_message(&dimensions);
    }

    pub fn reset_camera(&mut self) {
        let largest_side = self.room.dimensions().largest_side();
        self.camera.camera.reset(largest_side);
    }

    pub fn top_view(&mut self) {
        self.camera.camera.top_view();
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.room.toggle_grid()
    }

    pub fn toggle_walls(&mut self) -> bool {
        self.room.toggle_walls()
    }

    // --- selection ---

    /// Selects `id`; a gizmo drag on another object is ended first
    pub fn select(&mut self, id: ObjectId) {
        let Some(object) = self.scene.get(id) else {
            return;
        };
        let status = selection::selected_message(&object.name);
        if self.gizmo.attached() != Some(id) {
            self.end_gizmo_drag();
            self.gizmo_touch = None;
        }
        self.status = status;
        self.selection.select(id);
        self.gizmo.attach(id);
    }

    /// Clears the selection; nothing happens when nothing is selected
    pub fn deselect(&mut self) {
        if self.selection.clear().is_none() {
            return;
        }
        self.end_gizmo_drag();
        self.gizmo_touch = None;
        self.gizmo.detach();
        self.status = selection::IDLE_HINT.to_string();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selection.get() else {
            return;
        };
        if let Some(object) = self.scene.remove(id) {
            log::info!("Removed {} ({:?})", object.name, id);
        }
        self.deselect();
    }

    /// Picks at a pixel: objects first, then the floor (deselects)
    pub fn click(&mut self, x: f32, y: f32) {
        let ray = screen_to_ray((x, y), self.viewport, &self.camera.camera);

        if let Some(hit) = pick_object(&ray, self.scene.objects()) {
            self.select(hit.object_id);
            return;
        }

        let dimensions = self.room.dimensions();
        if intersect_floor(&ray, dimensions.width, dimensions.length).is_some() {
            self.deselect();
        }
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        if self.gizmo.is_dragging() {
            self.end_gizmo_drag();
        }
        self.gizmo.set_mode(mode);
    }

    pub fn execute(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::SetGizmoMode(mode) => self.set_gizmo_mode(mode),
            EditorCommand::DeleteSelected => self.delete_selected(),
            EditorCommand::Deselect => self.deselect(),
        }
    }

    // --- placement ---

    /// Where to fetch a catalog entry from
    pub fn asset_source(&self, entry: &CatalogEntry) -> AssetSource {
        match (&self.catalog_source.local_folder, &entry.download_url) {
            (Some(folder), _) => AssetSource::Local(folder.join(&entry.file)),
            (None, Some(url)) => AssetSource::Remote(url.clone()),
            (None, None) => AssetSource::Remote(self.catalog_source.raw_url(&entry.file)),
        }
    }

    /// Marks a load as started and returns its source
    pub fn begin_placement(&mut self, entry: &CatalogEntry) -> AssetSource {
        self.status = placement::loading_message(&entry.name);
        self.asset_source(entry)
    }

    /// Adds the loaded model, or a placeholder box when loading failed
    pub fn finish_placement(
        &mut self,
        entry: &CatalogEntry,
        result: Result<ModelData, AssetError>,
    ) -> ObjectId {
        let id = self.scene.allocate_id();
        let (object, status) = match result {
            Ok(model) => (
                placement::object_from_model(id, entry, model),
                placement::added_message(&entry.name),
            ),
            Err(e) => {
                log::warn!("Using placeholder for {}: {}", entry.file, e);
                (
                    placement::placeholder_object(id, entry),
                    placement::placeholder_message(&entry.file),
                )
            }
        };

        self.scene.insert(object);
        self.select(id);
        self.status = status;
        id
    }

    // --- properties ---

    pub fn property_form(&self) -> Option<PropertyForm> {
        self.selected_object()
            .map(|object| PropertyForm::new(&object.name, &object.transform))
    }

    /// Applies a typed value to the selected object, then re-snaps it
    pub fn commit_property(&mut self, field: PropertyField, text: &str) -> Result<(), PropertyError> {
        let Some(object) = self.selection.get().and_then(|id| self.scene.get_mut(id)) else {
            return Ok(());
        };
        properties::apply_edit(&mut object.transform, field, text)?;
        object.snap_to_floor();
        Ok(())
    }

    pub fn step_property(&mut self, field: PropertyField, direction: f32) {
        if let Some(object) = self.selection.get().and_then(|id| self.scene.get_mut(id)) {
            properties::step(&mut object.transform, field, direction);
            object.snap_to_floor();
        }
    }

    // --- pointer input ---

    /// Routes a window event; returns true if it was pointer input
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::CursorLeft { .. } => self.camera.controller.cancel_drag(),
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.pointer_pressed(*button),
                ElementState::Released => self.pointer_released(*button),
            },
            WindowEvent::MouseWheel { delta, .. } => self.wheel(wheel_delta_pixels(delta)),
            WindowEvent::Touch(Touch {
                id,
                phase,
                location,
                ..
            }) => self.touch(*id, *phase, (location.x as f32, location.y as f32)),
            _ => return false,
        }
        true
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.camera
            .controller
            .cursor_moved(x, y, &mut self.camera.camera);

        if self.gizmo.is_dragging() {
            self.drag_gizmo((x, y));
        } else if let Some(object) = self.gizmo.attached().and_then(|id| self.scene.get(id)) {
            self.gizmo
                .hover((x, y), self.viewport, &self.camera.camera, &object.transform);
        }
    }

    pub fn pointer_pressed(&mut self, button: MouseButton) {
        if button == MouseButton::Left {
            if let Some(cursor) = self.camera.controller.cursor() {
                if self.begin_gizmo_drag(cursor) {
                    self.gizmo_pointer = true;
                    return;
                }
            }
        }
        self.camera.controller.button_pressed(button);
    }

    /// A primary release after a press on a handle never counts as a click,
    /// even if the drag was already ended by a selection change
    pub fn pointer_released(&mut self, button: MouseButton) {
        if button == MouseButton::Left && std::mem::take(&mut self.gizmo_pointer) {
            self.end_gizmo_drag();
            return;
        }
        if let PointerOutcome::Click { x, y } = self.camera.controller.button_released(button) {
            self.click(x, y);
        }
    }

    /// Drops any pointer drag without a click, for releases the UI kept
    pub fn cancel_pointer(&mut self) {
        if std::mem::take(&mut self.gizmo_pointer) {
            self.end_gizmo_drag();
        }
        self.camera.controller.cancel_drag();
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.controller.wheel(delta_y, &mut self.camera.camera);
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, position: (f32, f32)) {
        if self.gizmo_touch == Some(id) {
            match phase {
                TouchPhase::Moved => self.drag_gizmo(position),
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    self.end_gizmo_drag();
                    self.gizmo_touch = None;
                }
                TouchPhase::Started => {}
            }
            return;
        }

        match phase {
            TouchPhase::Started => {
                if self.gizmo_touch.is_none() && self.begin_gizmo_drag(position) {
                    self.gizmo_touch = Some(id);
                } else {
                    self.camera.controller.touch_start(id, position);
                }
            }
            TouchPhase::Moved => {
                self.camera
                    .controller
                    .touch_move(id, position, &mut self.camera.camera)
            }
            TouchPhase::Ended => {
                if let PointerOutcome::Click { x, y } = self.camera.controller.touch_end(id) {
                    self.click(x, y);
                }
            }
            TouchPhase::Cancelled => self.camera.controller.touch_cancel(),
        }
    }

    fn begin_gizmo_drag(&mut self, cursor: (f32, f32)) -> bool {
        let Some(object) = self.gizmo.attached().and_then(|id| self.scene.get(id)) else {
            return false;
        };
        if !self
            .gizmo
            .begin_drag(cursor, self.viewport, &self.camera.camera, &object.transform)
        {
            return false;
        }
        self.camera.controller.cancel_drag();
        self.camera.controller.enabled = false;
        true
    }

    fn drag_gizmo(&mut self, cursor: (f32, f32)) {
        let Some(object) = self.gizmo.attached().and_then(|id| self.scene.get_mut(id)) else {
            return;
        };
        if self
            .gizmo
            .drag_to(cursor, self.viewport, &self.camera.camera, &mut object.transform)
        {
            object.snap_to_floor();
        }
    }

    fn end_gizmo_drag(&mut self) {
        if self.gizmo.end_drag() {
            if let Some(object) = self.gizmo.attached().and_then(|id| self.scene.get_mut(id)) {
                object.snap_to_floor();
            }
        }
        self.camera.controller.enabled = true;
    }

    // --- rendering support ---

    /// Selection outline and gizmo handles, drawn without depth testing
    pub fn overlay_lines(&self) -> Vec<LineVertex> {
        let Some(object) = self.selected_object() else {
            return Vec::new();
        };
        let mut lines = box_outline(&object.world_bounds(), SELECTION_OUTLINE_COLOR);
        lines.extend(self.gizmo.lines(&self.camera.camera, &object.transform));
        lines
    }
}

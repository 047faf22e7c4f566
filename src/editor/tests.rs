use std::path::PathBuf;

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use winit::event::{MouseButton, TouchPhase};

use super::*;
use crate::assets::MeshData;
use crate::gfx::geometry::{generate_box, GeometryData};
use crate::gfx::picking::world_to_screen;

const VIEWPORT: (f32, f32) = (1200.0, 800.0);

fn editor() -> Editor {
    Editor::new(RoomDimensions::DEFAULT, CatalogSource::default(), VIEWPORT)
}

fn entry(file: &str) -> CatalogEntry {
    CatalogEntry::from_file(file).unwrap()
}

fn unit_box() -> ModelData {
    ModelData {
        parts: vec![MeshData {
            geometry: generate_box(1.0, 1.0, 1.0),
            color: [0.5, 0.5, 0.5],
        }],
    }
}

/// Unit octahedron, whose vertices never sit on its bounding box corners
fn octahedron() -> ModelData {
    let geometry = GeometryData {
        vertices: vec![
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ],
        normals: Vec::new(),
        indices: vec![
            0, 2, 4, 4, 2, 1, 1, 2, 5, 5, 2, 0, 4, 3, 0, 1, 3, 4, 5, 3, 1, 0, 3, 5,
        ],
    };
    ModelData {
        parts: vec![MeshData {
            geometry,
            color: [0.7, 0.6, 0.5],
        }],
    }
}

fn screen(editor: &Editor, point: Vector3<f32>) -> (f32, f32) {
    world_to_screen(point, editor.viewport(), editor.camera()).unwrap()
}

fn floor_y(editor: &Editor, id: ObjectId) -> f32 {
    editor.scene().get(id).unwrap().world_bounds().min.y
}

fn lowest_vertex_y(editor: &Editor, id: ObjectId) -> f32 {
    let object = editor.scene().get(id).unwrap();
    let matrix = object.transform.matrix();
    object
        .meshes()
        .iter()
        .flat_map(|mesh| mesh.vertices())
        .map(|v| (matrix * Vector3::from(v.position).extend(1.0)).y)
        .fold(f32::INFINITY, f32::min)
}

#[test]
fn test_starts_idle() {
    let editor = editor();
    assert_eq!(editor.status(), selection::IDLE_HINT);
    assert!(editor.selected().is_none());
    assert!(editor.scene().is_empty());
    assert!(editor.overlay_lines().is_empty());
    assert!(editor.property_form().is_none());
}

#[test]
fn test_loaded_model_is_added_and_selected() {
    let mut editor = editor();
    let sofa = entry("modern_sofa.glb");

    editor.begin_placement(&sofa);
    assert_eq!(editor.status(), "Loading Modern Sofa…");

    let id = editor.finish_placement(&sofa, Ok(unit_box()));
    assert_eq!(editor.selected(), Some(id));
    assert_eq!(editor.gizmo().attached(), Some(id));
    assert_eq!(editor.status(), "Added Modern Sofa • Use gizmos to position");

    let object = editor.scene().get(id).unwrap();
    assert!(!object.placeholder);
    assert!(floor_y(&editor, id).abs() < 1e-5);
    assert!(!editor.overlay_lines().is_empty());
}

#[test]
fn test_failed_load_places_placeholder() {
    let mut editor = editor();
    let chair = entry("office_chair.glb");
    let error = AssetError::Status {
        url: "https://example.invalid/office_chair.glb".to_string(),
        status: 404,
    };

    let id = editor.finish_placement(&chair, Err(error));
    let object = editor.scene().get(id).unwrap();
    assert!(object.placeholder);
    assert_eq!(object.meshes().len(), 1);
    assert_eq!(
        editor.status(),
        "⚠ office_chair.glb not found — showing placeholder box"
    );
    assert_eq!(editor.selected(), Some(id));
}

#[test]
fn test_duplicate_names_get_distinct_ids() {
    let mut editor = editor();
    let lamp = entry("lamp.glb");
    let first = editor.finish_placement(&lamp, Ok(unit_box()));
    let second = editor.finish_placement(&lamp, Ok(unit_box()));
    assert_ne!(first, second);
    assert_eq!(editor.scene().len(), 2);
    assert_eq!(editor.selected(), Some(second));
}

#[test]
fn test_click_selects_object_and_floor_deselects() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("desk.glb"), Ok(unit_box()));
    editor.deselect();
    assert!(editor.selected().is_none());

    let (x, y) = screen(&editor, Vector3::new(0.0, 0.5, 0.0));
    editor.click(x, y);
    assert_eq!(editor.selected(), Some(id));
    assert_eq!(
        editor.status(),
        "Selected: Desk • W/E/R to switch gizmo mode"
    );

    let (x, y) = screen(&editor, Vector3::new(3.0, 0.0, 2.0));
    editor.click(x, y);
    assert!(editor.selected().is_none());
    assert!(editor.gizmo().attached().is_none());
    assert_eq!(editor.status(), selection::IDLE_HINT);
}

#[test]
fn test_click_outside_room_keeps_selection() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("desk.glb"), Ok(unit_box()));
    editor.click(VIEWPORT.0 / 2.0, 1.0);
    assert_eq!(editor.selected(), Some(id));
}

#[test]
fn test_deselect_without_selection_is_noop() {
    let mut editor = editor();
    editor.set_status("Room updated: 10m × 8m × 3m");
    editor.execute(EditorCommand::Deselect);
    assert_eq!(editor.status(), "Room updated: 10m × 8m × 3m");
}

#[test]
fn test_delete_selected() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("bed.glb"), Ok(unit_box()));
    editor.execute(EditorCommand::DeleteSelected);

    assert!(!editor.scene().contains(id));
    assert!(editor.selected().is_none());
    assert!(editor.gizmo().attached().is_none());
    assert_eq!(editor.status(), selection::IDLE_HINT);

    // Nothing selected: nothing to delete
    editor.execute(EditorCommand::DeleteSelected);
    assert!(editor.scene().is_empty());
}

#[test]
fn test_gizmo_mode_command() {
    let mut editor = editor();
    editor.execute(EditorCommand::SetGizmoMode(GizmoMode::Scale));
    assert_eq!(editor.gizmo().mode(), GizmoMode::Scale);
}

#[test]
fn test_property_commit_resnaps_to_floor() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("bookshelf.glb"), Ok(unit_box()));

    editor.commit_property(PropertyField::PositionX, "2.5").unwrap();
    editor.commit_property(PropertyField::ScaleY, "3").unwrap();

    let object = editor.scene().get(id).unwrap();
    assert_eq!(object.transform.position.x, 2.5);
    assert_eq!(object.transform.scale.y, 3.0);
    assert!(floor_y(&editor, id).abs() < 1e-4);
    assert!((object.transform.position.y - 1.5).abs() < 1e-4);

    let form = editor.property_form().unwrap();
    assert_eq!(form.name, "Bookshelf");
    assert_eq!(form.value(PropertyField::PositionX), "2.50");
}

#[test]
fn test_invalid_property_leaves_transform() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("bookshelf.glb"), Ok(unit_box()));
    let before = editor.scene().get(id).unwrap().transform;

    assert!(editor
        .commit_property(PropertyField::PositionZ, "abc")
        .is_err());
    assert_eq!(editor.scene().get(id).unwrap().transform, before);
}

#[test]
fn test_random_edits_stay_on_floor() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut editor = editor();
    let id = editor.finish_placement(&entry("armchair.glb"), Ok(unit_box()));

    for _ in 0..50 {
        let field = PropertyField::ALL[rng.random_range(0..PropertyField::ALL.len())];
        if rng.random_bool(0.5) {
            let value: f32 = rng.random_range(-4.0..4.0);
            editor.commit_property(field, &value.to_string()).unwrap();
        } else {
            editor.step_property(field, if rng.random_bool(0.5) { 1.0 } else { -1.0 });
        }

        let object = editor.scene().get(id).unwrap();
        assert!(floor_y(&editor, id).abs() < 1e-3, "{:?}", object.transform);
        assert!(object.transform.scale.x >= properties::MIN_SCALE);
        assert!(object.transform.scale.y >= properties::MIN_SCALE);
        assert!(object.transform.scale.z >= properties::MIN_SCALE);
    }
}

#[test]
fn test_apply_room_updates_status_and_camera() {
    let mut editor = editor();
    editor.camera_mut().set_radius(40.0);

    editor.apply_room(RoomDimensions {
        width: 6.0,
        length: 5.0,
        height: 2.5,
    });
    assert_eq!(editor.status(), "Room updated: 6m × 5m × 2.5m");
    assert_eq!(editor.room().dimensions().width, 6.0);
    assert!((editor.camera().radius - 6.0 * 1.4).abs() < 1e-4);
}

#[test]
fn test_room_toggles() {
    let mut editor = editor();
    assert!(!editor.toggle_grid());
    assert!(!editor.toggle_walls());
    assert!(editor.toggle_walls());
    assert!(!editor.room().grid_visible());
}

#[test]
fn test_asset_source_selection() {
    let mut editor = editor();
    let sofa = entry("sofa.glb");
    assert_eq!(
        editor.asset_source(&sofa),
        AssetSource::Remote(
            "https://raw.githubusercontent.com/Tossengames/3DRoom/main/models/sofa.glb".to_string()
        )
    );

    let listed = sofa
        .clone()
        .with_download_url(Some("https://cdn.example/sofa.glb".to_string()));
    assert_eq!(
        editor.asset_source(&listed),
        AssetSource::Remote("https://cdn.example/sofa.glb".to_string())
    );

    editor.catalog_source.local_folder = Some(PathBuf::from("/srv/models"));
    assert_eq!(
        editor.asset_source(&listed),
        AssetSource::Local(PathBuf::from("/srv/models/sofa.glb"))
    );
}

#[test]
fn test_gizmo_drag_moves_object_without_click() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("table.glb"), Ok(unit_box()));
    let pivot = editor.scene().get(id).unwrap().transform.position;
    let length = editor.gizmo().handle_length(pivot, editor.camera());

    let grab = screen(&editor, pivot + Vector3::unit_x() * length * 0.8);
    editor.pointer_moved(grab.0, grab.1);
    editor.pointer_pressed(MouseButton::Left);
    assert!(editor.gizmo().is_dragging());
    assert!(!editor.camera.controller.enabled);

    let target = screen(&editor, pivot + Vector3::unit_x() * (length * 0.8 + 1.0));
    editor.pointer_moved(target.0, target.1);
    editor.pointer_released(MouseButton::Left);

    let object = editor.scene().get(id).unwrap();
    assert!((object.transform.position.x - 1.0).abs() < 1e-2);
    assert!(floor_y(&editor, id).abs() < 1e-4);
    assert!(!editor.gizmo().is_dragging());
    assert!(editor.camera.controller.enabled);
    // The release ended the drag rather than clicking
    assert_eq!(editor.selected(), Some(id));
}

#[test]
fn test_touch_tap_selects() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("desk.glb"), Ok(unit_box()));
    editor.deselect();

    let point = screen(&editor, Vector3::new(0.0, 0.5, 0.0));
    editor.touch(1, TouchPhase::Started, point);
    editor.touch(1, TouchPhase::Ended, point);
    assert_eq!(editor.selected(), Some(id));
}

#[test]
fn test_orbit_drag_release_is_not_a_click() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("desk.glb"), Ok(unit_box()));
    editor.deselect();

    let point = screen(&editor, Vector3::new(0.0, 0.5, 0.0));
    editor.pointer_moved(point.0 - 40.0, point.1);
    editor.pointer_pressed(MouseButton::Right);
    editor.pointer_moved(point.0, point.1);
    editor.pointer_released(MouseButton::Left);
    assert!(editor.selected().is_none());

    editor.pointer_released(MouseButton::Right);
    let point = screen(&editor, Vector3::new(0.0, 0.5, 0.0));
    editor.pointer_moved(point.0, point.1);
    editor.pointer_released(MouseButton::Left);
    assert_eq!(editor.selected(), Some(id));
}

#[test]
fn test_placement_during_gizmo_drag_releases_camera() {
    let mut editor = editor();
    let table = editor.finish_placement(&entry("table.glb"), Ok(unit_box()));
    let pivot = editor.scene().get(table).unwrap().transform.position;
    let length = editor.gizmo().handle_length(pivot, editor.camera());

    let grab = screen(&editor, pivot + Vector3::unit_x() * length * 0.8);
    editor.pointer_moved(grab.0, grab.1);
    editor.pointer_pressed(MouseButton::Left);
    assert!(editor.gizmo().is_dragging());

    // A model finishing loading mid-drag takes the selection
    let lamp = editor.finish_placement(&entry("floor_lamp.glb"), Ok(unit_box()));
    assert_eq!(editor.gizmo().attached(), Some(lamp));
    assert!(!editor.gizmo().is_dragging());
    assert!(editor.camera.controller.enabled);

    // The release of the interrupted drag is not a click
    editor.pointer_released(MouseButton::Left);
    assert_eq!(editor.selected(), Some(lamp));

    let azimuth = editor.camera().azimuth;
    editor.pointer_pressed(MouseButton::Right);
    editor.pointer_moved(grab.0 + 50.0, grab.1);
    editor.pointer_released(MouseButton::Right);
    assert!((editor.camera().azimuth - azimuth).abs() > 1e-3);
}

#[test]
fn test_click_during_touch_drag_clears_gizmo_finger() {
    let mut editor = editor();
    let table = editor.finish_placement(&entry("table.glb"), Ok(unit_box()));
    let lamp = editor.finish_placement(&entry("floor_lamp.glb"), Ok(unit_box()));
    editor.select(table);
    let pivot = editor.scene().get(table).unwrap().transform.position;
    let length = editor.gizmo().handle_length(pivot, editor.camera());

    let grab = screen(&editor, pivot + Vector3::unit_x() * length * 0.8);
    editor.touch(4, TouchPhase::Started, grab);
    assert!(editor.gizmo().is_dragging());

    editor.select(lamp);
    assert!(!editor.gizmo().is_dragging());
    assert!(editor.camera.controller.enabled);

    // The old finger no longer drives any gizmo
    let before = editor.scene().get(lamp).unwrap().transform.position;
    editor.touch(4, TouchPhase::Moved, (grab.0 + 80.0, grab.1));
    editor.touch(4, TouchPhase::Ended, (grab.0 + 80.0, grab.1));
    assert_eq!(editor.scene().get(lamp).unwrap().transform.position, before);
}

#[test]
fn test_ui_captured_release_cancels_drags() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("table.glb"), Ok(unit_box()));
    let pivot = editor.scene().get(id).unwrap().transform.position;
    let length = editor.gizmo().handle_length(pivot, editor.camera());

    let grab = screen(&editor, pivot + Vector3::unit_x() * length * 0.8);
    editor.pointer_moved(grab.0, grab.1);
    editor.pointer_pressed(MouseButton::Left);
    assert!(editor.gizmo().is_dragging());
    editor.cancel_pointer();
    assert!(!editor.gizmo().is_dragging());
    assert!(editor.camera.controller.enabled);
    assert!(floor_y(&editor, id).abs() < 1e-4);

    let position = editor.scene().get(id).unwrap().transform.position;
    editor.pointer_moved(grab.0 + 60.0, grab.1);
    assert_eq!(editor.scene().get(id).unwrap().transform.position, position);

    editor.pointer_pressed(MouseButton::Right);
    editor.pointer_moved(grab.0 + 100.0, grab.1);
    editor.cancel_pointer();
    let azimuth = editor.camera().azimuth;
    editor.pointer_moved(grab.0 + 160.0, grab.1);
    assert_eq!(editor.camera().azimuth, azimuth);
}

#[test]
fn test_gizmo_rotate_x_keeps_lowest_vertex_on_floor() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("vase.glb"), Ok(octahedron()));
    editor.set_gizmo_mode(GizmoMode::Rotate);
    let pivot = editor.scene().get(id).unwrap().transform.position;
    let length = editor.gizmo().handle_length(pivot, editor.camera());

    // 45 degrees round the X ring, dragged up to its top
    let diagonal = std::f32::consts::FRAC_1_SQRT_2 * length;
    let grab = screen(&editor, pivot + Vector3::new(0.0, diagonal, -diagonal));
    editor.pointer_moved(grab.0, grab.1);
    editor.pointer_pressed(MouseButton::Left);
    assert!(editor.gizmo().is_dragging());

    let top = screen(&editor, pivot + Vector3::unit_y() * length);
    editor.pointer_moved(top.0, top.1);
    editor.pointer_released(MouseButton::Left);

    let transform = editor.scene().get(id).unwrap().transform;
    assert!((transform.rotation.x.abs() - std::f32::consts::FRAC_PI_4).abs() < 1e-2);
    assert!(transform.rotation.y.abs() < 1e-5 && transform.rotation.z.abs() < 1e-5);
    let lowest = lowest_vertex_y(&editor, id);
    assert!(lowest.abs() < 1e-3, "lowest vertex at {}", lowest);
}

#[test]
fn test_gizmo_scale_y_keeps_lowest_vertex_on_floor() {
    let mut editor = editor();
    let id = editor.finish_placement(&entry("vase.glb"), Ok(octahedron()));
    editor.set_gizmo_mode(GizmoMode::Scale);
    let pivot = editor.scene().get(id).unwrap().transform.position;
    let length = editor.gizmo().handle_length(pivot, editor.camera());

    let grab = screen(&editor, pivot + Vector3::unit_y() * length * 0.5);
    editor.pointer_moved(grab.0, grab.1);
    editor.pointer_pressed(MouseButton::Left);
    assert!(editor.gizmo().is_dragging());

    let target = screen(&editor, pivot + Vector3::unit_y() * length);
    editor.pointer_moved(target.0, target.1);
    editor.pointer_released(MouseButton::Left);

    let transform = editor.scene().get(id).unwrap().transform;
    assert!((transform.scale.y - 2.0).abs() < 0.05, "scale y {}", transform.scale.y);
    assert!((transform.scale.x - 1.0).abs() < 1e-5);
    let lowest = lowest_vertex_y(&editor, id);
    assert!(lowest.abs() < 1e-3, "lowest vertex at {}", lowest);
}

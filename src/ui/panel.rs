//! Editor panels
//!
//! Panels read the editor and return [`UiAction`]s instead of mutating it;
//! the app applies the actions after the frame is built.

use imgui::{Condition, WindowFlags};

use crate::catalog::{Catalog, CatalogEntry, CatalogError};
use crate::config::{CatalogSource, RoomDimensions};
use crate::editor::{
    properties::{PropertyField, PropertyForm},
    Editor,
};
use crate::gfx::gizmos::GizmoMode;

const SIDE_PANEL_WIDTH: f32 = 320.0;
const STATUS_BAR_HEIGHT: f32 = 30.0;
const MARGIN: f32 = 10.0;

/// Something the user asked for through a panel
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    AddModel(CatalogEntry),
    ApplyRoom(RoomDimensions),
    ToggleGrid,
    ToggleWalls,
    ResetCamera,
    TopView,
    SetGizmoMode(GizmoMode),
    DeleteSelected,
    Deselect,
    CommitProperty(PropertyField, String),
    StepProperty(PropertyField, f32),
}

/// What the catalog panel shows
#[derive(Debug, Clone)]
pub enum CatalogView {
    Ready(Catalog),
    Failed { message: String, hint: Option<String> },
}

impl CatalogView {
    pub fn from_result(result: Result<Catalog, CatalogError>, source: &CatalogSource) -> Self {
        match result {
            Ok(catalog) => CatalogView::Ready(catalog),
            Err(CatalogError::NoModels) => CatalogView::Failed {
                message: format!("No model files found in {}/", source.folder),
                hint: None,
            },
            Err(e) => CatalogView::Failed {
                message: format!("Could not load model list: {}", e),
                hint: source.local_folder.is_none().then(|| {
                    format!(
                        "Check that the branch '{}' is correct (main or master).",
                        source.branch
                    )
                }),
            },
        }
    }
}

/// Text buffers and toggles that live across frames
pub struct UiState {
    pub search: String,
    pub show_touch_controls: bool,
    room_inputs: [String; 3],
    property_buffers: [String; 6],
    editing: Option<PropertyField>,
}

impl UiState {
    pub fn new(room: RoomDimensions, show_touch_controls: bool) -> Self {
        let mut state = Self {
            search: String::new(),
            show_touch_controls,
            room_inputs: Default::default(),
            property_buffers: Default::default(),
            editing: None,
        };
        state.sync_room(room);
        state
    }

    /// Shows the dimensions actually in use
    pub fn sync_room(&mut self, room: RoomDimensions) {
        self.room_inputs = [room.width, room.length, room.height].map(|v| v.to_string());
    }

    /// Refreshes every property field except the one being typed into
    pub fn sync_properties(&mut self, form: Option<&PropertyForm>) {
        let Some(form) = form else {
            self.editing = None;
            return;
        };
        for (field, buffer) in PropertyField::ALL.iter().zip(self.property_buffers.iter_mut()) {
            if self.editing != Some(*field) {
                *buffer = form.value(*field).to_string();
            }
        }
    }

    fn room_dimensions(&self) -> RoomDimensions {
        let [w, l, h] = &self.room_inputs;
        RoomDimensions::parse(w, l, h)
    }
}

/// Builds every panel for one frame
pub fn draw_panels(
    ui: &imgui::Ui,
    state: &mut UiState,
    catalog: &CatalogView,
    editor: &Editor,
) -> Vec<UiAction> {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return Vec::new();
    }

    let form = editor.property_form();
    state.sync_properties(form.as_ref());

    let mut actions = Vec::new();
    catalog_panel(ui, state, catalog, display_size, &mut actions);
    room_panel(ui, state, editor, display_size, &mut actions);
    properties_panel(ui, state, form.as_ref(), display_size, &mut actions);
    gizmo_toolbar(ui, editor, display_size, &mut actions);
    if state.show_touch_controls {
        touch_sheet(ui, form.as_ref(), display_size, &mut actions);
    }
    status_bar(ui, editor.status(), display_size);
    actions
}

fn catalog_panel(
    ui: &imgui::Ui,
    state: &mut UiState,
    catalog: &CatalogView,
    display_size: [f32; 2],
    actions: &mut Vec<UiAction>,
) {
    let height = display_size[1] - STATUS_BAR_HEIGHT - 2.0 * MARGIN;
    ui.window("Models")
        .position([MARGIN, MARGIN], Condition::FirstUseEver)
        .size([SIDE_PANEL_WIDTH, height], Condition::FirstUseEver)
        .collapsible(true)
        .build(|| match catalog {
            CatalogView::Failed { message, hint } => {
                ui.text_wrapped(message);
                if let Some(hint) = hint {
                    ui.spacing();
                    ui.text_disabled(hint);
                }
            }
            CatalogView::Ready(catalog) => {
                ui.set_next_item_width(-1.0);
                ui.input_text("##search", &mut state.search)
                    .hint("Search models...")
                    .build();
                ui.separator();

                let groups = catalog.grouped(&state.search);
                if groups.is_empty() {
                    ui.text_disabled("No models found");
                    return;
                }
                for group in groups {
                    ui.text_disabled(group.category.label());
                    for entry in group.entries {
                        let label = format!(
                            "[{}] {}  ({})##{}",
                            entry.icon.badge, entry.name, entry.file, entry.file
                        );
                        if ui.selectable(label) {
                            actions.push(UiAction::AddModel(entry.clone()));
                        }
                    }
                    ui.spacing();
                }
            }
        });
}

fn room_panel(
    ui: &imgui::Ui,
    state: &mut UiState,
    editor: &Editor,
    display_size: [f32; 2],
    actions: &mut Vec<UiAction>,
) {
    let x = display_size[0] - SIDE_PANEL_WIDTH - MARGIN;
    ui.window("Room")
        .position([x, MARGIN], Condition::FirstUseEver)
        .size([SIDE_PANEL_WIDTH, 230.0], Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            let labels = ["Width (m)", "Length (m)", "Height (m)"];
            for (label, input) in labels.iter().zip(state.room_inputs.iter_mut()) {
                ui.input_text(label, input)
                    .chars_decimal(true)
                    .build();
            }
            if ui.button("Apply") {
                actions.push(UiAction::ApplyRoom(state.room_dimensions()));
            }
            ui.separator();

            let room = editor.room();
            let mut grid = room.grid_visible();
            if ui.checkbox("Grid", &mut grid) {
                actions.push(UiAction::ToggleGrid);
            }
            ui.same_line();
            let mut walls = room.walls_visible();
            if ui.checkbox("Walls", &mut walls) {
                actions.push(UiAction::ToggleWalls);
            }

            if ui.button("Reset camera") {
                actions.push(UiAction::ResetCamera);
            }
            ui.same_line();
            if ui.button("Top view") {
                actions.push(UiAction::TopView);
            }
            ui.checkbox("Touch controls", &mut state.show_touch_controls);
        });
}

fn properties_panel(
    ui: &imgui::Ui,
    state: &mut UiState,
    form: Option<&PropertyForm>,
    display_size: [f32; 2],
    actions: &mut Vec<UiAction>,
) {
    let x = display_size[0] - SIDE_PANEL_WIDTH - MARGIN;
    ui.window("Properties")
        .position([x, 250.0], Condition::FirstUseEver)
        .size([SIDE_PANEL_WIDTH, 260.0], Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            let Some(form) = form else {
                ui.text_disabled("No object selected");
                return;
            };

            ui.text(&form.name);
            ui.separator();

            for (field, buffer) in PropertyField::ALL.iter().zip(state.property_buffers.iter_mut()) {
                let entered = ui
                    .input_text(field.label(), buffer)
                    .enter_returns_true(true)
                    .build();
                let committed = entered || ui.is_item_deactivated_after_edit();

                if ui.is_item_active() {
                    state.editing = Some(*field);
                } else if state.editing == Some(*field) {
                    state.editing = None;
                }
                if committed {
                    actions.push(UiAction::CommitProperty(*field, buffer.clone()));
                }
            }

            ui.spacing();
            if ui.button("Delete") {
                actions.push(UiAction::DeleteSelected);
            }
            ui.same_line();
            if ui.button("Deselect") {
                actions.push(UiAction::Deselect);
            }
        });
}

fn gizmo_toolbar(
    ui: &imgui::Ui,
    editor: &Editor,
    display_size: [f32; 2],
    actions: &mut Vec<UiAction>,
) {
    let flags = WindowFlags::NO_TITLE_BAR
        | WindowFlags::NO_RESIZE
        | WindowFlags::ALWAYS_AUTO_RESIZE
        | WindowFlags::NO_SAVED_SETTINGS;
    ui.window("##gizmo_toolbar")
        .position([display_size[0] * 0.5 - 150.0, MARGIN], Condition::FirstUseEver)
        .flags(flags)
        .build(|| {
            let current = editor.gizmo().mode();
            for (i, mode) in GizmoMode::ALL.iter().enumerate() {
                if i > 0 {
                    ui.same_line();
                }
                let label = format!("{} ({})", mode.label(), mode.shortcut());
                if ui.radio_button_bool(label, current == *mode) && current != *mode {
                    actions.push(UiAction::SetGizmoMode(*mode));
                }
            }
        });
}

fn touch_sheet(
    ui: &imgui::Ui,
    form: Option<&PropertyForm>,
    display_size: [f32; 2],
    actions: &mut Vec<UiAction>,
) {
    let Some(form) = form else {
        return;
    };
    let y = display_size[1] - STATUS_BAR_HEIGHT - 250.0 - MARGIN;
    ui.window("Adjust")
        .position([display_size[0] * 0.5 - 160.0, y], Condition::FirstUseEver)
        .size([320.0, 250.0], Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            ui.text(&form.name);
            ui.separator();
            for field in PropertyField::ALL {
                if ui.button(format!(" - ##{:?}", field)) {
                    actions.push(UiAction::StepProperty(field, -1.0));
                }
                ui.same_line();
                if ui.button(format!(" + ##{:?}", field)) {
                    actions.push(UiAction::StepProperty(field, 1.0));
                }
                ui.same_line();
                ui.text(format!("{}: {}", field.label(), form.value(field)));
            }
            ui.spacing();
            if ui.button("Delete##touch") {
                actions.push(UiAction::DeleteSelected);
            }
            ui.same_line();
            if ui.button("Done##touch") {
                actions.push(UiAction::Deselect);
            }
        });
}

fn status_bar(ui: &imgui::Ui, status: &str, display_size: [f32; 2]) {
    let flags = WindowFlags::NO_TITLE_BAR
        | WindowFlags::NO_RESIZE
        | WindowFlags::NO_MOVE
        | WindowFlags::NO_SCROLLBAR
        | WindowFlags::NO_SAVED_SETTINGS;
    ui.window("##status_bar")
        .position([0.0, display_size[1] - STATUS_BAR_HEIGHT], Condition::Always)
        .size([display_size[0], STATUS_BAR_HEIGHT], Condition::Always)
        .flags(flags)
        .build(|| {
            ui.text(status);
        });
}

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::{load_model, loader::AssetLoader},
    catalog::{Catalog, GitHubListing, ListingSource, LocalListing},
    config::AppConfig,
    editor::{input::command_for_key, Editor},
    gfx::RenderEngine,
    ui::{draw_panels, CatalogView, UiAction, UiManager, UiState},
};

/// Window, GPU and UI state that exists once the event loop has resumed
struct Gpu {
    window: Arc<Window>,
    render_engine: RenderEngine,
    ui_manager: UiManager,
}

pub struct RoomArrangerApp {
    config: AppConfig,
    catalog: CatalogView,
    editor: Editor,
    loader: AssetLoader,
    ui_state: UiState,
    gpu: Option<Gpu>,
}

impl RoomArrangerApp {
    /// Fetches the catalog and prepares an empty room
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let catalog = CatalogView::from_result(fetch_catalog(&config), &config.catalog);
        if let CatalogView::Failed { message, .. } = &catalog {
            log::error!("{}", message);
        }

        let viewport = (config.window.width as f32, config.window.height as f32);
        let editor = Editor::new(config.room, config.catalog.clone(), viewport);
        let ui_state = UiState::new(editor.room().dimensions(), config.touch_controls);

        Ok(Self {
            catalog,
            editor,
            loader: AssetLoader::new()?,
            ui_state,
            gpu: None,
            config,
        })
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        for outcome in self.loader.poll() {
            self.editor.finish_placement(&outcome.entry, outcome.result);
        }

        let mut actions = Vec::new();
        let ui_ready = gpu.ui_manager.update_logic(&gpu.window, |ui| {
            actions = draw_panels(ui, &mut self.ui_state, &self.catalog, &self.editor);
        });
        for action in actions {
            apply_action(&mut self.editor, &mut self.ui_state, &mut self.loader, action);
        }

        gpu.render_engine.prepare(&mut self.editor);

        let ui_manager = &mut gpu.ui_manager;
        let draw_ui = |device: &wgpu::Device,
                       queue: &wgpu::Queue,
                       encoder: &mut wgpu::CommandEncoder,
                       view: &wgpu::TextureView| {
            ui_manager.render_display_only(device, queue, encoder, view);
        };
        let result = gpu
            .render_engine
            .render_frame(&self.editor, ui_ready.then_some(draw_ui));
        if let Err(e) = result {
            log::error!("Failed to render frame: {}", e);
        }
    }
}

impl ApplicationHandler for RoomArrangerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let window_config = &self.config.window;
        let attributes = WindowAttributes::default()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = window.inner_size().into();
        let render_engine = match pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            window_config.vsync,
        )) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Failed to initialise rendering: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let mut ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);
        self.editor.resize(width, height);

        self.gpu = Some(Gpu {
            window,
            render_engine,
            ui_manager,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        if matches!(event, WindowEvent::Touch(_)) {
            self.ui_state.show_touch_controls = true;
        }

        // UI gets the event first
        if gpu.ui_manager.handle_event(&gpu.window, window_id, &event) {
            // A release over a panel still ends a drag started in the viewport
            if let WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } = event
            {
                self.editor.cancel_pointer();
            }
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if gpu.ui_manager.wants_text_input() {
                    return;
                }
                if let Some(command) = command_for_key(&logical_key) {
                    self.editor.execute(command);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                gpu.render_engine.resize(width, height);
                gpu.ui_manager.update_display_size(width, height);
                self.editor.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            other => {
                self.editor.handle_window_event(&other);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn fetch_catalog(config: &AppConfig) -> Result<Catalog, crate::catalog::CatalogError> {
    let source: Box<dyn ListingSource> = match &config.catalog.local_folder {
        Some(folder) => Box::new(LocalListing::new(folder.clone())),
        None => Box::new(GitHubListing::new(config.catalog.clone())),
    };
    Catalog::fetch(source.as_ref())
}

/// Carries out one panel request against the editor
fn apply_action(
    editor: &mut Editor,
    ui_state: &mut UiState,
    loader: &mut AssetLoader,
    action: UiAction,
) {
    match action {
        UiAction::AddModel(entry) => {
            let source = editor.begin_placement(&entry);
            if loader.request(entry.clone(), source.clone()).is_none() {
                let result = load_model(&source, entry.format);
                editor.finish_placement(&entry, result);
            }
        }
        UiAction::ApplyRoom(dimensions) => {
            editor.apply_room(dimensions);
            ui_state.sync_room(editor.room().dimensions());
        }
        UiAction::ToggleGrid => {
            editor.toggle_grid();
        }
        UiAction::ToggleWalls => {
            editor.toggle_walls();
        }
        UiAction::ResetCamera => editor.reset_camera(),
        UiAction::TopView => editor.top_view(),
        UiAction::SetGizmoMode(mode) => editor.set_gizmo_mode(mode),
        UiAction::DeleteSelected => editor.delete_selected(),
        UiAction::Deselect => editor.deselect(),
        UiAction::CommitProperty(field, text) => {
            if let Err(e) = editor.commit_property(field, &text) {
                log::debug!("Ignoring {} input: {}", field.label(), e);
            }
        }
        UiAction::StepProperty(field, direction) => editor.step_property(field, direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogSource, RoomDimensions};
    use crate::editor::properties::PropertyField;
    use crate::gfx::gizmos::GizmoMode;

    fn setup() -> (Editor, UiState, AssetLoader) {
        let editor = Editor::new(RoomDimensions::DEFAULT, CatalogSource::default(), (800.0, 600.0));
        let ui_state = UiState::new(RoomDimensions::DEFAULT, false);
        (editor, ui_state, AssetLoader::new().unwrap())
    }

    #[test]
    fn test_room_action_updates_editor() {
        let (mut editor, mut ui_state, mut loader) = setup();
        let dims = RoomDimensions::parse("6", "5", "2.5");
        apply_action(&mut editor, &mut ui_state, &mut loader, UiAction::ApplyRoom(dims));
        assert_eq!(editor.room().dimensions(), dims);
        assert_eq!(editor.status(), "Room updated: 6m × 5m × 2.5m");

        apply_action(&mut editor, &mut ui_state, &mut loader, UiAction::ToggleGrid);
        assert!(!editor.room().grid_visible());
    }

    #[test]
    fn test_gizmo_and_property_actions_without_selection() {
        let (mut editor, mut ui_state, mut loader) = setup();
        apply_action(
            &mut editor,
            &mut ui_state,
            &mut loader,
            UiAction::SetGizmoMode(GizmoMode::Scale),
        );
        assert_eq!(editor.gizmo().mode(), GizmoMode::Scale);

        apply_action(
            &mut editor,
            &mut ui_state,
            &mut loader,
            UiAction::CommitProperty(PropertyField::PositionX, "3".to_string()),
        );
        apply_action(&mut editor, &mut ui_state, &mut loader, UiAction::DeleteSelected);
        assert!(editor.selected().is_none());
        assert!(editor.scene().is_empty());
    }
}

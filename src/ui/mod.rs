//! Dear ImGui front end
//!
//! [`UiManager`] owns the ImGui context and draws it over the scene;
//! [`panel`] builds the catalog, room, properties and gizmo panels.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{draw_panels, CatalogView, UiAction, UiState};

//! Single-object selection

use crate::gfx::scene::object::ObjectId;

pub const IDLE_HINT: &str = "Tap an object to select • Tap a model in the panel to add";

pub fn selected_message(name: &str) -> String {
    format!("Selected: {} • W/E/R to switch gizmo mode", name)
}

/// At most one selected object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<ObjectId>,
}

impl Selection {
    pub fn get(&self) -> Option<ObjectId> {
        self.current
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.current == Some(id)
    }

    /// Replaces any previous selection
    pub fn select(&mut self, id: ObjectId) {
        self.current = Some(id);
    }

    /// Returns the id that was selected, if any
    pub fn clear(&mut self) -> Option<ObjectId> {
        self.current.take()
    }
}

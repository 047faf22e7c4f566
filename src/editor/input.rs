//! Keyboard shortcuts
//!
//! Letters are matched on the logical key, so W/E/R follow the active
//! keyboard layout.

use winit::keyboard::{Key, NamedKey};

use crate::gfx::gizmos::GizmoMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    SetGizmoMode(GizmoMode),
    DeleteSelected,
    Deselect,
}

pub fn command_for_key(key: &Key) -> Option<EditorCommand> {
    match key {
        Key::Character(text) => match text.to_lowercase().as_str() {
            "w" => Some(EditorCommand::SetGizmoMode(GizmoMode::Translate)),
            "e" => Some(EditorCommand::SetGizmoMode(GizmoMode::Rotate)),
            "r" => Some(EditorCommand::SetGizmoMode(GizmoMode::Scale)),
            _ => None,
        },
        Key::Named(NamedKey::Delete | NamedKey::Backspace) => Some(EditorCommand::DeleteSelected),
        Key::Named(NamedKey::Escape) => Some(EditorCommand::Deselect),
        _ => None,
    }
}

//! Room Arranger
//!
//! A 3D room editor built on wgpu and winit: browse a model catalog, drop
//! furniture into a room and arrange it with an orbit camera and transform
//! gizmos.

pub mod app;
pub mod assets;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod gfx;
pub mod ui;
pub mod wgpu_utils;

pub use app::RoomArrangerApp;
pub use config::AppConfig;

/// Loads the catalog and runs the editor window until it is closed
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    RoomArrangerApp::new(config)?.run()
}

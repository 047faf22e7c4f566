//! Render pipelines and the per-frame draw of the editor state

pub mod pipeline_manager;
pub mod render_engine;

pub use pipeline_manager::{PipelineConfig, PipelineManager, VertexKind};
pub use render_engine::RenderEngine;

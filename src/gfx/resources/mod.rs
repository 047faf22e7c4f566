//! GPU resources shared by every pipeline: global uniforms and the depth buffer

pub mod global_bindings;
pub mod texture_resource;

pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, GlobalUniform, LightRig};
pub use texture_resource::TextureResource;

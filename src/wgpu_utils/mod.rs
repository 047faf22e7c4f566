//! Thin wrappers around wgpu buffers

pub mod uniform_buffer;

pub use uniform_buffer::{UniformBuffer, VertexArrayBuffer};

//! # Graphics Module
//!
//! Everything between editor state and pixels.
//!
//! - **Camera** ([`camera`]) - orbit camera and its pointer controller
//! - **Geometry** ([`geometry`]) - boxes, planes and line lists built on the CPU
//! - **Gizmos** ([`gizmos`]) - translate / rotate / scale handles
//! - **Picking** ([`picking`]) - screen rays, bounding boxes, hit tests
//! - **Rendering** ([`rendering`]) - pipelines and the frame draw
//! - **Resources** ([`resources`]) - global uniforms and the depth buffer
//! - **Scene** ([`scene`]) - placed objects and the room shell

pub mod camera;
pub mod geometry;
pub mod gizmos;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::OrbitCamera;
pub use rendering::RenderEngine;

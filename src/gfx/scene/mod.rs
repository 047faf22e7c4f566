//! # Scene Module
//!
//! CPU-side scene data: placed furniture, the room shell and the vertex
//! layouts both are drawn with.
//!
//! - [`Scene`] - placed objects keyed by [`ObjectId`]
//! - [`PlacedObject`] - one furniture item made of [`Mesh`]es and a [`Transform`]
//! - [`Room`] - floor, walls, skirting and grid for the current dimensions
//! - [`Vertex3D`] / [`LineVertex`] - GPU vertex formats

pub mod object;
pub mod room;
pub mod scene;
pub mod vertex;

pub use object::{DrawMesh, Mesh, ObjectId, PlacedObject, Transform};
pub use room::Room;
pub use scene::Scene;
pub use vertex::{LineVertex, Vertex3D};

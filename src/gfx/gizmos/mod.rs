//! # Gizmos
//!
//! On-screen manipulation handles. [`TransformGizmo`] moves, rotates and
//! scales the selected object.

pub mod transform_gizmo;

pub use transform_gizmo::{Axis, GizmoMode, TransformGizmo, MIN_SCALE};

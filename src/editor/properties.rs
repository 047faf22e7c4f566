//! Editable transform fields for the selected object
//!
//! Values are shown as text (position and scale with two decimals, the Y
//! rotation in degrees with one) and parsed back on commit. Touch layouts use
//! fixed-size steps instead of typing.

use cgmath::{Deg, Rad};
use thiserror::Error;

use crate::gfx::scene::object::Transform;

pub const MIN_SCALE: f32 = 0.01;
pub const POSITION_STEP: f32 = 0.1;
pub const ROTATION_STEP_DEGREES: f32 = 15.0;
pub const SCALE_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    PositionX,
    PositionZ,
    RotationY,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl PropertyField {
    pub const ALL: [PropertyField; 6] = [
        PropertyField::PositionX,
        PropertyField::PositionZ,
        PropertyField::RotationY,
        PropertyField::ScaleX,
        PropertyField::ScaleY,
        PropertyField::ScaleZ,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PropertyField::PositionX => "Position X",
            PropertyField::PositionZ => "Position Z",
            PropertyField::RotationY => "Rotation Y°",
            PropertyField::ScaleX => "Scale X",
            PropertyField::ScaleY => "Scale Y",
            PropertyField::ScaleZ => "Scale Z",
        }
    }

    fn step_size(&self) -> f32 {
        match self {
            PropertyField::PositionX | PropertyField::PositionZ => POSITION_STEP,
            PropertyField::RotationY => ROTATION_STEP_DEGREES,
            _ => SCALE_STEP,
        }
    }

    /// Current value in display units (degrees for rotation)
    pub fn read(&self, transform: &Transform) -> f32 {
        match self {
            PropertyField::PositionX => transform.position.x,
            PropertyField::PositionZ => transform.position.z,
            PropertyField::RotationY => Deg::from(Rad(transform.rotation.y)).0,
            PropertyField::ScaleX => transform.scale.x,
            PropertyField::ScaleY => transform.scale.y,
            PropertyField::ScaleZ => transform.scale.z,
        }
    }

    /// Writes a value in display units; scale is clamped to [`MIN_SCALE`]
    pub fn write(&self, transform: &mut Transform, value: f32) {
        match self {
            PropertyField::PositionX => transform.position.x = value,
            PropertyField::PositionZ => transform.position.z = value,
            PropertyField::RotationY => transform.rotation.y = Rad::from(Deg(value)).0,
            PropertyField::ScaleX => transform.scale.x = value.max(MIN_SCALE),
            PropertyField::ScaleY => transform.scale.y = value.max(MIN_SCALE),
            PropertyField::ScaleZ => transform.scale.z = value.max(MIN_SCALE),
        }
    }

    pub fn format(&self, transform: &Transform) -> String {
        let value = self.read(transform);
        match self {
            PropertyField::RotationY => format!("{:.1}", value),
            _ => format!("{:.2}", value),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PropertyError {
    #[error("{field:?}: '{text}' is not a number")]
    NotANumber { field: PropertyField, text: String },
}

/// Parses `text` and applies it to the field
///
/// Unparsable or non-finite input leaves the transform untouched.
pub fn apply_edit(
    transform: &mut Transform,
    field: PropertyField,
    text: &str,
) -> Result<(), PropertyError> {
    let value = text
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| PropertyError::NotANumber {
            field,
            text: text.to_string(),
        })?;
    field.write(transform, value);
    Ok(())
}

/// Moves the field one step up (`direction` > 0) or down
pub fn step(transform: &mut Transform, field: PropertyField, direction: f32) {
    let value = field.read(transform) + field.step_size() * direction.signum();
    field.write(transform, value);
}

/// Text shown in every field for the current transform
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyForm {
    pub name: String,
    pub values: [String; 6],
}

impl PropertyForm {
    pub fn new(name: &str, transform: &Transform) -> Self {
        Self {
            name: name.to_string(),
            values: PropertyField::ALL.map(|field| field.format(transform)),
        }
    }

    pub fn value(&self, field: PropertyField) -> &str {
        let index = PropertyField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or(0);
        &self.values[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn sample() -> Transform {
        Transform {
            position: Vector3::new(1.234, 0.5, -2.0),
            rotation: Vector3::new(0.0, std::f32::consts::FRAC_PI_4, 0.0),
            scale: Vector3::new(1.0, 2.5, 0.333),
        }
    }

    #[test]
    fn test_form_formatting() {
        let form = PropertyForm::new("Chair", &sample());
        assert_eq!(form.name, "Chair");
        assert_eq!(form.value(PropertyField::PositionX), "1.23");
        assert_eq!(form.value(PropertyField::PositionZ), "-2.00");
        assert_eq!(form.value(PropertyField::RotationY), "45.0");
        assert_eq!(form.value(PropertyField::ScaleY), "2.50");
        assert_eq!(form.value(PropertyField::ScaleZ), "0.33");
    }

    #[test]
    fn test_apply_edit() {
        let mut transform = sample();
        apply_edit(&mut transform, PropertyField::PositionZ, " 3.5 ").unwrap();
        assert_eq!(transform.position.z, 3.5);

        apply_edit(&mut transform, PropertyField::RotationY, "90").unwrap();
        assert!((transform.rotation.y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

        apply_edit(&mut transform, PropertyField::ScaleX, "-4").unwrap();
        assert_eq!(transform.scale.x, MIN_SCALE);
    }

    #[test]
    fn test_invalid_edit_leaves_transform() {
        let mut transform = sample();
        let err = apply_edit(&mut transform, PropertyField::PositionX, "abc").unwrap_err();
        assert!(matches!(err, PropertyError::NotANumber { .. }));
        assert!(apply_edit(&mut transform, PropertyField::ScaleY, "NaN").is_err());
        assert_eq!(transform, sample());
    }

    #[test]
    fn test_steps() {
        let mut transform = Transform::default();
        step(&mut transform, PropertyField::PositionX, 1.0);
        assert!((transform.position.x - 0.1).abs() < 1e-6);

        step(&mut transform, PropertyField::RotationY, -1.0);
        assert!((PropertyField::RotationY.read(&transform) + 15.0).abs() < 1e-4);

        for _ in 0..20 {
            step(&mut transform, PropertyField::ScaleY, -1.0);
        }
        assert_eq!(transform.scale.y, MIN_SCALE);
    }
}

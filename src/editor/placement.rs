//! Turning loaded models (or load failures) into placed objects

use crate::assets::ModelData;
use crate::catalog::{CatalogEntry, Category};
use crate::gfx::scene::{
    object::{Mesh, ObjectId, PlacedObject},
    vertex::hsl_color,
};

pub fn loading_message(name: &str) -> String {
    format!("Loading {}…", name)
}

pub fn added_message(name: &str) -> String {
    format!("Added {} • Use gizmos to position", name)
}

pub fn placeholder_message(file: &str) -> String {
    format!("⚠ {} not found — showing placeholder box", file)
}

/// Stand-in box size (width, height, depth) per category
pub fn placeholder_size(category: Category) -> [f32; 3] {
    match category {
        Category::Seating => [0.8, 0.9, 0.9],
        Category::Tables => [1.2, 0.75, 0.7],
        Category::Storage => [0.9, 1.8, 0.45],
        Category::Bedroom => [1.6, 0.5, 2.0],
        Category::Decor => [0.3, 1.5, 0.3],
        _ => [1.0, 1.0, 1.0],
    }
}

/// Stable color derived from the first character of the name
pub fn placeholder_color(name: &str) -> [f32; 3] {
    let code = name.encode_utf16().next().unwrap_or(0) as u32;
    let hue = (code * 37) % 360;
    hsl_color(hue as f32, 0.4, 0.45)
}

/// Builds an object from a decoded model: pivot centred, resting on the floor
pub fn object_from_model(id: ObjectId, entry: &CatalogEntry, model: ModelData) -> PlacedObject {
    let meshes = model
        .parts
        .into_iter()
        .map(|part| Mesh::from_geometry(part.geometry, part.color))
        .collect();

    let mut object = PlacedObject::new(id, entry.name.clone(), entry.file.clone(), meshes);
    object.center_on_origin();
    object.snap_to_floor();
    object
}

/// Box sized and colored for the entry's category, resting on the floor
pub fn placeholder_object(id: ObjectId, entry: &CatalogEntry) -> PlacedObject {
    let mesh = Mesh::cuboid(
        placeholder_size(entry.category),
        placeholder_color(&entry.name),
    );
    let mut object = PlacedObject::new(id, entry.name.clone(), entry.file.clone(), vec![mesh]);
    object.placeholder = true;
    object.snap_to_floor();
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MeshData;
    use crate::gfx::geometry::generate_box;
    use cgmath::Vector3;

    fn entry(file: &str) -> CatalogEntry {
        CatalogEntry::from_file(file).unwrap()
    }

    #[test]
    fn test_placeholder_sizes() {
        assert_eq!(placeholder_size(Category::Seating), [0.8, 0.9, 0.9]);
        assert_eq!(placeholder_size(Category::Bathroom), [1.0, 1.0, 1.0]);
        assert_eq!(placeholder_size(Category::Other), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_placeholder_color_from_first_char() {
        // 'S' = 83, 83 * 37 % 360 = 191
        assert_eq!(placeholder_color("Sofa"), hsl_color(191.0, 0.4, 0.45));
        assert_eq!(placeholder_color("Sofa"), placeholder_color("Stool"));
    }

    #[test]
    fn test_placeholder_rests_on_floor() {
        let object = placeholder_object(ObjectId(3), &entry("wooden_table.glb"));
        let bounds = object.world_bounds();
        assert!(object.placeholder);
        assert_eq!(object.name, "Wooden Table");
        assert!(bounds.min.y.abs() < 1e-5);
        assert!((bounds.size().x - 1.2).abs() < 1e-5);
        assert!((bounds.max.y - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_model_centred_and_snapped() {
        let geometry = generate_box(2.0, 1.0, 2.0)
            .transformed(cgmath::Matrix4::from_translation(Vector3::new(5.0, 3.0, -4.0)));
        let model = ModelData {
            parts: vec![MeshData {
                geometry,
                color: [0.5; 3],
            }],
        };

        let object = object_from_model(ObjectId(1), &entry("armchair.glb"), model);
        let bounds = object.world_bounds();
        assert!(!object.placeholder);
        assert!(bounds.center().x.abs() < 1e-4);
        assert!(bounds.center().z.abs() < 1e-4);
        assert!(bounds.min.y.abs() < 1e-4);
    }
}

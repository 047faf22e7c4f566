use wgpu::Device;

use super::object::{ObjectId, PlacedObject};

/// Emissive tint added to the selected object
pub const SELECTION_EMISSIVE: [f32; 3] = [0.09, 0.14, 0.25];

/// All furniture placed in the room, in insertion order
#[derive(Default)]
pub struct Scene {
    objects: Vec<PlacedObject>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh identifier; ids are never reused
    pub fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    pub fn insert(&mut self, object: PlacedObject) -> ObjectId {
        let id = object.id;
        self.next_id = self.next_id.max(id.0);
        self.objects.push(object);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<PlacedObject> {
        let index = self.objects.iter().position(|object| object.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PlacedObject> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Uploads meshes of newly placed objects
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        for object in self.objects.iter_mut().filter(|object| !object.is_uploaded()) {
            object.init_gpu_resources(device, layout);
        }
    }

    /// Writes model matrices, tinting the selected object
    pub fn update_gpu(&mut self, queue: &wgpu::Queue, selected: Option<ObjectId>) {
        for object in &mut self.objects {
            let emissive = if Some(object.id) == selected {
                SELECTION_EMISSIVE
            } else {
                [0.0; 3]
            };
            object.update_gpu(queue, emissive);
        }
    }
}

//! # Model Assets
//!
//! Fetches model files from a local folder or over HTTP and decodes them into
//! flat, colored triangle meshes. Binary glTF goes through `gltf`, Wavefront
//! OBJ through `tobj`. Node transforms are baked into the vertices so every
//! model arrives in a single model space.

pub mod loader;

use std::{
    io::{BufReader, Cursor, Read},
    path::{Path, PathBuf},
};

use cgmath::{Matrix4, SquareMatrix};
use thiserror::Error;

use crate::catalog::ModelFormat;
use crate::gfx::geometry::GeometryData;

pub use loader::{AssetLoader, LoadOutcome, LoadRequest};

/// Largest download accepted for a single model
const MAX_DOWNLOAD_BYTES: u64 = 128 * 1024 * 1024;
const DEFAULT_COLOR: [f32; 3] = [0.7, 0.7, 0.7];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("download of {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("invalid OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("model contains no triangles")]
    Empty,
}

/// Where a model's bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSource {
    Local(PathBuf),
    Remote(String),
}

impl AssetSource {
    pub fn describe(&self) -> String {
        match self {
            AssetSource::Local(path) => path.display().to_string(),
            AssetSource::Remote(url) => url.clone(),
        }
    }

    pub fn fetch(&self) -> Result<Vec<u8>, AssetError> {
        match self {
            AssetSource::Local(path) => std::fs::read(path).map_err(|source| AssetError::Io {
                path: path.display().to_string(),
                source,
            }),
            AssetSource::Remote(url) => download(url),
        }
    }

    /// Folder next to the model, for OBJ material libraries
    fn sibling_dir(&self) -> Option<&Path> {
        match self {
            AssetSource::Local(path) => path.parent(),
            AssetSource::Remote(_) => None,
        }
    }
}

fn download(url: &str) -> Result<Vec<u8>, AssetError> {
    let response = ureq::get(url)
        .set("User-Agent", concat!("room-arranger/", env!("CARGO_PKG_VERSION")))
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(status, _) => AssetError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => AssetError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        })?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DOWNLOAD_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|source| AssetError::Io {
            path: url.to_string(),
            source,
        })?;
    Ok(bytes)
}

/// One colored part of a model
#[derive(Debug, Clone)]
pub struct MeshData {
    pub geometry: GeometryData,
    pub color: [f32; 3],
}

/// Decoded model, parts in model space
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub parts: Vec<MeshData>,
}

impl ModelData {
    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|part| part.geometry.triangle_count()).sum()
    }
}

/// Fetches and decodes a model
pub fn load_model(source: &AssetSource, format: ModelFormat) -> Result<ModelData, AssetError> {
    let bytes = source.fetch()?;
    let model = match format {
        ModelFormat::Glb => decode_glb(&bytes)?,
        ModelFormat::Obj => decode_obj(&bytes, source.sibling_dir())?,
    };

    if model.triangle_count() == 0 {
        return Err(AssetError::Empty);
    }
    Ok(model)
}

/// Decodes a binary (or embedded) glTF document
pub fn decode_glb(bytes: &[u8]) -> Result<ModelData, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    let mut model = ModelData::default();

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Matrix4::identity(), &buffers, &mut model);
            }
        }
        // No scene graph: take the meshes as they are
        None => {
            for mesh in document.meshes() {
                collect_mesh(&mesh, Matrix4::identity(), &buffers, &mut model);
            }
        }
    }

    Ok(model)
}

fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) {
    let world = parent * Matrix4::from(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, world, buffers, model);
    }
    for child in node.children() {
        collect_node(&child, world, buffers, model);
    }
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    transform: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }

        let reader = primitive.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let vertices: Vec<[f32; 3]> = positions.collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|normals| normals.collect())
            .unwrap_or_default();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };

        let base = primitive.material().pbr_metallic_roughness().base_color_factor();
        let geometry = GeometryData {
            vertices,
            normals,
            indices,
        }
        .transformed(transform);

        model.parts.push(MeshData {
            geometry,
            color: [base[0], base[1], base[2]],
        });
    }
}

/// Decodes a Wavefront OBJ file; materials are looked up in `mtl_dir`
pub fn decode_obj(bytes: &[u8], mtl_dir: Option<&Path>) -> Result<ModelData, AssetError> {
    let mut reader = BufReader::new(Cursor::new(bytes));
    let (models, materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |path| match mtl_dir {
            Some(dir) => tobj::load_mtl(dir.join(path)),
            None => Err(tobj::LoadError::OpenFileFailed),
        },
    )?;

    let materials = materials.unwrap_or_else(|e| {
        log::debug!("No OBJ materials ({}), using default color", e);
        Vec::new()
    });

    let parts = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            let color = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .and_then(|material| material.diffuse)
                .unwrap_or(DEFAULT_COLOR);
            MeshData {
                geometry: GeometryData {
                    vertices: mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect(),
                    normals: mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect(),
                    indices: mesh.indices,
                },
                color,
            }
        })
        .collect();

    Ok(ModelData { parts })
}

//! Voxel type catalog: every placeable voxel type resolves to a mesh and a
//! material set held in a content-addressed asset store.
//!
//! The renderer consumes voxels by these handles. The simulation only needs
//! to know that a type is complete before a voxel of that type is placed.

use cubeworld_common::VoxelTypeId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Block types offered by the block picker, in picker order.
pub const PLACEABLE_BLOCKS: [&str; 10] = [
    "cobblestone",
    "plank",
    "brick",
    "diamond",
    "glowstone",
    "obsidian",
    "whitewool",
    "bluewool",
    "redwool",
    "netherrack",
];

/// Terrain block used when seeding a new world.
pub const GRASS: &str = "grass";

/// Block selected when a session starts.
pub const DEFAULT_BLOCK: &str = "cobblestone";

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// Geometry description for a voxel mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl Mesh {
    /// A cube with one quad per face.
    pub fn cube() -> Self {
        Self {
            name: "cube".into(),
            vertex_count: 24,
            index_count: 36,
        }
    }
}

/// A textured material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Texture image path; presentation only, never used as identity.
    pub texture: String,
}

impl Material {
    pub fn textured(name: &str) -> Self {
        Self {
            name: name.into(),
            texture: format!("./textures/{name}.png"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Asset {
    Mesh(Mesh),
    Material(Material),
}

/// Errors from resolving voxel types.
///
/// Every variant is fatal for the voxel being constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("unknown voxel type {0}")]
    UnknownVoxelType(VoxelTypeId),
    #[error("voxel type {0} has no geometry")]
    MissingGeometry(VoxelTypeId),
    #[error("voxel type {0} has no material")]
    MissingMaterial(VoxelTypeId),
}

/// Content-addressed asset registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return its asset ID.
    pub fn register_mesh(&mut self, mesh: Mesh) -> AssetId {
        let id = content_hash(&[
            b"mesh".as_slice(),
            mesh.name.as_bytes(),
            mesh.vertex_count.to_le_bytes().as_slice(),
            mesh.index_count.to_le_bytes().as_slice(),
        ]);
        self.assets.insert(id, Asset::Mesh(mesh));
        id
    }

    /// Register a material and return its asset ID.
    pub fn register_material(&mut self, material: Material) -> AssetId {
        let id = content_hash(&[
            b"material".as_slice(),
            material.name.as_bytes(),
            material.texture.as_bytes(),
        ]);
        self.assets.insert(id, Asset::Material(material));
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn get_mesh(&self, id: AssetId) -> Option<&Mesh> {
        match self.assets.get(&id) {
            Some(Asset::Mesh(m)) => Some(m),
            _ => None,
        }
    }

    pub fn get_material(&self, id: AssetId) -> Option<&Material> {
        match self.assets.get(&id) {
            Some(Asset::Material(m)) => Some(m),
            _ => None,
        }
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Handles a voxel type is declared with. Either part may be missing in a
/// malformed definition; [`VoxelCatalog::resolve`] rejects those.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxelDefinition {
    pub mesh: Option<AssetId>,
    /// One material for all faces, or six in +x, -x, +y, -y, +z, -z order.
    pub materials: Vec<AssetId>,
}

/// A fully resolved voxel type: geometry plus per-face materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelVisual {
    pub type_id: VoxelTypeId,
    pub mesh: AssetId,
    pub materials: Vec<AssetId>,
}

/// Registry of voxel types and the assets backing them.
#[derive(Debug, Clone, Default)]
pub struct VoxelCatalog {
    assets: AssetStore,
    types: BTreeMap<VoxelTypeId, VoxelDefinition>,
}

impl VoxelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with grass and every placeable block.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        let cube = catalog.assets.register_mesh(Mesh::cube());

        let [side, top, bottom] = ["grass_dirt", "grass", "dirt"]
            .map(|texture| catalog.assets.register_material(Material::textured(texture)));
        catalog.define(
            VoxelTypeId::from(GRASS),
            VoxelDefinition {
                mesh: Some(cube),
                materials: vec![side, side, top, bottom, side, side],
            },
        );

        for name in PLACEABLE_BLOCKS {
            let material = catalog.assets.register_material(Material::textured(name));
            catalog.define(
                VoxelTypeId::from(name),
                VoxelDefinition {
                    mesh: Some(cube),
                    materials: vec![material],
                },
            );
        }
        tracing::debug!(
            types = catalog.len(),
            assets = catalog.assets.len(),
            "voxel catalog built"
        );
        catalog
    }

    /// Declare (or redeclare) a voxel type.
    pub fn define(&mut self, id: VoxelTypeId, definition: VoxelDefinition) {
        self.types.insert(id, definition);
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    pub fn contains(&self, id: &VoxelTypeId) -> bool {
        self.types.contains_key(id)
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &VoxelTypeId> {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a voxel type to its geometry and materials.
    ///
    /// Fails when the type is unknown, its mesh handle is absent or dangling,
    /// or it has no materials or a dangling material handle.
    pub fn resolve(&self, id: &VoxelTypeId) -> Result<VoxelVisual, AssetError> {
        let def = self
            .types
            .get(id)
            .ok_or_else(|| AssetError::UnknownVoxelType(id.clone()))?;

        let mesh = def
            .mesh
            .filter(|m| self.assets.get_mesh(*m).is_some())
            .ok_or_else(|| AssetError::MissingGeometry(id.clone()))?;

        let materials_ok = !def.materials.is_empty()
            && def
                .materials
                .iter()
                .all(|m| self.assets.get_material(*m).is_some());
        if !materials_ok {
            return Err(AssetError::MissingMaterial(id.clone()));
        }

        Ok(VoxelVisual {
            type_id: id.clone(),
            mesh,
            materials: def.materials.clone(),
        })
    }
}

fn content_hash(parts: &[&[u8]]) -> AssetId {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}

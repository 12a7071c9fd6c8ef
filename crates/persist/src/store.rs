//! File-backed save store.
//!
//! Layout inside the store directory:
//! ```text
//! map.json         - nested [x][y][z] voxel type names
//! position.json    - player center as [x, y, z]
//! direction.json   - camera {lat, lon} in degrees
//! save.meta.json   - schema version (optional on load)
//! ```

use cubeworld_assets::{AssetError, VoxelCatalog};
use cubeworld_input::Orientation;
use cubeworld_kernel::{ConfigError, GridError, NestedMap, World, WorldConfig, WorldError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::saved::SavedWorld;

const SAVE_SCHEMA_VERSION: u32 = 1;

const MAP_FILE: &str = "map.json";
const POSITION_FILE: &str = "position.json";
const DIRECTION_FILE: &str = "direction.json";
const META_FILE: &str = "save.meta.json";

/// Errors from saving or loading.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("saved map has the wrong shape: {0}")]
    Shape(#[from] GridError),
    #[error("saved map cannot be rendered: {0}")]
    Voxel(#[from] AssetError),
    #[error("invalid world config: {0}")]
    Config(#[from] ConfigError),
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
}

impl From<WorldError> for PersistError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::Config(e) => PersistError::Config(e),
            WorldError::Asset(e) => PersistError::Voxel(e),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveMeta {
    schema_version: u32,
}

/// A directory holding at most one save.
#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
}

impl SaveStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True only when all three documents exist and parse.
    pub fn has_save(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }

    /// Write all three documents. Each is written to a temporary file first
    /// and the files are renamed into place only once every write succeeded.
    pub fn save(&self, saved: &SavedWorld) -> Result<(), PersistError> {
        let _span = tracing::info_span!("save", root = %self.root.display()).entered();
        let staged = [
            (MAP_FILE, serde_json::to_vec(&saved.map)?),
            (POSITION_FILE, serde_json::to_vec(&saved.position)?),
            (DIRECTION_FILE, serde_json::to_vec(&saved.direction)?),
            (
                META_FILE,
                serde_json::to_vec_pretty(&SaveMeta {
                    schema_version: SAVE_SCHEMA_VERSION,
                })?,
            ),
        ];
        for (name, bytes) in &staged {
            std::fs::write(self.tmp_path(name), bytes)?;
        }
        for (name, _) in &staged {
            std::fs::rename(self.tmp_path(name), self.root.join(name))?;
        }
        tracing::debug!(size = saved.map.len(), "world saved");
        Ok(())
    }

    pub fn save_world(&self, world: &World) -> Result<(), PersistError> {
        self.save(&SavedWorld::capture(world))
    }

    /// Read the save. `Ok(None)` when any of the three documents is missing.
    pub fn load(&self) -> Result<Option<SavedWorld>, PersistError> {
        let names = [MAP_FILE, POSITION_FILE, DIRECTION_FILE];
        if names.iter().any(|name| !self.root.join(name).exists()) {
            tracing::debug!(root = %self.root.display(), "no complete save");
            return Ok(None);
        }

        let meta_path = self.root.join(META_FILE);
        if meta_path.exists() {
            let meta: SaveMeta = read_json(&meta_path)?;
            if meta.schema_version != SAVE_SCHEMA_VERSION {
                return Err(PersistError::SchemaMismatch {
                    file_version: meta.schema_version,
                    expected_version: SAVE_SCHEMA_VERSION,
                });
            }
        }

        let map: NestedMap = read_json(&self.root.join(MAP_FILE))?;
        let position: [f32; 3] = read_json(&self.root.join(POSITION_FILE))?;
        let direction: Orientation = read_json(&self.root.join(DIRECTION_FILE))?;
        Ok(Some(SavedWorld {
            map,
            position,
            direction,
        }))
    }

    /// Load and rebuild a world, if a save exists.
    pub fn load_world(
        &self,
        config: WorldConfig,
        catalog: VoxelCatalog,
    ) -> Result<Option<World>, PersistError> {
        match self.load()? {
            Some(saved) => saved.restore(config, catalog).map(Some),
            None => Ok(None),
        }
    }

    /// Delete every save document that exists.
    pub fn clear(&self) -> Result<(), PersistError> {
        for name in [MAP_FILE, POSITION_FILE, DIRECTION_FILE, META_FILE] {
            let path = self.root.join(name);
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn tmp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.tmp"))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

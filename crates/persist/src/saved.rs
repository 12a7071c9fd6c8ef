use cubeworld_assets::VoxelCatalog;
use cubeworld_input::Orientation;
use cubeworld_kernel::{NestedMap, SpatialGrid, World, WorldConfig};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::store::PersistError;

/// Everything a save holds: which voxel sits where, where the player
/// stands and where the camera looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWorld {
    /// `[x][y][z]` voxel type names, `null` for empty cells.
    pub map: NestedMap,
    pub position: [f32; 3],
    pub direction: Orientation,
}

impl SavedWorld {
    pub fn capture(world: &World) -> Self {
        Self {
            map: world.grid().to_nested(),
            position: world.body().position().to_array(),
            direction: world.orientation(),
        }
    }

    /// Rebuild a world. The map decides the grid size; `config` supplies
    /// everything else and must itself be valid.
    pub fn restore(
        &self,
        config: WorldConfig,
        catalog: VoxelCatalog,
    ) -> Result<World, PersistError> {
        config.validate()?;
        let grid = SpatialGrid::from_nested(&self.map, config.cube_size)?;
        let world = World::restore(
            config,
            catalog,
            grid,
            Vec3::from_array(self.position),
            self.direction,
        )?;
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeworld_common::VoxelTypeId;
    use glam::IVec3;

    fn small_config() -> WorldConfig {
        WorldConfig {
            grid_size: 12,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn capture_then_restore() {
        let mut world = World::generate(small_config(), VoxelCatalog::standard(), 5).unwrap();
        world.set_orientation(Orientation::new(-20.0, 45.0));
        world.place_voxel(IVec3::new(0, 0, 0)).unwrap();

        let saved = SavedWorld::capture(&world);
        assert_eq!(saved.map.len(), 12);
        assert_eq!(saved.map[0][0][0], Some(VoxelTypeId::from("cobblestone")));

        let restored = saved
            .restore(WorldConfig::default(), VoxelCatalog::standard())
            .unwrap();
        assert_eq!(restored.grid(), world.grid());
        assert_eq!(restored.body().position(), world.body().position());
        assert_eq!(restored.orientation(), world.orientation());
        assert_eq!(restored.config().grid_size, 12);
    }

    #[test]
    fn restore_rejects_unknown_types() {
        let world = World::new(small_config(), VoxelCatalog::standard()).unwrap();
        let mut saved = SavedWorld::capture(&world);
        saved.map[1][0][1] = Some(VoxelTypeId::from("bedrock"));
        let err = saved
            .restore(small_config(), VoxelCatalog::standard())
            .unwrap_err();
        assert!(matches!(err, PersistError::Voxel(_)));
    }

    #[test]
    fn restore_rejects_ragged_maps() {
        let world = World::new(small_config(), VoxelCatalog::standard()).unwrap();
        let mut saved = SavedWorld::capture(&world);
        saved.map[3].pop();
        let err = saved
            .restore(small_config(), VoxelCatalog::standard())
            .unwrap_err();
        assert!(matches!(err, PersistError::Shape(_)));
    }

    #[test]
    fn restore_rejects_invalid_config() {
        let world = World::new(small_config(), VoxelCatalog::standard()).unwrap();
        let saved = SavedWorld::capture(&world);
        for cube_size in [0.0, -1.0, f32::NAN] {
            let config = WorldConfig {
                cube_size,
                ..small_config()
            };
            let err = saved.restore(config, VoxelCatalog::standard()).unwrap_err();
            assert!(matches!(err, PersistError::Config(_)), "{err}");
        }
    }
}

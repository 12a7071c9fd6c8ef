use std::collections::BTreeMap;

use cubeworld_common::VoxelTypeId;
use cubeworld_kernel::World;
use glam::{IVec3, Vec3};

/// Read-only queries against a world for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    pub fn summary(world: &World) -> WorldSummary {
        let body = world.body();
        let orientation = world.orientation();
        WorldSummary {
            tick: world.tick_count(),
            grid_size: world.grid().size(),
            voxel_count: world.grid().occupied_count(),
            position: body.position(),
            cell: world.grid().cell_of(body.position()),
            lat: orientation.lat,
            lon: orientation.lon,
            grounded: world.motion().grounded,
            paused: world.is_paused(),
            selected: world.selected().clone(),
            pending_events: world.events().len(),
        }
    }

    /// What occupies `cell`, if it is inside the grid.
    pub fn inspect_cell(world: &World, cell: IVec3) -> Option<CellInfo> {
        let voxel = world.grid().get(cell).ok()?.cloned();
        Some(CellInfo {
            cell,
            voxel,
            center: world.grid().voxel_center(cell),
        })
    }

    /// Voxel count per type, in type name order.
    pub fn voxel_histogram(world: &World) -> BTreeMap<VoxelTypeId, usize> {
        let mut histogram = BTreeMap::new();
        for (_, voxel) in world.grid().iter_occupied() {
            *histogram.entry(voxel.clone()).or_insert(0) += 1;
        }
        tracing::trace!(types = histogram.len(), "voxel histogram");
        histogram
    }
}

/// Snapshot of the session state.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub tick: u64,
    pub grid_size: usize,
    pub voxel_count: usize,
    pub position: Vec3,
    /// Unclamped cell under the body center.
    pub cell: IVec3,
    pub lat: f32,
    pub lon: f32,
    pub grounded: bool,
    pub paused: bool,
    pub selected: VoxelTypeId,
    pub pending_events: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} grid={} voxels={} pos=({:.2}, {:.2}, {:.2}) cell={} \
             lat={:.2} lon={:.2} grounded={} paused={} selected={} pending_events={}",
            self.tick,
            self.grid_size,
            self.voxel_count,
            self.position.x,
            self.position.y,
            self.position.z,
            self.cell,
            self.lat,
            self.lon,
            self.grounded,
            self.paused,
            self.selected,
            self.pending_events,
        )
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellInfo {
    pub cell: IVec3,
    pub voxel: Option<VoxelTypeId>,
    pub center: Vec3,
}

impl std::fmt::Display for CellInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let voxel = self.voxel.as_ref().map_or("empty", VoxelTypeId::as_str);
        write!(
            f,
            "Cell {} {} center=({:.1}, {:.1}, {:.1})",
            self.cell, voxel, self.center.x, self.center.y, self.center.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeworld_assets::VoxelCatalog;
    use cubeworld_kernel::WorldConfig;

    fn world() -> World {
        let config = WorldConfig {
            grid_size: 20,
            ..WorldConfig::default()
        };
        World::new(config, VoxelCatalog::standard()).unwrap()
    }

    #[test]
    fn summary_empty_world() {
        let w = world();
        let summary = WorldInspector::summary(&w);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.voxel_count, 0);
        assert_eq!(summary.grid_size, 20);
        assert_eq!(summary.cell, IVec3::new(10, 0, 10));
        assert!(summary.grounded);
        assert_eq!(summary.selected.as_str(), "cobblestone");
    }

    #[test]
    fn summary_counts_voxels_and_events() {
        let mut w = world();
        w.place_voxel(IVec3::new(1, 0, 1)).unwrap();
        w.place_voxel(IVec3::new(2, 0, 1)).unwrap();
        let summary = WorldInspector::summary(&w);
        assert_eq!(summary.voxel_count, 2);
        assert_eq!(summary.pending_events, 2);
    }

    #[test]
    fn inspect_cell_inside_and_outside() {
        let mut w = world();
        let cell = IVec3::new(3, 1, 4);
        w.place_voxel(cell).unwrap();
        let info = WorldInspector::inspect_cell(&w, cell).unwrap();
        assert_eq!(info.voxel, Some(VoxelTypeId::from("cobblestone")));
        assert_eq!(info.center, Vec3::new(150.0, 75.0, 200.0));

        let empty = WorldInspector::inspect_cell(&w, IVec3::ZERO).unwrap();
        assert_eq!(empty.voxel, None);
        assert!(format!("{empty}").contains("empty"));

        assert!(WorldInspector::inspect_cell(&w, IVec3::new(-1, 0, 0)).is_none());
    }

    #[test]
    fn histogram_groups_by_type() {
        let mut w = world();
        w.place_voxel(IVec3::new(1, 0, 1)).unwrap();
        w.select_voxel_type(VoxelTypeId::from("brick")).unwrap();
        w.place_voxel(IVec3::new(2, 0, 1)).unwrap();
        w.place_voxel(IVec3::new(3, 0, 1)).unwrap();
        let h = WorldInspector::voxel_histogram(&w);
        assert_eq!(h.get(&VoxelTypeId::from("brick")), Some(&2));
        assert_eq!(h.get(&VoxelTypeId::from("cobblestone")), Some(&1));
    }

    #[test]
    fn summary_display() {
        let w = world();
        let s = format!("{}", WorldInspector::summary(&w));
        assert!(s.contains("tick=0"));
        assert!(s.contains("voxels=0"));
    }
}

use cubeworld_common::VoxelTypeId;
use glam::IVec3;

use crate::body::KinematicBody;
use crate::grid::SpatialGrid;

/// Collision queries of a body against the ground plane, the world
/// boundary and the voxels of a grid.
///
/// Broad phase is the clamped cell range around the body's box; the grid's
/// own addressing is the only index.
#[derive(Debug, Clone, Copy)]
pub struct CollisionDetector<'a> {
    grid: &'a SpatialGrid,
}

impl<'a> CollisionDetector<'a> {
    pub fn new(grid: &'a SpatialGrid) -> Self {
        Self { grid }
    }

    /// True when the body is below ground, outside the world horizontally,
    /// or overlapping any voxel.
    pub fn collides(&self, body: &KinematicBody) -> bool {
        if body.below_ground() {
            return true;
        }
        if self.beyond_bounds(body) {
            return true;
        }
        let body_box = body.bounding_box();
        self.possible_voxels(body)
            .any(|(cell, _)| body_box.overlaps(&self.grid.voxel_box(cell)))
    }

    /// The world boundary is a wall on x and z; height is unbounded.
    pub fn beyond_bounds(&self, body: &KinematicBody) -> bool {
        let cell = self.grid.cell_of(body.position());
        !self.grid.contains(IVec3::new(cell.x, 0, cell.z))
    }

    /// Whether the body overlaps the voxel box of `cell`, occupied or not.
    pub fn overlaps_cell(&self, body: &KinematicBody, cell: IVec3) -> bool {
        body.bounding_box().overlaps(&self.grid.voxel_box(cell))
    }

    /// Cells that may hold a voxel touching the body: from the cell of the
    /// box minimum to the cell one cube past the box maximum, clamped.
    pub fn candidate_cells(&self, body: &KinematicBody) -> impl Iterator<Item = IVec3> + use<> {
        let b = body.bounding_box();
        let c = self.grid.cube_size();
        let g = self.grid;
        let min = IVec3::new(g.to_grid(b.min.x), g.to_grid(b.min.y), g.to_grid(b.min.z));
        let max = IVec3::new(
            g.to_grid(b.max.x + c),
            g.to_grid(b.max.y + c),
            g.to_grid(b.max.z + c),
        );
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| IVec3::new(x, y, z)))
        })
    }

    /// Occupied cells among [`CollisionDetector::candidate_cells`].
    pub fn possible_voxels(
        &self,
        body: &KinematicBody,
    ) -> impl Iterator<Item = (IVec3, &'a VoxelTypeId)> + use<'a> {
        let grid = self.grid;
        self.candidate_cells(body)
            .filter_map(move |cell| grid.get(cell).ok().flatten().map(|v| (cell, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn grid_with(size: usize, cells: &[IVec3]) -> SpatialGrid {
        let mut grid = SpatialGrid::new(size, 50.0).unwrap();
        for cell in cells {
            grid.put(*cell, Some(VoxelTypeId::from("cobblestone"))).unwrap();
        }
        grid
    }

    #[test]
    fn below_ground_collides() {
        let grid = grid_with(5, &[]);
        let body = KinematicBody::player(50.0);
        let body = body.at(Vec3::new(100.0, body.half_height() - 1.0, 100.0));
        assert!(CollisionDetector::new(&grid).collides(&body));
    }

    #[test]
    fn resting_on_ground_does_not_collide() {
        let grid = grid_with(5, &[]);
        let body = KinematicBody::player(50.0);
        let body = body.at(Vec3::new(100.0, body.half_height(), 100.0));
        assert!(!CollisionDetector::new(&grid).collides(&body));
    }

    #[test]
    fn outside_world_collides() {
        let grid = grid_with(5, &[]);
        // Horizontal cell (5, *, 2).
        let body = KinematicBody::player(50.0).at(Vec3::new(260.0, 200.0, 110.0));
        let detector = CollisionDetector::new(&grid);
        assert!(detector.beyond_bounds(&body));
        assert!(detector.collides(&body));

        let negative = KinematicBody::player(50.0).at(Vec3::new(-1.0, 200.0, 110.0));
        assert!(detector.collides(&negative));
    }

    #[test]
    fn height_is_not_bounded() {
        let grid = grid_with(5, &[]);
        let body = KinematicBody::player(50.0).at(Vec3::new(100.0, 10_000.0, 100.0));
        assert!(!CollisionDetector::new(&grid).collides(&body));
    }

    #[test]
    fn body_at_voxel_position_collides() {
        let cell = IVec3::new(2, 0, 2);
        let grid = grid_with(10, &[cell]);
        let detector = CollisionDetector::new(&grid);

        let centered = KinematicBody::player(50.0).at(grid.voxel_center(cell));
        assert!(detector.collides(&centered));
        assert!(detector.overlaps_cell(&centered, cell));

        // Above ground but still inside the voxel's height.
        let standing = KinematicBody::player(50.0).at(Vec3::new(100.0, 41.0, 100.0));
        assert!(!standing.below_ground());
        assert!(detector.collides(&standing));

        let away = standing.at(standing.position() + Vec3::new(200.0, 0.0, 0.0));
        assert!(!detector.collides(&away));
    }

    #[test]
    fn touching_a_voxel_face_collides() {
        let cell = IVec3::new(2, 0, 2);
        let grid = grid_with(10, &[cell]);
        let body = KinematicBody::player(50.0);
        // Voxel spans x in [75, 125]; put the body's min x exactly on 125.
        let x = 125.0 + body.half_extents().x;
        let touching = body.at(Vec3::new(x, 41.0, 100.0));
        assert!(CollisionDetector::new(&grid).collides(&touching));
        let apart = body.at(Vec3::new(x + 0.5, 41.0, 100.0));
        assert!(!CollisionDetector::new(&grid).collides(&apart));
    }

    #[test]
    fn standing_on_voxel_top_collides_when_sinking() {
        let cell = IVec3::new(2, 0, 2);
        let grid = grid_with(10, &[cell]);
        let body = KinematicBody::player(50.0);
        let on_top = body.at(Vec3::new(100.0, 50.0 + body.half_height() + 0.1, 100.0));
        let detector = CollisionDetector::new(&grid);
        assert!(!detector.collides(&on_top));
        let sunk = on_top.at(on_top.position() - Vec3::new(0.0, 0.2, 0.0));
        assert!(detector.collides(&sunk));
    }

    #[test]
    fn candidate_cells_are_clamped() {
        let grid = grid_with(5, &[]);
        let body = KinematicBody::player(50.0).at(Vec3::new(5.0, 45.0, 245.0));
        let cells: Vec<IVec3> = CollisionDetector::new(&grid).candidate_cells(&body).collect();
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|c| grid.contains(*c)));
    }

    #[test]
    fn possible_voxels_only_reports_occupied() {
        let grid = grid_with(10, &[IVec3::new(2, 0, 2), IVec3::new(9, 9, 9)]);
        let body = KinematicBody::player(50.0).at(Vec3::new(100.0, 41.0, 100.0));
        let found: Vec<IVec3> = CollisionDetector::new(&grid)
            .possible_voxels(&body)
            .map(|(c, _)| c)
            .collect();
        assert_eq!(found, vec![IVec3::new(2, 0, 2)]);
    }
}

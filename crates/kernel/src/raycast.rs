use glam::{IVec3, Vec3};

use crate::grid::SpatialGrid;

/// What a pick ray hit first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickHit {
    /// A voxel, and the outward normal of the face the ray entered through.
    Voxel { cell: IVec3, normal: IVec3 },
    /// The ground plane at `point` (`point.y == 0`).
    Floor { point: Vec3 },
}

/// Source of pick hits for placement and removal.
///
/// A renderer with its own scene picking can stand in for [`GridRayCaster`].
pub trait RayCaster {
    fn cast_ray(&self, origin: Vec3, direction: Vec3) -> Option<PickHit>;
}

/// Ray marching over the voxel boxes of a [`SpatialGrid`].
#[derive(Debug, Clone, Copy)]
pub struct GridRayCaster<'a> {
    grid: &'a SpatialGrid,
    max_distance: f32,
}

impl<'a> GridRayCaster<'a> {
    /// Marches far enough to cross the whole grid diagonally.
    pub fn new(grid: &'a SpatialGrid) -> Self {
        let extent = grid.size() as f32 * grid.cube_size();
        Self {
            grid,
            max_distance: extent * 2.0,
        }
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    fn entry_normal(&self, cell: IVec3, previous: Vec3, direction: Vec3) -> IVec3 {
        let b = self.grid.voxel_box(cell);
        let mut normal = IVec3::ZERO;
        let mut best = 0.0;
        for axis in 0..3 {
            let outside = if previous[axis] < b.min[axis] {
                Some((b.min[axis] - previous[axis], -1))
            } else if previous[axis] > b.max[axis] {
                Some((previous[axis] - b.max[axis], 1))
            } else {
                None
            };
            if let Some((distance, sign)) = outside {
                if distance > best {
                    best = distance;
                    normal = IVec3::ZERO;
                    normal[axis] = sign;
                }
            }
        }
        if normal == IVec3::ZERO {
            // Started inside or grazing: face against the dominant direction.
            let d = direction.abs();
            let axis = if d.x >= d.y && d.x >= d.z {
                0
            } else if d.y >= d.z {
                1
            } else {
                2
            };
            normal[axis] = if direction[axis] > 0.0 { -1 } else { 1 };
        }
        normal
    }

    fn floor_hit(origin: Vec3, direction: Vec3) -> Option<PickHit> {
        if direction.y >= 0.0 {
            return None;
        }
        let t = -origin.y / direction.y;
        Some(PickHit::Floor {
            point: Vec3::new(origin.x + t * direction.x, 0.0, origin.z + t * direction.z),
        })
    }
}

impl RayCaster for GridRayCaster<'_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3) -> Option<PickHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let step = self.grid.cube_size() / 16.0;
        let start = self.grid.voxel_cell_at(origin);
        let mut previous = origin;
        let mut travelled = 0.0;
        while travelled <= self.max_distance {
            travelled += step;
            let point = origin + direction * travelled;
            if point.y < 0.0 {
                break;
            }
            let cell = self.grid.voxel_cell_at(point);
            if cell != start && self.grid.is_occupied(cell) {
                let normal = self.entry_normal(cell, previous, direction);
                return Some(PickHit::Voxel { cell, normal });
            }
            previous = point;
        }
        Self::floor_hit(origin, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeworld_common::VoxelTypeId;

    fn grid_with(cells: &[IVec3]) -> SpatialGrid {
        let mut grid = SpatialGrid::new(10, 50.0).unwrap();
        for c in cells {
            grid.put(*c, Some(VoxelTypeId::from("plank"))).unwrap();
        }
        grid
    }

    #[test]
    fn hits_voxel_side_face() {
        let grid = grid_with(&[IVec3::new(4, 0, 2)]);
        let hit = GridRayCaster::new(&grid).cast_ray(Vec3::new(50.0, 25.0, 100.0), Vec3::X);
        assert_eq!(
            hit,
            Some(PickHit::Voxel {
                cell: IVec3::new(4, 0, 2),
                normal: IVec3::new(-1, 0, 0),
            })
        );
    }

    #[test]
    fn hits_voxel_top_face() {
        let grid = grid_with(&[IVec3::new(2, 0, 2)]);
        let hit =
            GridRayCaster::new(&grid).cast_ray(Vec3::new(100.0, 200.0, 100.0), Vec3::NEG_Y);
        assert_eq!(
            hit,
            Some(PickHit::Voxel {
                cell: IVec3::new(2, 0, 2),
                normal: IVec3::Y,
            })
        );
    }

    #[test]
    fn downward_ray_without_voxels_hits_floor() {
        let grid = grid_with(&[]);
        let hit = GridRayCaster::new(&grid)
            .cast_ray(Vec3::new(100.0, 100.0, 100.0), Vec3::new(1.0, -1.0, 0.0));
        match hit {
            Some(PickHit::Floor { point }) => {
                assert!((point.x - 200.0).abs() < 1e-3);
                assert_eq!(point.y, 0.0);
                assert!((point.z - 100.0).abs() < 1e-3);
            }
            other => panic!("expected floor hit, got {other:?}"),
        }
    }

    #[test]
    fn upward_ray_hits_nothing() {
        let grid = grid_with(&[IVec3::new(2, 0, 2)]);
        let caster = GridRayCaster::new(&grid);
        assert_eq!(caster.cast_ray(Vec3::new(100.0, 100.0, 100.0), Vec3::Y), None);
        assert_eq!(caster.cast_ray(Vec3::new(100.0, 100.0, 100.0), Vec3::ZERO), None);
    }

    #[test]
    fn max_distance_limits_voxel_hits() {
        let grid = grid_with(&[IVec3::new(8, 0, 2)]);
        let caster = GridRayCaster::new(&grid).with_max_distance(100.0);
        assert_eq!(caster.cast_ray(Vec3::new(50.0, 25.0, 100.0), Vec3::X), None);
    }
}

use cubeworld_common::{Aabb, VoxelTypeId};
use glam::{IVec3, Vec3};

/// Errors from grid access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell {cell} is outside a grid of size {size}")]
    OutOfRange { cell: IVec3, size: usize },
    #[error("voxel map is not a {size}x{size}x{size} cube")]
    NotCubic { size: usize },
    #[error("grid size {size} is outside 1..={max}", max = MAX_GRID_SIZE)]
    InvalidSize { size: usize },
    #[error("cube size must be a positive finite number")]
    InvalidCubeSize,
}

/// Largest accepted cells-per-side; the grid stores `size`³ cells up front.
pub const MAX_GRID_SIZE: usize = 256;

/// Nested `[x][y][z]` voxel map as written to saves.
pub type NestedMap = Vec<Vec<Vec<Option<VoxelTypeId>>>>;

/// Bounded cubic voxel store.
///
/// Every cell is either empty or holds the type of the voxel placed there.
/// All reads and writes are bounds-checked; only [`SpatialGrid::to_grid`]
/// clamps instead of failing.
///
/// A voxel in cell `(x, y, z)` sits at world center `(x·C, y·C + C/2, z·C)`
/// where `C` is the cube size: it rests on `y = 0` and is centered on the
/// cell's corner in the horizontal plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGrid {
    size: usize,
    cube_size: f32,
    cells: Vec<Option<VoxelTypeId>>,
    occupied: usize,
}

impl SpatialGrid {
    /// Create an empty grid of `size`³ cells.
    pub fn new(size: usize, cube_size: f32) -> Result<Self, GridError> {
        let cells = Self::cell_count(size)?;
        if !(cube_size.is_finite() && cube_size > 0.0) {
            return Err(GridError::InvalidCubeSize);
        }
        Ok(Self {
            size,
            cube_size,
            cells: vec![None; cells],
            occupied: 0,
        })
    }

    fn cell_count(size: usize) -> Result<usize, GridError> {
        if !(1..=MAX_GRID_SIZE).contains(&size) {
            return Err(GridError::InvalidSize { size });
        }
        size.checked_mul(size)
            .and_then(|square| square.checked_mul(size))
            .ok_or(GridError::InvalidSize { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cube_size(&self) -> f32 {
        self.cube_size
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn contains(&self, cell: IVec3) -> bool {
        let size = self.size as i64;
        [cell.x, cell.y, cell.z]
            .iter()
            .all(|&c| (0..size).contains(&(c as i64)))
    }

    fn index(&self, cell: IVec3) -> Result<usize, GridError> {
        if !self.contains(cell) {
            return Err(GridError::OutOfRange {
                cell,
                size: self.size,
            });
        }
        let (x, y, z) = (cell.x as usize, cell.y as usize, cell.z as usize);
        Ok((x * self.size + y) * self.size + z)
    }

    /// Occupant of a cell.
    pub fn get(&self, cell: IVec3) -> Result<Option<&VoxelTypeId>, GridError> {
        let i = self.index(cell)?;
        Ok(self.cells[i].as_ref())
    }

    /// Whether a cell holds a voxel. Out-of-range cells are empty.
    pub fn is_occupied(&self, cell: IVec3) -> bool {
        matches!(self.get(cell), Ok(Some(_)))
    }

    /// Write a cell (`None` clears it). Returns the previous occupant.
    pub fn put(
        &mut self,
        cell: IVec3,
        voxel: Option<VoxelTypeId>,
    ) -> Result<Option<VoxelTypeId>, GridError> {
        let i = self.index(cell)?;
        let previous = std::mem::replace(&mut self.cells[i], voxel);
        match (&previous, &self.cells[i]) {
            (None, Some(_)) => self.occupied += 1,
            (Some(_), None) => self.occupied -= 1,
            _ => {}
        }
        Ok(previous)
    }

    /// All occupied cells in `[x][y][z]` order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (IVec3, &VoxelTypeId)> {
        let size = self.size;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let voxel = cell.as_ref()?;
            let z = i % size;
            let y = (i / size) % size;
            let x = i / (size * size);
            Some((IVec3::new(x as i32, y as i32, z as i32), voxel))
        })
    }

    /// Floor a world position to cell coordinates. Not clamped.
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        (position / self.cube_size).floor().as_ivec3()
    }

    /// Floor a single world coordinate to a cell index clamped to `[0, size - 1]`.
    pub fn to_grid(&self, value: f32) -> i32 {
        let cell = (value / self.cube_size).floor() as i64;
        cell.clamp(0, self.size as i64 - 1) as i32
    }

    /// World-space center of the voxel in `cell`.
    pub fn voxel_center(&self, cell: IVec3) -> Vec3 {
        let c = self.cube_size;
        Vec3::new(
            cell.x as f32 * c,
            cell.y as f32 * c + c / 2.0,
            cell.z as f32 * c,
        )
    }

    /// Collision box of the voxel in `cell`.
    pub fn voxel_box(&self, cell: IVec3) -> Aabb {
        Aabb::cube(self.voxel_center(cell), self.cube_size)
    }

    /// Cell whose voxel box contains `point`; inverse of [`SpatialGrid::voxel_center`].
    pub fn voxel_cell_at(&self, point: Vec3) -> IVec3 {
        let half = self.cube_size / 2.0;
        self.cell_of(point + Vec3::new(half, 0.0, half))
    }

    /// Copy out as a nested `[x][y][z]` map.
    pub fn to_nested(&self) -> NestedMap {
        (0..self.size)
            .map(|x| {
                (0..self.size)
                    .map(|y| {
                        let start = (x * self.size + y) * self.size;
                        self.cells[start..start + self.size].to_vec()
                    })
                    .collect()
            })
            .collect()
    }

    /// Rebuild a grid from a nested `[x][y][z]` map; every level must have the same length.
    ///
    /// The shape is checked in full before any cell storage is allocated.
    pub fn from_nested(map: &NestedMap, cube_size: f32) -> Result<Self, GridError> {
        let size = map.len();
        let cubic = size > 0
            && map
                .iter()
                .all(|plane| plane.len() == size && plane.iter().all(|column| column.len() == size));
        if !cubic {
            return Err(GridError::NotCubic { size });
        }
        let mut grid = Self::new(size, cube_size)?;
        for (x, plane) in map.iter().enumerate() {
            for (y, column) in plane.iter().enumerate() {
                for (z, voxel) in column.iter().enumerate() {
                    if voxel.is_some() {
                        let cell = IVec3::new(x as i32, y as i32, z as i32);
                        grid.put(cell, voxel.clone())?;
                    }
                }
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone() -> VoxelTypeId {
        VoxelTypeId::from("cobblestone")
    }

    #[test]
    fn put_then_get() {
        let mut grid = SpatialGrid::new(5, 50.0).unwrap();
        let cell = IVec3::new(1, 2, 3);
        assert_eq!(grid.put(cell, Some(stone())).unwrap(), None);
        assert_eq!(grid.get(cell).unwrap(), Some(&stone()));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn put_none_clears() {
        let mut grid = SpatialGrid::new(5, 50.0).unwrap();
        let cell = IVec3::new(4, 0, 4);
        grid.put(cell, Some(stone())).unwrap();
        assert_eq!(grid.put(cell, None).unwrap(), Some(stone()));
        assert_eq!(grid.get(cell).unwrap(), None);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn overwrite_keeps_count() {
        let mut grid = SpatialGrid::new(3, 50.0).unwrap();
        let cell = IVec3::ZERO;
        grid.put(cell, Some(stone())).unwrap();
        grid.put(cell, Some(VoxelTypeId::from("brick"))).unwrap();
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut grid = SpatialGrid::new(5, 50.0).unwrap();
        for cell in [
            IVec3::new(5, 0, 0),
            IVec3::new(0, -1, 0),
            IVec3::new(0, 0, i32::MAX),
        ] {
            assert_eq!(
                grid.get(cell),
                Err(GridError::OutOfRange { cell, size: 5 })
            );
            assert!(grid.put(cell, Some(stone())).is_err());
            assert!(!grid.is_occupied(cell));
        }
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn to_grid_always_in_range() {
        let grid = SpatialGrid::new(5, 50.0).unwrap();
        for v in [
            -1e30_f32,
            -1000.0,
            -0.001,
            0.0,
            49.9,
            50.0,
            249.9,
            250.0,
            1e9,
            f32::MAX,
            f32::INFINITY,
            f32::NEG_INFINITY,
        ] {
            let c = grid.to_grid(v);
            assert!((0..5).contains(&c), "to_grid({v}) = {c}");
        }
        assert_eq!(grid.to_grid(120.0), 2);
    }

    #[test]
    fn cell_of_floors() {
        let grid = SpatialGrid::new(5, 50.0).unwrap();
        assert_eq!(grid.cell_of(Vec3::new(120.0, 0.0, -10.0)), IVec3::new(2, 0, -1));
    }

    #[test]
    fn voxel_center_and_cell_at_agree() {
        let grid = SpatialGrid::new(10, 50.0).unwrap();
        let cell = IVec3::new(2, 0, 2);
        let center = grid.voxel_center(cell);
        assert_eq!(center, Vec3::new(100.0, 25.0, 100.0));
        assert_eq!(grid.voxel_cell_at(center), cell);
        assert_eq!(grid.voxel_cell_at(center + Vec3::splat(24.0)), cell);
        assert_eq!(grid.voxel_cell_at(center - Vec3::splat(24.0)), cell);
        let b = grid.voxel_box(cell);
        assert_eq!(b.min, Vec3::new(75.0, 0.0, 75.0));
        assert_eq!(b.max, Vec3::new(125.0, 50.0, 125.0));
    }

    #[test]
    fn iter_occupied_reports_cells() {
        let mut grid = SpatialGrid::new(4, 50.0).unwrap();
        grid.put(IVec3::new(3, 1, 2), Some(stone())).unwrap();
        grid.put(IVec3::new(0, 0, 1), Some(stone())).unwrap();
        let cells: Vec<IVec3> = grid.iter_occupied().map(|(c, _)| c).collect();
        assert_eq!(cells, vec![IVec3::new(0, 0, 1), IVec3::new(3, 1, 2)]);
    }

    #[test]
    fn nested_map_preserves_layout() {
        let mut grid = SpatialGrid::new(3, 50.0).unwrap();
        grid.put(IVec3::new(2, 1, 0), Some(stone())).unwrap();
        let nested = grid.to_nested();
        assert_eq!(nested.len(), 3);
        assert_eq!(nested[2][1][0], Some(stone()));
        assert_eq!(nested[0][1][2], None);

        let rebuilt = SpatialGrid::from_nested(&nested, 50.0).unwrap();
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn ragged_nested_map_is_rejected() {
        let mut nested = SpatialGrid::new(2, 50.0).unwrap().to_nested();
        nested[1][0].pop();
        assert_eq!(
            SpatialGrid::from_nested(&nested, 50.0),
            Err(GridError::NotCubic { size: 2 })
        );
        assert!(SpatialGrid::from_nested(&Vec::new(), 50.0).is_err());
    }

    #[test]
    fn long_ragged_map_is_rejected_before_allocating() {
        let nested: NestedMap = vec![Vec::new(); 3000];
        assert_eq!(
            SpatialGrid::from_nested(&nested, 50.0),
            Err(GridError::NotCubic { size: 3000 })
        );
    }

    #[test]
    fn bad_dimensions_are_errors() {
        assert_eq!(SpatialGrid::new(0, 50.0), Err(GridError::InvalidSize { size: 0 }));
        assert_eq!(
            SpatialGrid::new(MAX_GRID_SIZE + 1, 50.0),
            Err(GridError::InvalidSize { size: MAX_GRID_SIZE + 1 })
        );
        assert_eq!(
            SpatialGrid::new(usize::MAX, 50.0),
            Err(GridError::InvalidSize { size: usize::MAX })
        );
        for cube_size in [0.0, -50.0, f32::NAN, f32::INFINITY] {
            assert_eq!(SpatialGrid::new(4, cube_size), Err(GridError::InvalidCubeSize));
        }
        assert!(SpatialGrid::new(1, 1.0).is_ok());
    }
}

use cubeworld_common::Aabb;
use glam::Vec3;

/// World axis, used by per-axis collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Resolution order within a sub-step.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// The player: an unrotated box around a center position.
///
/// Half-extents are fixed at construction; only the position ever changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    position: Vec3,
    half_extents: Vec3,
    eyes_delta: f32,
}

impl KinematicBody {
    /// Player proportions: 0.3 cubes wide and deep, 1.63 cubes tall,
    /// eyes at 90% of the half-height above center.
    pub fn player(cube_size: f32) -> Self {
        let width = cube_size * 0.3;
        let depth = cube_size * 0.3;
        let height = cube_size * 1.63;
        let half_extents = Vec3::new(width / 2.0, height / 2.0, depth / 2.0);
        Self {
            position: Vec3::ZERO,
            half_extents,
            eyes_delta: half_extents.y * 0.9,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn axis(&self, axis: Axis) -> f32 {
        self.position[axis.index()]
    }

    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        self.position[axis.index()] = value;
    }

    pub fn translate_axis(&mut self, axis: Axis, delta: f32) {
        self.position[axis.index()] += delta;
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn half_height(&self) -> f32 {
        self.half_extents.y
    }

    /// Camera position; not used for collision.
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.eyes_delta, 0.0)
    }

    /// Corner selected by the sign of each component (`-1` or `1`).
    pub fn vertex(&self, sx: f32, sy: f32, sz: f32) -> Vec3 {
        self.position + Vec3::new(sx, sy, sz) * self.half_extents
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(self.vertex(-1.0, -1.0, -1.0), self.vertex(1.0, 1.0, 1.0))
    }

    /// The ground is the plane `y = 0`.
    pub fn below_ground(&self) -> bool {
        self.position.y < self.half_height()
    }
}

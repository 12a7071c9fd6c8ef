//! Cubeworld kernel: the voxel grid, player collision and movement, and the
//! world session that ties them to input.
//!
//! # Invariants
//! - Grid reads and writes are bounds-checked; only `to_grid` clamps.
//! - Touching boxes collide: interval overlap is inclusive at both ends.
//! - Movement resolves each axis on its own, in x, y, z order, reverting
//!   an axis whose move collides.
//! - Every grid mutation is recorded in the world event log.

pub mod body;
pub mod clock;
pub mod collision;
pub mod config;
pub mod grid;
pub mod movement;
pub mod raycast;
pub mod world;

pub use body::{Axis, KinematicBody};
pub use clock::FrameClock;
pub use collision::CollisionDetector;
pub use config::{ConfigError, MovementConfig, WorldConfig};
pub use grid::{GridError, MAX_GRID_SIZE, NestedMap, SpatialGrid};
pub use movement::{MotionState, MovementIntegrator};
pub use raycast::{GridRayCaster, PickHit, RayCaster};
pub use world::{ActionOutcome, PlaceError, TickReport, World, WorldError, WorldEvent};

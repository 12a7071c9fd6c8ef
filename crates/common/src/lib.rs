//! Shared types and collision primitives for the cubeworld engine.
//!
//! # Invariants
//! - Interval and box tests are inclusive: touching counts as overlapping.

pub mod collision;
pub mod types;

pub use collision::{Aabb, intervals_overlap};
pub use types::VoxelTypeId;

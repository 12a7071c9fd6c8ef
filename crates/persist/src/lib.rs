//! Persistence: the voxel map, player position and camera direction, saved
//! as three JSON documents.
//!
//! # Invariants
//! - A save exists only when all three documents exist and parse.
//! - Restoring never accepts a voxel type the catalog cannot resolve.

pub mod saved;
pub mod store;

pub use saved::SavedWorld;
pub use store::{PersistError, SaveStore};

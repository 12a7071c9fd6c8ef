//! Developer tooling: read-only world inspection for the CLI and debugging.
//!
//! # Invariants
//! - Inspection never mutates the world.

pub mod inspector;

pub use inspector::{CellInfo, WorldInspector, WorldSummary};

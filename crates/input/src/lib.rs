//! Input: keyboard and pointer events turned into per-tick snapshots,
//! high-level actions, and a clamped camera orientation.
//!
//! # Invariants
//! - Event handlers only write [`InputState`]; a tick only reads an [`InputSnapshot`].
//! - Camera pitch never leaves `[-85, 85]` degrees.

pub mod action;
pub mod orientation;
pub mod state;

pub use action::Action;
pub use orientation::{LAT_LIMIT, LookConfig, LookMode, Orientation, OrientationController};
pub use state::{
    InputSnapshot, InputState, Key, KeyBindings, MoveAxis, MoveBinding, PointerButton,
    PointerSnapshot, UnknownKey,
};

use cubeworld_common::VoxelTypeId;

use crate::orientation::LookMode;

/// A high-level action produced by input handling.
///
/// The world consumes actions, never raw input events, so any front end
/// (browser canvas, native window, scripted CLI run) drives the same logic.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Place the selected voxel type next to whatever the camera points at.
    PlaceVoxel,
    /// Remove the voxel the camera points at.
    RemoveVoxel,
    /// Change the voxel type used by subsequent placements.
    SelectVoxelType(VoxelTypeId),
    /// Pause or resume the simulation.
    TogglePause,
    /// Persist the world.
    Save,
    /// Switch between drag look and locked-pointer look.
    SetLookMode(LookMode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_select_carries_type() {
        let a = Action::SelectVoxelType(VoxelTypeId::from("brick"));
        assert!(matches!(a, Action::SelectVoxelType(ref id) if id.as_str() == "brick"));
    }

    #[test]
    fn action_place_remove() {
        assert!(matches!(Action::PlaceVoxel, Action::PlaceVoxel));
        assert_ne!(Action::PlaceVoxel, Action::RemoveVoxel);
    }

    #[test]
    fn action_look_mode() {
        let a = Action::SetLookMode(LookMode::LockedPointer);
        assert_eq!(a, Action::SetLookMode(LookMode::LockedPointer));
    }
}

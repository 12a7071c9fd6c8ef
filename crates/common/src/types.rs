use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a voxel type, e.g. `"cobblestone"`.
///
/// Stored alongside every placed voxel and written verbatim into saves, so
/// a voxel's identity never depends on how it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoxelTypeId(pub String);

impl VoxelTypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoxelTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoxelTypeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voxel_type_id_display() {
        let id = VoxelTypeId::from("cobblestone");
        assert_eq!(id.to_string(), "cobblestone");
        assert_eq!(id.as_str(), "cobblestone");
    }

    #[test]
    fn voxel_type_id_serializes_as_plain_string() {
        let id = VoxelTypeId::from("brick");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"brick\"");
    }
}

use labkit_core::{AreaId, LevelId};
use serde::{Deserialize, Serialize};

/// A named floor region. Its shape is the union of the polygons carrying
/// its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    /// Floor level the area belongs to
    #[serde(default)]
    pub level: Option<LevelId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Area {
    pub fn new(id: impl Into<AreaId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: None,
            notes: None,
        }
    }

    /// Builder-style level assignment.
    pub fn on_level(mut self, level: impl Into<LevelId>) -> Self {
        self.level = Some(level.into());
        self
    }
}

//! Stable entity identifiers
//!
//! Every entity on a floor is addressed by a string identifier that survives
//! storage round trips. Cross references between entities are always
//! identifier lookups, never embedded references.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Prefix used by [`Self::generate`].
            pub const PREFIX: &'static str = $prefix;

            /// Create a fresh identifier, e.g. `poly_3f9a01bc`.
            pub fn generate() -> Self {
                let uuid = uuid::Uuid::new_v4().simple().to_string();
                Self(format!("{}_{}", $prefix, &uuid[..8]))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a floor region (the aggregate of its polygons).
    AreaId,
    "area"
);
define_id!(
    /// Identifier of one polygon of an area.
    PolygonId,
    "poly"
);
define_id!(
    /// Identifier of a fixture nested in a polygon.
    FixtureId,
    "pin"
);
define_id!(
    /// Identifier of a free-floating block.
    BlockId,
    "block"
);
define_id!(
    /// Identifier of a door or window.
    OpeningId,
    "open"
);
define_id!(
    /// Identifier of a floor level.
    LevelId,
    "lvl"
);
define_id!(
    /// Identifier of the bench record linked to a fixture.
    BenchId,
    "mes"
);
define_id!(
    /// Identifier of the installation record linked to a fixture.
    InstallationId,
    "inst"
);
define_id!(
    /// Identifier of a material linked to a block.
    MaterialId,
    "mat"
);
define_id!(
    /// Identifier of the canvas (drawing sheet) a floor is stored under.
    CanvasId,
    "canvas"
);

//! Error handling for LabKit
//!
//! Provides error types for the layers of the layout engine:
//! - Layout errors (model lookups, rejected edits, interaction guards)
//! - Store errors (loading and saving floor records)
//!
//! Best-effort geometric outcomes (a collision that did not converge, a
//! fixture that only fits its parent's bounding box) are not errors; they are
//! reported as flags on the operation's outcome.

use thiserror::Error;

/// Layout error type
///
/// Represents errors raised by commands on the in-memory floor model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// No area with this identifier
    #[error("Unknown area: {id}")]
    UnknownArea {
        /// The missing identifier.
        id: String,
    },

    /// No polygon with this identifier
    #[error("Unknown polygon: {id}")]
    UnknownPolygon {
        /// The missing identifier.
        id: String,
    },

    /// No fixture with this identifier
    #[error("Unknown fixture: {id}")]
    UnknownFixture {
        /// The missing identifier.
        id: String,
    },

    /// No block with this identifier
    #[error("Unknown block: {id}")]
    UnknownBlock {
        /// The missing identifier.
        id: String,
    },

    /// No door or window with this identifier
    #[error("Unknown opening: {id}")]
    UnknownOpening {
        /// The missing identifier.
        id: String,
    },

    /// The area has no polygon to host an entity
    #[error("Area {area} has no polygons")]
    EmptyArea {
        /// The area identifier.
        area: String,
    },

    /// A vertex index past the end of the polygon's outline
    #[error("Polygon {polygon} has no vertex {index}")]
    UnknownVertex {
        /// The polygon identifier.
        polygon: String,
        /// The requested vertex index.
        index: usize,
    },

    /// A vertex edit would make the polygon self-intersecting
    #[error("Polygon {id} would self-intersect")]
    SelfIntersection {
        /// The polygon identifier.
        id: String,
    },

    /// A dimension is outside its accepted range
    #[error("Invalid {field}: {value}")]
    InvalidDimension {
        /// The field name.
        field: String,
        /// The rejected value.
        value: f64,
    },

    /// Removing the last polygon would orphan the area's contents
    #[error("Area {area} still holds {fixtures} fixtures, {blocks} blocks and {openings} openings")]
    AreaNotEmpty {
        /// The area identifier.
        area: String,
        /// Number of fixtures owned by the area.
        fixtures: usize,
        /// Number of blocks owned by the area.
        blocks: usize,
        /// Number of openings owned by the area.
        openings: usize,
    },

    /// The shape could not be separated from its siblings
    #[error("Cannot overlap another area: {id}")]
    CollisionUnresolved {
        /// The identifier of the moving entity.
        id: String,
    },

    /// The fixture does not fit inside any polygon of its area
    #[error("{id} does not fit inside its area")]
    NotContained {
        /// The identifier of the moving entity.
        id: String,
    },

    /// A vertex join could not be completed
    #[error("Join blocked: {reason}")]
    JoinBlocked {
        /// Why the join failed.
        reason: String,
    },

    /// A material may only be linked to a single block
    #[error("Material {material} is already linked to block {block}")]
    MaterialInUse {
        /// The material identifier.
        material: String,
        /// The block already holding it.
        block: String,
    },

    /// Invalid interaction state transition
    #[error("Invalid interaction transition from {current} to {requested}")]
    InvalidTransition {
        /// The current state name.
        current: String,
        /// The requested state name.
        requested: String,
    },
}

/// Store error type
///
/// Represents failures of the storage collaborator while loading or saving
/// floor records.
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record not found
    #[error("{kind} {id} not found")]
    NotFound {
        /// The entity kind.
        kind: String,
        /// The identifier.
        id: String,
    },

    /// The backend refused a record
    #[error("{kind} {id} rejected: {reason}")]
    Rejected {
        /// The entity kind.
        kind: String,
        /// The identifier.
        id: String,
        /// The backend's reason.
        reason: String,
    },

    /// Any other backend failure
    #[error("Store backend error: {message}")]
    Backend {
        /// A message describing the failure.
        message: String,
    },
}

/// Main error type for LabKit
#[derive(Error, Debug)]
pub enum Error {
    /// Layout error
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error rejected an interactive edit
    pub fn is_rejected_edit(&self) -> bool {
        matches!(
            self,
            Error::Layout(
                LayoutError::CollisionUnresolved { .. }
                    | LayoutError::NotContained { .. }
                    | LayoutError::SelfIntersection { .. }
                    | LayoutError::JoinBlocked { .. }
            )
        )
    }
}

/// Result type for LabKit operations
pub type Result<T> = std::result::Result<T, Error>;

//! Error handling for RoadKit
//!
//! A single error taxonomy shared by the geometry primitives and the road
//! model. Container operations that fail (deleting or moving a key that is
//! not present, inserting a duplicate start) report through these variants
//! instead of panicking, so that callers can abort before leaving the model
//! in a mixed state.

use thiserror::Error;

/// Errors raised by the road model and geometry primitives
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoadError {
    /// Geometry query outside the parameter domain
    #[error("s-coordinate {s:.6} out of range [{start:.6}, {end:.6}]")]
    OutOfRange {
        /// The requested s-coordinate.
        s: f64,
        /// Start of the valid domain.
        start: f64,
        /// End of the valid domain.
        end: f64,
    },

    /// No section of the given kind starts at `s`
    #[error("No {kind} section at s = {s:.6}")]
    SectionNotFound {
        /// The section kind name.
        kind: String,
        /// The looked-up key.
        s: f64,
    },

    /// A section of the given kind already starts at `s`
    #[error("Duplicate {kind} section at s = {s:.6}")]
    DuplicateSection {
        /// The section kind name.
        kind: String,
        /// The conflicting key.
        s: f64,
    },

    /// Section start must be a finite, non-negative value
    #[error("Invalid section start s = {0}")]
    InvalidStart(f64),

    /// Road id not present in the road system
    #[error("Road not found: {0}")]
    RoadNotFound(String),

    /// Road id already present in the road system
    #[error("Duplicate road id: {0}")]
    DuplicateRoad(String),

    /// Junction id not present in the road system
    #[error("Junction not found: {0}")]
    JunctionNotFound(String),

    /// Fiddleyard id not present in the road system
    #[error("Fiddleyard not found: {0}")]
    FiddleyardNotFound(String),

    /// Junction connection id not present in the junction
    #[error("Connection {connection} not found in junction {junction}")]
    ConnectionNotFound {
        /// The junction id.
        junction: String,
        /// The connection id.
        connection: String,
    },

    /// Lane id not present in the lane section
    #[error("Lane {id} not found in lane section at s = {s:.6}")]
    LaneNotFound {
        /// The lane id.
        id: i32,
        /// Start of the lane section.
        s: f64,
    },

    /// Lane id already present in the lane section
    #[error("Lane {id} already exists in lane section at s = {s:.6}")]
    DuplicateLane {
        /// The lane id.
        id: i32,
        /// Start of the lane section.
        s: f64,
    },

    /// The center lane cannot be inserted, removed or linked
    #[error("Invalid lane id: {0}")]
    InvalidLaneId(i32),

    /// No width entry at the given local offset
    #[error("No width entry of lane {lane} at offset {s_offset:.6}")]
    LaneWidthNotFound {
        /// The lane id.
        lane: i32,
        /// The local s offset.
        s_offset: f64,
    },

    /// No road mark at the given local offset
    #[error("No road mark of lane {lane} at offset {s_offset:.6}")]
    RoadMarkNotFound {
        /// The lane id.
        lane: i32,
        /// The local s offset.
        s_offset: f64,
    },

    /// No track component starts at `s`
    #[error("No track component at s = {0:.6}")]
    TrackNotFound(f64),

    /// The operation requires a non-degenerate geometry
    #[error("Degenerate geometry: {0}")]
    Degenerate(String),
}

/// Result type alias for road model operations
pub type RoadResult<T> = std::result::Result<T, RoadError>;

impl RoadError {
    /// Convenience constructor for a missing section
    pub fn section_not_found(kind: impl Into<String>, s: f64) -> Self {
        Self::SectionNotFound {
            kind: kind.into(),
            s,
        }
    }

    /// Convenience constructor for a duplicate section
    pub fn duplicate_section(kind: impl Into<String>, s: f64) -> Self {
        Self::DuplicateSection {
            kind: kind.into(),
            s,
        }
    }

    /// Whether the error denotes a missing element rather than a conflict
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SectionNotFound { .. }
                | Self::RoadNotFound(_)
                | Self::JunctionNotFound(_)
                | Self::FiddleyardNotFound(_)
                | Self::ConnectionNotFound { .. }
                | Self::LaneNotFound { .. }
                | Self::LaneWidthNotFound { .. }
                | Self::RoadMarkNotFound { .. }
                | Self::TrackNotFound(_)
        )
    }
}

//! Numeric tolerances and editing limits

/// Tolerance for s-coordinate comparisons and key canonicalization.
pub const NUMERICAL_ZERO6: f64 = 1.0e-6;

/// Tolerance below which a width change is considered insignificant.
pub const NUMERICAL_ZERO8: f64 = 1.0e-8;

/// Minimum length of a lane section produced by a split.
pub const MIN_LANESECTION_LENGTH: f64 = 1.0;

/// Minimum distance of a road split from either road end.
pub const MIN_SPLIT_MARGIN: f64 = 0.5;

/// Lane id of the center divider.
pub const CENTER_LANE: i32 = 0;

/// Junction id of roads that are not part of a junction.
pub const NO_JUNCTION: &str = "-1";

/// Default link-inference distance threshold in meters.
pub const DEFAULT_LINK_THRESHOLD: f64 = 5.0;

//! # RoadKit Core
//!
//! Core types shared by the RoadKit crates:
//! - [`SMap`]: ordered map keyed by canonicalized s-coordinates
//! - [`Cubic`]: polynomial profiles for widths and elevations
//! - [`TrackComponent`]: the reference-line primitive (line, arc)
//! - [`RoadError`]: the error taxonomy of the road model

pub mod constants;
pub mod error;
pub mod geometry;
pub mod polynomial;
pub mod smap;

pub use constants::*;
pub use error::{RoadError, RoadResult};
pub use geometry::{Pose, TrackArc, TrackComponent, TrackGeometry, TrackLine};
pub use polynomial::Cubic;
pub use smap::{canonical_s, SMap};

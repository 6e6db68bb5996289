//! # RoadKit Model
//!
//! The road network data model edited by RoadKit commands.
//!
//! A [`RoadSystem`] owns [`Road`]s, [`Junction`]s and [`Fiddleyard`]s. Each
//! road owns its reference line and five s-ordered [`SectionContainer`]s
//! (type, elevation, superelevation, crossfall, lane). Lane sections own
//! [`Lane`]s keyed by signed id.

pub mod changes;
pub mod junction;
pub mod lane;
pub mod lane_section;
pub mod link;
pub mod profile;
pub mod prototype;
pub mod road;
pub mod road_system;
pub mod section;

pub use changes::Changes;
pub use junction::{Fiddleyard, Junction, JunctionConnection, LaneLink};
pub use lane::{
    Lane, LaneRoadMark, LaneType, LaneWidth, RoadMarkColor, RoadMarkLaneChange, RoadMarkType,
    RoadMarkWeight,
};
pub use lane_section::LaneSection;
pub use link::{ContactPoint, ElementType, LinkType, RoadLink};
pub use profile::{
    CrossfallSection, CrossfallSide, ElevationSection, RoadType, SuperelevationSection,
    TypeSection,
};
pub use prototype::RoadPrototype;
pub use road::{AnySection, Road, SectionSet};
pub use road_system::RoadSystem;
pub use section::{RoadSection, SectionContainer, SectionKind};

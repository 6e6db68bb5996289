//! Road profile sections: type, elevation, superelevation and crossfall

use serde::{Deserialize, Serialize};

use roadkit_core::Cubic;

use crate::changes::Changes;
use crate::section::{RoadSection, SectionKind};

/// OpenDRIVE road type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadType {
    #[default]
    Unknown,
    Rural,
    Motorway,
    Town,
    LowSpeed,
    Pedestrian,
    Bicycle,
}

/// Road type valid from `s_start` on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSection {
    pub s_start: f64,
    pub road_type: RoadType,
    /// Speed limit in m/s, if posted
    pub speed_limit: Option<f64>,
    #[serde(skip)]
    pub changes: Changes,
}

impl TypeSection {
    pub fn new(s_start: f64, road_type: RoadType) -> Self {
        Self {
            s_start,
            road_type,
            speed_limit: None,
            changes: Changes::NONE,
        }
    }
}

impl RoadSection for TypeSection {
    const KIND: SectionKind = SectionKind::Type;

    fn s_start(&self) -> f64 {
        self.s_start
    }

    fn set_s_start(&mut self, s: f64) {
        self.s_start = s;
    }

    fn changes(&self) -> Changes {
        self.changes
    }

    fn add_changes(&mut self, changes: Changes) {
        self.changes |= changes;
    }

    fn clear_changes(&mut self) {
        self.changes.clear();
    }

    fn clip(&self, from: f64, _to: f64) -> Self {
        let mut piece = self.clone();
        piece.s_start = from;
        piece
    }
}

/// Side of the road a crossfall applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossfallSide {
    Left,
    Right,
    #[default]
    Both,
}

macro_rules! cubic_section {
    ($(#[$doc:meta])* $name:ident, $kind:expr $(, $field:ident: $ty:ty)*) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub s_start: f64,
            pub profile: Cubic,
            $(pub $field: $ty,)*
            #[serde(skip)]
            pub changes: Changes,
        }

        impl $name {
            /// Profile value at road coordinate `s`
            pub fn value(&self, s: f64) -> f64 {
                self.profile.value(s - self.s_start)
            }

            /// Profile slope at road coordinate `s`
            pub fn slope(&self, s: f64) -> f64 {
                self.profile.slope(s - self.s_start)
            }

            /// Profile curvature at road coordinate `s`
            pub fn curvature(&self, s: f64) -> f64 {
                self.profile.curvature(s - self.s_start)
            }
        }

        impl RoadSection for $name {
            const KIND: SectionKind = $kind;

            fn s_start(&self) -> f64 {
                self.s_start
            }

            fn set_s_start(&mut self, s: f64) {
                self.s_start = s;
            }

            fn changes(&self) -> Changes {
                self.changes
            }

            fn add_changes(&mut self, changes: Changes) {
                self.changes |= changes;
            }

            fn clear_changes(&mut self) {
                self.changes.clear();
            }

            fn clip(&self, from: f64, _to: f64) -> Self {
                let mut piece = self.clone();
                piece.profile = self.profile.rebased(from - self.s_start);
                piece.s_start = from;
                piece
            }
        }
    };
}

cubic_section!(
    /// Elevation of the reference line in meters.
    ElevationSection,
    SectionKind::Elevation
);

cubic_section!(
    /// Roll angle of the road cross section in radians.
    SuperelevationSection,
    SectionKind::Superelevation
);

cubic_section!(
    /// Crossfall angle in radians applied to one or both sides.
    CrossfallSection,
    SectionKind::Crossfall,
    side: CrossfallSide
);

impl ElevationSection {
    pub fn new(s_start: f64, profile: Cubic) -> Self {
        Self {
            s_start,
            profile,
            changes: Changes::NONE,
        }
    }
}

impl SuperelevationSection {
    pub fn new(s_start: f64, profile: Cubic) -> Self {
        Self {
            s_start,
            profile,
            changes: Changes::NONE,
        }
    }
}

impl CrossfallSection {
    pub fn new(s_start: f64, side: CrossfallSide, profile: Cubic) -> Self {
        Self {
            s_start,
            profile,
            side,
            changes: Changes::NONE,
        }
    }
}

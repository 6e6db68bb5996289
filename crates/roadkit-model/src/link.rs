//! Road links
//!
//! A road's predecessor and successor slots each hold an optional
//! [`RoadLink`] to a road end, a junction or a fiddleyard.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of element a road link targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Road,
    Junction,
    Fiddleyard,
}

/// End of a road a link attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPoint {
    Start,
    End,
}

impl ContactPoint {
    pub fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

impl fmt::Display for ContactPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::End => "end",
        })
    }
}

/// Which slot of a road a link occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Predecessor,
    Successor,
}

impl LinkType {
    /// The road end this slot sits on
    pub fn own_end(self) -> ContactPoint {
        match self {
            Self::Predecessor => ContactPoint::Start,
            Self::Successor => ContactPoint::End,
        }
    }

    /// The slot sitting on the given road end
    pub fn at_end(end: ContactPoint) -> Self {
        match end {
            ContactPoint::Start => Self::Predecessor,
            ContactPoint::End => Self::Successor,
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Predecessor => "predecessor",
            Self::Successor => "successor",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadLink {
    pub element_type: ElementType,
    pub element_id: String,
    pub contact_point: ContactPoint,
}

impl RoadLink {
    pub fn new(
        element_type: ElementType,
        element_id: impl Into<String>,
        contact_point: ContactPoint,
    ) -> Self {
        Self {
            element_type,
            element_id: element_id.into(),
            contact_point,
        }
    }

    /// Link to the given end of road `road_id`
    pub fn road(road_id: impl Into<String>, contact_point: ContactPoint) -> Self {
        Self::new(ElementType::Road, road_id, contact_point)
    }

    /// Link into junction `junction_id`
    pub fn junction(junction_id: impl Into<String>, contact_point: ContactPoint) -> Self {
        Self::new(ElementType::Junction, junction_id, contact_point)
    }

    pub fn is_road(&self) -> bool {
        self.element_type == ElementType::Road
    }

    /// Whether the link targets road `road_id`
    pub fn targets_road(&self, road_id: &str) -> bool {
        self.is_road() && self.element_id == road_id
    }
}

impl fmt::Display for RoadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.element_type {
            ElementType::Road => "road",
            ElementType::Junction => "junction",
            ElementType::Fiddleyard => "fiddleyard",
        };
        write!(f, "{kind} {} ({})", self.element_id, self.contact_point)
    }
}

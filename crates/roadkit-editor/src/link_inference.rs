//! Link inference
//!
//! Finds road ends that lie within a distance threshold of each other and
//! derives the road links, junction connections and lane links that join
//! them. Candidates are ranked by distance and applied in ascending order;
//! an end matched by several candidates keeps the last (farthest) one.

use std::fmt;

use nalgebra::Point2;
use tracing::{debug, warn};

use roadkit_model::{ContactPoint, JunctionConnection, LinkType, Road, RoadLink, RoadSystem};

use crate::lane_links::linked_lane_id;

/// Which ends of the two roads of a pair touch, as bit flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactMask(u8);

impl ContactMask {
    pub const FIRST_START: u8 = 0b0001;
    pub const FIRST_END: u8 = 0b0010;
    pub const SECOND_START: u8 = 0b0100;
    pub const SECOND_END: u8 = 0b1000;

    pub fn new(first: ContactPoint, second: ContactPoint) -> Self {
        let first = match first {
            ContactPoint::Start => Self::FIRST_START,
            ContactPoint::End => Self::FIRST_END,
        };
        let second = match second {
            ContactPoint::Start => Self::SECOND_START,
            ContactPoint::End => Self::SECOND_END,
        };
        Self(first | second)
    }

    /// Mask from raw flags; exactly one flag per road must be set
    pub fn from_bits(bits: u8) -> Option<Self> {
        let first = bits & (Self::FIRST_START | Self::FIRST_END);
        let second = bits & (Self::SECOND_START | Self::SECOND_END);
        let single = |b: u8| b.count_ones() == 1;
        (bits & !0b1111 == 0 && single(first) && single(second)).then_some(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Touching end of the first road
    pub fn first(self) -> ContactPoint {
        if self.0 & Self::FIRST_END != 0 {
            ContactPoint::End
        } else {
            ContactPoint::Start
        }
    }

    /// Touching end of the second road
    pub fn second(self) -> ContactPoint {
        if self.0 & Self::SECOND_END != 0 {
            ContactPoint::End
        } else {
            ContactPoint::Start
        }
    }

    pub fn swapped(self) -> Self {
        Self::new(self.second(), self.first())
    }
}

impl fmt::Debug for ContactMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactMask({}/{})", self.first(), self.second())
    }
}

/// Two road ends close enough to be linked.
///
/// A pair of a road with itself describes a closed loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPair {
    pub first: String,
    pub second: String,
    pub contacts: ContactMask,
    pub distance: f64,
}

impl RoadPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>, contacts: ContactMask) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            contacts,
            distance: 0.0,
        }
    }

    pub fn swapped(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
            contacts: self.contacts.swapped(),
            distance: self.distance,
        }
    }

    pub fn is_loop(&self) -> bool {
        self.first == self.second
    }
}

struct Ends<'a> {
    road: &'a Road,
    start: Point2<f64>,
    end: Point2<f64>,
}

impl<'a> Ends<'a> {
    fn of(road: &'a Road) -> Option<Self> {
        let start = road.global_point(0.0, 0.0).ok()?;
        let end = road.global_point(road.length(), 0.0).ok()?;
        Some(Self { road, start, end })
    }
}

/// Order of the endpoint combinations examined for each pair
const COMBINATIONS: [(ContactPoint, ContactPoint); 4] = [
    (ContactPoint::Start, ContactPoint::Start),
    (ContactPoint::End, ContactPoint::Start),
    (ContactPoint::End, ContactPoint::End),
    (ContactPoint::Start, ContactPoint::End),
];

/// Up to two candidates for two different roads, `first` placed first.
fn pair_candidates(first: &Ends<'_>, second: &Ends<'_>, threshold: f64, out: &mut Vec<RoadPair>) {
    let distances = [
        (first.start - second.start).norm(),
        (first.end - second.start).norm(),
        (first.end - second.end).norm(),
        (first.start - second.end).norm(),
    ];
    // Out of reach even if both roads were folded towards each other.
    if distances[0] - first.road.length() - second.road.length() > threshold {
        return;
    }

    let mut within: Vec<usize> = (0..4).filter(|k| distances[*k] <= threshold).collect();
    within.sort_by(|a, b| distances[*a].total_cmp(&distances[*b]).then(a.cmp(b)));
    for k in within.into_iter().take(2) {
        let (c1, c2) = COMBINATIONS[k];
        out.push(RoadPair {
            first: first.road.id().to_string(),
            second: second.road.id().to_string(),
            contacts: ContactMask::new(c1, c2),
            distance: distances[k],
        });
    }
}

/// Ranked link candidates among `road_ids`.
///
/// Pairs of two junction roads are never considered. In a mixed pair the
/// junction road comes first. Roads without a reference line are skipped.
pub fn candidate_pairs(system: &RoadSystem, road_ids: &[String], threshold: f64) -> Vec<RoadPair> {
    let ends: Vec<Ends<'_>> = road_ids
        .iter()
        .filter_map(|id| system.road(id))
        .filter_map(Ends::of)
        .collect();

    let mut pairs = Vec::new();
    for (i, a) in ends.iter().enumerate() {
        if a.road.is_in_junction() {
            for b in ends[i + 1..].iter().filter(|b| !b.road.is_in_junction()) {
                pair_candidates(a, b, threshold, &mut pairs);
            }
            continue;
        }
        let closure = (a.start - a.end).norm();
        if closure <= threshold {
            pairs.push(RoadPair {
                first: a.road.id().to_string(),
                second: a.road.id().to_string(),
                contacts: ContactMask::new(ContactPoint::Start, ContactPoint::End),
                distance: closure,
            });
        }
        for b in &ends[i + 1..] {
            if b.road.is_in_junction() {
                pair_candidates(b, a, threshold, &mut pairs);
            } else {
                pair_candidates(a, b, threshold, &mut pairs);
            }
        }
    }
    pairs.sort_by(|x, y| x.distance.total_cmp(&y.distance));
    debug!(roads = ends.len(), candidates = pairs.len(), threshold, "link candidates ranked");
    pairs
}

/// A road link to install in one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLink {
    pub road: String,
    pub slot: LinkType,
    pub link: RoadLink,
}

/// A junction connection to add.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedConnection {
    pub junction: String,
    pub connection: JunctionConnection,
}

/// Every mutation link inference derives from a list of pairs, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPlan {
    pub links: Vec<PlannedLink>,
    pub connections: Vec<PlannedConnection>,
}

impl LinkPlan {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.connections.is_empty()
    }
}

/// Translate ranked pairs into links and junction connections.
///
/// Two plain roads get reciprocal road links. When one road of the pair
/// belongs to a junction, it links to the other road directly while the
/// other road links to the junction, and the junction gains a connection
/// with lane links derived from the junction road's boundary lanes.
pub fn plan_links(system: &RoadSystem, pairs: &[RoadPair]) -> LinkPlan {
    let mut plan = LinkPlan::default();
    for pair in pairs {
        let (Some(a), Some(b)) = (system.road(&pair.first), system.road(&pair.second)) else {
            warn!(first = %pair.first, second = %pair.second, "link candidate names a missing road");
            continue;
        };
        if a.is_in_junction() && b.is_in_junction() {
            continue;
        }
        let pair = if !a.is_in_junction() && b.is_in_junction() {
            pair.swapped()
        } else {
            pair.clone()
        };
        let (c1, c2) = (pair.contacts.first(), pair.contacts.second());
        let slot1 = LinkType::at_end(c1);
        let slot2 = LinkType::at_end(c2);
        let Some(first) = system.road(&pair.first) else {
            continue;
        };

        if !first.is_in_junction() {
            plan.links.push(PlannedLink {
                road: pair.first.clone(),
                slot: slot1,
                link: RoadLink::road(pair.second.clone(), c2),
            });
            plan.links.push(PlannedLink {
                road: pair.second.clone(),
                slot: slot2,
                link: RoadLink::road(pair.first.clone(), c1),
            });
            continue;
        }

        let junction_id = first.junction().to_string();
        let Some(junction) = system.junction(&junction_id) else {
            warn!(road = %pair.first, junction = %junction_id, "road belongs to a missing junction");
            continue;
        };
        let planned = plan
            .connections
            .iter()
            .filter(|c| c.junction == junction_id)
            .count();
        let id = junction
            .next_connection_ids(planned + 1)
            .pop()
            .unwrap_or_else(|| format!("jc{planned}"));
        let mut connection = JunctionConnection::new(id, pair.second.clone(), pair.first.clone(), c1);
        // Every lane of the connecting road, the center lane included.
        if let Some(section) = first.boundary_lane_section(c1) {
            for lane in section.lanes() {
                connection.add_lane_link(linked_lane_id(slot2, c1, lane.id()), lane.id());
            }
        }

        plan.links.push(PlannedLink {
            road: pair.first.clone(),
            slot: slot1,
            link: RoadLink::road(pair.second.clone(), c2),
        });
        plan.links.push(PlannedLink {
            road: pair.second.clone(),
            slot: slot2,
            link: RoadLink::junction(junction_id.clone(), c1),
        });
        plan.connections.push(PlannedConnection {
            junction: junction_id,
            connection,
        });
    }
    plan
}

//! Lane-level link bookkeeping
//!
//! Road links imply links between the lanes of the touching boundary lane
//! sections. The helpers here derive those lane links and snapshot them so
//! commands can restore the exact previous wiring on undo.

use smallvec::SmallVec;

use roadkit_core::CENTER_LANE;
use roadkit_model::{ContactPoint, LinkType, RoadSystem};

/// Saved predecessor/successor of one lane.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneLinkEntry {
    pub road: String,
    pub section: f64,
    pub lane: i32,
    pub predecessor: Option<i32>,
    pub successor: Option<i32>,
}

/// Lane links of a set of lane sections, captured before an edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneLinkSnapshot {
    entries: Vec<LaneLinkEntry>,
}

impl LaneLinkSnapshot {
    /// Every lane of every lane section of `roads`
    pub fn capture(system: &RoadSystem, roads: &[String]) -> Self {
        let mut snapshot = Self::default();
        for id in roads {
            let Some(road) = system.road(id) else {
                continue;
            };
            for section in road.lane_sections().iter() {
                snapshot.push_section(id, section);
            }
        }
        snapshot
    }

    /// Every lane of the lane section of `road` starting at `section`
    pub fn capture_section(system: &RoadSystem, road: &str, section: f64) -> Self {
        let mut snapshot = Self::default();
        if let Some(lane_section) = system
            .road(road)
            .and_then(|r| r.lane_sections().get_exact(section))
        {
            snapshot.push_section(road, lane_section);
        }
        snapshot
    }

    fn push_section(&mut self, road: &str, section: &roadkit_model::LaneSection) {
        for lane in section.lanes() {
            self.entries.push(LaneLinkEntry {
                road: road.to_string(),
                section: section.s_start(),
                lane: lane.id(),
                predecessor: lane.predecessor(),
                successor: lane.successor(),
            });
        }
    }

    pub fn extend(&mut self, other: LaneLinkSnapshot) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[LaneLinkEntry] {
        &self.entries
    }

    /// Write the saved links back. Lanes that no longer exist are skipped.
    pub fn restore(&self, system: &mut RoadSystem) {
        for entry in &self.entries {
            let Some(lane) = system
                .road_mut(&entry.road)
                .and_then(|r| r.lane_sections_mut().get_exact_mut(entry.section))
                .and_then(|s| s.lane_mut(entry.lane))
            else {
                continue;
            };
            if lane.predecessor() != entry.predecessor {
                lane.set_predecessor(entry.predecessor);
            }
            if lane.successor() != entry.successor {
                lane.set_successor(entry.successor);
            }
        }
    }
}

/// Which lanes of a boundary section take part in link propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneFilter {
    /// Left lanes for a predecessor link, right lanes for a successor link
    SlotSide,
    /// Every lane except the center lane
    AllLanes,
}

impl LaneFilter {
    fn accepts(self, slot: LinkType, id: i32) -> bool {
        if id == CENTER_LANE {
            return false;
        }
        match self {
            Self::AllLanes => true,
            Self::SlotSide => match slot {
                LinkType::Predecessor => id > 0,
                LinkType::Successor => id < 0,
            },
        }
    }
}

/// Lane id on the linked road that lane `id` connects to.
///
/// Roads meeting start-to-start or end-to-end run in opposite directions,
/// so the lane sides swap.
pub fn linked_lane_id(slot: LinkType, contact: ContactPoint, id: i32) -> i32 {
    match (slot, contact) {
        (LinkType::Predecessor, ContactPoint::Start) | (LinkType::Successor, ContactPoint::End) => {
            -id
        }
        _ => id,
    }
}

/// Wire the lanes of `road`'s boundary section at `slot` to the lanes of
/// the road its link in `slot` points at.
///
/// Does nothing for junction or fiddleyard links or when the linked road is
/// missing. Lanes without a counterpart keep their links.
pub fn propagate_lane_links(
    system: &mut RoadSystem,
    road: &str,
    slot: LinkType,
    filter: LaneFilter,
) {
    let Some(own) = system.road(road) else {
        return;
    };
    let Some(link) = own.link(slot).filter(|l| l.is_road()).cloned() else {
        return;
    };
    let Some(own_section) = own.boundary_lane_section(slot.own_end()) else {
        return;
    };
    let Some(other_section) = system
        .road(&link.element_id)
        .and_then(|r| r.boundary_lane_section(link.contact_point))
    else {
        return;
    };

    let pairs: SmallVec<[(i32, i32); 8]> = own_section
        .lanes()
        .map(|lane| lane.id())
        .filter(|id| filter.accepts(slot, *id))
        .map(|id| (id, linked_lane_id(slot, link.contact_point, id)))
        .filter(|(_, target)| other_section.contains_lane(*target))
        .collect();
    let own_start = own_section.s_start();
    let other_start = other_section.s_start();
    let other_slot = LinkType::at_end(link.contact_point);

    for (id, target) in pairs {
        if let Some(lane) = system
            .road_mut(road)
            .and_then(|r| r.lane_sections_mut().get_exact_mut(own_start))
            .and_then(|s| s.lane_mut(id))
        {
            set_lane_link(lane, slot, Some(target));
        }
        if let Some(lane) = system
            .road_mut(&link.element_id)
            .and_then(|r| r.lane_sections_mut().get_exact_mut(other_start))
            .and_then(|s| s.lane_mut(target))
        {
            set_lane_link(lane, other_slot, Some(id));
        }
    }
}

/// Link every boundary lane of `road` back to its own id
pub fn reset_boundary_lane_links(system: &mut RoadSystem, road: &str) {
    let Some(road) = system.road_mut(road) else {
        return;
    };
    if let Some(section) = road.boundary_lane_section_mut(ContactPoint::Start) {
        for lane in section.lanes_mut() {
            let id = lane.id();
            lane.set_predecessor(Some(id));
        }
    }
    if let Some(section) = road.boundary_lane_section_mut(ContactPoint::End) {
        for lane in section.lanes_mut() {
            let id = lane.id();
            lane.set_successor(Some(id));
        }
    }
}

/// Rewrite the lane links pointing into the lane section of `road` at
/// `section` after its lanes were renumbered.
///
/// `map` turns an old lane id into the new one, `None` clearing the link.
/// The successor links of the preceding section and the predecessor links
/// of the following section are updated.
pub fn remap_neighbour_links<F>(system: &mut RoadSystem, road: &str, section: f64, map: F)
where
    F: Fn(i32) -> Option<i32>,
{
    let Some(road) = system.road_mut(road) else {
        return;
    };
    let previous = road.lane_section_before(section).map(|s| s.s_start());
    let next = road.lane_sections().get_next(section).map(|s| s.s_start());

    if let Some(lanes) = previous.and_then(|s| road.lane_sections_mut().get_exact_mut(s)) {
        for lane in lanes.lanes_mut() {
            if let Some(target) = lane.successor() {
                let mapped = map(target);
                if mapped != Some(target) {
                    lane.set_successor(mapped);
                }
            }
        }
    }
    if let Some(lanes) = next.and_then(|s| road.lane_sections_mut().get_exact_mut(s)) {
        for lane in lanes.lanes_mut() {
            if let Some(target) = lane.predecessor() {
                let mapped = map(target);
                if mapped != Some(target) {
                    lane.set_predecessor(mapped);
                }
            }
        }
    }
}

/// Lane links of the sections neighbouring `section` on `road`
pub fn capture_neighbours(system: &RoadSystem, road: &str, section: f64) -> LaneLinkSnapshot {
    let mut snapshot = LaneLinkSnapshot::default();
    let Some(r) = system.road(road) else {
        return snapshot;
    };
    if let Some(previous) = r.lane_section_before(section) {
        snapshot.extend(LaneLinkSnapshot::capture_section(
            system,
            road,
            previous.s_start(),
        ));
    }
    if let Some(next) = r.lane_sections().get_next(section) {
        snapshot.extend(LaneLinkSnapshot::capture_section(system, road, next.s_start()));
    }
    snapshot
}

pub(crate) fn set_lane_link(lane: &mut roadkit_model::Lane, slot: LinkType, id: Option<i32>) {
    match slot {
        LinkType::Predecessor => lane.set_predecessor(id),
        LinkType::Successor => lane.set_successor(id),
    }
}

pub(crate) fn lane_link(lane: &roadkit_model::Lane, slot: LinkType) -> Option<i32> {
    match slot {
        LinkType::Predecessor => lane.predecessor(),
        LinkType::Successor => lane.successor(),
    }
}

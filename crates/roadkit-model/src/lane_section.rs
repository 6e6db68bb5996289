//! Lane sections
//!
//! A lane section holds the lanes valid over `[s_start, s_end)` of a road.
//! `s_end` is implicit: the next lane section's start or the road length.
//! Lane ids form one contiguous run on each side of the center lane 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use roadkit_core::{RoadError, RoadResult, CENTER_LANE};

use crate::changes::Changes;
use crate::lane::Lane;
use crate::section::{RoadSection, SectionKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSection {
    s_start: f64,
    lanes: BTreeMap<i32, Lane>,
    #[serde(skip)]
    changes: Changes,
}

impl LaneSection {
    /// Empty lane section starting at `s_start`
    pub fn new(s_start: f64) -> Self {
        Self {
            s_start,
            lanes: BTreeMap::new(),
            changes: Changes::NONE,
        }
    }

    /// Lane section holding `lanes`, keyed by their ids
    pub fn with_lanes(s_start: f64, lanes: impl IntoIterator<Item = Lane>) -> RoadResult<Self> {
        let mut section = Self::new(s_start);
        for lane in lanes {
            section.add_lane(lane)?;
        }
        section.changes.clear();
        Ok(section)
    }

    pub fn s_start(&self) -> f64 {
        self.s_start
    }

    pub fn lanes(&self) -> impl DoubleEndedIterator<Item = &Lane> + '_ {
        self.lanes.values()
    }

    pub fn lanes_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Lane> + '_ {
        self.lanes.values_mut()
    }

    pub fn lane_ids(&self) -> Vec<i32> {
        self.lanes.keys().copied().collect()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lane(&self, id: i32) -> Option<&Lane> {
        self.lanes.get(&id)
    }

    pub fn lane_mut(&mut self, id: i32) -> Option<&mut Lane> {
        self.lanes.get_mut(&id)
    }

    pub fn contains_lane(&self, id: i32) -> bool {
        self.lanes.contains_key(&id)
    }

    /// Lane `id` or a [`RoadError::LaneNotFound`]
    pub fn try_lane(&self, id: i32) -> RoadResult<&Lane> {
        self.lanes.get(&id).ok_or(RoadError::LaneNotFound {
            id,
            s: self.s_start,
        })
    }

    pub fn try_lane_mut(&mut self, id: i32) -> RoadResult<&mut Lane> {
        let s = self.s_start;
        self.lanes
            .get_mut(&id)
            .ok_or(RoadError::LaneNotFound { id, s })
    }

    pub fn add_lane(&mut self, lane: Lane) -> RoadResult<()> {
        let id = lane.id();
        if self.lanes.contains_key(&id) {
            return Err(RoadError::DuplicateLane {
                id,
                s: self.s_start,
            });
        }
        self.lanes.insert(id, lane);
        self.changes |= Changes::LANES;
        Ok(())
    }

    pub fn remove_lane(&mut self, id: i32) -> RoadResult<Lane> {
        let lane = self.lanes.remove(&id).ok_or(RoadError::LaneNotFound {
            id,
            s: self.s_start,
        })?;
        self.changes |= Changes::LANES;
        Ok(lane)
    }

    /// Re-key lane `old` as `new`. Fails if `new` is occupied.
    pub fn renumber_lane(&mut self, old: i32, new: i32) -> RoadResult<()> {
        if old == new {
            return self.try_lane(old).map(|_| ());
        }
        if self.lanes.contains_key(&new) {
            return Err(RoadError::DuplicateLane {
                id: new,
                s: self.s_start,
            });
        }
        let mut lane = self.remove_lane(old)?;
        lane.set_id(new);
        self.lanes.insert(new, lane);
        Ok(())
    }

    /// The id of the lane with the greatest id below `id`
    pub fn next_lower(&self, id: i32) -> Option<i32> {
        self.lanes.range(..id).next_back().map(|(k, _)| *k)
    }

    /// The id of the lane with the smallest id above `id`
    pub fn next_upper(&self, id: i32) -> Option<i32> {
        self.lanes.range(id + 1..).next().map(|(k, _)| *k)
    }

    /// Id of the outermost right lane (most negative), if any
    pub fn right_most(&self) -> Option<i32> {
        self.lanes.keys().next().copied().filter(|id| *id < CENTER_LANE)
    }

    /// Id of the outermost left lane, if any
    pub fn left_most(&self) -> Option<i32> {
        self.lanes
            .keys()
            .next_back()
            .copied()
            .filter(|id| *id > CENTER_LANE)
    }

    /// Whether the ids are `{-k..-1} ∪ {0} ∪ {1..m}` without gaps
    pub fn has_contiguous_ids(&self) -> bool {
        if !self.lanes.contains_key(&CENTER_LANE) {
            return false;
        }
        let ids: Vec<i32> = self.lanes.keys().copied().collect();
        ids.windows(2).all(|pair| pair[1] == pair[0] + 1)
    }

    /// Width of lane `id` at road coordinate `s`
    pub fn lane_width(&self, id: i32, s: f64) -> f64 {
        self.lanes
            .get(&id)
            .map_or(0.0, |lane| lane.width(s - self.s_start))
    }

    pub fn changes(&self) -> Changes {
        self.changes
    }

    /// Clear the flags of the section and of its lanes
    pub fn clear_all_changes(&mut self) {
        self.changes.clear();
        for lane in self.lanes.values_mut() {
            lane.clear_changes();
        }
    }

    /// Lane section combining `low` with the following section `high`.
    ///
    /// The result starts at `low`'s start and keeps `low`'s lanes; width and
    /// road-mark entries of `high` are appended to the lane with the same id,
    /// shifted by the distance between the two starts.
    pub fn merged(low: &LaneSection, high: &LaneSection) -> LaneSection {
        let offset = high.s_start - low.s_start;
        let mut merged = LaneSection {
            s_start: low.s_start,
            lanes: low.lanes.clone(),
            changes: Changes::LANES,
        };
        for lane in high.lanes.values() {
            match merged.lanes.get_mut(&lane.id()) {
                Some(target) => {
                    target.append_shifted(lane, offset);
                    target.set_successor(lane.successor());
                }
                None => {
                    let mut extra = Lane::new(lane.id(), lane.lane_type());
                    extra.append_shifted(lane, offset);
                    extra.set_successor(lane.successor());
                    merged.lanes.insert(lane.id(), extra);
                }
            }
        }
        merged
    }
}

impl RoadSection for LaneSection {
    const KIND: SectionKind = SectionKind::Lane;

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
        self.clear_all_changes();
    }

    fn clip(&self, from: f64, to: f64) -> Self {
        let local_from = from - self.s_start;
        let local_to = to - self.s_start;
        LaneSection {
            s_start: from,
            lanes: self
                .lanes
                .iter()
                .map(|(id, lane)| (*id, lane.clip(local_from, local_to)))
                .collect(),
            changes: Changes::NONE,
        }
    }
}

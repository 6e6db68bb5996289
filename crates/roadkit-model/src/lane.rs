//! Lanes, lane widths and road marks

use serde::{Deserialize, Serialize};

use roadkit_core::{Cubic, RoadError, RoadResult, SMap};

use crate::changes::Changes;

/// OpenDRIVE lane type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneType {
    #[default]
    Driving,
    None,
    Stop,
    Shoulder,
    Biking,
    Sidewalk,
    Border,
    Restricted,
    Parking,
    Median,
    Entry,
    Exit,
    OnRamp,
    OffRamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadMarkType {
    #[default]
    None,
    Solid,
    Broken,
    SolidSolid,
    SolidBroken,
    BrokenSolid,
    BrokenBroken,
    BottsDots,
    Grass,
    Curb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadMarkWeight {
    #[default]
    Standard,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadMarkColor {
    #[default]
    Standard,
    White,
    Yellow,
    Blue,
    Green,
    Red,
}

/// Lane changes a road mark permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadMarkLaneChange {
    Increase,
    Decrease,
    #[default]
    Both,
    None,
}

/// Width polynomial valid from `s_offset` (relative to the lane section start).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneWidth {
    pub s_offset: f64,
    pub profile: Cubic,
}

impl LaneWidth {
    pub fn new(s_offset: f64, profile: Cubic) -> Self {
        Self { s_offset, profile }
    }

    /// Width at `ds`, measured from the lane section start
    pub fn width(&self, ds: f64) -> f64 {
        self.profile.value(ds - self.s_offset)
    }
}

/// Road mark valid from `s_offset` (relative to the lane section start).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRoadMark {
    pub s_offset: f64,
    pub mark_type: RoadMarkType,
    pub weight: RoadMarkWeight,
    pub color: RoadMarkColor,
    pub width: f64,
    pub lane_change: RoadMarkLaneChange,
}

impl LaneRoadMark {
    pub fn new(s_offset: f64, mark_type: RoadMarkType) -> Self {
        Self {
            s_offset,
            mark_type,
            weight: RoadMarkWeight::Standard,
            color: RoadMarkColor::Standard,
            width: 0.12,
            lane_change: RoadMarkLaneChange::Both,
        }
    }
}

/// A lane of a lane section.
///
/// Ids are signed: 0 is the center divider, positive ids lie left of the
/// reference line, negative ids right of it. Predecessor and successor are
/// lane ids on the neighbouring lane section (or linked road); `None` means
/// no link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    id: i32,
    lane_type: LaneType,
    level: bool,
    predecessor: Option<i32>,
    successor: Option<i32>,
    widths: SMap<LaneWidth>,
    road_marks: SMap<LaneRoadMark>,
    #[serde(skip)]
    changes: Changes,
}

impl Lane {
    /// Lane linked to its own id on both ends
    pub fn new(id: i32, lane_type: LaneType) -> Self {
        Self {
            id,
            lane_type,
            level: false,
            predecessor: Some(id),
            successor: Some(id),
            widths: SMap::new(),
            road_marks: SMap::new(),
            changes: Changes::NONE,
        }
    }

    /// Lane with one constant width entry
    pub fn with_width(id: i32, lane_type: LaneType, width: f64) -> Self {
        let mut lane = Self::new(id, lane_type);
        // An empty width map always accepts offset 0.
        let _ = lane.widths.insert(0.0, LaneWidth::new(0.0, Cubic::constant(width)));
        lane
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn set_id(&mut self, id: i32) {
        self.id = id;
        self.changes |= Changes::ID;
    }

    pub fn lane_type(&self) -> LaneType {
        self.lane_type
    }

    pub fn set_lane_type(&mut self, lane_type: LaneType) {
        self.lane_type = lane_type;
        self.changes |= Changes::TYPE;
    }

    pub fn level(&self) -> bool {
        self.level
    }

    pub fn set_level(&mut self, level: bool) {
        self.level = level;
        self.changes |= Changes::PARAMS;
    }

    pub fn predecessor(&self) -> Option<i32> {
        self.predecessor
    }

    pub fn set_predecessor(&mut self, id: Option<i32>) {
        self.predecessor = id;
        self.changes |= Changes::LINK;
    }

    pub fn successor(&self) -> Option<i32> {
        self.successor
    }

    pub fn set_successor(&mut self, id: Option<i32>) {
        self.successor = id;
        self.changes |= Changes::LINK;
    }

    pub fn changes(&self) -> Changes {
        self.changes
    }

    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    // Widths

    pub fn widths(&self) -> &SMap<LaneWidth> {
        &self.widths
    }

    pub fn width_entry(&self, s_offset: f64) -> Option<&LaneWidth> {
        self.widths.get(s_offset)
    }

    pub fn width_entry_mut(&mut self, s_offset: f64) -> Option<&mut LaneWidth> {
        self.changes |= Changes::WIDTH;
        self.widths.get_mut(s_offset)
    }

    /// Width at `ds` from the lane section start, 0 without width entries
    pub fn width(&self, ds: f64) -> f64 {
        self.widths
            .containing(ds)
            .map_or(0.0, |(_, entry)| entry.width(ds))
    }

    /// End of the width entry at `s_offset`: next offset or the section length
    pub fn width_end(&self, s_offset: f64, section_length: f64) -> f64 {
        self.widths.end_of(s_offset, section_length)
    }

    pub fn add_width(&mut self, width: LaneWidth) -> RoadResult<()> {
        let s_offset = width.s_offset;
        self.widths
            .insert(s_offset, width)
            .map_err(|_| RoadError::duplicate_section("lane width", s_offset))?;
        self.changes |= Changes::WIDTH;
        Ok(())
    }

    pub fn remove_width(&mut self, s_offset: f64) -> RoadResult<LaneWidth> {
        let removed = self.widths.remove(s_offset).ok_or(RoadError::LaneWidthNotFound {
            lane: self.id,
            s_offset,
        })?;
        self.changes |= Changes::WIDTH;
        Ok(removed)
    }

    /// Move the width entry at `old` to `new`, keeping the entry's offset in sync
    pub fn move_width(&mut self, old: f64, new: f64) -> RoadResult<()> {
        if !self.widths.move_key(old, new) {
            return Err(RoadError::LaneWidthNotFound {
                lane: self.id,
                s_offset: old,
            });
        }
        if let Some(entry) = self.widths.get_mut(new) {
            entry.s_offset = roadkit_core::canonical_s(new);
        }
        self.changes |= Changes::WIDTH;
        Ok(())
    }

    // Road marks

    pub fn road_marks(&self) -> &SMap<LaneRoadMark> {
        &self.road_marks
    }

    pub fn road_mark(&self, s_offset: f64) -> Option<&LaneRoadMark> {
        self.road_marks.get(s_offset)
    }

    pub fn road_mark_mut(&mut self, s_offset: f64) -> Option<&mut LaneRoadMark> {
        self.changes |= Changes::ROAD_MARK;
        self.road_marks.get_mut(s_offset)
    }

    pub fn add_road_mark(&mut self, mark: LaneRoadMark) -> RoadResult<()> {
        let s_offset = mark.s_offset;
        self.road_marks
            .insert(s_offset, mark)
            .map_err(|_| RoadError::duplicate_section("road mark", s_offset))?;
        self.changes |= Changes::ROAD_MARK;
        Ok(())
    }

    pub fn remove_road_mark(&mut self, s_offset: f64) -> RoadResult<LaneRoadMark> {
        let removed = self
            .road_marks
            .remove(s_offset)
            .ok_or(RoadError::RoadMarkNotFound {
                lane: self.id,
                s_offset,
            })?;
        self.changes |= Changes::ROAD_MARK;
        Ok(removed)
    }

    pub fn move_road_mark(&mut self, old: f64, new: f64) -> RoadResult<()> {
        if !self.road_marks.move_key(old, new) {
            return Err(RoadError::RoadMarkNotFound {
                lane: self.id,
                s_offset: old,
            });
        }
        if let Some(mark) = self.road_marks.get_mut(new) {
            mark.s_offset = roadkit_core::canonical_s(new);
        }
        self.changes |= Changes::ROAD_MARK;
        Ok(())
    }

    /// Copy of the lane restricted to local `[from, to)`, re-based at `from`
    pub fn clip(&self, from: f64, to: f64) -> Lane {
        let mut lane = Lane {
            widths: SMap::new(),
            road_marks: SMap::new(),
            changes: Changes::NONE,
            ..self.clone()
        };
        for (offset, entry) in self.widths.range(from, to) {
            let shifted = offset - from;
            let _ = lane
                .widths
                .insert(shifted, LaneWidth::new(shifted, entry.profile));
        }
        if !lane.widths.contains_key(0.0) {
            if let Some((offset, entry)) = self.widths.containing(from) {
                let _ = lane
                    .widths
                    .insert(0.0, LaneWidth::new(0.0, entry.profile.rebased(from - offset)));
            }
        }
        for (offset, mark) in self.road_marks.range(from, to) {
            let shifted = offset - from;
            let _ = lane.road_marks.insert(
                shifted,
                LaneRoadMark {
                    s_offset: shifted,
                    ..mark.clone()
                },
            );
        }
        if !lane.road_marks.contains_key(0.0) {
            if let Some((_, mark)) = self.road_marks.containing(from) {
                let _ = lane.road_marks.insert(
                    0.0,
                    LaneRoadMark {
                        s_offset: 0.0,
                        ..mark.clone()
                    },
                );
            }
        }
        lane
    }

    /// Append copies of `other`'s entries shifted by `offset`.
    ///
    /// Entries colliding with an existing offset are skipped.
    pub fn append_shifted(&mut self, other: &Lane, offset: f64) {
        for (s, entry) in other.widths.iter() {
            let shifted = s + offset;
            let _ = self
                .widths
                .insert(shifted, LaneWidth::new(shifted, entry.profile));
        }
        for (s, mark) in other.road_marks.iter() {
            let shifted = s + offset;
            let _ = self.road_marks.insert(
                shifted,
                LaneRoadMark {
                    s_offset: shifted,
                    ..mark.clone()
                },
            );
        }
        self.changes |= Changes::WIDTH | Changes::ROAD_MARK;
    }
}

//! Road mark commands

use roadkit_core::{RoadError, NUMERICAL_ZERO6};
use roadkit_model::{
    LaneRoadMark, RoadMarkColor, RoadMarkLaneChange, RoadMarkType, RoadMarkWeight, RoadSystem,
};

use super::{road, CommandInfo, LaneRef};
use crate::error::CommandResult;

/// Address of a road mark: its lane and local start offset.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMarkRef {
    pub lane: LaneRef,
    pub s_offset: f64,
}

impl RoadMarkRef {
    pub fn new(lane: LaneRef, s_offset: f64) -> Self {
        Self { lane, s_offset }
    }

    fn resolve<'a>(&self, system: &'a RoadSystem) -> Option<&'a LaneRoadMark> {
        self.lane.resolve(system).ok()?.road_mark(self.s_offset)
    }

    fn resolve_mut<'a>(&self, system: &'a mut RoadSystem) -> CommandResult<&'a mut LaneRoadMark> {
        let lane = self.lane.resolve_mut(system)?;
        let id = lane.id();
        Ok(lane
            .road_mark_mut(self.s_offset)
            .ok_or(RoadError::RoadMarkNotFound {
                lane: id,
                s_offset: self.s_offset,
            })?)
    }
}

/// Move a road mark along its lane.
///
/// The mark stays between its neighbouring marks and inside the lane
/// section.
#[derive(Debug)]
pub struct SetRoadMarkSOffsetCommand {
    info: CommandInfo,
    lane: LaneRef,
    old: f64,
    new: f64,
}

impl SetRoadMarkSOffsetCommand {
    const TEXT: &'static str = "Set Road Mark Offset";

    pub fn new(system: &RoadSystem, mark: &RoadMarkRef, s_offset: f64) -> Self {
        let info = match Self::check(system, mark, s_offset) {
            Ok(()) => CommandInfo::new(Self::TEXT),
            Err(reason) => CommandInfo::invalid(Self::TEXT, reason),
        };
        Self {
            info,
            lane: mark.lane.clone(),
            old: mark.s_offset,
            new: s_offset,
        }
    }

    fn check(system: &RoadSystem, mark: &RoadMarkRef, s_offset: f64) -> Result<(), &'static str> {
        let lane = mark.lane.resolve(system).map_err(|_| "lane not found")?;
        if lane.road_mark(mark.s_offset).is_none() {
            return Err("road mark not found");
        }
        if (s_offset - mark.s_offset).abs() < NUMERICAL_ZERO6 {
            return Err("offset unchanged");
        }
        let section_length = road(system, &mark.lane.road)
            .map(|r| r.lane_section_end(mark.lane.section) - mark.lane.section)
            .map_err(|_| "road not found")?;
        if s_offset < 0.0 || s_offset >= section_length {
            return Err("offset outside the lane section");
        }
        let marks = lane.road_marks();
        let lower = marks.before(mark.s_offset).map_or(-1.0, |(s, _)| s);
        let upper = marks
            .next_after(mark.s_offset)
            .map_or(section_length, |(s, _)| s);
        if s_offset <= lower || s_offset >= upper {
            return Err("offset passes a neighbouring road mark");
        }
        Ok(())
    }

    /// Absorb a following move of the same mark
    pub fn merge_with(&mut self, other: &SetRoadMarkSOffsetCommand) -> bool {
        if !self.info.is_valid() || !other.info.is_valid() || self.lane != other.lane {
            return false;
        }
        if (other.old - self.new).abs() > NUMERICAL_ZERO6 {
            return false;
        }
        self.new = other.new;
        true
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.lane
            .resolve_mut(system)?
            .move_road_mark(self.old, self.new)?;
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.lane
            .resolve_mut(system)?
            .move_road_mark(self.new, self.old)?;
        Ok(())
    }
}

/// One road mark attribute and its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoadMarkProperty {
    Type(RoadMarkType),
    Weight(RoadMarkWeight),
    Color(RoadMarkColor),
    Width(f64),
    LaneChange(RoadMarkLaneChange),
}

impl RoadMarkProperty {
    /// Current value of the same attribute on `mark`
    fn read(self, mark: &LaneRoadMark) -> Self {
        match self {
            Self::Type(_) => Self::Type(mark.mark_type),
            Self::Weight(_) => Self::Weight(mark.weight),
            Self::Color(_) => Self::Color(mark.color),
            Self::Width(_) => Self::Width(mark.width),
            Self::LaneChange(_) => Self::LaneChange(mark.lane_change),
        }
    }

    fn write(self, mark: &mut LaneRoadMark) {
        match self {
            Self::Type(v) => mark.mark_type = v,
            Self::Weight(v) => mark.weight = v,
            Self::Color(v) => mark.color = v,
            Self::Width(v) => mark.width = v,
            Self::LaneChange(v) => mark.lane_change = v,
        }
    }
}

/// Set one attribute on several road marks at once.
#[derive(Debug)]
pub struct SetRoadMarkPropertyCommand {
    info: CommandInfo,
    marks: Vec<RoadMarkRef>,
    old: Vec<RoadMarkProperty>,
    new: RoadMarkProperty,
}

impl SetRoadMarkPropertyCommand {
    const TEXT: &'static str = "Set Road Mark Property";

    pub fn new(system: &RoadSystem, marks: Vec<RoadMarkRef>, property: RoadMarkProperty) -> Self {
        let resolved: Option<Vec<RoadMarkProperty>> = marks
            .iter()
            .map(|m| m.resolve(system).map(|mark| property.read(mark)))
            .collect();
        let mut old = Vec::new();
        let info = match resolved {
            _ if marks.is_empty() => CommandInfo::invalid(Self::TEXT, "no road marks given"),
            None => CommandInfo::invalid(Self::TEXT, "road mark not found"),
            Some(_) if matches!(property, RoadMarkProperty::Width(w) if w < 0.0) => {
                CommandInfo::invalid(Self::TEXT, "negative width")
            }
            Some(values) if values.iter().all(|v| *v == property) => {
                CommandInfo::invalid(Self::TEXT, "property unchanged")
            }
            Some(values) => {
                old = values;
                CommandInfo::new(Self::TEXT)
            }
        };
        Self {
            info,
            marks,
            old,
            new: property,
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for mark in &self.marks {
            self.new.write(mark.resolve_mut(system)?);
        }
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for (mark, old) in self.marks.iter().zip(&self.old).rev() {
            old.write(mark.resolve_mut(system)?);
        }
        Ok(())
    }
}

impl_command!(SetRoadMarkSOffsetCommand, SetRoadMarkPropertyCommand);

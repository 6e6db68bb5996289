//! Lane width editing
//!
//! Width entries are addressed by lane and local start offset. Both
//! commands replace the touched entries with linear profiles and keep the
//! replaced profiles for undo.

use nalgebra::Vector2;

use roadkit_core::{Cubic, MIN_LANESECTION_LENGTH, NUMERICAL_ZERO6, NUMERICAL_ZERO8};
use roadkit_model::RoadSystem;

use super::{CommandInfo, LaneRef};
use crate::error::{CommandError, CommandResult};

/// Which end of a width entry an edit moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthEndpoint {
    Start,
    End,
}

/// One end of one width entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WidthRef {
    pub lane: LaneRef,
    pub s_offset: f64,
    pub endpoint: WidthEndpoint,
}

impl WidthRef {
    pub fn start(lane: LaneRef, s_offset: f64) -> Self {
        Self {
            lane,
            s_offset,
            endpoint: WidthEndpoint::Start,
        }
    }

    pub fn end(lane: LaneRef, s_offset: f64) -> Self {
        Self {
            lane,
            s_offset,
            endpoint: WidthEndpoint::End,
        }
    }
}

/// Profile and extent of a width entry before the edit
#[derive(Debug, Clone, PartialEq)]
struct EntryState {
    lane: LaneRef,
    s_offset: f64,
    profile: Cubic,
    length: f64,
    section_length: f64,
    moves_start: bool,
    moves_end: bool,
}

impl EntryState {
    fn capture(system: &RoadSystem, point: &WidthRef) -> Option<Self> {
        let road = system.road(&point.lane.road)?;
        let section_length = road.lane_section_end(point.lane.section) - point.lane.section;
        let lane = point.lane.resolve(system).ok()?;
        let entry = lane.width_entry(point.s_offset)?;
        let length = lane.width_end(entry.s_offset, section_length) - entry.s_offset;
        (length > NUMERICAL_ZERO8).then(|| Self {
            lane: point.lane.clone(),
            s_offset: entry.s_offset,
            profile: entry.profile,
            length,
            section_length,
            moves_start: point.endpoint == WidthEndpoint::Start,
            moves_end: point.endpoint == WidthEndpoint::End,
        })
    }

    fn same_entry(&self, lane: &LaneRef, s_offset: f64) -> bool {
        self.lane == *lane && (self.s_offset - s_offset).abs() < NUMERICAL_ZERO6
    }

    fn start_value(&self) -> f64 {
        self.profile.value(0.0)
    }

    fn end_value(&self) -> f64 {
        self.profile.value(self.length)
    }
}

/// Capture every addressed entry, merging start and end points of the same
/// entry. `None` when any point does not resolve.
fn capture_entries(system: &RoadSystem, points: &[WidthRef]) -> Option<Vec<EntryState>> {
    let mut entries: Vec<EntryState> = Vec::new();
    for point in points {
        let captured = EntryState::capture(system, point)?;
        match entries
            .iter_mut()
            .find(|e| e.same_entry(&captured.lane, captured.s_offset))
        {
            Some(existing) => {
                existing.moves_start |= captured.moves_start;
                existing.moves_end |= captured.moves_end;
            }
            None => entries.push(captured),
        }
    }
    Some(entries)
}

fn set_profile(
    system: &mut RoadSystem,
    lane: &LaneRef,
    s_offset: f64,
    profile: Cubic,
) -> CommandResult<()> {
    let lane_id = lane.lane;
    let entry = lane
        .resolve_mut(system)?
        .width_entry_mut(s_offset)
        .ok_or(CommandError::Model(roadkit_core::RoadError::LaneWidthNotFound {
            lane: lane_id,
            s_offset,
        }))?;
    entry.profile = profile;
    Ok(())
}

fn linear_between(start: f64, end: f64, length: f64) -> Cubic {
    Cubic::linear(start, (end - start) / length)
}

/// Set the width at the start or end of width entries.
///
/// An absolute edit sets the width, a relative edit adds to the current
/// width. The other end of each entry keeps its value.
#[derive(Debug)]
pub struct SetLaneWidthCommand {
    info: CommandInfo,
    targets: Vec<WidthRef>,
    entries: Vec<EntryState>,
    width: f64,
    absolute: bool,
}

impl SetLaneWidthCommand {
    const TEXT: &'static str = "Set Lane Width";

    pub fn new(system: &RoadSystem, targets: Vec<WidthRef>, width: f64, absolute: bool) -> Self {
        let mut entries = Vec::new();
        let info = if targets.is_empty() {
            CommandInfo::invalid(Self::TEXT, "no width points given")
        } else if !absolute && width.abs() < NUMERICAL_ZERO8 {
            CommandInfo::invalid(Self::TEXT, "no change")
        } else if absolute && width < 0.0 {
            CommandInfo::invalid(Self::TEXT, "negative width")
        } else {
            match capture_entries(system, &targets) {
                Some(captured) => {
                    entries = captured;
                    CommandInfo::new(Self::TEXT)
                }
                None => CommandInfo::invalid(Self::TEXT, "width entry not found"),
            }
        };
        Self {
            info,
            targets,
            entries,
            width,
            absolute,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    fn target_value(&self, old: f64) -> f64 {
        let value = if self.absolute { self.width } else { old + self.width };
        value.max(0.0)
    }

    /// Whether a relative edit pushed some point below zero, so the width
    /// it produced is not `old + width`
    fn clamped(&self) -> bool {
        !self.absolute
            && self.entries.iter().any(|e| {
                (e.moves_start && e.start_value() + self.width < 0.0)
                    || (e.moves_end && e.end_value() + self.width < 0.0)
            })
    }

    /// Absorb a following edit of the same width points.
    ///
    /// Relative edits only merge while the accumulated step did not hit
    /// zero; past the clamp the next step starts from zero instead.
    pub fn merge_with(&mut self, other: &SetLaneWidthCommand) -> bool {
        if !self.info.is_valid() || !other.info.is_valid() || self.targets != other.targets {
            return false;
        }
        if !other.absolute && self.clamped() {
            return false;
        }
        if other.absolute {
            self.width = other.width;
        } else {
            self.width += other.width;
        }
        self.absolute |= other.absolute;
        true
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for entry in &self.entries {
            let start = if entry.moves_start {
                self.target_value(entry.start_value())
            } else {
                entry.start_value()
            };
            let end = if entry.moves_end {
                self.target_value(entry.end_value())
            } else {
                entry.end_value()
            };
            let profile = linear_between(start, end, entry.length);
            set_profile(system, &entry.lane, entry.s_offset, profile)?;
        }
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for entry in self.entries.iter().rev() {
            set_profile(system, &entry.lane, entry.s_offset, entry.profile)?;
        }
        Ok(())
    }
}

/// Drag width points by `(ds, dwidth)`.
///
/// Start points move along s, so the entry they start and the entry before
/// it change length. When a point sits on a lane section boundary, or a
/// move would make an entry shorter than [`MIN_LANESECTION_LENGTH`], only
/// the width changes.
#[derive(Debug)]
pub struct LaneWidthMovePointsCommand {
    info: CommandInfo,
    entries: Vec<EntryState>,
    /// Shift along s actually applied to start points
    ds: f64,
    dwidth: f64,
}

impl LaneWidthMovePointsCommand {
    const TEXT: &'static str = "Move Width Point";

    pub fn new(system: &RoadSystem, points: Vec<WidthRef>, delta: Vector2<f64>) -> Self {
        let rejected = |reason: &str| Self {
            info: CommandInfo::invalid(Self::TEXT, reason),
            entries: Vec::new(),
            ds: 0.0,
            dwidth: 0.0,
        };
        if points.is_empty() || delta.x.abs() + delta.y.abs() < NUMERICAL_ZERO8 {
            return rejected("no change");
        }
        let Some(entries) = capture_entries(system, &points) else {
            return rejected("width entry not found");
        };

        let mut width_only = false;
        for entry in &entries {
            if entry.moves_end
                && (entry.s_offset + entry.length - entry.section_length).abs() < NUMERICAL_ZERO8
            {
                width_only = true;
            }
            if entry.moves_start {
                if entry.s_offset.abs() < NUMERICAL_ZERO8
                    || entry.length - delta.x < MIN_LANESECTION_LENGTH
                {
                    width_only = true;
                }
                let previous = entry
                    .lane
                    .resolve(system)
                    .ok()
                    .and_then(|l| l.widths().before(entry.s_offset))
                    .map(|(s, _)| entry.s_offset - s);
                if previous.is_some_and(|length| length + delta.x < MIN_LANESECTION_LENGTH) {
                    width_only = true;
                }
            }
        }

        Self {
            info: CommandInfo::new(Self::TEXT),
            entries,
            ds: if width_only { 0.0 } else { delta.x },
            dwidth: delta.y,
        }
    }

    /// Whether the points only change width
    pub fn is_width_only(&self) -> bool {
        self.ds == 0.0
    }

    fn current_offset(&self, entry: &EntryState) -> f64 {
        if entry.moves_start {
            entry.s_offset + self.ds
        } else {
            entry.s_offset
        }
    }

    /// Absorb a following drag of the same points
    pub fn merge_with(&mut self, other: &LaneWidthMovePointsCommand) -> bool {
        if !self.info.is_valid()
            || !other.info.is_valid()
            || self.entries.len() != other.entries.len()
        {
            return false;
        }
        let same_points = self.entries.iter().zip(&other.entries).all(|(mine, theirs)| {
            mine.moves_start == theirs.moves_start
                && mine.moves_end == theirs.moves_end
                && theirs.same_entry(&mine.lane, self.current_offset(mine))
        });
        if !same_points {
            return false;
        }
        self.ds += other.ds;
        self.dwidth += other.dwidth;
        true
    }

    fn move_keys(&self, system: &mut RoadSystem, forward: bool) -> CommandResult<()> {
        if self.ds == 0.0 {
            return Ok(());
        }
        let shift = if forward { self.ds } else { -self.ds };
        let mut starts: Vec<&EntryState> = self.entries.iter().filter(|e| e.moves_start).collect();
        // Move the leading entry first so keys never collide.
        starts.sort_by(|a, b| a.s_offset.total_cmp(&b.s_offset));
        if shift > 0.0 {
            starts.reverse();
        }
        for entry in starts {
            let from = if forward {
                entry.s_offset
            } else {
                entry.s_offset + self.ds
            };
            entry.lane.resolve_mut(system)?.move_width(from, from + shift)?;
        }
        Ok(())
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.move_keys(system, true)?;
        for entry in &self.entries {
            let offset = self.current_offset(entry);
            let length = entry
                .lane
                .resolve(system)?
                .width_end(offset, entry.section_length)
                - offset;
            let start = if entry.moves_start {
                (entry.start_value() + self.dwidth).max(0.0)
            } else {
                entry.start_value()
            };
            let end = if entry.moves_end {
                (entry.end_value() + self.dwidth).max(0.0)
            } else {
                entry.end_value()
            };
            set_profile(system, &entry.lane, offset, linear_between(start, end, length))?;
        }
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for entry in &self.entries {
            set_profile(system, &entry.lane, self.current_offset(entry), entry.profile)?;
        }
        self.move_keys(system, false)
    }
}

impl_command!(SetLaneWidthCommand, LaneWidthMovePointsCommand);

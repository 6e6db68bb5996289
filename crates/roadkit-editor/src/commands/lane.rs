//! Lane commands
//!
//! Inserting or removing a lane keeps the ids on its side contiguous by
//! renumbering the lanes further out. Lane links of the neighbouring lane
//! sections follow the renumbering.

use roadkit_core::{RoadResult, CENTER_LANE};
use roadkit_model::{ElementType, Lane, LaneSection, LaneType, LaneWidth, LinkType, RoadSystem};

use super::{lane_section, lane_section_mut, CommandInfo, Custody, LaneRef};
use crate::error::{CommandError, CommandResult};
use crate::lane_links::{
    capture_neighbours, lane_link, remap_neighbour_links, set_lane_link, LaneLinkSnapshot,
};

/// Make room at `id` by moving every lane from `id` outwards one step out
fn shift_outward(section: &mut LaneSection, id: i32) -> RoadResult<()> {
    if id > 0 {
        let outer = section.left_most().unwrap_or(CENTER_LANE);
        for lane in (id..=outer).rev() {
            section.renumber_lane(lane, lane + 1)?;
        }
    } else {
        let outer = section.right_most().unwrap_or(CENTER_LANE);
        for lane in outer..=id {
            section.renumber_lane(lane, lane - 1)?;
        }
    }
    Ok(())
}

/// Close the gap at `id` by moving every lane beyond it one step in
fn shift_inward(section: &mut LaneSection, id: i32) -> RoadResult<()> {
    if id > 0 {
        let mut next = section.next_upper(id);
        let mut free = id;
        while let Some(lane) = next {
            next = section.next_upper(lane);
            section.renumber_lane(lane, free)?;
            free = lane;
        }
    } else {
        let mut next = section.next_lower(id);
        let mut free = id;
        while let Some(lane) = next {
            next = section.next_lower(lane);
            section.renumber_lane(lane, free)?;
            free = lane;
        }
    }
    Ok(())
}

/// Run `edit` on a copy of `section` and install the copy only when every
/// step succeeded.
fn edit_staged<T>(
    section: &mut LaneSection,
    edit: impl FnOnce(&mut LaneSection) -> RoadResult<T>,
) -> RoadResult<T> {
    let mut staged = section.clone();
    let out = edit(&mut staged)?;
    *section = staged;
    Ok(out)
}

fn same_side_beyond(id: i32, other: i32) -> bool {
    (id > 0 && other >= id) || (id < 0 && other <= id)
}

/// Insert a lane into a lane section.
///
/// When the id is taken, the occupying lane and every lane further out on
/// that side move one id outwards.
#[derive(Debug)]
pub struct InsertLaneCommand {
    info: CommandInfo,
    road: String,
    section: f64,
    id: i32,
    custody: Custody<(), Lane>,
    neighbours: LaneLinkSnapshot,
}

impl InsertLaneCommand {
    const TEXT: &'static str = "Insert Lane";

    pub fn new(system: &RoadSystem, road: &str, section: f64, lane: Lane) -> Self {
        let id = lane.id();
        let info = match lane_section(system, road, section) {
            Err(_) => CommandInfo::invalid(Self::TEXT, "lane section not found"),
            Ok(_) if id == CENTER_LANE => {
                CommandInfo::invalid(Self::TEXT, "cannot insert a lane with id 0")
            }
            Ok(ls) if !ls.has_contiguous_ids() => {
                CommandInfo::invalid(Self::TEXT, "lane ids are not contiguous")
            }
            Ok(ls) if !ls.contains_lane(id) && !Self::adjacent_to_outermost(ls, id) => {
                CommandInfo::invalid(Self::TEXT, "lane id would leave a gap")
            }
            Ok(_) => CommandInfo::new(Self::TEXT),
        };
        Self {
            info,
            road: road.to_string(),
            section,
            id,
            custody: Custody::OwnsNew(lane),
            neighbours: LaneLinkSnapshot::default(),
        }
    }

    fn adjacent_to_outermost(section: &LaneSection, id: i32) -> bool {
        if id > 0 {
            id == section.left_most().unwrap_or(CENTER_LANE) + 1
        } else {
            id == section.right_most().unwrap_or(CENTER_LANE) - 1
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.neighbours = capture_neighbours(system, &self.road, self.section);
        let id = self.id;
        let lane = self
            .custody
            .new_ref()
            .cloned()
            .ok_or(CommandError::Custody("replacement not held"))?;
        let section = lane_section_mut(system, &self.road, self.section)?;
        let occupied = section.contains_lane(id);
        edit_staged(section, |staged| {
            if occupied {
                shift_outward(staged, id)?;
            }
            staged.add_lane(lane)
        })?;
        self.custody.hold_old(());
        if occupied {
            let step = id.signum();
            remap_neighbour_links(system, &self.road, self.section, |x| {
                Some(if same_side_beyond(id, x) { x + step } else { x })
            });
        }
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let id = self.id;
        if self.custody.old_ref().is_none() {
            return Err(CommandError::Custody("replaced state not held"));
        }
        let section = lane_section_mut(system, &self.road, self.section)?;
        let lane = edit_staged(section, |staged| {
            let lane = staged.remove_lane(id)?;
            shift_inward(staged, id)?;
            Ok(lane)
        })?;
        self.custody.hold_new(lane);
        self.neighbours.restore(system);
        Ok(())
    }
}

/// Remove a lane; the lanes further out on that side move one id inwards.
#[derive(Debug)]
pub struct RemoveLaneCommand {
    info: CommandInfo,
    road: String,
    section: f64,
    id: i32,
    custody: Custody<Lane, ()>,
    neighbours: LaneLinkSnapshot,
}

impl RemoveLaneCommand {
    const TEXT: &'static str = "Remove Lane";

    pub fn new(system: &RoadSystem, lane: &LaneRef) -> Self {
        let info = if lane.lane == CENTER_LANE {
            CommandInfo::invalid(Self::TEXT, "cannot remove the lane with id 0")
        } else if lane.resolve(system).is_err() {
            CommandInfo::invalid(Self::TEXT, "lane not found")
        } else if lane_section(system, &lane.road, lane.section)
            .is_ok_and(|ls| !ls.has_contiguous_ids())
        {
            CommandInfo::invalid(Self::TEXT, "lane ids are not contiguous")
        } else {
            CommandInfo::new(Self::TEXT)
        };
        Self {
            info,
            road: lane.road.clone(),
            section: lane.section,
            id: lane.lane,
            custody: Custody::OwnsNew(()),
            neighbours: LaneLinkSnapshot::default(),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.neighbours = capture_neighbours(system, &self.road, self.section);
        let id = self.id;
        if self.custody.new_ref().is_none() {
            return Err(CommandError::Custody("replacement not held"));
        }
        let section = lane_section_mut(system, &self.road, self.section)?;
        let lane = edit_staged(section, |staged| {
            let lane = staged.remove_lane(id)?;
            shift_inward(staged, id)?;
            Ok(lane)
        })?;
        self.custody.hold_old(lane);
        let step = id.signum();
        remap_neighbour_links(system, &self.road, self.section, |x| {
            if x == id {
                None
            } else if same_side_beyond(id, x) {
                Some(x - step)
            } else {
                Some(x)
            }
        });
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let id = self.id;
        let lane = self
            .custody
            .old_ref()
            .cloned()
            .ok_or(CommandError::Custody("replaced state not held"))?;
        let section = lane_section_mut(system, &self.road, self.section)?;
        edit_staged(section, |staged| {
            shift_outward(staged, id)?;
            staged.add_lane(lane)
        })?;
        self.custody.hold_new(());
        self.neighbours.restore(system);
        Ok(())
    }
}

/// Give a lane a free id.
#[derive(Debug)]
pub struct SetLaneIdCommand {
    info: CommandInfo,
    lane: LaneRef,
    new_id: i32,
    neighbours: LaneLinkSnapshot,
}

impl SetLaneIdCommand {
    const TEXT: &'static str = "Set Lane ID";

    pub fn new(system: &RoadSystem, lane: &LaneRef, new_id: i32) -> Self {
        let info = match lane_section(system, &lane.road, lane.section) {
            Err(_) => CommandInfo::invalid(Self::TEXT, "lane section not found"),
            Ok(ls) if !ls.contains_lane(lane.lane) => {
                CommandInfo::invalid(Self::TEXT, "lane not found")
            }
            Ok(_) if lane.lane == new_id => CommandInfo::invalid(Self::TEXT, "no change"),
            Ok(_) if lane.lane == CENTER_LANE || new_id == CENTER_LANE => {
                CommandInfo::invalid(Self::TEXT, "the center lane keeps id 0")
            }
            Ok(ls) if ls.contains_lane(new_id) => {
                CommandInfo::invalid(Self::TEXT, "id already taken")
            }
            Ok(_) => CommandInfo::new(Self::TEXT),
        };
        Self {
            info,
            lane: lane.clone(),
            new_id,
            neighbours: LaneLinkSnapshot::default(),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.neighbours = capture_neighbours(system, &self.lane.road, self.lane.section);
        lane_section_mut(system, &self.lane.road, self.lane.section)?
            .renumber_lane(self.lane.lane, self.new_id)?;
        let (old, new) = (self.lane.lane, self.new_id);
        remap_neighbour_links(system, &self.lane.road, self.lane.section, |x| {
            Some(if x == old { new } else { x })
        });
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        lane_section_mut(system, &self.lane.road, self.lane.section)?
            .renumber_lane(self.new_id, self.lane.lane)?;
        self.neighbours.restore(system);
        Ok(())
    }
}

#[derive(Debug)]
pub struct SetLaneTypeCommand {
    info: CommandInfo,
    lane: LaneRef,
    old: LaneType,
    new: LaneType,
}

impl SetLaneTypeCommand {
    const TEXT: &'static str = "Set Lane Type";

    pub fn new(system: &RoadSystem, lane: &LaneRef, lane_type: LaneType) -> Self {
        let (info, old) = match lane.resolve(system) {
            Err(_) => (CommandInfo::invalid(Self::TEXT, "lane not found"), lane_type),
            Ok(l) if l.lane_type() == lane_type => {
                (CommandInfo::invalid(Self::TEXT, "no change"), lane_type)
            }
            Ok(l) => (CommandInfo::new(Self::TEXT), l.lane_type()),
        };
        Self {
            info,
            lane: lane.clone(),
            old,
            new: lane_type,
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.lane.resolve_mut(system)?.set_lane_type(self.new);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.lane.resolve_mut(system)?.set_lane_type(self.old);
        Ok(())
    }
}

#[derive(Debug)]
pub struct SetLaneLevelCommand {
    info: CommandInfo,
    lane: LaneRef,
    level: bool,
}

impl SetLaneLevelCommand {
    const TEXT: &'static str = "Set Lane Level";

    pub fn new(system: &RoadSystem, lane: &LaneRef, level: bool) -> Self {
        let info = match lane.resolve(system) {
            Err(_) => CommandInfo::invalid(Self::TEXT, "lane not found"),
            Ok(l) if l.level() == level => CommandInfo::invalid(Self::TEXT, "no change"),
            Ok(_) => CommandInfo::new(Self::TEXT),
        };
        Self {
            info,
            lane: lane.clone(),
            level,
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.lane.resolve_mut(system)?.set_level(self.level);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.lane.resolve_mut(system)?.set_level(!self.level);
        Ok(())
    }
}

/// Set the predecessor or successor lane id of one lane.
///
/// A lane of the first (last) lane section can only be linked when the road
/// has a predecessor (successor) that is not a junction.
#[derive(Debug)]
pub struct SetLaneLinkIdCommand {
    info: CommandInfo,
    lane: LaneRef,
    slot: LinkType,
    old: Option<i32>,
    new: i32,
}

impl SetLaneLinkIdCommand {
    pub fn predecessor(system: &RoadSystem, lane: &LaneRef, id: i32) -> Self {
        Self::new(system, lane, LinkType::Predecessor, id)
    }

    pub fn successor(system: &RoadSystem, lane: &LaneRef, id: i32) -> Self {
        Self::new(system, lane, LinkType::Successor, id)
    }

    fn new(system: &RoadSystem, lane: &LaneRef, slot: LinkType, id: i32) -> Self {
        let text = match slot {
            LinkType::Predecessor => "Set Lane Predecessor",
            LinkType::Successor => "Set Lane Successor",
        };
        let mut old = None;
        let info = if id == CENTER_LANE {
            CommandInfo::invalid(text, "no lane link")
        } else {
            match (system.road(&lane.road), lane.resolve(system)) {
                (Some(road), Ok(current)) => {
                    let at_boundary = road
                        .boundary_lane_section(slot.own_end())
                        .is_some_and(|s| s.s_start() == lane.section);
                    let unlinked = road
                        .link(slot)
                        .is_none_or(|l| l.element_type == ElementType::Junction);
                    old = lane_link(current, slot);
                    if at_boundary && unlinked {
                        CommandInfo::invalid(text, &format!("road has no {slot}"))
                    } else if old == Some(id) {
                        CommandInfo::invalid(text, "no change")
                    } else {
                        CommandInfo::new(text)
                    }
                }
                _ => CommandInfo::invalid(text, "lane not found"),
            }
        };
        Self {
            info,
            lane: lane.clone(),
            slot,
            old,
            new: id,
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        set_lane_link(self.lane.resolve_mut(system)?, self.slot, Some(self.new));
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        set_lane_link(self.lane.resolve_mut(system)?, self.slot, self.old);
        Ok(())
    }
}

/// Add a width entry to a lane.
#[derive(Debug)]
pub struct InsertLaneWidthCommand {
    info: CommandInfo,
    lane: LaneRef,
    s_offset: f64,
    custody: Custody<(), LaneWidth>,
}

impl InsertLaneWidthCommand {
    const TEXT: &'static str = "Insert Lane Width";

    pub fn new(system: &RoadSystem, lane: &LaneRef, width: LaneWidth) -> Self {
        let section_length = system
            .road(&lane.road)
            .map(|r| r.lane_section_end(lane.section) - lane.section);
        let info = match (lane.resolve(system), section_length) {
            (Ok(l), Some(length)) => {
                if width.s_offset < 0.0 || width.s_offset >= length {
                    CommandInfo::invalid(Self::TEXT, "offset outside the lane section")
                } else if l.width_entry(width.s_offset).is_some() {
                    CommandInfo::invalid(Self::TEXT, "offset already taken")
                } else {
                    CommandInfo::new(Self::TEXT)
                }
            }
            _ => CommandInfo::invalid(Self::TEXT, "lane not found"),
        };
        Self {
            info,
            lane: lane.clone(),
            s_offset: width.s_offset,
            custody: Custody::OwnsNew(width),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let lane = self.lane.resolve_mut(system)?;
        let width = self.custody.take_new()?;
        lane.add_width(width)?;
        self.custody.hold_old(());
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let lane = self.lane.resolve_mut(system)?;
        self.custody.take_old()?;
        let width = lane.remove_width(self.s_offset)?;
        self.custody.hold_new(width);
        Ok(())
    }
}

impl_command!(
    InsertLaneCommand,
    RemoveLaneCommand,
    SetLaneIdCommand,
    SetLaneTypeCommand,
    SetLaneLevelCommand,
    SetLaneLinkIdCommand,
    InsertLaneWidthCommand,
);

//! Commands on sections of any kind

use roadkit_core::NUMERICAL_ZERO6;
use roadkit_model::{AnySection, RoadSystem, SectionKind};

use super::{road_mut, CommandInfo, Custody};
use crate::error::CommandResult;

/// Insert a section into one of a road's containers.
///
/// The section containing the new start now ends there. Into an empty
/// container only a section starting at 0 goes.
#[derive(Debug)]
pub struct InsertSectionCommand {
    info: CommandInfo,
    road: String,
    kind: SectionKind,
    start: f64,
    custody: Custody<(), AnySection>,
}

impl InsertSectionCommand {
    const TEXT: &'static str = "Insert Section";

    pub fn new(system: &RoadSystem, road: &str, section: AnySection) -> Self {
        let kind = section.kind();
        let start = section.s_start();
        let info = match system.road(road) {
            None => CommandInfo::invalid(Self::TEXT, "road not found"),
            Some(_) if start < 0.0 => CommandInfo::invalid(Self::TEXT, "negative start"),
            Some(r) if r.section_count(kind) == 0 && start.abs() >= NUMERICAL_ZERO6 => {
                CommandInfo::invalid(Self::TEXT, "the first section must start at 0")
            }
            Some(r) if r.section_count(kind) > 0 && start >= r.length() => {
                CommandInfo::invalid(Self::TEXT, "start beyond the road end")
            }
            Some(r) if r.has_section_at(kind, start) => {
                CommandInfo::invalid(Self::TEXT, "a section already starts here")
            }
            Some(_) => CommandInfo::new(Self::TEXT),
        };
        Self {
            info,
            road: road.to_string(),
            kind,
            start,
            custody: Custody::OwnsNew(section),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let section = self.custody.take_new()?;
        road.insert_section(section)?;
        self.custody.hold_old(());
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        self.custody.take_old()?;
        let section = road.delete_section(self.kind, self.start)?;
        self.custody.hold_new(section);
        Ok(())
    }
}

/// Delete the section of `kind` starting exactly at `s`.
///
/// The root section at 0 can only go when it is the last one of its kind.
#[derive(Debug)]
pub struct DeleteSectionCommand {
    info: CommandInfo,
    road: String,
    kind: SectionKind,
    start: f64,
    custody: Custody<AnySection, ()>,
}

impl DeleteSectionCommand {
    const TEXT: &'static str = "Delete Section";

    pub fn new(system: &RoadSystem, road: &str, kind: SectionKind, s: f64) -> Self {
        let info = match system.road(road) {
            None => CommandInfo::invalid(Self::TEXT, "road not found"),
            Some(r) if !r.has_section_at(kind, s) => {
                CommandInfo::invalid(Self::TEXT, "no section starts here")
            }
            Some(r) if s.abs() < NUMERICAL_ZERO6 && r.section_count(kind) > 1 => {
                CommandInfo::invalid(Self::TEXT, "the first section cannot be deleted")
            }
            Some(_) => CommandInfo::new(Self::TEXT),
        };
        Self {
            info,
            road: road.to_string(),
            kind,
            start: s,
            custody: Custody::OwnsNew(()),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        self.custody.take_new()?;
        let section = road.delete_section(self.kind, self.start)?;
        self.custody.hold_old(section);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let section = self.custody.take_old()?;
        road.insert_section(section)?;
        self.custody.hold_new(());
        Ok(())
    }
}

/// Move the start of a section between its neighbours.
#[derive(Debug)]
pub struct MoveSectionCommand {
    info: CommandInfo,
    road: String,
    kind: SectionKind,
    old: f64,
    new: f64,
}

impl MoveSectionCommand {
    const TEXT: &'static str = "Move Section";

    pub fn new(system: &RoadSystem, road: &str, kind: SectionKind, old: f64, new: f64) -> Self {
        let info = match system.road(road) {
            None => CommandInfo::invalid(Self::TEXT, "road not found"),
            Some(r) if !r.has_section_at(kind, old) => {
                CommandInfo::invalid(Self::TEXT, "no section starts here")
            }
            Some(_) if old.abs() < NUMERICAL_ZERO6 => {
                CommandInfo::invalid(Self::TEXT, "the first section cannot move")
            }
            Some(_) if (new - old).abs() < NUMERICAL_ZERO6 => {
                CommandInfo::invalid(Self::TEXT, "no change")
            }
            Some(r) => {
                let lower = r.section_before_start(kind, old).unwrap_or(0.0);
                let upper = r.section_next_start(kind, old).unwrap_or(r.length());
                if new <= lower + NUMERICAL_ZERO6 || new >= upper - NUMERICAL_ZERO6 {
                    CommandInfo::invalid(Self::TEXT, "start passes a neighbouring section")
                } else {
                    CommandInfo::new(Self::TEXT)
                }
            }
        };
        Self {
            info,
            road: road.to_string(),
            kind,
            old,
            new,
        }
    }

    /// Absorb a following move of the same section
    pub fn merge_with(&mut self, other: &MoveSectionCommand) -> bool {
        let continues = self.road == other.road
            && self.kind == other.kind
            && (other.old - self.new).abs() < NUMERICAL_ZERO6;
        if !self.info.is_valid() || !other.info.is_valid() || !continues {
            return false;
        }
        self.new = other.new;
        true
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        road_mut(system, &self.road)?.move_section(self.kind, self.old, self.new)?;
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        road_mut(system, &self.road)?.move_section(self.kind, self.new, self.old)?;
        Ok(())
    }
}

impl_command!(InsertSectionCommand, DeleteSectionCommand, MoveSectionCommand);

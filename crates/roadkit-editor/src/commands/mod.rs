//! Reversible edit commands
//!
//! Every edit of the road model goes through a command. A command checks
//! its preconditions against the live model when it is built and records
//! the outcome in its [`CommandInfo`]; an invalid command never mutates
//! anything. `redo` installs the edit and `undo` reverts it, strictly
//! alternating, starting with `redo`.
//!
//! Commands that swap objects in and out of the model hold the object that
//! is currently *not* installed in a [`Custody`] slot.

use tracing::debug;

use roadkit_model::{Lane, LaneSection, Road, RoadSystem};

use crate::error::{CommandError, CommandResult};

/// A reversible edit of a [`RoadSystem`].
pub trait Command {
    /// Label shown in the history, suffixed with `(invalid!)` when rejected
    fn text(&self) -> &str;

    fn is_valid(&self) -> bool;

    /// Whether the edit is currently installed in the model
    fn is_applied(&self) -> bool;

    fn redo(&mut self, system: &mut RoadSystem) -> CommandResult<()>;

    fn undo(&mut self, system: &mut RoadSystem) -> CommandResult<()>;
}

/// Label, validity and applied state shared by every command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInfo {
    text: String,
    valid: bool,
    applied: bool,
}

impl CommandInfo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            valid: true,
            applied: false,
        }
    }

    /// A rejected command. Logs the reason.
    pub fn invalid(text: &str, reason: &str) -> Self {
        debug!(command = text, reason, "command rejected");
        Self {
            text: format!("{text} (invalid!)"),
            valid: false,
            applied: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    pub fn check_redo(&self) -> CommandResult<()> {
        if !self.valid {
            return Err(CommandError::Invalid(self.text.clone()));
        }
        if self.applied {
            return Err(CommandError::AlreadyApplied(self.text.clone()));
        }
        Ok(())
    }

    pub fn check_undo(&self) -> CommandResult<()> {
        if !self.valid {
            return Err(CommandError::Invalid(self.text.clone()));
        }
        if !self.applied {
            return Err(CommandError::NotApplied(self.text.clone()));
        }
        Ok(())
    }

    pub fn set_applied(&mut self, applied: bool) {
        self.applied = applied;
    }
}

/// Which of two states a command holds while the other one is installed.
///
/// Before `redo` (and after `undo`) the command owns the replacement; after
/// `redo` it owns what was replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum Custody<O, N> {
    OwnsNew(N),
    OwnsOld(O),
    Empty,
}

impl<O, N> Custody<O, N> {
    pub fn take_new(&mut self) -> CommandResult<N> {
        match std::mem::replace(self, Custody::Empty) {
            Custody::OwnsNew(new) => Ok(new),
            other => {
                *self = other;
                Err(CommandError::Custody("replacement not held"))
            }
        }
    }

    pub fn take_old(&mut self) -> CommandResult<O> {
        match std::mem::replace(self, Custody::Empty) {
            Custody::OwnsOld(old) => Ok(old),
            other => {
                *self = other;
                Err(CommandError::Custody("replaced state not held"))
            }
        }
    }

    pub fn hold_new(&mut self, new: N) {
        *self = Custody::OwnsNew(new);
    }

    pub fn hold_old(&mut self, old: O) {
        *self = Custody::OwnsOld(old);
    }

    pub fn new_ref(&self) -> Option<&N> {
        match self {
            Custody::OwnsNew(new) => Some(new),
            _ => None,
        }
    }

    pub fn old_ref(&self) -> Option<&O> {
        match self {
            Custody::OwnsOld(old) => Some(old),
            _ => None,
        }
    }
}

/// Implements [`Command`] for types with an `info: CommandInfo` field and
/// `apply` / `revert` methods.
macro_rules! impl_command {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::commands::Command for $ty {
            fn text(&self) -> &str {
                self.info.text()
            }

            fn is_valid(&self) -> bool {
                self.info.is_valid()
            }

            fn is_applied(&self) -> bool {
                self.info.is_applied()
            }

            fn redo(
                &mut self,
                system: &mut roadkit_model::RoadSystem,
            ) -> $crate::error::CommandResult<()> {
                self.info.check_redo()?;
                self.apply(system)?;
                self.info.set_applied(true);
                tracing::debug!(command = self.info.text(), "redo");
                Ok(())
            }

            fn undo(
                &mut self,
                system: &mut roadkit_model::RoadSystem,
            ) -> $crate::error::CommandResult<()> {
                self.info.check_undo()?;
                self.revert(system)?;
                self.info.set_applied(false);
                tracing::debug!(command = self.info.text(), "undo");
                Ok(())
            }
        }
    )*};
}

pub mod lane;
pub mod lane_section;
pub mod lane_width;
pub mod link;
pub mod road;
pub mod road_mark;
pub mod section;

pub use lane::{
    InsertLaneCommand, InsertLaneWidthCommand, RemoveLaneCommand, SetLaneIdCommand,
    SetLaneLevelCommand, SetLaneLinkIdCommand, SetLaneTypeCommand,
};
pub use lane_section::{
    MergeLaneSectionCommand, RemoveLaneSectionCommand, SplitLaneSectionCommand,
};
pub use lane_width::{LaneWidthMovePointsCommand, SetLaneWidthCommand, WidthEndpoint, WidthRef};
pub use link::{RemoveRoadLinkCommand, SetRoadLinkCommand, SetRoadLinkRoadsCommand};
pub use road::{
    split_track_road, AppendRoadPrototypeCommand, ChangeSectionPrototypeCommand,
    MergeRoadsCommand, MoveRoadCommand, NewRoadCommand, RemoveRoadCommand, RemoveTrackCommand,
    RotateRoadCommand, SnapRoadsCommand, SplitRoadCommand, SplitTrackComponentCommand,
};
pub use road_mark::{RoadMarkProperty, RoadMarkRef, SetRoadMarkPropertyCommand, SetRoadMarkSOffsetCommand};
pub use section::{DeleteSectionCommand, InsertSectionCommand, MoveSectionCommand};

/// Address of a lane: road id, lane section start and lane id.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneRef {
    pub road: String,
    pub section: f64,
    pub lane: i32,
}

impl LaneRef {
    pub fn new(road: impl Into<String>, section: f64, lane: i32) -> Self {
        Self {
            road: road.into(),
            section,
            lane,
        }
    }

    pub fn resolve<'a>(&self, system: &'a RoadSystem) -> CommandResult<&'a Lane> {
        Ok(lane_section(system, &self.road, self.section)?.try_lane(self.lane)?)
    }

    pub fn resolve_mut<'a>(&self, system: &'a mut RoadSystem) -> CommandResult<&'a mut Lane> {
        Ok(lane_section_mut(system, &self.road, self.section)?.try_lane_mut(self.lane)?)
    }

    /// Same lane section, other lane
    pub fn with_lane(&self, lane: i32) -> Self {
        Self {
            lane,
            ..self.clone()
        }
    }
}

pub(crate) fn road<'a>(system: &'a RoadSystem, id: &str) -> CommandResult<&'a Road> {
    Ok(system.get_road(id)?)
}

pub(crate) fn road_mut<'a>(system: &'a mut RoadSystem, id: &str) -> CommandResult<&'a mut Road> {
    Ok(system.get_road_mut(id)?)
}

/// The lane section of road `id` starting exactly at `s`
pub(crate) fn lane_section<'a>(
    system: &'a RoadSystem,
    id: &str,
    s: f64,
) -> CommandResult<&'a LaneSection> {
    Ok(system.get_road(id)?.try_lane_section(s)?)
}

pub(crate) fn lane_section_mut<'a>(
    system: &'a mut RoadSystem,
    id: &str,
    s: f64,
) -> CommandResult<&'a mut LaneSection> {
    Ok(system.get_road_mut(id)?.try_lane_section_mut(s)?)
}

macro_rules! edit_commands {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Any edit command; the element type of the undo history.
        #[derive(Debug)]
        #[allow(clippy::large_enum_variant)]
        pub enum EditCommand {
            $($variant($ty),)*
        }

        impl Command for EditCommand {
            fn text(&self) -> &str {
                match self {
                    $(Self::$variant(c) => c.text(),)*
                }
            }

            fn is_valid(&self) -> bool {
                match self {
                    $(Self::$variant(c) => c.is_valid(),)*
                }
            }

            fn is_applied(&self) -> bool {
                match self {
                    $(Self::$variant(c) => c.is_applied(),)*
                }
            }

            fn redo(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
                match self {
                    $(Self::$variant(c) => c.redo(system),)*
                }
            }

            fn undo(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
                match self {
                    $(Self::$variant(c) => c.undo(system),)*
                }
            }
        }

        $(
            impl From<$ty> for EditCommand {
                fn from(command: $ty) -> Self {
                    Self::$variant(command)
                }
            }
        )*
    };
}

edit_commands! {
    InsertLane(InsertLaneCommand),
    RemoveLane(RemoveLaneCommand),
    SetLaneId(SetLaneIdCommand),
    SetLaneType(SetLaneTypeCommand),
    SetLaneLevel(SetLaneLevelCommand),
    SetLaneLinkId(SetLaneLinkIdCommand),
    InsertLaneWidth(InsertLaneWidthCommand),
    SetLaneWidth(SetLaneWidthCommand),
    LaneWidthMovePoints(LaneWidthMovePointsCommand),
    SetRoadMarkSOffset(SetRoadMarkSOffsetCommand),
    SetRoadMarkProperty(SetRoadMarkPropertyCommand),
    SplitLaneSection(SplitLaneSectionCommand),
    MergeLaneSection(MergeLaneSectionCommand),
    RemoveLaneSection(RemoveLaneSectionCommand),
    InsertSection(InsertSectionCommand),
    DeleteSection(DeleteSectionCommand),
    MoveSection(MoveSectionCommand),
    NewRoad(NewRoadCommand),
    RemoveRoad(RemoveRoadCommand),
    MoveRoad(MoveRoadCommand),
    RotateRoad(RotateRoadCommand),
    SplitTrackComponent(SplitTrackComponentCommand),
    SplitRoad(SplitRoadCommand),
    MergeRoads(MergeRoadsCommand),
    SnapRoads(SnapRoadsCommand),
    RemoveTrack(RemoveTrackCommand),
    AppendRoadPrototype(AppendRoadPrototypeCommand),
    ChangeSectionPrototype(ChangeSectionPrototypeCommand),
    SetRoadLink(SetRoadLinkCommand),
    RemoveRoadLink(RemoveRoadLinkCommand),
    SetRoadLinkRoads(SetRoadLinkRoadsCommand),
    Composite(CompositeCommand),
}

impl EditCommand {
    /// Absorb `other`, issued right after this command on the same objects.
    ///
    /// Both commands are applied. On success this command's new state is
    /// `other`'s new state and `other` can be dropped.
    pub fn merge_with(&mut self, other: &EditCommand) -> bool {
        match (self, other) {
            (Self::SetLaneWidth(a), Self::SetLaneWidth(b)) => a.merge_with(b),
            (Self::LaneWidthMovePoints(a), Self::LaneWidthMovePoints(b)) => a.merge_with(b),
            (Self::SetRoadMarkSOffset(a), Self::SetRoadMarkSOffset(b)) => a.merge_with(b),
            (Self::MoveSection(a), Self::MoveSection(b)) => a.merge_with(b),
            (Self::MoveRoad(a), Self::MoveRoad(b)) => a.merge_with(b),
            (Self::RotateRoad(a), Self::RotateRoad(b)) => a.merge_with(b),
            _ => false,
        }
    }
}

/// Ordered child commands applied as one edit.
///
/// `redo` runs the children in order and `undo` in reverse. When a child
/// fails during `redo`, the children already applied are reverted.
#[derive(Debug)]
pub struct CompositeCommand {
    info: CommandInfo,
    children: Vec<EditCommand>,
}

impl CompositeCommand {
    pub fn new(text: &str, children: Vec<EditCommand>) -> Self {
        if children.is_empty() {
            return Self {
                info: CommandInfo::invalid(text, "no child commands"),
                children,
            };
        }
        if let Some(child) = children.iter().find(|c| !c.is_valid()) {
            let reason = format!("child command invalid: {}", child.text());
            return Self {
                info: CommandInfo::invalid(text, &reason),
                children,
            };
        }
        Self {
            info: CommandInfo::new(text),
            children,
        }
    }

    /// Composite of children that have already been applied one by one
    pub(crate) fn from_applied(text: &str, children: Vec<EditCommand>) -> Self {
        let mut info = CommandInfo::new(text);
        info.set_applied(true);
        Self { info, children }
    }

    pub fn children(&self) -> &[EditCommand] {
        &self.children
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for index in 0..self.children.len() {
            if let Err(err) = self.children[index].redo(system) {
                for done in self.children[..index].iter_mut().rev() {
                    done.undo(system)?;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for child in self.children.iter_mut().rev() {
            child.undo(system)?;
        }
        Ok(())
    }
}

impl_command!(CompositeCommand);

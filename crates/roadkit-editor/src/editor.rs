//! Editing session
//!
//! [`RoadEditor`] owns the road system, its undo history and the editor
//! configuration. All edits go through [`RoadEditor::execute`].

use tracing::info;

use roadkit_model::RoadSystem;
use roadkit_settings::EditorConfig;

use crate::commands::{
    split_track_road, CompositeCommand, EditCommand, SetRoadLinkRoadsCommand,
    SplitLaneSectionCommand, SplitRoadCommand,
};
use crate::error::CommandResult;
use crate::undo_stack::UndoStack;

/// A road system under edit.
#[derive(Debug)]
pub struct RoadEditor {
    system: RoadSystem,
    history: UndoStack,
    config: EditorConfig,
}

impl RoadEditor {
    pub fn new(system: RoadSystem) -> Self {
        Self::with_config(system, EditorConfig::default())
    }

    pub fn with_config(system: RoadSystem, config: EditorConfig) -> Self {
        Self {
            system,
            history: UndoStack::with_depth(config.history.max_depth),
            config,
        }
    }

    pub fn system(&self) -> &RoadSystem {
        &self.system
    }

    /// Give up the session and keep the edited model
    pub fn into_system(self) -> RoadSystem {
        self.system
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Apply a command and record it. `Ok(false)` when it was rejected.
    pub fn execute(&mut self, command: impl Into<EditCommand>) -> CommandResult<bool> {
        self.history.push(command, &mut self.system)
    }

    pub fn undo(&mut self) -> CommandResult<()> {
        self.history.undo(&mut self.system)
    }

    pub fn redo(&mut self) -> CommandResult<()> {
        self.history.redo(&mut self.system)
    }

    /// Group the following commands into one undo step
    pub fn begin_macro(&mut self, text: &str) {
        self.history.begin_macro(text);
    }

    pub fn end_macro(&mut self) {
        self.history.end_macro();
    }

    /// Link the ends of `roads` lying within the configured threshold
    pub fn link_roads(&mut self, roads: &[String]) -> CommandResult<bool> {
        let command =
            SetRoadLinkRoadsCommand::new(&self.system, roads, self.config.linking.threshold);
        self.execute(command)
    }

    /// Link the ends of every road in the system
    pub fn link_all_roads(&mut self) -> CommandResult<bool> {
        let roads = self.system.road_ids();
        let linked = self.link_roads(&roads)?;
        info!(roads = roads.len(), linked, "linked all roads");
        Ok(linked)
    }

    /// Split the lane section containing `s`, honouring the configured minimum length
    pub fn split_lane_section(&mut self, road: &str, s: f64) -> CommandResult<bool> {
        let command = SplitLaneSectionCommand::with_min_length(
            &self.system,
            road,
            s,
            self.config.editing.min_lane_section_length,
        );
        self.execute(command)
    }

    /// Split a road at the track boundary nearest to `s`
    pub fn split_road(&mut self, road: &str, s: f64) -> CommandResult<bool> {
        let command =
            SplitRoadCommand::with_margin(&self.system, road, s, self.config.editing.split_margin);
        self.execute(command)
    }

    /// Split the track at `s` and the road at the new boundary
    pub fn split_track_and_road(&mut self, road: &str, s: f64) -> CommandResult<bool> {
        let command: CompositeCommand =
            split_track_road(&self.system, road, s, self.config.editing.split_margin);
        self.execute(command)
    }
}

//! RoadKit Editor Crate
//!
//! Reversible edit commands over a [`roadkit_model::RoadSystem`], the undo
//! history that records them, road link inference, and the
//! [`RoadEditor`] session tying them to the editor configuration.

pub mod commands;
pub mod editor;
pub mod error;
pub mod lane_links;
pub mod link_inference;
pub mod undo_stack;

pub use commands::{Command, CommandInfo, CompositeCommand, EditCommand, LaneRef};
pub use editor::RoadEditor;
pub use error::{CommandError, CommandResult};
pub use lane_links::LaneFilter;
pub use link_inference::{candidate_pairs, plan_links, ContactMask, LinkPlan, RoadPair};
pub use undo_stack::UndoStack;

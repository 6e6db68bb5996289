//! Error types for edit commands and the undo history.

use roadkit_core::RoadError;
use thiserror::Error;

/// Errors raised while applying or reverting a command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The command failed validation when it was built
    #[error("Invalid command: {0}")]
    Invalid(String),

    /// The road model rejected an operation
    #[error("Model error: {0}")]
    Model(#[from] RoadError),

    /// `redo` called on a command whose effect is already installed
    #[error("Command already applied: {0}")]
    AlreadyApplied(String),

    /// `undo` called on a command that is not applied
    #[error("Command not applied: {0}")]
    NotApplied(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    /// The command does not hold the state the requested transition needs
    #[error("Command state error: {0}")]
    Custody(&'static str),
}

/// Result type alias for command operations.
pub type CommandResult<T> = Result<T, CommandError>;

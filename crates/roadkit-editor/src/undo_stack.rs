//! Undo history of edit commands

use tracing::{debug, warn};

use roadkit_model::RoadSystem;

use crate::commands::{Command, CompositeCommand, EditCommand};
use crate::error::{CommandError, CommandResult};

/// An open macro: commands applied so far, grouped under one label
#[derive(Debug)]
struct Macro {
    text: String,
    children: Vec<EditCommand>,
}

/// Applied and undone commands, newest last.
///
/// Pushing a command applies it and clears the redo side. A command that
/// continues the edit on top of the stack is merged into it, so a drag
/// becomes a single undo step.
#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
    max_depth: usize,
    current_macro: Option<Macro>,
}

impl UndoStack {
    /// Create a new undo stack with default depth (100)
    pub fn new() -> Self {
        Self::with_depth(100)
    }

    /// Create with custom maximum undo depth
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(256)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            current_macro: None,
        }
    }

    /// Apply `command` and record it.
    ///
    /// Returns `Ok(false)` without touching the model when the command is
    /// invalid.
    pub fn push(&mut self, command: impl Into<EditCommand>, system: &mut RoadSystem) -> CommandResult<bool> {
        let mut command = command.into();
        if !command.is_valid() {
            debug!(command = command.text(), "invalid command not pushed");
            return Ok(false);
        }
        command.redo(system)?;
        self.redo_stack.clear();

        if let Some(open) = &mut self.current_macro {
            open.children.push(command);
            return Ok(true);
        }
        if let Some(top) = self.undo_stack.last_mut() {
            if top.merge_with(&command) {
                debug!(command = top.text(), "merged into previous command");
                return Ok(true);
            }
        }
        self.push_undo(command);
        Ok(true)
    }

    fn push_undo(&mut self, command: EditCommand) {
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Start grouping pushed commands into one undo step
    pub fn begin_macro(&mut self, text: &str) {
        if self.current_macro.is_some() {
            warn!(text, "macro already open, ending it first");
            self.end_macro();
        }
        self.current_macro = Some(Macro {
            text: text.to_string(),
            children: Vec::new(),
        });
    }

    /// Close the open macro and record it as a single command
    pub fn end_macro(&mut self) {
        let Some(open) = self.current_macro.take() else {
            return;
        };
        match open.children.len() {
            0 => {}
            1 => {
                if let Some(single) = open.children.into_iter().next() {
                    self.push_undo(single);
                }
            }
            _ => self.push_undo(CompositeCommand::from_applied(&open.text, open.children).into()),
        }
    }

    pub fn is_in_macro(&self) -> bool {
        self.current_macro.is_some()
    }

    /// Revert the newest command
    pub fn undo(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.end_macro();
        let mut command = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;
        if let Err(err) = command.undo(system) {
            self.undo_stack.push(command);
            return Err(err);
        }
        self.redo_stack.push(command);
        Ok(())
    }

    /// Re-apply the newest undone command
    pub fn redo(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let mut command = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;
        if let Err(err) = command.redo(system) {
            self.redo_stack.push(command);
            return Err(err);
        }
        self.undo_stack.push(command);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the command `undo` would revert
    pub fn undo_text(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.text())
    }

    /// Label of the command `redo` would apply
    pub fn redo_text(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.text())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget all history. The model keeps its current state.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_macro = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

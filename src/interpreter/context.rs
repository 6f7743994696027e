use std::collections::HashMap;
use tracing::{debug, trace};

use super::io::InputOutput;
use super::{Value, Variable};
use crate::error::{Error, Result};

type Frame = HashMap<String, Variable>;

/// Scope frames plus the I/O collaborator a program runs against.
///
/// There is always at least the outermost frame. Lookups and updates search
/// from the innermost frame outwards and stop at the first frame that holds
/// the name; declarations only ever touch the innermost frame.
pub struct Context<'io> {
    frames: Vec<Frame>,
    io: &'io mut dyn InputOutput,
}

impl<'io> Context<'io> {
    pub fn new(io: &'io mut dyn InputOutput) -> Self {
        Self {
            frames: vec![Frame::new()],
            io,
        }
    }

    pub fn declare(&mut self, variable: Variable) -> Result<()> {
        let frame = self.frames.last_mut().expect("context has no frames");
        if let Some(previous) = frame.get(variable.name()) {
            return Err(Error::VariableAlreadyDefined {
                line: variable.line(),
                name: variable.name().to_string(),
                previous_line: previous.line(),
            });
        }
        debug!("declare {}: {} on line {}", variable.name(), variable.typ(), variable.line());
        frame.insert(variable.name().to_string(), variable);
        Ok(())
    }

    pub fn lookup(&self, name: &str, line: usize) -> Result<&Variable> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .ok_or_else(|| Error::UndefinedVariable {
                line,
                name: name.to_string(),
            })
    }

    /// Replaces an existing binding of `variable.name()`. Never creates one.
    pub fn update(&mut self, variable: Variable, line: usize) -> Result<()> {
        match self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(variable.name()))
        {
            Some(slot) => {
                debug!("update {} on line {}", variable.name(), line);
                *slot = variable;
                Ok(())
            }
            None => Err(Error::UndefinedVariable {
                line,
                name: variable.name().to_string(),
            }),
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::new());
        trace!("push frame, depth {}", self.frames.len());
    }

    pub fn pop_frame(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the outermost frame");
        self.frames.pop();
        trace!("pop frame, depth {}", self.frames.len());
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn print(&mut self, value: &Value) -> Result<()> {
        self.io.print(value)
    }

    /// Reads one line on behalf of the statement on `line`.
    pub fn read_line(&mut self, line: usize) -> Result<String> {
        self.io
            .read_line()?
            .ok_or(Error::InputExhausted { line })
    }
}

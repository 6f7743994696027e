use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use super::Value;
use crate::error::Result;

/// The outside world as seen by a running program.
pub trait InputOutput {
    /// Writes the value's natural text, without separators or newlines.
    fn print(&mut self, value: &Value) -> Result<()>;
    /// One line of input without its line terminator, or `None` once input
    /// is exhausted.
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// Console I/O on stdin and stdout.
#[derive(Debug, Default)]
pub struct StdIo;

impl InputOutput for StdIo {
    fn print(&mut self, value: &Value) -> Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{value}")?;
        stdout.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// In-memory I/O: input lines are queued up front, printed values are kept.
#[derive(Debug, Default)]
pub struct BufferedIo {
    input: VecDeque<String>,
    output: Vec<Value>,
    reads: usize,
}

impl BufferedIo {
    pub fn new<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
    /// Every value printed so far, in order.
    pub fn output(&self) -> &[Value] {
        &self.output
    }
    /// Printed values concatenated the way a console would show them.
    pub fn text(&self) -> String {
        self.output.iter().map(Value::to_string).collect()
    }
    /// Number of `read_line` calls made, including ones that found no input.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl InputOutput for BufferedIo {
    fn print(&mut self, value: &Value) -> Result<()> {
        self.output.push(value.clone());
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.reads += 1;
        Ok(self.input.pop_front())
    }
}

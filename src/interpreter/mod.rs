pub(crate) mod actions;
mod context;
mod io;
mod value;

pub use context::Context;
pub use io::{BufferedIo, InputOutput, StdIo};
pub use value::{Type, Value, Variable};

use tracing::info;

use crate::error::Result;
use crate::parser::{self, Consumed, Tokenizer};

/// Parses `source` completely, then runs it against a fresh context.
pub fn run(source: &str, io: &mut dyn InputOutput) -> Result<()> {
    let mut context = Context::new(io);
    run_in(source, &mut context)
}

/// Parses `source` completely, then runs it against `context`, so bindings
/// made by earlier runs stay visible.
pub fn run_in(source: &str, context: &mut Context) -> Result<()> {
    let program = compile(source)?;
    info!("running program");
    evaluate(&program, context)?;
    info!("program finished");
    Ok(())
}

/// Tokenizes and parses `source` into its root node without running anything.
pub fn compile(source: &str) -> Result<Consumed> {
    let tokens = Tokenizer::new().tokenize(source)?;
    info!("parsing {} tokens", tokens.len());
    parser::parse(&tokens)
}

pub fn evaluate(program: &Consumed, context: &mut Context) -> Result<()> {
    program.execute(context)
}

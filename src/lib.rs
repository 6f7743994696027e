mod error;
pub use error::{Error, Result};

mod parser;
pub use parser::{tokenize_string, Consumed, Payload, Token, TokenType, Tokenizer};

mod interpreter;
pub use interpreter::{
    compile, evaluate, run, run_in, BufferedIo, Context, InputOutput, StdIo, Type, Value,
    Variable,
};

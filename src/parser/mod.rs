pub(crate) mod combinators;
mod grammar;
mod locations;
pub mod tokenizer;

pub use combinators::Consumed;
pub(crate) use grammar::parse;
pub use locations::Locatable;
pub use tokenizer::{tokenize_string, Payload, Token, TokenType, Tokenizer};

#[cfg(test)]
mod test;

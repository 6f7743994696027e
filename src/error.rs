use thiserror::Error;

use crate::interpreter::Type;
use crate::parser::tokenizer::TokenType;

#[derive(Debug, Error)]
pub enum Error {
    // Lexical
    #[error("Unexpected character '{character}' on line {line}")]
    UnexpectedCharacter { line: usize, character: char },
    #[error("Unexpected end of input on line {line}")]
    EndOfInput { line: usize },
    #[error("Invalid integer literal '{literal}' on line {line}")]
    InvalidIntegerLiteral { line: usize, literal: String },

    // Syntactic
    #[error("Unexpected token {actual} on line {line} (expected {expected})")]
    UnexpectedToken {
        line: usize,
        actual: TokenType,
        expected: TokenType,
    },
    #[error("Syntax error on line {line}: no rule matches {actual}")]
    RuleNotMatched { line: usize, actual: TokenType },

    // Scoping
    #[error("Undefined variable '{name}' on line {line}")]
    UndefinedVariable { line: usize, name: String },
    #[error("Variable '{name}' on line {line} is already defined on line {previous_line}")]
    VariableAlreadyDefined {
        line: usize,
        name: String,
        previous_line: usize,
    },

    // Typing
    #[error("Type error on line {line}: expected {expected}, got {actual}")]
    Type {
        line: usize,
        expected: Type,
        actual: Type,
    },
    #[error("Unsupported operation on line {line}: cannot use {operator} with {typ}")]
    OperationNotSupported {
        line: usize,
        typ: Type,
        operator: TokenType,
    },
    #[error("Unsupported input on line {line}: cannot read a value of type {typ}")]
    UnsupportedInput { line: usize, typ: Type },

    // Value semantics
    #[error("Variable '{name}' is used uninitialized on line {line}")]
    UninitializedVariable { line: usize, name: String },
    #[error("Could not parse '{input}' as an integer on line {line}")]
    IntegerParse { line: usize, input: String },
    #[error("Assertion failed on line {line}")]
    AssertionFailure { line: usize },
    #[error("Arithmetic fault on line {line}: division by zero or overflow")]
    ArithmeticFault { line: usize },

    // Collaborator
    #[error("No more input available for read on line {line}")]
    InputExhausted { line: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Source line the error is attributed to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnexpectedCharacter { line, .. }
            | Self::EndOfInput { line }
            | Self::InvalidIntegerLiteral { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::RuleNotMatched { line, .. }
            | Self::UndefinedVariable { line, .. }
            | Self::VariableAlreadyDefined { line, .. }
            | Self::Type { line, .. }
            | Self::OperationNotSupported { line, .. }
            | Self::UnsupportedInput { line, .. }
            | Self::UninitializedVariable { line, .. }
            | Self::IntegerParse { line, .. }
            | Self::AssertionFailure { line }
            | Self::ArithmeticFault { line }
            | Self::InputExhausted { line } => Some(*line),
            Self::Io(_) => None,
        }
    }

    /// True if the error only says the source stopped too early, i.e. more
    /// input could still turn it into a valid program.
    pub fn is_incomplete(&self) -> bool {
        match self {
            Self::EndOfInput { .. } => true,
            Self::UnexpectedToken { actual, .. } | Self::RuleNotMatched { actual, .. } => {
                *actual == TokenType::ENDMARKER
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

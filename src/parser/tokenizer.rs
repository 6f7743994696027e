use const_format::concatcp;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::interpreter::Type;

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Token {
    pub(crate) typ: TokenType,
    pub(crate) payload: Payload,
    pub(crate) line: usize,
}

/// Literal content carried by a token, if its kind has any.
#[derive(Clone, Default, Debug, PartialEq)]
pub enum Payload {
    #[default]
    None,
    Int(i64),
    Str(String),
    Bool(bool),
    Type(Type),
}

impl Token {
    pub(crate) fn new(typ: TokenType, payload: Payload, line: usize) -> Self {
        Self { typ, payload, line }
    }
    pub fn typ(&self) -> TokenType {
        self.typ
    }
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
    pub fn line(&self) -> usize {
        self.line
    }
    /// Name of an identifier token.
    pub(crate) fn name(&self) -> &str {
        match &self.payload {
            Payload::Str(name) if self.typ == TokenType::NAME => name,
            _ => panic!("{self} is not an identifier"),
        }
    }
    /// Type carried by a type-name token.
    pub(crate) fn var_type(&self) -> Type {
        match self.payload {
            Payload::Type(typ) => typ,
            _ => panic!("{self} is not a type name"),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            Payload::None => write!(f, "{:?}", self.typ),
            Payload::Int(i) => write!(f, "{:?}({})", self.typ, i),
            Payload::Str(s) => write!(f, "{:?}('{}')", self.typ, s),
            Payload::Bool(b) => write!(f, "{:?}({})", self.typ, b),
            Payload::Type(t) => write!(f, "{:?}({})", self.typ, t),
        }
    }
}

#[allow(non_camel_case_types)]
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TokenType {
    #[default]
    ENDMARKER,
    NAME,
    NUMBER,
    STRING,
    BOOLEAN,
    TYPE,
    VAR,
    FOR,
    END,
    IN,
    DO,
    READ,
    PRINT,
    ASSERT,
    LPAR,
    RPAR,
    SEMI,
    COLON,
    COLONEQUAL,
    DOUBLEDOT,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    LESS,
    EQUAL,
    AMPER,
    EXCLAMATION,
}

impl TokenType {
    pub const ALL: [TokenType; 28] = [
        Self::ENDMARKER,
        Self::NAME,
        Self::NUMBER,
        Self::STRING,
        Self::BOOLEAN,
        Self::TYPE,
        Self::VAR,
        Self::FOR,
        Self::END,
        Self::IN,
        Self::DO,
        Self::READ,
        Self::PRINT,
        Self::ASSERT,
        Self::LPAR,
        Self::RPAR,
        Self::SEMI,
        Self::COLON,
        Self::COLONEQUAL,
        Self::DOUBLEDOT,
        Self::PLUS,
        Self::MINUS,
        Self::STAR,
        Self::SLASH,
        Self::LESS,
        Self::EQUAL,
        Self::AMPER,
        Self::EXCLAMATION,
    ];

    /// A piece of source text that tokenizes to this kind.
    pub fn canonical(&self) -> &'static str {
        match self {
            Self::ENDMARKER => "",
            Self::NAME => "x",
            Self::NUMBER => "0",
            Self::STRING => "\"\"",
            Self::BOOLEAN => "true",
            Self::TYPE => "int",
            Self::VAR => "var",
            Self::FOR => "for",
            Self::END => "end",
            Self::IN => "in",
            Self::DO => "do",
            Self::READ => "read",
            Self::PRINT => "print",
            Self::ASSERT => "assert",
            Self::LPAR => LPAR.0,
            Self::RPAR => RPAR.0,
            Self::SEMI => SEMI.0,
            Self::COLON => COLON.0,
            Self::COLONEQUAL => COLONEQUAL.0,
            Self::DOUBLEDOT => DOUBLEDOT.0,
            Self::PLUS => PLUS.0,
            Self::MINUS => MINUS.0,
            Self::STAR => STAR.0,
            Self::SLASH => SLASH.0,
            Self::LESS => LESS.0,
            Self::EQUAL => EQUAL.0,
            Self::AMPER => AMPER.0,
            Self::EXCLAMATION => EXCLAMATION.0,
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ENDMARKER => write!(f, "end of input"),
            Self::NAME => write!(f, "identifier"),
            Self::NUMBER => write!(f, "integer literal"),
            Self::STRING => write!(f, "string literal"),
            Self::BOOLEAN => write!(f, "boolean literal"),
            Self::TYPE => write!(f, "type name"),
            other => write!(f, "'{}'", other.canonical()),
        }
    }
}

const COLONEQUAL: (&str, TokenType) = (":=", TokenType::COLONEQUAL);
const DOUBLEDOT: (&str, TokenType) = ("..", TokenType::DOUBLEDOT);
const LPAR: (&str, TokenType) = ("(", TokenType::LPAR);
const RPAR: (&str, TokenType) = (")", TokenType::RPAR);
const SEMI: (&str, TokenType) = (";", TokenType::SEMI);
const COLON: (&str, TokenType) = (":", TokenType::COLON);
const PLUS: (&str, TokenType) = ("+", TokenType::PLUS);
const MINUS: (&str, TokenType) = ("-", TokenType::MINUS);
const STAR: (&str, TokenType) = ("*", TokenType::STAR);
const SLASH: (&str, TokenType) = ("/", TokenType::SLASH);
const LESS: (&str, TokenType) = ("<", TokenType::LESS);
const EQUAL: (&str, TokenType) = ("=", TokenType::EQUAL);
const AMPER: (&str, TokenType) = ("&", TokenType::AMPER);
const EXCLAMATION: (&str, TokenType) = ("!", TokenType::EXCLAMATION);

// Longer lexemes first, so ":=" wins over ":".
const SIMPLE_TOKENS: [(&str, TokenType); 14] = [
    COLONEQUAL,
    DOUBLEDOT,
    LPAR,
    RPAR,
    SEMI,
    COLON,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    LESS,
    EQUAL,
    AMPER,
    EXCLAMATION,
];

const KEYWORDS: [(&str, TokenType); 8] = [
    ("var", TokenType::VAR),
    ("for", TokenType::FOR),
    ("end", TokenType::END),
    ("in", TokenType::IN),
    ("do", TokenType::DO),
    ("read", TokenType::READ),
    ("print", TokenType::PRINT),
    ("assert", TokenType::ASSERT),
];

const BOOLEANS: [(&str, bool); 2] = [("true", true), ("false", false)];

const TYPES: [(&str, Type); 3] = [("int", Type::Int), ("string", Type::String), ("bool", Type::Bool)];

const ESCAPES: [(char, char); 3] = [('n', '\n'), ('t', '\t'), ('"', '"')];

macro_rules! alternative {
    ($t:expr) => {{
        $t
    }};
    ($t:expr, $($ts:expr),+) => {{
        concatcp!($t, "|", alternative!($($ts),+))
    }}
}

macro_rules! group {
    ($($ts:expr),+) => {{
        concatcp!(r"(?:", alternative!($($ts),+), ")")
    }}
}

const S_WHITESPACE: &str = r"^\s+";
const S_LETTER: &str = r"[A-Za-z]";
const S_DIGIT: &str = r"[0-9]";
const S_NAME: &str = concatcp!("^", S_LETTER, group!(S_LETTER, S_DIGIT, "_"), "*");
const S_NUMBER: &str = concatcp!("^", S_DIGIT, "+");

/// Turns MiniPL source text into tokens. All lookup tables and patterns are
/// built once per instance in [`Tokenizer::new`] and never change afterwards.
pub struct Tokenizer {
    whitespace: Regex,
    name: Regex,
    number: Regex,
    keywords: HashMap<&'static str, TokenType>,
    booleans: HashMap<&'static str, bool>,
    types: HashMap<&'static str, Type>,
    escapes: HashMap<char, char>,
    line: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            whitespace: Regex::new(S_WHITESPACE).expect("Error compiling regex."),
            name: Regex::new(S_NAME).expect("Error compiling regex."),
            number: Regex::new(S_NUMBER).expect("Error compiling regex."),
            keywords: KEYWORDS.into_iter().collect(),
            booleans: BOOLEANS.into_iter().collect(),
            types: TYPES.into_iter().collect(),
            escapes: ESCAPES.into_iter().collect(),
            line: 1,
        }
    }

    /// Tokenizes a complete source text. The result always ends with an
    /// `ENDMARKER` token.
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<Token>> {
        self.line = 1;
        let mut tokens = vec![];
        let mut rest = self.skip_trivia(source)?;
        while !rest.is_empty() {
            let (token, len) = self.read_token(rest)?;
            trace!("{}", token);
            tokens.push(token);
            rest = self.skip_trivia(&rest[len..])?;
        }
        tokens.push(Token::new(TokenType::ENDMARKER, Payload::None, self.line));
        debug!("tokenized {} tokens over {} lines", tokens.len(), self.line);
        Ok(tokens)
    }

    fn skip_trivia<'s>(&mut self, mut rest: &'s str) -> Result<&'s str> {
        loop {
            if let Some(m) = self.whitespace.find(rest) {
                self.line += count_newlines(m.as_str());
                rest = &rest[m.end()..];
            } else if let Some(comment) = rest.strip_prefix("//") {
                rest = match comment.find('\n') {
                    Some(end) => {
                        self.line += 1;
                        &comment[end + 1..]
                    }
                    None => "",
                };
            } else if let Some(comment) = rest.strip_prefix("/*") {
                match comment.find("*/") {
                    Some(end) => {
                        self.line += count_newlines(&comment[..end]);
                        rest = &comment[end + 2..];
                    }
                    None => {
                        self.line += count_newlines(comment);
                        return Err(Error::EndOfInput { line: self.line });
                    }
                }
            } else {
                return Ok(rest);
            }
        }
    }

    fn read_token(&mut self, rest: &str) -> Result<(Token, usize)> {
        let line = self.line;
        for (lexeme, tok_type) in SIMPLE_TOKENS {
            if rest.starts_with(lexeme) {
                return Ok((Token::new(tok_type, Payload::None, line), lexeme.len()));
            }
        }
        let mut chars = rest.chars();
        match chars.next() {
            // A lone dot: ".." was already tried above.
            Some('.') => match chars.next() {
                None => Err(Error::EndOfInput { line }),
                Some(character) => Err(Error::UnexpectedCharacter { line, character }),
            },
            Some('"') => self.read_string(&rest[1..]).map(|(token, len)| (token, len + 1)),
            _ => {
                if let Some(m) = self.number.find(rest) {
                    return self.read_number(m.as_str(), &rest[m.end()..]);
                }
                if let Some(m) = self.name.find(rest) {
                    return Ok((self.classify(m.as_str()), m.end()));
                }
                let character = rest.chars().next().unwrap_or_default();
                Err(Error::UnexpectedCharacter { line, character })
            }
        }
    }

    fn read_number(&self, digits: &str, after: &str) -> Result<(Token, usize)> {
        let line = self.line;
        if let Some(character) = after.chars().next().filter(char::is_ascii_alphabetic) {
            return Err(Error::UnexpectedCharacter { line, character });
        }
        let value = digits
            .parse::<i64>()
            .map_err(|_| Error::InvalidIntegerLiteral {
                line,
                literal: digits.to_string(),
            })?;
        Ok((
            Token::new(TokenType::NUMBER, Payload::Int(value), line),
            digits.len(),
        ))
    }

    /// Reads a string literal body; `rest` starts right after the opening quote.
    /// The returned length covers the closing quote.
    fn read_string(&mut self, rest: &str) -> Result<(Token, usize)> {
        let line = self.line;
        let mut content = String::new();
        let mut chars = rest.char_indices();
        while let Some((i, chr)) = chars.next() {
            match chr {
                '"' => {
                    let token = Token::new(TokenType::STRING, Payload::Str(content), line);
                    return Ok((token, i + 1));
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => {
                        if escaped == '\n' {
                            self.line += 1;
                        }
                        content.push(*self.escapes.get(&escaped).unwrap_or(&escaped));
                    }
                    None => break,
                },
                _ => {
                    if chr == '\n' {
                        self.line += 1;
                    }
                    content.push(chr);
                }
            }
        }
        Err(Error::EndOfInput { line: self.line })
    }

    fn classify(&self, word: &str) -> Token {
        let line = self.line;
        if let Some(&typ) = self.keywords.get(word) {
            Token::new(typ, Payload::None, line)
        } else if let Some(&value) = self.booleans.get(word) {
            Token::new(TokenType::BOOLEAN, Payload::Bool(value), line)
        } else if let Some(&typ) = self.types.get(word) {
            Token::new(TokenType::TYPE, Payload::Type(typ), line)
        } else {
            Token::new(TokenType::NAME, Payload::Str(word.to_string()), line)
        }
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

pub fn tokenize_string(source: &str) -> Result<Vec<Token>> {
    Tokenizer::new().tokenize(source)
}

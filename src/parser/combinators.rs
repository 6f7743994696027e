use derivative::Derivative;
use once_cell::unsync::OnceCell;
use tracing::trace;

use super::tokenizer::{Token, TokenType};
use crate::error::{Error, Result};
use crate::interpreter::{Context, Value};

/// Cursor over a token slice. Consuming is destructive: a rule that advanced
/// the stream never gives tokens back.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }
    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }
    pub fn expect(&mut self, expected: TokenType) -> Result<Token> {
        match self.peek() {
            Some(token) if token.typ == expected => {
                self.advance();
                trace!("consumed {}", token);
                Ok(token.clone())
            }
            Some(token) => Err(Error::UnexpectedToken {
                line: token.line,
                actual: token.typ,
                expected,
            }),
            None => Err(Error::EndOfInput { line: self.line() }),
        }
    }
    /// Line of the next token, or of the last one once the stream is exhausted.
    pub fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(1, |token| token.line)
    }
}

/// A semantic action: computes the effect or value of a production from its
/// consumed children.
pub type Action = fn(&[Consumed], &mut Context<'_>) -> Result<Option<Value>>;

/// Result of consuming a rule: a raw token, a list of children, or children
/// waiting for their semantic action to be run.
#[derive(Derivative)]
#[derivative(Debug)]
pub enum Consumed {
    Token(Token),
    List(Vec<Consumed>),
    Deferred(Vec<Consumed>, #[derivative(Debug = "ignore")] Action),
}

impl Consumed {
    pub fn token(&self) -> &Token {
        match self {
            Self::Token(token) => token,
            other => panic!("expected a token, found {other:?}"),
        }
    }
    pub fn list(&self) -> &[Consumed] {
        match self {
            Self::List(children) => children,
            other => panic!("expected a list, found {other:?}"),
        }
    }
    /// Runs the semantic action and returns the value it produced.
    pub fn evaluate(&self, context: &mut Context) -> Result<Value> {
        match self {
            Self::Deferred(children, action) => match action(children, context)? {
                Some(value) => Ok(value),
                None => panic!("production {self:?} does not produce a value"),
            },
            other => panic!("expected an expression, found {other:?}"),
        }
    }
    /// Runs the semantic action for its side effects only. An empty list is
    /// the result of an epsilon production and does nothing.
    pub fn execute(&self, context: &mut Context) -> Result<()> {
        match self {
            Self::Deferred(children, action) => action(children, context).map(|_| ()),
            Self::List(children) => children.iter().try_for_each(|c| c.execute(context)),
            Self::Token(token) => panic!("cannot execute token {token}"),
        }
    }
}

pub trait Rule: std::fmt::Debug {
    /// Lookahead on the next unconsumed token. Never advances the stream.
    fn matches(&self, input: &TokenStream) -> bool;
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed>;

    fn boxed(self) -> BoxedRule
    where
        Self: Sized + 'static,
    {
        BoxedRule::new(self)
    }
    fn or(self, rule: impl Rule + 'static) -> BoxedRule
    where
        Self: Sized + 'static,
    {
        Alternative::new(vec![self.boxed(), rule.boxed()]).boxed()
    }
    fn with_action(self, action: Action) -> BoxedRule
    where
        Self: Sized + 'static,
    {
        WithAction {
            rule: self.boxed(),
            action,
        }
        .boxed()
    }
}

#[derive(Debug)]
pub struct BoxedRule {
    rule: Box<dyn Rule>,
}

impl BoxedRule {
    fn new(rule: impl Rule + 'static) -> Self {
        Self {
            rule: Box::new(rule),
        }
    }
}

impl Rule for BoxedRule {
    fn matches(&self, input: &TokenStream) -> bool {
        self.rule.matches(input)
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        self.rule.consume(input)
    }
    fn boxed(self) -> BoxedRule {
        self
    }
}

#[derive(Debug)]
pub struct Terminal(TokenType);

impl Rule for Terminal {
    fn matches(&self, input: &TokenStream) -> bool {
        input.peek().is_some_and(|token| token.typ == self.0)
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        input.expect(self.0).map(Consumed::Token)
    }
}

/// All sub-rules in order. Only the first one decides whether the sequence
/// matches; a later mismatch is an error at consume time.
#[derive(Debug)]
pub struct Sequence(Vec<BoxedRule>);

impl Sequence {
    pub fn new(rules: Vec<BoxedRule>) -> Self {
        assert!(!rules.is_empty(), "empty sequence");
        Self(rules)
    }
}

impl Rule for Sequence {
    fn matches(&self, input: &TokenStream) -> bool {
        self.0[0].matches(input)
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        self.0
            .iter()
            .map(|rule| rule.consume(input))
            .collect::<Result<Vec<_>>>()
            .map(Consumed::List)
    }
}

/// The first sub-rule that matches.
#[derive(Debug)]
pub struct Alternative(Vec<BoxedRule>);

impl Alternative {
    pub fn new(rules: Vec<BoxedRule>) -> Self {
        Self(rules)
    }
}

impl Rule for Alternative {
    fn matches(&self, input: &TokenStream) -> bool {
        self.0.iter().any(|rule| rule.matches(input))
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        match self.0.iter().find(|rule| rule.matches(input)) {
            Some(rule) => rule.consume(input),
            None => Err(Error::RuleNotMatched {
                line: input.line(),
                actual: input.peek().map_or(TokenType::ENDMARKER, |token| token.typ),
            }),
        }
    }
}

/// Zero or one occurrence of a sequence. Consuming yields an empty list when
/// the sequence does not match.
#[derive(Debug)]
pub struct Optional(Sequence);

impl Optional {
    pub fn new(sequence: Sequence) -> Self {
        Self(sequence)
    }
}

impl Rule for Optional {
    fn matches(&self, _input: &TokenStream) -> bool {
        true
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        if self.0.matches(input) {
            self.0.consume(input)
        } else {
            epsilon().consume(input)
        }
    }
}

/// Zero or more occurrences of a sequence, consumed in a loop. Yields one
/// flat list with an entry per occurrence.
#[derive(Debug)]
pub struct Repeat(Sequence);

impl Rule for Repeat {
    fn matches(&self, _input: &TokenStream) -> bool {
        true
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        let mut occurrences = vec![];
        while self.0.matches(input) {
            occurrences.push(self.0.consume(input)?);
        }
        Ok(Consumed::List(occurrences))
    }
}

#[derive(Debug)]
pub struct Empty;

impl Rule for Empty {
    fn matches(&self, _input: &TokenStream) -> bool {
        true
    }
    fn consume(&self, _input: &mut TokenStream) -> Result<Consumed> {
        Ok(Consumed::List(vec![]))
    }
}

/// A rule built on first use, for productions that refer to themselves.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Lazy {
    #[derivative(Debug = "ignore")]
    supplier: Box<dyn Fn() -> BoxedRule>,
    rule: OnceCell<BoxedRule>,
}

impl Lazy {
    fn get(&self) -> &BoxedRule {
        self.rule.get_or_init(|| (self.supplier)())
    }
}

impl Rule for Lazy {
    fn matches(&self, input: &TokenStream) -> bool {
        self.get().matches(input)
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        self.get().consume(input)
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct WithAction {
    rule: BoxedRule,
    #[derivative(Debug = "ignore")]
    action: Action,
}

impl Rule for WithAction {
    fn matches(&self, input: &TokenStream) -> bool {
        self.rule.matches(input)
    }
    fn consume(&self, input: &mut TokenStream) -> Result<Consumed> {
        let children = match self.rule.consume(input)? {
            Consumed::List(children) => children,
            other => vec![other],
        };
        Ok(Consumed::Deferred(children, self.action))
    }
}

pub fn tok(expected_type: TokenType) -> Terminal {
    Terminal(expected_type)
}

pub fn epsilon() -> Empty {
    Empty
}

pub fn many(sequence: Sequence) -> Repeat {
    Repeat(sequence)
}

pub fn lazy(supplier: impl Fn() -> BoxedRule + 'static) -> Lazy {
    Lazy {
        supplier: Box::new(supplier),
        rule: OnceCell::new(),
    }
}

pub fn rule(sequence: Sequence, action: Action) -> BoxedRule {
    sequence.with_action(action)
}

macro_rules! seq {
    ($($rule:expr),+ $(,)?) => {
        $crate::parser::combinators::Sequence::new(vec![
            $($crate::parser::combinators::Rule::boxed($rule)),+
        ])
    };
}

macro_rules! any {
    ($($rule:expr),+ $(,)?) => {
        $crate::parser::combinators::Alternative::new(vec![
            $($crate::parser::combinators::Rule::boxed($rule)),+
        ])
    };
}

macro_rules! maybe {
    ($($rule:expr),+ $(,)?) => {
        $crate::parser::combinators::Optional::new($crate::parser::combinators::seq!($($rule),+))
    };
}

pub(crate) use any;
pub(crate) use maybe;
pub(crate) use seq;

use super::combinators::Consumed;
use super::tokenizer::Token;

/// Anything that can be traced back to a line of source text.
pub trait Locatable {
    fn line(&self) -> Option<usize>;
}

impl Locatable for Token {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }
}

/// The line of the first token consumed for this node.
impl Locatable for Consumed {
    fn line(&self) -> Option<usize> {
        match self {
            Self::Token(token) => Locatable::line(token),
            Self::List(children) | Self::Deferred(children, _) => children.line(),
        }
    }
}

impl<R> Locatable for [R]
where
    R: Locatable,
{
    fn line(&self) -> Option<usize> {
        self.iter().find_map(Locatable::line)
    }
}

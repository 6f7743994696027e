// # ========================= START OF THE GRAMMAR =========================
//
// # Every rule is decided by the kind of the next unconsumed token; there is no
// # backtracking. A production paired with a semantic action yields a deferred
// # node which runs the action only when its parent asks for it, so a loop body
// # is parsed once and executed once per iteration.
//
// # Grammar Syntax:
// #
// # e1 e2      Match e1, then match e2.
// # e1 | e2    Match e1 or e2 (first one whose lookahead matches).
// # [ e ]      Optionally match e.
// # UPPER      A token kind.
// # (action)   The semantic action run for the production.

use super::combinators::*;
use super::tokenizer::{Token, TokenType as TT};
use crate::error::Result;
use crate::interpreter::actions;

/// Parses a complete program without running it.
pub(crate) fn parse(tokens: &[Token]) -> Result<Consumed> {
    let mut input = TokenStream::new(tokens);
    let program = statements().consume(&mut input)?;
    tok(TT::ENDMARKER).consume(&mut input)?;
    Ok(program)
}

// statements: (statement ';')*        (statements)
pub(crate) fn statements() -> BoxedRule {
    many(seq![statement(), tok(TT::SEMI)]).with_action(actions::statements)
}

// statement:
//     | 'var' NAME ':' TYPE [':=' expression]                  (create_variable)
//     | NAME ':=' expression                                   (update_variable)
//     | 'print' expression                                    (print_expression)
//     | 'read' NAME                                           (read_variable)
//     | 'assert' '(' expression ')'                           (assert_expression)
//     | 'for' NAME 'in' expression '..' expression 'do'
//           statements 'end' 'for'                          (for_loop)
pub(crate) fn statement() -> BoxedRule {
    any![
        rule(
            seq![
                tok(TT::VAR),
                tok(TT::NAME),
                tok(TT::COLON),
                tok(TT::TYPE),
                maybe!(tok(TT::COLONEQUAL), expression()),
            ],
            actions::create_variable,
        ),
        rule(
            seq![tok(TT::NAME), tok(TT::COLONEQUAL), expression()],
            actions::update_variable,
        ),
        rule(seq![tok(TT::PRINT), expression()], actions::print_expression),
        rule(seq![tok(TT::READ), tok(TT::NAME)], actions::read_variable),
        rule(
            seq![tok(TT::ASSERT), tok(TT::LPAR), expression(), tok(TT::RPAR)],
            actions::assert_expression,
        ),
        rule(
            seq![
                tok(TT::FOR),
                tok(TT::NAME),
                tok(TT::IN),
                expression(),
                tok(TT::DOUBLEDOT),
                expression(),
                tok(TT::DO),
                lazy(statements),
                tok(TT::END),
                tok(TT::FOR),
            ],
            actions::for_loop,
        ),
    ]
    .boxed()
}

// expression:
//     | '!' operand                    (logical_not)
//     | operand [operator operand]     (operation)
pub(crate) fn expression() -> BoxedRule {
    rule(seq![tok(TT::EXCLAMATION), operand()], actions::logical_not)
        .or(rule(seq![operand(), maybe!(operator(), operand())], actions::operation))
}

// operator: '+' | '-' | '*' | '/' | '<' | '=' | '&'
pub(crate) fn operator() -> BoxedRule {
    any![
        tok(TT::PLUS),
        tok(TT::MINUS),
        tok(TT::STAR),
        tok(TT::SLASH),
        tok(TT::LESS),
        tok(TT::EQUAL),
        tok(TT::AMPER),
    ]
    .boxed()
}

// operand:
//     | NUMBER | STRING | BOOLEAN       (constant)
//     | NAME                           (identifier)
//     | '(' expression ')'             (parenthesized)
pub(crate) fn operand() -> BoxedRule {
    any![
        rule(
            seq![any![tok(TT::NUMBER), tok(TT::STRING), tok(TT::BOOLEAN)]],
            actions::constant,
        ),
        rule(seq![tok(TT::NAME)], actions::identifier),
        rule(
            seq![tok(TT::LPAR), lazy(expression), tok(TT::RPAR)],
            actions::parenthesized,
        ),
    ]
    .boxed()
}

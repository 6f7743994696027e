//! Semantic actions attached to the grammar productions.
//!
//! Each action receives the children its production consumed, in grammar
//! order, and the context to run against. Statements return `None`,
//! expressions return the value they evaluate to.

use tracing::debug;

use super::{Context, Type, Value, Variable};
use crate::error::{Error, Result};
use crate::parser::tokenizer::{Payload, Token, TokenType as TT};
use crate::parser::{Consumed, Locatable};

// (statement ';')*
pub(crate) fn statements(children: &[Consumed], context: &mut Context) -> Result<Option<Value>> {
    for occurrence in children {
        occurrence.list()[0].execute(context)?;
    }
    Ok(None)
}

// 'var' ident ':' type [':=' expr]
pub(crate) fn create_variable(
    children: &[Consumed],
    context: &mut Context,
) -> Result<Option<Value>> {
    let line = children[0].token().line();
    let name = children[1].token().name();
    let typ = children[3].token().var_type();
    let variable = match children[4].list() {
        [] => Variable::declared(name, line, typ),
        [_, initializer] => {
            let value = initializer.evaluate(context)?;
            expect_type(typ, &value, line)?;
            Variable::new(name, line, typ, Some(value))
        }
        other => unreachable!("malformed initializer {other:?}"),
    };
    context.declare(variable)?;
    Ok(None)
}

// ident ':=' expr
pub(crate) fn update_variable(
    children: &[Consumed],
    context: &mut Context,
) -> Result<Option<Value>> {
    let token = children[0].token();
    let line = token.line();
    let variable = context.lookup(token.name(), line)?.clone();
    let value = children[2].evaluate(context)?;
    expect_type(variable.typ(), &value, children[2].line().unwrap_or(line))?;
    context.update(variable.with_value(value), line)?;
    Ok(None)
}

// 'print' expr
pub(crate) fn print_expression(
    children: &[Consumed],
    context: &mut Context,
) -> Result<Option<Value>> {
    let value = children[1].evaluate(context)?;
    context.print(&value)?;
    Ok(None)
}

// 'read' ident
pub(crate) fn read_variable(children: &[Consumed], context: &mut Context) -> Result<Option<Value>> {
    let line = children[0].token().line();
    let variable = context.lookup(children[1].token().name(), line)?.clone();
    let value = match variable.typ() {
        Type::Int => {
            let input = context.read_line(line)?;
            let parsed = input
                .parse::<i64>()
                .map_err(|_| Error::IntegerParse {
                    line,
                    input: input.clone(),
                })?;
            Value::Int(parsed)
        }
        Type::String => Value::String(context.read_line(line)?),
        typ => return Err(Error::UnsupportedInput { line, typ }),
    };
    context.update(variable.with_value(value), line)?;
    Ok(None)
}

// 'assert' '(' expr ')'
pub(crate) fn assert_expression(
    children: &[Consumed],
    context: &mut Context,
) -> Result<Option<Value>> {
    let line = children[0].token().line();
    match children[2].evaluate(context)? {
        Value::Bool(true) => Ok(None),
        Value::Bool(false) => Err(Error::AssertionFailure { line }),
        other => Err(Error::Type {
            line,
            expected: Type::Bool,
            actual: other.typ(),
        }),
    }
}

// 'for' ident 'in' expr '..' expr 'do' statements 'end' 'for'
//
// The control variable lives in the enclosing scope and stays visible after
// the loop: it holds `end + 1` once the loop ran, or `start` if the range was
// empty. Each iteration runs the body in a fresh frame that binds its own copy
// of the counter.
pub(crate) fn for_loop(children: &[Consumed], context: &mut Context) -> Result<Option<Value>> {
    let token = children[1].token();
    let line = token.line();
    let start = integer_bound(&children[3], children[2].token().line(), context)?;
    let end = integer_bound(&children[5], children[4].token().line(), context)?;
    let body = &children[7];

    let variable = context.lookup(token.name(), line)?.clone();
    if variable.typ() != Type::Int {
        return Err(Error::Type {
            line,
            expected: Type::Int,
            actual: variable.typ(),
        });
    }
    debug!("for {} in {}..{} on line {}", token.name(), start, end, line);

    context.update(variable.with_value(Value::Int(start)), line)?;
    for i in start..=end {
        context.push_frame();
        let result = context
            .declare(variable.with_value(Value::Int(i)))
            .and_then(|()| body.execute(context));
        context.pop_frame();
        result?;
        context.update(variable.with_value(Value::Int(i.wrapping_add(1))), line)?;
    }
    Ok(None)
}

fn integer_bound(bound: &Consumed, line: usize, context: &mut Context) -> Result<i64> {
    match bound.evaluate(context)? {
        Value::Int(i) => Ok(i),
        other => Err(Error::Type {
            line: bound.line().unwrap_or(line),
            expected: Type::Int,
            actual: other.typ(),
        }),
    }
}

// '!' operand
pub(crate) fn logical_not(children: &[Consumed], context: &mut Context) -> Result<Option<Value>> {
    let operator = children[0].token();
    match children[1].evaluate(context)? {
        Value::Bool(b) => Ok(Some(Value::Bool(!b))),
        other => Err(Error::OperationNotSupported {
            line: operator.line(),
            typ: other.typ(),
            operator: operator.typ(),
        }),
    }
}

// operand [operator operand]
pub(crate) fn operation(children: &[Consumed], context: &mut Context) -> Result<Option<Value>> {
    let left = children[0].evaluate(context)?;
    match children[1].list() {
        [] => Ok(Some(left)),
        [operator, right] => {
            let right = right.evaluate(context)?;
            binary_operation(left, operator.token(), right).map(Some)
        }
        other => unreachable!("malformed operation {other:?}"),
    }
}

/// Applies `operator` to two operands of the same type.
pub(crate) fn binary_operation(left: Value, operator: &Token, right: Value) -> Result<Value> {
    let line = operator.line();
    let typ = left.typ();
    if typ != right.typ() {
        return Err(Error::Type {
            line,
            expected: typ,
            actual: right.typ(),
        });
    }
    let value = match (operator.typ(), left, right) {
        (TT::PLUS, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_add(r)),
        (TT::MINUS, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_sub(r)),
        (TT::STAR, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_mul(r)),
        (TT::SLASH, Value::Int(l), Value::Int(r)) => {
            Value::Int(l.checked_div(r).ok_or(Error::ArithmeticFault { line })?)
        }
        (TT::LESS, Value::Int(l), Value::Int(r)) => Value::Bool(l < r),
        (TT::PLUS, Value::String(l), Value::String(r)) => Value::String(l + &r),
        (TT::AMPER, Value::Bool(l), Value::Bool(r)) => Value::Bool(l && r),
        (TT::EQUAL, l, r) => Value::Bool(l == r),
        _ => {
            return Err(Error::OperationNotSupported {
                line,
                typ,
                operator: operator.typ(),
            })
        }
    };
    Ok(value)
}

// int | string | bool literal
pub(crate) fn constant(children: &[Consumed], _context: &mut Context) -> Result<Option<Value>> {
    let token = children[0].token();
    let value = match token.payload() {
        Payload::Int(i) => Value::Int(*i),
        Payload::Str(s) => Value::String(s.clone()),
        Payload::Bool(b) => Value::Bool(*b),
        _ => unreachable!("{token} is not a literal"),
    };
    Ok(Some(value))
}

// ident
pub(crate) fn identifier(children: &[Consumed], context: &mut Context) -> Result<Option<Value>> {
    let token = children[0].token();
    let line = token.line();
    let value = context.lookup(token.name(), line)?.value(line)?.clone();
    Ok(Some(value))
}

// '(' expr ')'
pub(crate) fn parenthesized(
    children: &[Consumed],
    context: &mut Context,
) -> Result<Option<Value>> {
    children[1].evaluate(context).map(Some)
}

fn expect_type(expected: Type, value: &Value, line: usize) -> Result<()> {
    if value.typ() == expected {
        Ok(())
    } else {
        Err(Error::Type {
            line,
            expected,
            actual: value.typ(),
        })
    }
}

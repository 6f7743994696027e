use std::cell::Cell;
use std::rc::Rc;

use super::combinators::*;
use super::grammar::parse;
use super::tokenizer::{tokenize_string, Payload, Token, TokenType as TT};
use super::Locatable;
use crate::error::Error;
use crate::interpreter::{BufferedIo, Context, Type, Value};

fn kinds(input: &str) -> Vec<TT> {
    tokenize_string(input)
        .unwrap()
        .iter()
        .map(|t| t.typ())
        .collect()
}

fn tokens(input: &str) -> Vec<Token> {
    tokenize_string(input).unwrap()
}

fn parse_string(input: &str) -> Result<Consumed, Error> {
    let tokens = tokenize_string(input)?;
    parse(&tokens)
}

fn parse_tree_matches(input: &str, tree_repr: &str) {
    let result = parse_string(input);
    assert!(result.is_ok(), "failed to parse \"{input}\": {result:?}");
    let result_repr = format!("{:?}", result.unwrap());
    assert!(
        result_repr.contains(tree_repr),
        "\nFailed to parse \"{}\":\nexpected \"{}\" somewhere in \"{}\"\n",
        input,
        tree_repr,
        result_repr
    )
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("var for end in do read print assert"),
        vec![
            TT::VAR,
            TT::FOR,
            TT::END,
            TT::IN,
            TT::DO,
            TT::READ,
            TT::PRINT,
            TT::ASSERT,
            TT::ENDMARKER
        ]
    );
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds(":= : .. ( ) ; + - * / < = & !"),
        vec![
            TT::COLONEQUAL,
            TT::COLON,
            TT::DOUBLEDOT,
            TT::LPAR,
            TT::RPAR,
            TT::SEMI,
            TT::PLUS,
            TT::MINUS,
            TT::STAR,
            TT::SLASH,
            TT::LESS,
            TT::EQUAL,
            TT::AMPER,
            TT::EXCLAMATION,
            TT::ENDMARKER
        ]
    );
    assert_eq!(kinds("x:=1"), vec![TT::NAME, TT::COLONEQUAL, TT::NUMBER, TT::ENDMARKER]);
    assert_eq!(
        kinds("0..n-1"),
        vec![TT::NUMBER, TT::DOUBLEDOT, TT::NAME, TT::MINUS, TT::NUMBER, TT::ENDMARKER]
    );
}

#[test]
fn test_literals() {
    let toks = tokens("42 \"hi there\" true false int string bool counter_2");
    let payloads: Vec<&Payload> = toks.iter().map(|t| t.payload()).collect();
    assert_eq!(
        payloads,
        vec![
            &Payload::Int(42),
            &Payload::Str("hi there".to_string()),
            &Payload::Bool(true),
            &Payload::Bool(false),
            &Payload::Type(Type::Int),
            &Payload::Type(Type::String),
            &Payload::Type(Type::Bool),
            &Payload::Str("counter_2".to_string()),
            &Payload::None,
        ]
    );
    assert_eq!(toks[0].typ(), TT::NUMBER);
    assert_eq!(toks[1].typ(), TT::STRING);
    assert_eq!(toks[2].typ(), TT::BOOLEAN);
    assert_eq!(toks[4].typ(), TT::TYPE);
    assert_eq!(toks[7].typ(), TT::NAME);
}

#[test]
fn test_keywords_are_whole_words() {
    let toks = tokens("variable forx integer truth");
    assert!(toks[..4].iter().all(|t| t.typ() == TT::NAME));
    assert_eq!(toks[0].name(), "variable");
}

#[test]
fn test_escapes() {
    let toks = tokens(r#""a\nb\tc\"d\\e\q""#);
    assert_eq!(toks[0].payload(), &Payload::Str("a\nb\tc\"d\\eq".to_string()));
}

#[test]
fn test_comments_are_skipped() {
    let toks = tokens("// line comment\nvar /* block\ncomment */ x // trailing");
    let kinds: Vec<TT> = toks.iter().map(|t| t.typ()).collect();
    assert_eq!(kinds, vec![TT::VAR, TT::NAME, TT::ENDMARKER]);
    assert_eq!(toks[0].line(), 2);
    assert_eq!(toks[1].line(), 3);
}

#[test]
fn test_slash_is_division_outside_comments() {
    assert_eq!(
        kinds("a / b"),
        vec![TT::NAME, TT::SLASH, TT::NAME, TT::ENDMARKER]
    );
}

#[test]
fn test_line_numbers() {
    let toks = tokens("var x : int;\n\nprint \"two\nlines\";\nprint x;");
    let lines: Vec<usize> = toks.iter().map(|t| t.line()).collect();
    assert_eq!(lines, vec![1, 1, 1, 1, 1, 3, 3, 4, 5, 5, 5, 5]);
}

#[test]
fn test_lexical_errors() {
    assert!(matches!(
        tokenize_string(".1"),
        Err(Error::UnexpectedCharacter { line: 1, character: '1' })
    ));
    assert!(matches!(tokenize_string("."), Err(Error::EndOfInput { .. })));
    assert!(matches!(
        tokenize_string("print \"abc"),
        Err(Error::EndOfInput { .. })
    ));
    assert!(matches!(
        tokenize_string("\"abc\\"),
        Err(Error::EndOfInput { .. })
    ));
    assert!(matches!(
        tokenize_string("x /* never\nclosed"),
        Err(Error::EndOfInput { line: 2 })
    ));
    assert!(matches!(
        tokenize_string("\n12abc"),
        Err(Error::UnexpectedCharacter { line: 2, character: 'a' })
    ));
    assert!(matches!(
        tokenize_string("var x # y"),
        Err(Error::UnexpectedCharacter { character: '#', .. })
    ));
    assert!(matches!(
        tokenize_string("1...2"),
        Err(Error::UnexpectedCharacter { character: '2', .. })
    ));
    assert!(matches!(
        tokenize_string("99999999999999999999"),
        Err(Error::InvalidIntegerLiteral { .. })
    ));
}

#[test]
fn test_canonical_forms_round_trip() {
    for kind in TT::ALL.into_iter().filter(|k| *k != TT::ENDMARKER) {
        assert_eq!(
            kinds(kind.canonical()),
            vec![kind, TT::ENDMARKER],
            "canonical form of {kind:?}"
        );
    }
    let all: Vec<&str> = TT::ALL.iter().map(|k| k.canonical()).collect();
    assert_eq!(kinds(&all.join(" ")), {
        let mut expected: Vec<TT> = TT::ALL[1..].to_vec();
        expected.push(TT::ENDMARKER);
        expected
    });
}

#[test]
fn test_terminal() {
    let toks = tokens("var x");
    let mut input = TokenStream::new(&toks);
    assert!(tok(TT::VAR).matches(&input));
    assert!(!tok(TT::NAME).matches(&input));
    assert!(tok(TT::VAR).matches(&input), "matches must not advance");
    let consumed = tok(TT::VAR).consume(&mut input).unwrap();
    assert_eq!(consumed.token().typ(), TT::VAR);
    assert!(matches!(
        tok(TT::COLON).consume(&mut input),
        Err(Error::UnexpectedToken {
            actual: TT::NAME,
            expected: TT::COLON,
            ..
        })
    ));
}

#[test]
fn test_sequence_only_checks_first_rule() {
    let toks = tokens("var 1");
    let mut input = TokenStream::new(&toks);
    let rule = seq![tok(TT::VAR), tok(TT::NAME)];
    assert!(rule.matches(&input));
    assert!(matches!(
        rule.consume(&mut input),
        Err(Error::UnexpectedToken {
            actual: TT::NUMBER,
            expected: TT::NAME,
            line: 1
        })
    ));
}

#[test]
fn test_sequence_collects_children() {
    let toks = tokens("var x");
    let mut input = TokenStream::new(&toks);
    let consumed = seq![tok(TT::VAR), tok(TT::NAME)].consume(&mut input).unwrap();
    assert_eq!(consumed.list().len(), 2);
    assert_eq!(consumed.list()[1].token().name(), "x");
    assert_eq!(input.peek().unwrap().typ(), TT::ENDMARKER);
}

#[test]
fn test_alternative() {
    let toks = tokens("( x");
    let mut input = TokenStream::new(&toks);
    let rule = any![tok(TT::NAME), tok(TT::LPAR)];
    assert!(rule.matches(&input));
    assert_eq!(rule.consume(&mut input).unwrap().token().typ(), TT::LPAR);
    assert_eq!(rule.consume(&mut input).unwrap().token().typ(), TT::NAME);
    assert!(!rule.matches(&input));
    assert!(matches!(
        rule.consume(&mut input),
        Err(Error::RuleNotMatched {
            actual: TT::ENDMARKER,
            ..
        })
    ));
}

#[test]
fn test_or_tries_rules_in_order() {
    let toks = tokens("x");
    let mut input = TokenStream::new(&toks);
    let rule = seq![tok(TT::NAME)].or(tok(TT::NAME));
    assert!(matches!(rule.consume(&mut input), Ok(Consumed::List(_))));
}

#[test]
fn test_optional() {
    let toks = tokens("x := 1");
    let mut input = TokenStream::new(&toks);
    let rule = maybe!(tok(TT::COLON), tok(TT::TYPE));
    assert!(rule.matches(&input));
    assert!(rule.consume(&mut input).unwrap().list().is_empty());
    assert_eq!(input.peek().unwrap().typ(), TT::NAME);

    input.advance();
    let rule = maybe!(tok(TT::COLONEQUAL), tok(TT::NUMBER));
    assert_eq!(rule.consume(&mut input).unwrap().list().len(), 2);
    assert!(epsilon().matches(&input));
}

#[test]
fn test_many_collects_flat_occurrences() {
    let toks = tokens("a; b; c; 1");
    let mut input = TokenStream::new(&toks);
    let rule = many(seq![tok(TT::NAME), tok(TT::SEMI)]);
    let consumed = rule.consume(&mut input).unwrap();
    assert_eq!(consumed.list().len(), 3);
    assert_eq!(consumed.list()[2].list()[0].token().name(), "c");
    assert_eq!(input.peek().unwrap().typ(), TT::NUMBER);
    assert!(rule.consume(&mut input).unwrap().list().is_empty());
}

#[test]
fn test_many_propagates_errors_inside_an_occurrence() {
    let toks = tokens("a; b 1");
    let mut input = TokenStream::new(&toks);
    assert!(matches!(
        many(seq![tok(TT::NAME), tok(TT::SEMI)]).consume(&mut input),
        Err(Error::UnexpectedToken {
            actual: TT::NUMBER,
            expected: TT::SEMI,
            ..
        })
    ));
}

#[test]
fn test_long_statement_list_is_flat() {
    let source = "print 1;\n".repeat(20_000);
    let program = parse_string(&source).unwrap();
    match program {
        Consumed::Deferred(children, _) => assert_eq!(children.len(), 20_000),
        other => panic!("unexpected root {other:?}"),
    }
}

#[test]
fn test_lazy_builds_once() {
    let built = Rc::new(Cell::new(0));
    let counter = built.clone();
    let rule = lazy(move || {
        counter.set(counter.get() + 1);
        tok(TT::NAME).boxed()
    });
    assert_eq!(built.get(), 0);
    let toks = tokens("a b");
    let mut input = TokenStream::new(&toks);
    assert!(rule.matches(&input));
    rule.consume(&mut input).unwrap();
    rule.consume(&mut input).unwrap();
    assert_eq!(built.get(), 1);
}

fn failing_action(children: &[Consumed], _context: &mut Context) -> crate::Result<Option<Value>> {
    Err(Error::AssertionFailure {
        line: children.line().unwrap_or(0),
    })
}

#[test]
fn test_actions_are_deferred() {
    let toks = tokens("\nprint");
    let mut input = TokenStream::new(&toks);
    let consumed = rule(seq![tok(TT::PRINT)], failing_action)
        .consume(&mut input)
        .unwrap();
    assert!(matches!(consumed, Consumed::Deferred(..)));
    let mut io = BufferedIo::default();
    let mut context = Context::new(&mut io);
    assert!(matches!(
        consumed.execute(&mut context),
        Err(Error::AssertionFailure { line: 2 })
    ));
}

#[test]
#[should_panic]
fn test_wrong_shape_access_panics() {
    Consumed::List(vec![]).token();
}

#[test]
fn test_statements() {
    parse_tree_matches("print 1;", "typ: PRINT");
    parse_tree_matches("var x : int := 4 + (6 * 2);", "typ: STAR");
    parse_tree_matches("var s : string;", "Type(String)");
    parse_tree_matches("x := !b;", "typ: EXCLAMATION");
    parse_tree_matches("read x;", "typ: READ");
    parse_tree_matches("assert (x = 3);", "typ: EQUAL");
    parse_tree_matches(
        "for i in 1..n do print i; end for;",
        "typ: DOUBLEDOT",
    );
    parse_tree_matches(
        "for i in 1..3 do for j in 1..3 do print j; end for; end for;",
        "typ: END",
    );
    parse_tree_matches("", "Deferred([])");
}

#[test]
fn test_parsing_does_not_execute() {
    assert!(parse_string("assert(false); print x;").is_ok());
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(
        parse_string(";;"),
        Err(Error::UnexpectedToken {
            actual: TT::SEMI,
            expected: TT::ENDMARKER,
            ..
        })
    ));
    assert!(matches!(
        parse_string("var a : int;;"),
        Err(Error::UnexpectedToken {
            actual: TT::SEMI,
            ..
        })
    ));
    assert!(matches!(
        parse_string("print ;"),
        Err(Error::RuleNotMatched {
            actual: TT::SEMI,
            line: 1
        })
    ));
    assert!(matches!(
        parse_string("print 1 + ;"),
        Err(Error::RuleNotMatched { .. })
    ));
    assert!(matches!(
        parse_string("var x int;"),
        Err(Error::UnexpectedToken {
            actual: TT::TYPE,
            expected: TT::COLON,
            ..
        })
    ));
    assert!(matches!(
        parse_string("for i in 1..2 do print i; end;"),
        Err(Error::UnexpectedToken {
            actual: TT::SEMI,
            expected: TT::FOR,
            ..
        })
    ));
    assert!(matches!(
        parse_string("print 1 + 2 + 3;"),
        Err(Error::UnexpectedToken {
            actual: TT::PLUS,
            expected: TT::SEMI,
            ..
        })
    ));
}

#[test]
fn test_incomplete_input() {
    let err = parse_string("var x : int").unwrap_err();
    assert!(err.is_incomplete());
    let err = parse_string("for i in 1..2 do\nprint i;\n").unwrap_err();
    assert!(err.is_incomplete());
    let err = parse_string("print;").unwrap_err();
    assert!(!err.is_incomplete());
}

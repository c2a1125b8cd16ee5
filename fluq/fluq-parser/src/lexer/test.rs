use insta::assert_debug_snapshot;

use super::*;

fn lex(source: &str) -> Vec<Token> {
    lex_source(source).unwrap().0
}

#[test]
fn test_lex_predicate() {
    assert_debug_snapshot!(lex("u => u.age > 18"), @r#"
    [
        0..1: Ident("u"),
        2..4: ArrowFat,
        5..6: Ident("u"),
        6..7: Control('.'),
        7..10: Ident("age"),
        11..12: Control('>'),
        13..15: Literal(Integer(18)),
    ]
    "#);
}

#[test]
fn test_lex_operators() {
    assert_debug_snapshot!(lex("a === b !== c && d || !e"), @r#"
    [
        0..1: Ident("a"),
        2..5: Eq,
        6..7: Ident("b"),
        8..11: Ne,
        12..13: Ident("c"),
        14..16: And,
        17..18: Ident("d"),
        19..21: Or,
        22..23: Control('!'),
        23..24: Ident("e"),
    ]
    "#);
}

#[test]
fn test_lex_spread() {
    assert_debug_snapshot!(lex("({ ...u, total: 1.5 })"), @r#"
    [
        0..1: Control('('),
        1..2: Control('{'),
        3..6: Spread,
        6..7: Ident("u"),
        7..8: Control(','),
        9..14: Ident("total"),
        14..15: Control(':'),
        16..19: Literal(Float(1.5)),
        20..21: Control('}'),
        21..22: Control(')'),
    ]
    "#);
}

#[test]
fn test_lex_strings() {
    assert_debug_snapshot!(lex(r#""done" 'it'"#), @r#"
    [
        0..6: Literal(String("done")),
        7..11: Literal(String("it")),
    ]
    "#);
    assert_debug_snapshot!(lex(r"'a\'b'"), @r#"
    [
        0..6: Literal(String("a'b")),
    ]
    "#);
}

#[test]
fn test_lex_keyword_literals() {
    assert_debug_snapshot!(lex("truthy true null nullable"), @r#"
    [
        0..6: Ident("truthy"),
        7..11: Literal(Boolean(true)),
        12..16: Literal(Null),
        17..25: Ident("nullable"),
    ]
    "#);
}

#[test]
fn test_lex_error() {
    let errors = lex_source("u => u.age ~ 1").unwrap_err();
    assert_eq!(errors.0.len(), 1);
    assert_eq!(errors.0[0].code, Some("E0001"));
}

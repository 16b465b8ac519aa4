mod common;

use archscript::interpreter::parse;
use archscript::Value;
use common::{eval, eval_in, render};
use pretty_assertions::assert_eq;

#[test]
fn test_atoms_survive_a_round_trip() {
    let samples = [
        Value::Nil,
        Value::True,
        Value::Integer(0),
        Value::Integer(-17),
        Value::Integer(i64::MAX),
        Value::Double(3.0),
        Value::Double(-0.25),
        Value::string(""),
        Value::string("quote \" backslash \\ newline \n tab \t"),
    ];
    for value in samples {
        let text = value.to_string();
        assert_eq!(eval(&text), value, "round trip of {}", text);
    }
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(eval("nil"), Value::Nil);
    assert_eq!(eval("NIL"), Value::Nil);
    assert_eq!(eval("true"), Value::True);
}

#[test]
fn test_quoted_literals() {
    assert_eq!(eval("'word"), Value::string("word"));
    assert_eq!(eval("'12"), Value::Integer(12));
    assert_eq!(eval("'()"), Value::Nil);
    assert_eq!(render("'(1 (2 3) \"x\" y)"), "'(1 (2 3) \"x\" \"y\")");
}

#[test]
fn test_expression_text_is_canonical() {
    let forms = parse("(add   1\t(multiply 2 3.0) )").unwrap();
    assert_eq!(forms[0].to_string(), "(add 1 (multiply 2 3.0))");
}

#[test]
fn test_struct_literal_yields_fresh_structs() {
    let mut interp = archscript::Interpreter::new();
    eval_in(&mut interp, "(setq make (lambda () () {count: 0}))");
    eval_in(&mut interp, "(setq a (make))");
    eval_in(&mut interp, "(setq b (make))");
    eval_in(&mut interp, "(setq a.count 5)");
    assert_eq!(eval_in(&mut interp, "a.count"), Value::Integer(5));
    assert_eq!(eval_in(&mut interp, "b.count"), Value::Integer(0));
    assert_eq!(eval_in(&mut interp, "(make)").to_string(), "{count: 0}");
}

#[test]
fn test_list_literal_yields_fresh_lists() {
    let mut interp = archscript::Interpreter::new();
    eval_in(&mut interp, "(setq make (lambda () () '(1 2)))");
    eval_in(&mut interp, "(setq xs (make))");
    eval_in(&mut interp, "(set@ xs 0 9)");
    assert_eq!(eval_in(&mut interp, "(make)").to_string(), "'(1 2)");
}

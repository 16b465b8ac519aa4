use archscript::interpreter::{Continuation, NoContinuation, Parser};
use archscript::{Interpreter, Value};
use pretty_assertions::assert_eq;

/// Answers continuation requests from a script and records the prompts.
struct Scripted {
    answers: Vec<&'static str>,
    prompts: Vec<String>,
}

impl Scripted {
    fn new(answers: &[&'static str]) -> Self {
        Self { answers: answers.iter().rev().copied().collect(), prompts: Vec::new() }
    }
}

impl Continuation for Scripted {
    fn more_input(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop().map(str::to_string)
    }
}

#[test]
fn test_open_form_requests_more_input() {
    let mut more = Scripted::new(&[" 2)"]);
    let mut interp = Interpreter::new();
    let value = interp.eval_interactive("(add 1", &mut more).unwrap();
    assert_eq!(value, Value::Integer(3));
    assert_eq!(more.prompts, vec!["(add 1 ... ".to_string()]);
}

#[test]
fn test_several_continuation_lines() {
    let mut more = Scripted::new(&["(multiply 2", "3))"]);
    let mut interp = Interpreter::new();
    let value = interp.eval_interactive("(add 1", &mut more).unwrap();
    assert_eq!(value, Value::Integer(7));
    assert_eq!(more.prompts.len(), 2);
    assert_eq!(more.prompts[1], "(add 1 (multiply 2 ... ");
}

#[test]
fn test_empty_answer_ends_in_structural_error() {
    let mut more = Scripted::new(&[""]);
    let mut interp = Interpreter::new();
    let err = interp.eval_interactive("(add 1", &mut more).unwrap_err();
    assert!(err.message().starts_with("mismatched open parenthesis"));
    assert_eq!(more.prompts.len(), 1);
}

#[test]
fn test_without_collaborator_the_form_is_malformed() {
    let err = Parser::new("{a: 1", &mut NoContinuation).parse_all().unwrap_err();
    assert!(err.message().starts_with("mismatched open brace"));
}

#[test]
fn test_closure_collaborator() {
    let mut lines = vec!["world\""].into_iter();
    let mut more = |_prompt: &str| lines.next().map(String::from);
    let mut interp = Interpreter::new();
    let value = interp.eval_interactive("(cat \"hello", &mut more);
    // The string closes on the second line but the call does not, and the
    // next request gets nothing.
    assert!(value.is_err());

    let mut lines = vec!["world\")"].into_iter();
    let mut more = |_prompt: &str| lines.next().map(String::from);
    let value = interp.eval_interactive("(cat \"hello", &mut more).unwrap();
    assert_eq!(value, Value::string("hello\nworld"));
}

#[test]
fn test_complete_input_never_asks() {
    let mut more = Scripted::new(&[]);
    let mut interp = Interpreter::new();
    assert_eq!(interp.eval_interactive("(add 1 2) (add 3 4)", &mut more).unwrap(), Value::Integer(7));
    assert!(more.prompts.is_empty());
}

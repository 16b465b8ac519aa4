#![allow(dead_code)]

use archscript::interpreter::{BufferConsole, Interpreter};
use archscript::{LispError, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Evaluate `source` in a fresh interpreter, panicking on error.
pub fn eval(source: &str) -> Value {
    eval_in(&mut Interpreter::new(), source)
}

pub fn eval_in(interp: &mut Interpreter, source: &str) -> Value {
    interp
        .eval_source(source)
        .unwrap_or_else(|e| panic!("evaluation of {} failed: {}", source, e))
}

/// Canonical text of the result.
pub fn render(source: &str) -> String {
    eval(source).to_string()
}

pub fn eval_err(source: &str) -> LispError {
    match Interpreter::new().eval_source(source) {
        Ok(value) => panic!("evaluation of {} should fail, got {}", source, value),
        Err(err) => err,
    }
}

/// Interpreter whose `print` output is captured and whose `read` answers
/// from `input`.
pub fn captured(input: &[&str]) -> (Interpreter, Rc<RefCell<Vec<String>>>) {
    let console = BufferConsole::with_input(input.iter().copied());
    let output = console.output();
    (Interpreter::new().with_console(Box::new(console)), output)
}

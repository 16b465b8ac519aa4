use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

use super::environment::Frame;
use super::error::LispError;
use super::evaluator::Interpreter;

/// How a block or loop body finished.
#[derive(Debug, PartialEq)]
pub enum ControlFlow {
    Next(Value),
    Return(Value),
    Break(Value),
    /// A jump to a label this body does not own.
    Goto(Rc<str>),
}

impl ControlFlow {
    /// The value a block yields: Return and Break stop here, an unresolved
    /// Goto keeps travelling as a signal.
    pub fn into_value(self) -> Value {
        match self {
            ControlFlow::Next(value) | ControlFlow::Return(value) | ControlFlow::Break(value) => value,
            ControlFlow::Goto(target) => Value::Goto(target),
        }
    }
}

/// Name carried by a `label`/`goto` form argument.
pub fn target_name(form: &Value) -> Result<Rc<str>, LispError> {
    match form {
        Value::Symbol(name) | Value::String(name) => Ok(name.clone()),
        other => Err(LispError::new(format!("label name expected [{}]", other))),
    }
}

/// `(label name)` written directly in a body.
fn literal_label(form: &Value) -> Option<Rc<str>> {
    match form {
        Value::Expression(items) if items.len() == 2 && matches!(&items[0], Value::Symbol(head) if &**head == "label") => {
            target_name(&items[1]).ok()
        }
        _ => None,
    }
}

/// Run a sequence of forms with label/goto dispatch.
///
/// Labels written literally among `forms` are known up front so jumps work in
/// both directions; a Label value produced any other way is registered at the
/// position that produced it.
pub fn run_body(interpreter: &mut Interpreter, forms: &[Value]) -> Result<ControlFlow, LispError> {
    let mut labels: HashMap<Rc<str>, usize> = forms
        .iter()
        .enumerate()
        .filter_map(|(position, form)| literal_label(form).map(|name| (name, position)))
        .collect();

    let mut result = Value::Nil;
    let mut position = 0;
    while position < forms.len() {
        match interpreter.evaluate(&forms[position])? {
            Value::Return(value) => return Ok(ControlFlow::Return(*value)),
            Value::Break(value) => return Ok(ControlFlow::Break(*value)),
            Value::Goto(target) => match labels.get(&target) {
                Some(&at) => {
                    position = at + 1;
                    continue;
                }
                None => return Ok(ControlFlow::Goto(target)),
            },
            Value::Label(name) => {
                labels.insert(name, position);
                result = Value::Nil;
            }
            value => result = value,
        }
        position += 1;
    }
    Ok(ControlFlow::Next(result))
}

/// One loop pass: `body` runs inside `frame`, popped on every exit path.
pub fn run_iteration(interpreter: &mut Interpreter, frame: Frame, body: &[Value]) -> Result<ControlFlow, LispError> {
    let _frame = interpreter.env().scope(frame);
    run_body(interpreter, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::parser::parse;

    fn body(source: &str) -> Vec<Value> {
        parse(source).unwrap()
    }

    #[test]
    fn test_plain_body_returns_last_value() {
        let mut interp = Interpreter::new();
        let flow = run_body(&mut interp, &body("1 2 (add 1 2)")).unwrap();
        assert_eq!(flow, ControlFlow::Next(Value::Integer(3)));
    }

    #[test]
    fn test_return_stops_body() {
        let mut interp = Interpreter::new();
        let flow = run_body(&mut interp, &body("(setq r 1) (return 7) (setq r 2)")).unwrap();
        assert_eq!(flow, ControlFlow::Return(Value::Integer(7)));
        assert_eq!(interp.resolve("r").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_break_stops_body() {
        let mut interp = Interpreter::new();
        let flow = run_body(&mut interp, &body("(setq r 1) (break) (setq r 2)")).unwrap();
        assert_eq!(flow, ControlFlow::Break(Value::Nil));
        assert_eq!(interp.resolve("r").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_forward_goto_skips_forms() {
        let mut interp = Interpreter::new();
        let forms = body("(setq r 1) (goto done) (setq r 2) (label done) r");
        assert_eq!(run_body(&mut interp, &forms).unwrap(), ControlFlow::Next(Value::Integer(1)));
    }

    #[test]
    fn test_unknown_goto_escapes() {
        let mut interp = Interpreter::new();
        let flow = run_body(&mut interp, &body("(goto elsewhere) 5")).unwrap();
        assert_eq!(flow, ControlFlow::Goto(Rc::from("elsewhere")));
        assert_eq!(flow.into_value(), Value::Goto(Rc::from("elsewhere")));
    }

    #[test]
    fn test_iteration_pops_frame_on_error() {
        let mut interp = Interpreter::new();
        let mut frame = Frame::new();
        frame.insert("i".to_string(), Value::Integer(0));
        assert!(run_iteration(&mut interp, frame, &body("(add i missing)")).is_err());
        assert_eq!(interp.env().depth(), 0);
    }
}

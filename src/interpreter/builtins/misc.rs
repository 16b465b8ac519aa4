//! Assignment, evaluation, errors and introspection.

use crate::value::{ParamKind, Value};
use std::rc::Rc;

use super::super::environment::Frame;
use super::super::error::LispError;
use super::super::evaluator::Interpreter;
use super::super::parser::parse;

use ParamKind::{Any, Function, Rest, Unevaluated};

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_checked(
        "setq",
        &[Unevaluated, Any],
        builtin_setq,
        "(setq name|path value) -> value, assigned to the innermost binding or a new global",
    );
    interp.define_alias("=", "setq");
    interp.define_checked("eval", &[Any], builtin_eval, "(eval string|value) -> result of evaluating the parsed string or the value");
    interp.define_checked("throw", &[Any], builtin_throw, "(throw message|error) -> raises an error");
    interp.define_checked(
        "try",
        &[Unevaluated, Unevaluated, Unevaluated],
        builtin_try,
        "(try form name handler) -> value of form, or of handler with the error bound to name",
    );
    interp.define_checked("help", &[Rest], builtin_help, "(help [prefix]) -> help lines of the globals starting with prefix");
    interp.define_checked("type", &[Any], builtin_type, "(type value) -> name of the value's type");
    interp.define_checked("bound", &[ParamKind::Symbol], builtin_bound, "(bound symbol) -> True when the symbol resolves");
    interp.define_checked("apply", &[Function, Any], builtin_apply, "(apply function list) -> result of calling function with the list items");
}

fn builtin_setq(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let value = args[1].clone();
    match &args[0] {
        Value::Symbol(path) => interp.assign(path, value),
        form => match eval_form!(interp, form) {
            Value::String(path) | Value::Symbol(path) => interp.assign(&path, value),
            other => Err(LispError::new(format!("identifier expected [{}]", other))),
        },
    }
}

fn builtin_eval(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::String(source) => {
            let forms = parse(source)?;
            interp.eval_forms(&forms)
        }
        other => interp.evaluate(other),
    }
}

fn builtin_throw(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::String(message) => Err(LispError::new(message.to_string())),
        Value::Error(error) => Err(LispError::clone(error)),
        other => Err(LispError::type_mismatch(ParamKind::String, other)),
    }
}

fn builtin_try(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let name = match &args[1] {
        Value::Symbol(name) | Value::String(name) if !name.contains('.') => name.clone(),
        other => return Err(LispError::type_mismatch(ParamKind::Symbol, other)),
    };
    match interp.evaluate(&args[0]) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::debug!(%error, binding = %name, "caught error");
            let _frame = interp.env().scope(Frame::new());
            interp.env().set_local(&name, Value::Error(Rc::new(error)));
            interp.evaluate(&args[2])
        }
    }
}

fn builtin_help(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    if let Some(extra) = args.get(1) {
        return Err(LispError::too_many_arguments(extra));
    }
    let prefix = args.first().map(Value::text).unwrap_or_default();
    let lines: Vec<&str> = interp
        .help_entries()
        .filter(|(name, _)| name.starts_with(prefix.as_str()))
        .map(|(_, text)| text)
        .collect();
    Ok(Value::string(lines.join("\n")))
}

fn builtin_type(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::string(args[0].type_name()))
}

fn builtin_bound(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Symbol(path) => Ok(Value::from_bool(interp.resolve(path).is_ok())),
        other => Err(LispError::type_mismatch(ParamKind::Symbol, other)),
    }
}

fn builtin_apply(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let values = match &args[1] {
        Value::Nil => Vec::new(),
        Value::List(items) => items.borrow().clone(),
        other => return Err(LispError::type_mismatch(ParamKind::List, other)),
    };
    interp.apply(&args[0], values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(interp: &mut Interpreter, source: &str) -> Value {
        interp.eval_source(source).unwrap_or_else(|e| panic!("{} failed: {}", source, e))
    }

    #[test]
    fn test_setq_and_alias() {
        let mut interp = Interpreter::new();
        assert_eq!(eval(&mut interp, "(setq x 5)"), Value::Integer(5));
        assert_eq!(eval(&mut interp, "(= y (add x 1))"), Value::Integer(6));
        assert_eq!(eval(&mut interp, "(setq \"z\" 7) z"), Value::Integer(7));
        let err = interp.eval_source("(setq 1 2)").unwrap_err();
        assert!(err.message().starts_with("identifier expected [1]"));
    }

    #[test]
    fn test_eval_string_and_value() {
        let mut interp = Interpreter::new();
        assert_eq!(eval(&mut interp, "(eval \"(add 1 2)\")"), Value::Integer(3));
        assert_eq!(eval(&mut interp, "(eval \"(setq n 4) (add n n)\")"), Value::Integer(8));
        assert_eq!(eval(&mut interp, "(eval 7)"), Value::Integer(7));
        assert_eq!(eval(&mut interp, "(eval '(1 2))").to_string(), "'(1 2)");
    }

    #[test]
    fn test_try_binds_error() {
        let mut interp = Interpreter::new();
        let result = eval(&mut interp, "(try (throw \"boom\") e (cat \"caught: \" e))");
        assert_eq!(result, Value::string("caught: boom"));
        assert_eq!(interp.env().depth(), 0);
        assert_eq!(eval(&mut interp, "(try 1 e 2)"), Value::Integer(1));
        assert_eq!(eval(&mut interp, "(try (undefined) e (type e))"), Value::string("Error"));
    }

    #[test]
    fn test_rethrow_keeps_message() {
        let mut interp = Interpreter::new();
        let err = interp.eval_source("(try (throw \"inner\") e (throw e))").unwrap_err();
        assert_eq!(err.message(), "inner");
    }

    #[test]
    fn test_introspection() {
        let mut interp = Interpreter::new();
        assert_eq!(eval(&mut interp, "(type 1.5)"), Value::string("Double"));
        assert_eq!(eval(&mut interp, "(bound 'add)"), Value::True);
        assert_eq!(eval(&mut interp, "(bound \"nothing\")"), Value::Nil);
        let help = eval(&mut interp, "(help \"setq\")");
        assert!(help.text().starts_with("(setq name|path value)"));
    }

    #[test]
    fn test_apply() {
        let mut interp = Interpreter::new();
        assert_eq!(eval(&mut interp, "(apply add '(1 2 3))"), Value::Integer(6));
        assert_eq!(eval(&mut interp, "(apply (lambda () (a b) (cat a b)) (list \"x\" \"y\"))"), Value::string("xy"));
    }
}

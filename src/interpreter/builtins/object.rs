//! Struct built-in functions and indexed access.

use crate::value::{ParamKind, StructMap, Value};

use super::super::error::LispError;
use super::super::evaluator::Interpreter;

use ParamKind::{Any, Rest};

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_checked("struct", &[Rest], builtin_struct, "(struct key value ...) -> new struct from key/value pairs");
    interp.define_checked("keys", &[ParamKind::Struct], builtin_keys, "(keys struct) -> list of the struct's keys in order");
    interp.define_checked("@", &[Any, Any], builtin_at, "(@ struct|list key|index) -> item at key|index of struct|list");
    interp.define_checked(
        "set@",
        &[Any, Any, Any],
        builtin_set_at,
        "(set@ struct|list key|index value) -> the struct|list after writing value at key|index",
    );
}

fn struct_key(key: &Value) -> Result<String, LispError> {
    match key {
        Value::String(s) | Value::Symbol(s) => Ok(s.to_string()),
        Value::Integer(n) => Ok(n.to_string()),
        other => Err(LispError::new(format!("invalid key [{}]", other))),
    }
}

fn list_index(index: &Value, len: usize) -> Result<usize, LispError> {
    match index {
        Value::Integer(n) if *n >= 0 && (*n as u64) < len as u64 => Ok(*n as usize),
        Value::Integer(n) => Err(LispError::new(format!("index out of range [{}]", n))),
        other => Err(LispError::type_mismatch(ParamKind::Integer, other)),
    }
}

fn builtin_struct(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    if args.len() % 2 == 1 {
        return Err(LispError::new("insufficient arguments"));
    }
    let mut fields = StructMap::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        fields.insert(struct_key(&pair[0])?, pair[1].clone());
    }
    Ok(Value::new_struct(fields))
}

fn builtin_keys(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let keys = match &args[0] {
        Value::Struct(fields) => fields.borrow().keys().map(Value::string).collect(),
        other => return Err(LispError::type_mismatch(ParamKind::Struct, other)),
    };
    Ok(Value::list(keys))
}

fn builtin_at(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Struct(fields) => {
            let key = struct_key(&args[1])?;
            Ok(fields.borrow().get(&key).cloned().unwrap_or(Value::Nil))
        }
        Value::List(items) => {
            let items = items.borrow();
            Ok(items[list_index(&args[1], items.len())?].clone())
        }
        Value::Nil => list_index(&args[1], 0).map(|_| Value::Nil),
        other => Err(LispError::new(format!("struct or list expected [{}]", other))),
    }
}

fn builtin_set_at(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let value = args[2].clone();
    match &args[0] {
        Value::Struct(fields) => {
            let key = struct_key(&args[1])?;
            fields.borrow_mut().insert(key, value);
        }
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let index = list_index(&args[1], items.len())?;
            items[index] = value;
        }
        other => return Err(LispError::new(format!("struct or list expected [{}]", other))),
    }
    Ok(args[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(interp: &mut Interpreter, source: &str) -> Value {
        interp.eval_source(source).unwrap_or_else(|e| panic!("{} failed: {}", source, e))
    }

    #[test]
    fn test_struct_from_pairs() {
        let mut interp = Interpreter::new();
        assert_eq!(eval(&mut interp, "(struct \"a\" 1 'b (add 1 1))").to_string(), "{a: 1 b: 2}");
        let err = interp.eval_source("(struct \"a\")").unwrap_err();
        assert_eq!(err.message(), "insufficient arguments");
    }

    #[test]
    fn test_keys_in_insertion_order() {
        let mut interp = Interpreter::new();
        assert_eq!(eval(&mut interp, "(keys {z: 1 a: 2})").to_string(), "'(\"z\" \"a\")");
        assert_eq!(eval(&mut interp, "(keys {})"), Value::Nil);
    }

    #[test]
    fn test_at_reads_lists_and_structs() {
        let mut interp = Interpreter::new();
        assert_eq!(eval(&mut interp, "(@ '(10 20 30) 1)"), Value::Integer(20));
        assert_eq!(eval(&mut interp, "(@ {a: 5} \"a\")"), Value::Integer(5));
        assert_eq!(eval(&mut interp, "(@ {a: 5} \"b\")"), Value::Nil);
        let err = interp.eval_source("(@ '(1) 3)").unwrap_err();
        assert_eq!(err.message(), "index out of range [3]");
        let err = interp.eval_source("(@ 1 0)").unwrap_err();
        assert_eq!(err.message(), "struct or list expected [1]");
    }

    #[test]
    fn test_set_at_mutates_in_place() {
        let mut interp = Interpreter::new();
        eval(&mut interp, "(setq s {a: 1})");
        eval(&mut interp, "(set@ s \"b\" 2)");
        assert_eq!(eval(&mut interp, "s").to_string(), "{a: 1 b: 2}");
        eval(&mut interp, "(setq xs (list 1 2))");
        assert_eq!(eval(&mut interp, "(set@ xs 0 9)").to_string(), "'(9 2)");
        assert_eq!(eval(&mut interp, "xs").to_string(), "'(9 2)");
    }
}

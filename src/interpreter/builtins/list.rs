//! List built-in functions.

use crate::value::{ParamKind, Value};

use super::super::error::LispError;
use super::super::evaluator::Interpreter;

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_checked("list", &[ParamKind::Rest], builtin_list, "(list value ...) -> new list of the values, Nil when empty");
    interp.define_checked("count", &[ParamKind::Any], builtin_count, "(count string|list|struct) -> number of characters, items or keys");
    interp.define_checked(
        "append",
        &[ParamKind::Any, ParamKind::Rest],
        builtin_append,
        "(append list value ...) -> new list with the values added at the end",
    );
}

fn builtin_list(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::list(args.to_vec()))
}

fn builtin_count(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let count = match &args[0] {
        Value::Nil => 0,
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Struct(fields) => fields.borrow().len(),
        other => return Err(LispError::type_mismatch(ParamKind::List, other)),
    };
    Ok(Value::Integer(count as i64))
}

fn builtin_append(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let mut items = match &args[0] {
        Value::Nil => Vec::new(),
        Value::List(items) => items.borrow().clone(),
        other => return Err(LispError::type_mismatch(ParamKind::List, other)),
    };
    items.extend_from_slice(&args[1..]);
    Ok(Value::list(items))
}

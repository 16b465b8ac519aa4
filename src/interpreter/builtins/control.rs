//! Special forms: conditionals, blocks, jumps, loops and lambda.

use crate::value::{Closure, ParamKind, Value};
use indexmap::IndexMap;
use std::rc::Rc;

use super::super::control_flow::{run_body, run_iteration, target_name, ControlFlow};
use super::super::environment::Frame;
use super::super::error::LispError;
use super::super::evaluator::Interpreter;

use ParamKind::{Any, Integer, RestUnevaluated, Unevaluated};

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_primitive("if", builtin_if, "(if condition then [else]) -> value of the chosen branch");
    interp.define_checked(
        "block",
        &[Any, RestUnevaluated],
        builtin_block,
        "(block locals form ...) -> value of the last form; locals is a struct, a list of names or Nil",
    );
    interp.define_primitive("label", builtin_label, "(label name) -> marks a goto target in a block or loop body");
    interp.define_primitive("goto", builtin_goto, "(goto name) -> continues after the named label");
    interp.define_primitive("return", builtin_return, "(return [value]) -> leaves the enclosing block, loop or lambda");
    interp.define_primitive("break", builtin_break, "(break [value]) -> leaves the enclosing block or loop");
    interp.define_checked(
        "while",
        &[Unevaluated, RestUnevaluated],
        builtin_while,
        "(while condition form ...) -> repeats the body while condition holds",
    );
    interp.define_checked(
        "until",
        &[Unevaluated, RestUnevaluated],
        builtin_until,
        "(until condition form ...) -> repeats the body until condition holds",
    );
    interp.define_checked(
        "do",
        &[Unevaluated, RestUnevaluated],
        builtin_do,
        "(do condition form ...) -> runs the body, then repeats while condition holds",
    );
    interp.define_checked("loop", &[RestUnevaluated], builtin_loop, "(loop form ...) -> repeats the body until return");
    interp.define_checked(
        "for",
        &[Unevaluated, Integer, Integer, RestUnevaluated],
        builtin_for,
        "(for var from to form ...) -> runs the body with var bound over [from, to)",
    );
    interp.define_checked(
        "lambda",
        &[Unevaluated, Unevaluated, Unevaluated],
        builtin_lambda,
        "(lambda (captured ...) (param ...) body) -> closure",
    );
}

fn builtin_if(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    if args.len() < 2 {
        return Err(LispError::new("then expression expected"));
    }
    if let Some(extra) = args.get(3) {
        return Err(LispError::too_many_arguments(extra));
    }
    let condition = eval_form!(interp, &args[0]);
    if condition.is_truthy() {
        interp.evaluate(&args[1])
    } else if let Some(otherwise) = args.get(2) {
        interp.evaluate(otherwise)
    } else {
        Ok(Value::Nil)
    }
}

fn local_name(value: &Value) -> Result<String, LispError> {
    match value {
        Value::Symbol(name) | Value::String(name) if !name.contains('.') => Ok(name.to_string()),
        other => Err(LispError::new(format!("invalid local name [{}]", other))),
    }
}

fn builtin_block(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let frame: Frame = match &args[0] {
        Value::Struct(fields) => fields.borrow().iter().map(|(name, value)| (name.clone(), value.clone())).collect(),
        Value::List(names) => names
            .borrow()
            .iter()
            .map(|name| local_name(name).map(|name| (name, Value::Nil)))
            .collect::<Result<_, _>>()?,
        Value::Nil => Frame::new(),
        other => return Err(LispError::type_mismatch(ParamKind::Struct, other)),
    };
    let _frame = interp.env().scope(frame);
    Ok(run_body(interp, &args[1..])?.into_value())
}

fn builtin_label(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    require_args!(args, 1, "label");
    if let Some(extra) = args.get(1) {
        return Err(LispError::too_many_arguments(extra));
    }
    Ok(Value::Label(target_name(&args[0])?))
}

fn builtin_goto(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    require_args!(args, 1, "goto");
    if let Some(extra) = args.get(1) {
        return Err(LispError::too_many_arguments(extra));
    }
    Ok(Value::Goto(target_name(&args[0])?))
}

fn builtin_return(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    match args {
        [] => Ok(Value::Return(Box::new(Value::Nil))),
        [form] => {
            let value = eval_form!(interp, form);
            Ok(Value::Return(Box::new(value)))
        }
        [_, extra, ..] => Err(LispError::too_many_arguments(extra)),
    }
}

fn builtin_break(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    match args {
        [] => Ok(Value::Break(Box::new(Value::Nil))),
        [form] => {
            let value = eval_form!(interp, form);
            Ok(Value::Break(Box::new(value)))
        }
        [_, extra, ..] => Err(LispError::too_many_arguments(extra)),
    }
}

/// Pre-test loop shared by `while` (`expect` true) and `until` (`expect` false).
fn conditional_loop(interp: &mut Interpreter, condition: &Value, body: &[Value], expect: bool) -> Result<Value, LispError> {
    let mut result = Value::Nil;
    loop {
        let test = eval_form!(interp, condition);
        if test.is_truthy() != expect {
            return Ok(result);
        }
        match run_iteration(interp, Frame::new(), body)? {
            ControlFlow::Next(value) => result = value,
            ControlFlow::Return(value) | ControlFlow::Break(value) => return Ok(value),
            ControlFlow::Goto(target) => return Ok(Value::Goto(target)),
        }
    }
}

fn builtin_while(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    conditional_loop(interp, &args[0], &args[1..], true)
}

fn builtin_until(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    conditional_loop(interp, &args[0], &args[1..], false)
}

fn builtin_do(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let (condition, body) = (&args[0], &args[1..]);
    loop {
        let result = match run_iteration(interp, Frame::new(), body)? {
            ControlFlow::Next(value) => value,
            ControlFlow::Return(value) | ControlFlow::Break(value) => return Ok(value),
            ControlFlow::Goto(target) => return Ok(Value::Goto(target)),
        };
        let test = eval_form!(interp, condition);
        if !test.is_truthy() {
            return Ok(result);
        }
    }
}

fn builtin_loop(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    if args.is_empty() {
        return Err(LispError::new("loop body expected"));
    }
    loop {
        match run_iteration(interp, Frame::new(), args)? {
            ControlFlow::Next(_) => {}
            ControlFlow::Return(value) | ControlFlow::Break(value) => return Ok(value),
            ControlFlow::Goto(target) => return Ok(Value::Goto(target)),
        }
    }
}

fn builtin_for(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let var = match &args[0] {
        Value::Symbol(_) => local_name(&args[0])?,
        other => return Err(LispError::type_mismatch(ParamKind::Symbol, other)),
    };
    let (Value::Integer(from), Value::Integer(to)) = (&args[1], &args[2]) else {
        return Err(LispError::type_mismatch(ParamKind::Integer, &args[1]));
    };
    let mut result = Value::Nil;
    for i in *from..*to {
        let mut frame = Frame::new();
        frame.insert(var.clone(), Value::Integer(i));
        match run_iteration(interp, frame, &args[3..])? {
            ControlFlow::Next(value) => result = value,
            ControlFlow::Return(value) | ControlFlow::Break(value) => return Ok(value),
            ControlFlow::Goto(target) => return Ok(Value::Goto(target)),
        }
    }
    Ok(result)
}

/// Names from a capture or parameter list: `()`, `(a b)` or `'(a b)`.
fn name_list(form: &Value) -> Result<Vec<Rc<str>>, LispError> {
    let names: Vec<Value> = match form {
        Value::Nil => Vec::new(),
        Value::Expression(items) => items.to_vec(),
        Value::List(items) => items.borrow().clone(),
        other => return Err(LispError::new(format!("parameter list expected [{}]", other))),
    };
    names.iter().map(|name| local_name(name).map(|name| Rc::from(name.as_str()))).collect()
}

fn builtin_lambda(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let mut captured = IndexMap::new();
    for name in name_list(&args[0])? {
        captured.insert(name.to_string(), interp.resolve(&name)?);
    }
    let params = name_list(&args[1])?;
    Ok(Value::Closure(Rc::new(Closure { captured, params, body: args[2].clone() })))
}

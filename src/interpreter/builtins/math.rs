//! Arithmetic, comparison, logic and numeric coercion.

use crate::value::{ParamKind, Value};
use std::cmp::Ordering;

use super::super::error::LispError;
use super::super::evaluator::Interpreter;

use ParamKind::{Any, Integer, Number as NumberKind, Rest};

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_checked("add", &[Rest], builtin_add, "(add n ...) -> sum, Double if any operand is Double");
    interp.define_checked("subtract", &[NumberKind, Rest], builtin_subtract, "(subtract n m ...) -> difference, (subtract n) negates");
    interp.define_checked("multiply", &[Rest], builtin_multiply, "(multiply n ...) -> product");
    interp.define_checked("divide", &[NumberKind, NumberKind, Rest], builtin_divide, "(divide n m ...) -> quotient, integer division when all operands are Integer");
    interp.define_checked("modulo", &[Integer, Integer], builtin_modulo, "(modulo n m) -> remainder");
    interp.define_checked("lt", &[Any, Any], builtin_lt, "(lt a b) -> True when a < b");
    interp.define_checked("gt", &[Any, Any], builtin_gt, "(gt a b) -> True when a > b");
    interp.define_checked("leq", &[Any, Any], builtin_leq, "(leq a b) -> True when a <= b");
    interp.define_checked("geq", &[Any, Any], builtin_geq, "(geq a b) -> True when a >= b");
    interp.define_checked("eq", &[Any, Any], builtin_eq, "(eq a b) -> True when a equals b");
    interp.define_checked("neq", &[Any, Any], builtin_neq, "(neq a b) -> True when a differs from b");
    interp.define_checked("not", &[Any], builtin_not, "(not value) -> True when value is Nil");
    interp.define_primitive("and", builtin_and, "(and form ...) -> Nil at the first Nil, else the last value");
    interp.define_primitive("or", builtin_or, "(or form ...) -> first non-Nil value, else Nil");
    interp.define_checked("int", &[Any], builtin_int, "(int value) -> Integer from a number or numeric string, else Nil");
    interp.define_checked("double", &[Any], builtin_double, "(double value) -> Double from a number or numeric string, else Nil");

    for (alias, target) in [("+", "add"), ("-", "subtract"), ("*", "multiply"), ("/", "divide")] {
        interp.define_alias(alias, target);
    }
    for (alias, target) in [("<", "lt"), (">", "gt"), ("<=", "leq"), (">=", "geq")] {
        interp.define_alias(alias, target);
    }
}

/// Numeric operand with Integer arithmetic kept exact until a Double appears.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_value(value: &Value) -> Result<Self, LispError> {
        match value {
            Value::Integer(n) => Ok(Number::Int(*n)),
            Value::Double(d) => Ok(Number::Float(*d)),
            other => Err(LispError::type_mismatch(NumberKind, other)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(d) => d,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(n) => Value::Integer(n),
            Number::Float(d) => Value::Double(d),
        }
    }

    fn combine(
        self,
        other: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Number, LispError> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => int_op(a, b)
                .map(Number::Int)
                .ok_or_else(|| LispError::new(format!("integer overflow [{} {}]", a, b))),
            (a, b) => Ok(Number::Float(float_op(a.as_f64(), b.as_f64()))),
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(d) => d == 0.0,
        }
    }
}

fn fold_numbers(
    args: &[Value],
    initial: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, LispError> {
    let mut total = initial;
    for arg in args {
        total = total.combine(Number::from_value(arg)?, int_op, float_op)?;
    }
    Ok(total.into_value())
}

fn builtin_add(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    fold_numbers(args, Number::Int(0), i64::checked_add, |a, b| a + b)
}

fn builtin_multiply(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    fold_numbers(args, Number::Int(1), i64::checked_mul, |a, b| a * b)
}

fn builtin_subtract(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let first = Number::from_value(&args[0])?;
    if args.len() == 1 {
        return Ok(Number::Int(0).combine(first, i64::checked_sub, |a, b| a - b)?.into_value());
    }
    fold_numbers(&args[1..], first, i64::checked_sub, |a, b| a - b)
}

fn builtin_divide(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let mut total = Number::from_value(&args[0])?;
    for arg in &args[1..] {
        let divisor = Number::from_value(arg)?;
        if divisor.is_zero() {
            return Err(LispError::new("division by zero"));
        }
        total = total.combine(divisor, i64::checked_div, |a, b| a / b)?;
    }
    Ok(total.into_value())
}

fn builtin_modulo(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let (Value::Integer(a), Value::Integer(b)) = (&args[0], &args[1]) else {
        return Err(LispError::type_mismatch(Integer, &args[0]));
    };
    if *b == 0 {
        return Err(LispError::new("division by zero"));
    }
    a.checked_rem(*b)
        .map(Value::Integer)
        .ok_or_else(|| LispError::new(format!("integer overflow [{} {}]", a, b)))
}

/// Numbers compare numerically across Integer/Double, strings
/// lexicographically; anything else is not ordered.
fn compare(a: &Value, b: &Value) -> Result<Ordering, LispError> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => {
            let x = a.as_f64().ok_or_else(|| LispError::type_mismatch(NumberKind, a))?;
            let y = b.as_f64().ok_or_else(|| LispError::type_mismatch(NumberKind, b))?;
            x.partial_cmp(&y)
                .ok_or_else(|| LispError::new(format!("values are not comparable [{} {}]", a, b)))
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(_), Value::Double(_)) | (Value::Double(_), Value::Integer(_)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

fn builtin_lt(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::from_bool(compare(&args[0], &args[1])? == Ordering::Less))
}

fn builtin_gt(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::from_bool(compare(&args[0], &args[1])? == Ordering::Greater))
}

fn builtin_leq(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::from_bool(compare(&args[0], &args[1])? != Ordering::Greater))
}

fn builtin_geq(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::from_bool(compare(&args[0], &args[1])? != Ordering::Less))
}

fn builtin_eq(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::from_bool(values_equal(&args[0], &args[1])))
}

fn builtin_neq(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::from_bool(!values_equal(&args[0], &args[1])))
}

fn builtin_not(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::from_bool(args[0].is_nil()))
}

fn builtin_and(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let mut result = Value::True;
    for form in args {
        result = eval_form!(interp, form);
        if result.is_nil() {
            return Ok(Value::Nil);
        }
    }
    Ok(result)
}

fn builtin_or(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    for form in args {
        let value = eval_form!(interp, form);
        if value.is_truthy() {
            return Ok(value);
        }
    }
    Ok(Value::Nil)
}

fn builtin_int(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(match &args[0] {
        Value::Integer(n) => Value::Integer(*n),
        Value::Double(d) if d.is_finite() => Value::Integer(d.trunc() as i64),
        Value::String(s) => {
            let text = s.trim();
            match text.parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => text
                    .parse::<f64>()
                    .ok()
                    .filter(|d| d.is_finite())
                    .map_or(Value::Nil, |d| Value::Integer(d.trunc() as i64)),
            }
        }
        _ => Value::Nil,
    })
}

fn builtin_double(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    Ok(match &args[0] {
        Value::Integer(n) => Value::Double(*n as f64),
        Value::Double(d) => Value::Double(*d),
        Value::String(s) => s.trim().parse::<f64>().map_or(Value::Nil, Value::Double),
        _ => Value::Nil,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> Value {
        Interpreter::new().eval_source(source).unwrap_or_else(|e| panic!("{} failed: {}", source, e))
    }

    fn eval_err(source: &str) -> String {
        Interpreter::new().eval_source(source).unwrap_err().message().to_string()
    }

    #[test]
    fn test_add_promotes_to_double() {
        assert_eq!(eval("(add 1 2 3)"), Value::Integer(6));
        assert_eq!(eval("(add 1 2.5)"), Value::Double(3.5));
        assert_eq!(eval("(add)"), Value::Integer(0));
        assert_eq!(eval("(+ 1 1)"), Value::Integer(2));
    }

    #[test]
    fn test_add_rejects_non_numbers() {
        assert!(eval_err("(add 1 \"2\")").starts_with("Number expected"));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(eval_err("(add 9223372036854775807 1)").starts_with("integer overflow"));
    }

    #[test]
    fn test_subtract_and_negate() {
        assert_eq!(eval("(subtract 10 3 2)"), Value::Integer(5));
        assert_eq!(eval("(- 4)"), Value::Integer(-4));
        assert_eq!(eval("(- 1.5 0.5)"), Value::Double(1.0));
    }

    #[test]
    fn test_divide() {
        assert_eq!(eval("(divide 7 2)"), Value::Integer(3));
        assert_eq!(eval("(/ 7.0 2)"), Value::Double(3.5));
        assert_eq!(eval_err("(divide 1 0)"), "division by zero");
        assert_eq!(eval("(modulo 7 3)"), Value::Integer(1));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("(lt 1 2)"), Value::True);
        assert_eq!(eval("(< 2 1.5)"), Value::Nil);
        assert_eq!(eval("(geq 2 2.0)"), Value::True);
        assert_eq!(eval("(lt \"abc\" \"abd\")"), Value::True);
        assert!(eval_err("(lt 1 \"a\")").starts_with("Number expected"));
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval("(eq 2 2.0)"), Value::True);
        assert_eq!(eval("(eq '(1 2) '(1 2))"), Value::True);
        assert_eq!(eval("(neq \"a\" \"b\")"), Value::True);
        assert_eq!(eval("(not Nil)"), Value::True);
        assert_eq!(eval("(not 0)"), Value::Nil);
    }

    #[test]
    fn test_and_or_short_circuit() {
        assert_eq!(eval("(and 1 Nil (undefined))"), Value::Nil);
        assert_eq!(eval("(and 1 2)"), Value::Integer(2));
        assert_eq!(eval("(or Nil 3 (undefined))"), Value::Integer(3));
        assert_eq!(eval("(or Nil Nil)"), Value::Nil);
    }

    #[test]
    fn test_coercions() {
        assert_eq!(eval("(int 3.9)"), Value::Integer(3));
        assert_eq!(eval("(int \"42\")"), Value::Integer(42));
        assert_eq!(eval("(int \"forty\")"), Value::Nil);
        assert_eq!(eval("(double 2)"), Value::Double(2.0));
        assert_eq!(eval("(double \"0.5\")"), Value::Double(0.5));
        assert_eq!(eval("(double '(1))"), Value::Nil);
    }
}

//! String built-in functions.

use crate::value::{ParamKind, Value};

use super::super::error::LispError;
use super::super::evaluator::Interpreter;

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_checked("cat", &[ParamKind::Rest], builtin_cat, "(cat value ...) -> string concatenation of the values' texts");
}

fn builtin_cat(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let joined: String = args.iter().map(Value::text).collect();
    Ok(Value::string(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cat_uses_text_of_each_value() {
        let mut interp = Interpreter::new();
        let result = interp.eval_source("(cat \"n=\" 1 \" \" 2.5 \" \" '(a \"b\") Nil)").unwrap();
        assert_eq!(result, Value::string("n=1 2.5 '(\"a\" \"b\")Nil"));
    }

    #[test]
    fn test_cat_without_arguments() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_source("(cat)").unwrap(), Value::string(""));
    }
}

//! Built-in primitives registered into the global environment.
//!
//! Primitives are organized into categories:
//! - **Control**: if, block, label, goto, return, break, loops, lambda
//! - **Math**: arithmetic, comparison, logic and numeric coercion
//! - **String**: concatenation
//! - **List**: list construction and length
//! - **Object**: structs and indexed access into structs and lists
//! - **IO**: print and read through the interpreter's console
//! - **Misc**: assignment, eval, errors, help and introspection

use super::evaluator::Interpreter;

/// Evaluate a form inside a primitive. Return/Break/Goto leave the primitive
/// at once as its result; a Label is an error.
macro_rules! eval_form {
    ($interp:expr, $form:expr) => {{
        let value = $interp.evaluate($form)?;
        if value.is_signal() {
            return $interp.escalate(value);
        }
        value
    }};
}

/// Arity check for primitives that bind their own arguments.
macro_rules! require_args {
    ($args:expr, $n:expr, $name:expr) => {
        if $args.len() < $n {
            return Err($crate::interpreter::LispError::too_few_arguments($name));
        }
    };
}

mod control;
pub mod io;
mod list;
mod math;
mod misc;
mod object;
mod string;

pub fn register_all(interp: &mut Interpreter) {
    control::register(interp);
    math::register(interp);
    string::register(interp);
    list::register(interp);
    object::register(interp);
    io::register(interp);
    misc::register(interp);
}

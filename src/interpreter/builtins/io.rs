//! Input/output built-in functions and the console they talk to.

use crate::value::{ParamKind, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use super::super::error::LispError;
use super::super::evaluator::Interpreter;

/// Where `print` writes and `read` reads.
pub trait Console {
    fn write_line(&mut self, text: &str);
    /// One line without its terminator, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Process stdout and stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", text).ok();
        out.flush().ok();
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if !prompt.is_empty() {
            print!("{}", prompt);
            io::stdout().flush().ok();
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }
}

/// In-memory console: queued input lines, shared captured output.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    input: VecDeque<String>,
    output: Rc<RefCell<Vec<String>>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { input: lines.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    /// Handle to the captured output that stays valid after the console is
    /// moved into an interpreter.
    pub fn output(&self) -> Rc<RefCell<Vec<String>>> {
        self.output.clone()
    }
}

impl Console for BufferConsole {
    fn write_line(&mut self, text: &str) {
        self.output.borrow_mut().push(text.to_string());
    }

    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.input.pop_front()
    }
}

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_checked("print", &[ParamKind::Rest], builtin_print, "(print value ...) -> True, writes the values separated by spaces");
    interp.define_checked("read", &[ParamKind::Rest], builtin_read, "(read [prompt]) -> next input line as a string, Nil at end of input");
}

fn builtin_print(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    let output: Vec<String> = args.iter().map(Value::text).collect();
    interp.console().write_line(&output.join(" "));
    Ok(Value::True)
}

fn builtin_read(interp: &mut Interpreter, args: &[Value]) -> Result<Value, LispError> {
    if let Some(extra) = args.get(1) {
        return Err(LispError::too_many_arguments(extra));
    }
    let prompt = args.first().map(Value::text).unwrap_or_default();
    Ok(interp.console().read_line(&prompt).map(Value::string).unwrap_or(Value::Nil))
}

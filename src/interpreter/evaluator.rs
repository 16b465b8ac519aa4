use crate::value::{CheckedPrimitive, Closure, NativeFn, ParamKind, Primitive, StructMap, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use super::builtins;
use super::builtins::io::{Console, StdConsole};
use super::environment::Environment;
use super::error::LispError;
use super::parser::{Continuation, NoContinuation, Parser};

/// Nesting limit for expression evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 400;

#[derive(Debug, Clone, Copy)]
pub struct InterpreterConfig {
    pub max_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Arguments after contract binding, or the signal that cut binding short.
enum Bound {
    Args(Vec<Value>),
    Signal(Value),
}

pub struct Interpreter {
    env: Environment,
    help: IndexMap<String, String>,
    console: Box<dyn Console>,
    config: InterpreterConfig,
    depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        let mut interpreter = Self {
            env: Environment::new(),
            help: IndexMap::new(),
            console: Box::new(StdConsole),
            config,
            depth: 0,
        };
        builtins::register_all(&mut interpreter);
        tracing::debug!(globals = interpreter.help.len(), "registered builtins");
        interpreter
    }

    pub fn with_console(mut self, console: Box<dyn Console>) -> Self {
        self.console = console;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn console(&mut self) -> &mut dyn Console {
        self.console.as_mut()
    }

    pub fn help_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.help.iter().map(|(name, text)| (name.as_str(), text.as_str()))
    }

    pub fn define_primitive(&mut self, name: &str, func: NativeFn, help: &str) {
        let primitive = Primitive { name: Rc::from(name), func };
        self.env.define_global(name, Value::Primitive(Rc::new(primitive)));
        self.help.insert(name.to_string(), help.to_string());
    }

    pub fn define_checked(&mut self, name: &str, contract: &[ParamKind], func: NativeFn, help: &str) {
        let primitive = CheckedPrimitive { name: Rc::from(name), contract: contract.to_vec(), func };
        self.env.define_global(name, Value::CheckedPrimitive(Rc::new(primitive)));
        self.help.insert(name.to_string(), help.to_string());
    }

    pub fn define_alias(&mut self, alias: &str, target: &str) {
        if let Some(value) = self.env.get(target) {
            self.env.define_global(alias, value);
        }
    }

    pub fn evaluate(&mut self, value: &Value) -> Result<Value, LispError> {
        value.evaluate(self)
    }

    /// A signal met somewhere that cannot interpret it: Return, Break and Goto
    /// keep travelling outward, a Label is misplaced.
    pub fn escalate(&self, signal: Value) -> Result<Value, LispError> {
        match signal {
            Value::Label(_) => Err(LispError::improper_labels()),
            other => Ok(other),
        }
    }

    /// Evaluate one line of input with no continuation available.
    pub fn eval_source(&mut self, source: &str) -> Result<Value, LispError> {
        self.eval_interactive(source, &mut NoContinuation)
    }

    /// Parse and evaluate every form in `source`, asking `more` for text when
    /// a form is left open. Returns the value of the last form.
    pub fn eval_interactive(&mut self, source: &str, more: &mut dyn Continuation) -> Result<Value, LispError> {
        let forms = Parser::new(source, more).parse_all()?;
        let mut result = Value::Nil;
        for form in &forms {
            result = match self.evaluate(form)? {
                Value::Return(_) => return Err(LispError::stray_return().with_context(form.to_string())),
                Value::Break(_) => return Err(LispError::stray_break().with_context(form.to_string())),
                Value::Goto(target) => return Err(LispError::goto_target_not_found(&target).with_context(form.to_string())),
                Value::Label(_) => return Err(LispError::improper_labels().with_context(form.to_string())),
                value => value,
            };
        }
        Ok(result)
    }

    /// Evaluate forms in order; a signal stops the sequence and is returned.
    pub fn eval_forms(&mut self, forms: &[Value]) -> Result<Value, LispError> {
        let mut result = Value::Nil;
        for form in forms {
            result = self.evaluate(form)?;
            if result.is_signal() {
                return self.escalate(result);
            }
        }
        Ok(result)
    }

    /// Read a dotted path: the first segment through the environment, the rest
    /// through nested structs.
    pub fn resolve(&self, path: &str) -> Result<Value, LispError> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or(path);
        let mut current = self.env.lookup(first)?;
        for segment in segments {
            let next = match &current {
                Value::Struct(fields) => fields
                    .borrow()
                    .get(segment)
                    .cloned()
                    .ok_or_else(|| LispError::key_not_found(segment, path))?,
                other => return Err(LispError::type_mismatch(ParamKind::Struct, other)),
            };
            current = next;
        }
        Ok(current)
    }

    /// Write through a dotted path. A bare name goes through the environment's
    /// `set`; a path writes into the struct named by its prefix.
    pub fn assign(&self, path: &str, value: Value) -> Result<Value, LispError> {
        if path.split('.').any(str::is_empty) {
            return Err(LispError::new(format!("invalid symbol path [{}]", path)));
        }
        match path.rsplit_once('.') {
            None => {
                self.env.set(path, value.clone());
                Ok(value)
            }
            Some((parent, key)) => match self.resolve(parent)? {
                Value::Struct(fields) => {
                    fields.borrow_mut().insert(key.to_string(), value.clone());
                    Ok(value)
                }
                other => Err(LispError::type_mismatch(ParamKind::Struct, &other)),
            },
        }
    }

    /// Invoke `callee` with unevaluated argument forms.
    pub fn call(&mut self, callee: &Value, args: &[Value]) -> Result<Value, LispError> {
        tracing::trace!(%callee, args = args.len(), "call");
        match callee {
            Value::Primitive(primitive) => (primitive.func)(self, args),
            Value::CheckedPrimitive(primitive) => {
                match self.bind_contract(&primitive.name, &primitive.contract, args, true)? {
                    Bound::Args(bound) => (primitive.func)(self, &bound),
                    Bound::Signal(signal) => Ok(signal),
                }
            }
            Value::Closure(closure) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.evaluate(arg)?;
                    if value.is_signal() {
                        return self.escalate(value);
                    }
                    values.push(value);
                }
                self.invoke_closure(closure, values)
            }
            other => Err(LispError::function_expected(other)),
        }
    }

    /// Invoke `callee` with arguments that are already values.
    pub fn apply(&mut self, callee: &Value, values: Vec<Value>) -> Result<Value, LispError> {
        match callee {
            Value::Primitive(primitive) => (primitive.func)(self, &values),
            Value::CheckedPrimitive(primitive) => {
                match self.bind_contract(&primitive.name, &primitive.contract, &values, false)? {
                    Bound::Args(bound) => (primitive.func)(self, &bound),
                    Bound::Signal(signal) => Ok(signal),
                }
            }
            Value::Closure(closure) => self.invoke_closure(closure, values),
            other => Err(LispError::function_expected(other)),
        }
    }

    /// Walk `args` against `contract`, evaluating (when `evaluate` is set) and
    /// type-checking every position not declared unevaluated.
    fn bind_contract(
        &mut self,
        name: &str,
        contract: &[ParamKind],
        args: &[Value],
        evaluate: bool,
    ) -> Result<Bound, LispError> {
        let rest = contract.last().copied().filter(|kind| kind.is_rest());
        let fixed = contract.len() - usize::from(rest.is_some());
        if args.len() < fixed {
            return Err(LispError::too_few_arguments(name));
        }
        if rest.is_none() && args.len() > fixed {
            return Err(LispError::too_many_arguments(&args[fixed]));
        }

        let mut bound = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let kind = if i < fixed { contract[i] } else { rest.unwrap_or(ParamKind::Any) };
            if kind.is_unevaluated() {
                bound.push(arg.clone());
                continue;
            }
            let value = if evaluate { self.evaluate(arg)? } else { arg.clone() };
            if value.is_signal() {
                return self.escalate(value).map(Bound::Signal);
            }
            bound.push(kind.accept(value)?);
        }
        Ok(Bound::Args(bound))
    }

    /// Captured bindings seed a fresh frame, parameters default to Nil and are
    /// overwritten by the supplied arguments. Extra arguments are ignored.
    pub fn invoke_closure(&mut self, closure: &Closure, args: Vec<Value>) -> Result<Value, LispError> {
        let frame = closure.captured.iter().map(|(name, value)| (name.clone(), value.clone())).collect();
        let _frame = self.env.scope(frame);
        let mut args = args.into_iter();
        for param in &closure.params {
            self.env.set_local(param, args.next().unwrap_or(Value::Nil));
        }
        match self.evaluate(&closure.body)? {
            Value::Return(value) => Ok(*value),
            Value::Break(_) => Err(LispError::stray_break()),
            Value::Goto(target) => Err(LispError::goto_target_not_found(&target)),
            Value::Label(_) => Err(LispError::improper_labels()),
            value => Ok(value),
        }
    }

    /// Run one nested evaluation step under the depth limit.
    fn descend(&mut self, step: impl FnOnce(&mut Self) -> Result<Value, LispError>) -> Result<Value, LispError> {
        if self.depth >= self.config.max_depth {
            return Err(LispError::new("maximum evaluation depth exceeded"));
        }
        self.depth += 1;
        let result = step(self);
        self.depth -= 1;
        result
    }

    fn eval_expression(&mut self, forms: &Rc<[Value]>) -> Result<Value, LispError> {
        self.descend(|interp| interp.call_form(forms))
            .map_err(|error| error.with_context(Value::Expression(forms.clone()).to_string()))
    }

    fn call_form(&mut self, forms: &[Value]) -> Result<Value, LispError> {
        let Some((head, args)) = forms.split_first() else {
            return Ok(Value::Nil);
        };
        let callee = self.evaluate(head)?;
        if callee.is_signal() {
            return self.escalate(callee);
        }
        self.call(&callee, args)
    }

    /// Every evaluation of a struct literal yields a fresh struct.
    fn eval_struct(&mut self, fields: &RefCell<StructMap>) -> Result<Value, LispError> {
        let literal: Vec<(String, Value)> =
            fields.borrow().iter().map(|(key, form)| (key.clone(), form.clone())).collect();
        let mut evaluated = StructMap::with_capacity(literal.len());
        for (key, form) in literal {
            let value = self.evaluate(&form)?;
            if value.is_signal() {
                return self.escalate(value);
            }
            evaluated.insert(key, value);
        }
        Ok(Value::new_struct(evaluated))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Value {
    pub fn evaluate(&self, interpreter: &mut Interpreter) -> Result<Value, LispError> {
        match self {
            Value::Nil
            | Value::True
            | Value::Integer(_)
            | Value::Double(_)
            | Value::String(_)
            | Value::Primitive(_)
            | Value::CheckedPrimitive(_)
            | Value::Closure(_)
            | Value::Return(_)
            | Value::Break(_)
            | Value::Goto(_)
            | Value::Label(_)
            | Value::Error(_) => Ok(self.clone()),
            Value::List(items) => Ok(Value::List(Rc::new(RefCell::new(items.borrow().clone())))),
            Value::Struct(fields) => interpreter.descend(|interp| interp.eval_struct(fields)),
            Value::Symbol(path) => interpreter.resolve(path),
            Value::Expression(forms) => interpreter.eval_expression(forms),
        }
    }
}

/// Evaluate `source` in a fresh interpreter.
pub fn parse_and_run(source: &str) -> Result<Value, LispError> {
    Interpreter::new().eval_source(source)
}

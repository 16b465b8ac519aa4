use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::interpreter::{Interpreter, LispError};

/// Native implementation behind a primitive. Receives the interpreter and the
/// argument list: raw subforms for plain primitives, contract-bound values for
/// checked ones.
pub type NativeFn = fn(&mut Interpreter, &[Value]) -> Result<Value, LispError>;

pub type StructMap = IndexMap<String, Value>;

/// One value variant doubles as parse node and runtime value.
#[derive(Clone)]
pub enum Value {
    Nil,
    True,
    Integer(i64),
    Double(f64),
    String(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Struct(Rc<RefCell<StructMap>>),
    Symbol(Rc<str>),
    Expression(Rc<[Value]>),
    Primitive(Rc<Primitive>),
    CheckedPrimitive(Rc<CheckedPrimitive>),
    Closure(Rc<Closure>),
    Return(Box<Value>),
    Break(Box<Value>),
    Goto(Rc<str>),
    Label(Rc<str>),
    Error(Rc<LispError>),
}

pub struct Primitive {
    pub name: Rc<str>,
    pub func: NativeFn,
}

pub struct CheckedPrimitive {
    pub name: Rc<str>,
    pub contract: Vec<ParamKind>,
    pub func: NativeFn,
}

pub struct Closure {
    pub captured: IndexMap<String, Value>,
    pub params: Vec<Rc<str>>,
    pub body: Value,
}

/// Parameter kinds a checked primitive may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Function,
    Integer,
    Double,
    List,
    Number,
    Expression,
    Symbol,
    String,
    Unevaluated,
    Any,
    Struct,
    Rest,
    RestUnevaluated,
}

impl ParamKind {
    pub fn is_rest(self) -> bool {
        matches!(self, ParamKind::Rest | ParamKind::RestUnevaluated)
    }

    pub fn is_unevaluated(self) -> bool {
        matches!(self, ParamKind::Unevaluated | ParamKind::RestUnevaluated)
    }

    /// Type-check an already evaluated argument, converting where the kind allows it.
    pub fn accept(self, value: Value) -> Result<Value, LispError> {
        let ok = match (self, &value) {
            (ParamKind::Any | ParamKind::Rest | ParamKind::Unevaluated | ParamKind::RestUnevaluated, _) => true,
            (ParamKind::Function, v) => v.is_callable(),
            (ParamKind::Integer, Value::Integer(_)) => true,
            (ParamKind::Double, Value::Double(_)) => true,
            (ParamKind::Number, Value::Integer(_) | Value::Double(_)) => true,
            (ParamKind::List, Value::List(_) | Value::Nil) => true,
            (ParamKind::Expression, Value::Expression(_)) => true,
            (ParamKind::Symbol, Value::Symbol(_)) => true,
            (ParamKind::Symbol, Value::String(name)) => {
                return Ok(Value::Symbol(name.clone()));
            }
            (ParamKind::String, Value::String(_)) => true,
            (ParamKind::Struct, Value::Struct(_)) => true,
            _ => false,
        };
        if ok {
            Ok(value)
        } else {
            Err(LispError::type_mismatch(self, &value))
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Function => "Function",
            ParamKind::Integer => "Integer",
            ParamKind::Double => "Double",
            ParamKind::List => "List",
            ParamKind::Number => "Number",
            ParamKind::Expression => "Expression",
            ParamKind::Symbol => "Symbol",
            ParamKind::String => "String",
            ParamKind::Unevaluated => "Unevaluated",
            ParamKind::Any => "Any",
            ParamKind::Struct => "Struct",
            ParamKind::Rest => "Rest",
            ParamKind::RestUnevaluated => "RestUnevaluated",
        };
        f.write_str(name)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Vec::new())
    }
}

/// Structural equality. A pair of containers already being compared counts as
/// equal, so self-containing values terminate.
fn values_equal(left: &Value, right: &Value, active: &mut Vec<(*const (), *const ())>) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::True, Value::True) => true,
        (Value::Integer(left), Value::Integer(right)) => left == right,
        (Value::Double(left), Value::Double(right)) => left == right,
        (Value::String(left), Value::String(right)) => left == right,
        (Value::List(left), Value::List(right)) => {
            let pair = (Rc::as_ptr(left) as *const (), Rc::as_ptr(right) as *const ());
            if Rc::ptr_eq(left, right) || active.contains(&pair) {
                return true;
            }
            active.push(pair);
            let (left, right) = (left.borrow(), right.borrow());
            let equal = left.len() == right.len()
                && left.iter().zip(right.iter()).all(|(l, r)| values_equal(l, r, active));
            active.pop();
            equal
        }
        (Value::Struct(left), Value::Struct(right)) => {
            let pair = (Rc::as_ptr(left) as *const (), Rc::as_ptr(right) as *const ());
            if Rc::ptr_eq(left, right) || active.contains(&pair) {
                return true;
            }
            active.push(pair);
            let (left, right) = (left.borrow(), right.borrow());
            let equal = left.len() == right.len()
                && left.iter().all(|(key, lv)| right.get(key).is_some_and(|rv| values_equal(lv, rv, active)));
            active.pop();
            equal
        }
        (Value::Symbol(left), Value::Symbol(right)) => left == right,
        (Value::Expression(left), Value::Expression(right)) => {
            left.len() == right.len() && left.iter().zip(right.iter()).all(|(l, r)| values_equal(l, r, active))
        }
        (Value::Primitive(left), Value::Primitive(right)) => Rc::ptr_eq(left, right),
        (Value::CheckedPrimitive(left), Value::CheckedPrimitive(right)) => Rc::ptr_eq(left, right),
        (Value::Closure(left), Value::Closure(right)) => Rc::ptr_eq(left, right),
        (Value::Return(left), Value::Return(right)) | (Value::Break(left), Value::Break(right)) => {
            values_equal(left, right, active)
        }
        (Value::Goto(left), Value::Goto(right)) => left == right,
        (Value::Label(left), Value::Label(right)) => left == right,
        (Value::Error(left), Value::Error(right)) => left == right,
        _ => false,
    }
}

impl Value {
    pub fn string(text: impl AsRef<str>) -> Self {
        Value::String(Rc::from(text.as_ref()))
    }

    pub fn symbol(name: impl AsRef<str>) -> Self {
        Value::Symbol(Rc::from(name.as_ref()))
    }

    /// Lists are never empty: an empty sequence is Nil.
    pub fn list(items: Vec<Value>) -> Self {
        if items.is_empty() {
            Value::Nil
        } else {
            Value::List(Rc::new(RefCell::new(items)))
        }
    }

    pub fn new_struct(fields: StructMap) -> Self {
        Value::Struct(Rc::new(RefCell::new(fields)))
    }

    pub fn expression(items: Vec<Value>) -> Self {
        Value::Expression(Rc::from(items))
    }

    pub fn from_bool(flag: bool) -> Self {
        if flag {
            Value::True
        } else {
            Value::Nil
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    /// Return, Break, Goto and Label are control signals rather than inert data.
    pub fn is_signal(&self) -> bool {
        matches!(self, Value::Return(_) | Value::Break(_) | Value::Goto(_) | Value::Label(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Primitive(_) | Value::CheckedPrimitive(_) | Value::Closure(_))
    }

    pub fn as_struct(&self) -> Option<Ref<'_, StructMap>> {
        if let Value::Struct(fields) = self {
            Some(fields.borrow())
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<Ref<'_, Vec<Value>>> {
        if let Value::List(items) = self {
            Some(items.borrow())
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::True => "True",
            Value::Integer(_) => "Integer",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Struct(_) => "Struct",
            Value::Symbol(_) => "Symbol",
            Value::Expression(_) => "Expression",
            Value::Primitive(_) => "Primitive",
            Value::CheckedPrimitive(_) => "CheckedPrimitive",
            Value::Closure(_) => "Closure",
            Value::Return(_) => "Return",
            Value::Break(_) => "Break",
            Value::Goto(_) => "Goto",
            Value::Label(_) => "Label",
            Value::Error(_) => "Error",
        }
    }

    /// Text used when a value is spliced into a string: Strings contribute
    /// their contents, everything else its canonical text.
    pub fn text(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_double(f: &mut fmt::Formatter<'_>, d: f64) -> fmt::Result {
    let formatted = d.to_string();
    if d.is_finite() && !formatted.contains('.') {
        write!(f, "{}.0", formatted)
    } else {
        f.write_str(&formatted)
    }
}

/// Containers on the path currently being written.
type Active = Vec<*const ()>;

/// Enter a container unless it is already being written further out.
fn enter<T>(active: &mut Active, container: &Rc<T>) -> bool {
    let ptr = Rc::as_ptr(container) as *const ();
    if active.contains(&ptr) {
        return false;
    }
    active.push(ptr);
    true
}

fn write_separated<'v>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'v Value>,
    active: &mut Active,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write_value(f, item, active)?;
    }
    Ok(())
}

/// Items of a literal list: nested lists drop their apostrophe.
fn write_list_items(f: &mut fmt::Formatter<'_>, items: &[Value], active: &mut Active) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        match item {
            Value::List(inner) if enter(active, inner) => {
                f.write_str("(")?;
                write_list_items(f, &inner.borrow(), active)?;
                f.write_str(")")?;
                active.pop();
            }
            Value::List(_) => f.write_str("(...)")?,
            other => write_value(f, other, active)?,
        }
    }
    Ok(())
}

/// A list or struct met again inside itself prints as `'(...)` or `{...}`.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, active: &mut Active) -> fmt::Result {
    match value {
        Value::Nil => f.write_str("Nil"),
        Value::True => f.write_str("True"),
        Value::Integer(n) => write!(f, "{}", n),
        Value::Double(d) => write_double(f, *d),
        Value::String(s) => write_escaped(f, s),
        Value::List(items) => {
            if !enter(active, items) {
                return f.write_str("'(...)");
            }
            f.write_str("'(")?;
            write_list_items(f, &items.borrow(), active)?;
            active.pop();
            f.write_str(")")
        }
        Value::Struct(fields) => {
            if !enter(active, fields) {
                return f.write_str("{...}");
            }
            f.write_str("{")?;
            for (i, (key, value)) in fields.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}: ", key)?;
                write_value(f, value, active)?;
            }
            active.pop();
            f.write_str("}")
        }
        Value::Symbol(name) => f.write_str(name),
        Value::Expression(items) => {
            f.write_str("(")?;
            write_separated(f, items.iter(), active)?;
            f.write_str(")")
        }
        Value::Primitive(p) => write!(f, "[primitive {}]", p.name),
        Value::CheckedPrimitive(p) => write!(f, "[primitive {}]", p.name),
        Value::Closure(c) => {
            let captured: Vec<&str> = c.captured.keys().map(String::as_str).collect();
            let params: Vec<&str> = c.params.iter().map(|p| p.as_ref()).collect();
            write!(f, "(lambda ({}) ({}) ", captured.join(" "), params.join(" "))?;
            write_value(f, &c.body, active)?;
            f.write_str(")")
        }
        Value::Return(value) => {
            f.write_str("(return ")?;
            write_value(f, value, active)?;
            f.write_str(")")
        }
        Value::Break(value) => {
            f.write_str("(break ")?;
            write_value(f, value, active)?;
            f.write_str(")")
        }
        Value::Goto(target) => write!(f, "(goto {})", target),
        Value::Label(name) => write!(f, "(label {})", name),
        Value::Error(error) => f.write_str(error.message()),
    }
}

/// Canonical source text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Active::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.type_name(), self)
    }
}

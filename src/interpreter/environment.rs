use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::error::LispError;

/// One level of local bindings.
pub type Frame = HashMap<String, Value>;

/// Global bindings plus a stack of local frames.
///
/// Cloning an `Environment` shares the same underlying storage, which is what
/// lets a [`FrameGuard`] pop its frame without borrowing the interpreter.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    globals: Rc<RefCell<Frame>>,
    frames: Rc<RefCell<Vec<Frame>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost frame first, then the globals.
    pub fn lookup(&self, name: &str) -> Result<Value, LispError> {
        self.get(name).ok_or_else(|| LispError::unbound_symbol(name))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let frames = self.frames.borrow();
        for frame in frames.iter().rev() {
            if let Some(value) = frame.get(name) {
                return Some(value.clone());
            }
        }
        self.globals.borrow().get(name).cloned()
    }

    /// Overwrite the innermost existing binding, or create a global one.
    pub fn set(&self, name: &str, value: Value) {
        let mut frames = self.frames.borrow_mut();
        for frame in frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    /// Bind in the innermost frame, shadowing any outer binding. Without a
    /// local frame the binding lands in the globals.
    pub fn set_local(&self, name: &str, value: Value) {
        let mut frames = self.frames.borrow_mut();
        match frames.last_mut() {
            Some(frame) => {
                frame.insert(name.to_string(), value);
            }
            None => {
                self.globals.borrow_mut().insert(name.to_string(), value);
            }
        }
    }

    pub fn define_global(&self, name: &str, value: Value) {
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    pub fn push(&self, frame: Frame) {
        self.frames.borrow_mut().push(frame);
    }

    pub fn push_empty(&self) {
        self.push(Frame::new());
    }

    pub fn pop(&self) -> Option<Frame> {
        self.frames.borrow_mut().pop()
    }

    /// Push `frame` for the lifetime of the returned guard.
    pub fn scope(&self, frame: Frame) -> FrameGuard {
        self.push(frame);
        FrameGuard { env: self.clone(), depth: self.depth() }
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Global names, sorted.
    pub fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.globals.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Pops the frame it was created for when dropped, on every exit path.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    env: Environment,
    depth: usize,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let mut frames = self.env.frames.borrow_mut();
        frames.truncate(self.depth.saturating_sub(1));
    }
}

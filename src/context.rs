use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{FunctionDefinition, Value};
use crate::eval::Output;

/// A single scope frame.
///
/// Frames only hold their own bindings; lookups that miss locally fall
/// through to the parent chain. A child never writes into its parent's
/// bindings; `@debug`/`@warn` output is the one exception and always lands
/// in the root frame.
#[derive(Debug, Default)]
pub struct Context<'p> {
    parent: Option<&'p Context<'p>>,
    variables: HashMap<String, Value>,
    functions: HashMap<String, Rc<FunctionDefinition>>,
    outputs: RefCell<Vec<Output>>,
}

// `$foo-bar` and `$foo_bar` name the same variable
fn variable_key(name: &str) -> String {
    name.replace('-', "_")
}

impl<'p> Context<'p> {
    pub fn new() -> Context<'p> {
        Context::default()
    }

    pub fn with_parent(parent: &'p Context<'p>) -> Context<'p> {
        Context {
            parent: Some(parent),
            ..Context::default()
        }
    }

    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |p| p.depth() + 1)
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(variable_key(name), value);
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.lookup_variable(&variable_key(name))
    }

    fn lookup_variable(&self, key: &str) -> Option<&Value> {
        match self.variables.get(key) {
            Some(value) => Some(value),
            None => self.parent.and_then(|p| p.lookup_variable(key)),
        }
    }

    /// Registers `definition` under `name`, replacing any earlier entry of this frame.
    pub fn add_function(&mut self, name: impl Into<String>, definition: Rc<FunctionDefinition>) {
        self.functions.insert(name.into(), definition);
    }

    /// `name` is expected to be normalized already.
    pub fn function(&self, name: &str) -> Option<&Rc<FunctionDefinition>> {
        match self.functions.get(name) {
            Some(f) => Some(f),
            None => self.parent.and_then(|p| p.function(name)),
        }
    }

    /// Records `output` in the root frame, keeping emission order across calls.
    pub fn emit(&self, output: Output) {
        match self.parent {
            Some(parent) => parent.emit(output),
            None => self.outputs.borrow_mut().push(output),
        }
    }

    /// Drains the output recorded so far. Only the root frame holds any.
    pub fn take_outputs(&mut self) -> Vec<Output> {
        std::mem::take(self.outputs.get_mut())
    }
}

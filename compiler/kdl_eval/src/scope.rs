//! Hierarchical variable and function environment.
//!
//! Scopes form a stack-allocated chain: a child borrows its parent for its
//! whole lifetime, so every child is dropped before the scope it shadows.
//! Lookups walk towards the root; writes only ever touch the scope they are
//! made on.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};

use crate::{Function, Value};

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Binding can be reassigned (`@var`, parameters, field values).
    Mutable,
    /// Binding cannot be reassigned (`@const`, symbols).
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Error returned by [`Scope::assign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// Variable exists in this scope but is immutable.
    Immutable,
    /// Variable is not owned by this scope.
    Undefined,
}

/// A named value bound in a scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
    pub mutability: Mutability,
}

type ChangeObserver<'p> = Box<dyn FnMut(&Variable) + 'p>;

/// A single scope of variables and functions.
pub struct Scope<'p> {
    parent: Option<&'p Scope<'p>>,
    /// Bindings in insertion order; `index` maps names into it.
    variables: Vec<Variable>,
    index: FxHashMap<String, usize>,
    functions: FxHashMap<String, Rc<Function>>,
    observer: Option<ChangeObserver<'p>>,
}

impl Default for Scope<'_> {
    fn default() -> Self {
        Scope::new()
    }
}

impl<'p> Scope<'p> {
    /// A root scope with no parent and no functions.
    pub fn new() -> Self {
        Scope::with_parent(None)
    }

    fn with_parent(parent: Option<&'p Scope<'p>>) -> Self {
        Scope {
            parent,
            variables: Vec::new(),
            index: FxHashMap::default(),
            functions: FxHashMap::default(),
            observer: None,
        }
    }

    /// Create a child scope that sees everything visible from `self`.
    pub fn shadow(&self) -> Scope<'_> {
        Scope::with_parent(Some(self))
    }

    pub fn parent(&self) -> Option<&Scope<'p>> {
        self.parent
    }

    /// Install a callback fired whenever a variable is added to or changed in
    /// this scope.
    pub fn on_change(&mut self, observer: impl FnMut(&Variable) + 'p) {
        self.observer = Some(Box::new(observer));
    }

    fn notify(&mut self, index: usize) {
        if let (Some(observer), Some(variable)) =
            (self.observer.as_mut(), self.variables.get(index))
        {
            observer(variable);
        }
    }

    /// Look up a variable, walking towards the root.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        match self.index.get(name) {
            Some(&i) => self.variables.get(i),
            None => self.parent.and_then(|parent| parent.get(name)),
        }
    }

    /// Look up a variable, failing if it is not visible from this scope.
    pub fn variable(&self, name: &str) -> CompileResult<&Variable> {
        self.get(name).ok_or_else(|| {
            CompileError::semantic(
                ErrorCode::E2001,
                format!("Unrecognised variable referenced: `{name}`"),
            )
        })
    }

    pub fn has_variable(&self, name: &str, check_parent: bool) -> bool {
        if check_parent {
            self.get(name).is_some()
        } else {
            self.index.contains_key(name)
        }
    }

    /// Variables owned by this scope, in the order they were added.
    pub fn local_variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Add a mutable variable. Returns `false` without touching the existing
    /// binding if this scope already defines `name`.
    pub fn add_variable(&mut self, name: impl Into<String>, value: Value) -> bool {
        self.define(name, value, Mutability::Mutable)
    }

    /// Add an immutable variable, with the same first-write-wins rule as
    /// [`Scope::add_variable`].
    pub fn add_constant(&mut self, name: impl Into<String>, value: Value) -> bool {
        self.define(name, value, Mutability::Immutable)
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value, mutability: Mutability) -> bool {
        let name = name.into();
        if self.index.contains_key(&name) {
            return false;
        }
        let i = self.variables.len();
        self.index.insert(name.clone(), i);
        self.variables.push(Variable {
            name,
            value,
            mutability,
        });
        self.notify(i);
        true
    }

    /// Reassign a variable owned by this scope.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let i = *self.index.get(name).ok_or(AssignError::Undefined)?;
        let variable = self.variables.get_mut(i).ok_or(AssignError::Undefined)?;
        if !variable.mutability.is_mutable() {
            return Err(AssignError::Immutable);
        }
        variable.value = value;
        self.notify(i);
        Ok(())
    }

    /// Resolve a function, walking towards the root.
    pub fn function(&self, name: &str) -> Option<Rc<Function>> {
        match self.functions.get(name) {
            Some(function) => Some(Rc::clone(function)),
            None => self.parent.and_then(|parent| parent.function(name)),
        }
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.function(name).is_some()
    }

    /// Register a function in this scope. Functions registered on the root
    /// scope are visible from every descendant.
    pub fn add_function(&mut self, name: impl Into<String>, function: Function) -> CompileResult<()> {
        let name = name.into();
        if self.functions.contains_key(&name) {
            return Err(CompileError::semantic(
                ErrorCode::E2006,
                format!("Function `{name}` is already defined"),
            ));
        }
        self.functions.insert(name, Rc::new(function));
        Ok(())
    }

    /// Invoke a function against a fresh call scope.
    ///
    /// Constructors additionally export each of their assignments into
    /// `self`, which fires the change callback once per exported field.
    #[tracing::instrument(level = "trace", skip(self, args))]
    pub fn call(&mut self, name: &str, args: &[Value]) -> CompileResult<Value> {
        let function = self.function(name).ok_or_else(|| {
            CompileError::semantic(
                ErrorCode::E2001,
                format!("Unrecognised function referenced: `{name}`"),
            )
        })?;

        if let Some(arity) = function.arity() {
            if arity != args.len() {
                return Err(CompileError::semantic(
                    ErrorCode::E2005,
                    format!(
                        "Function `{name}` expects {arity} argument{} but received {}",
                        if arity == 1 { "" } else { "s" },
                        args.len()
                    ),
                ));
            }
        }

        match &*function {
            Function::Native { body, .. } => body(args),
            Function::User { params, body } => {
                let mut call_scope = self.shadow();
                for (param, arg) in params.iter().zip(args) {
                    call_scope.add_variable(param.as_str(), arg.clone());
                }
                body.evaluate(&mut call_scope)
            }
            Function::Constructor {
                params,
                assignments,
            } => {
                let exports = {
                    let mut call_scope = self.shadow();
                    for (param, arg) in params.iter().zip(args) {
                        call_scope.add_variable(param.as_str(), arg.clone());
                    }
                    let mut exports = Vec::with_capacity(assignments.len());
                    for (field, expression) in assignments {
                        let value = expression.evaluate(&mut call_scope)?;
                        call_scope.add_variable(field.as_str(), value.clone());
                        exports.push((field.clone(), value));
                    }
                    exports
                };
                for (field, value) in &exports {
                    self.add_variable(field.as_str(), value.clone());
                }
                Ok(Value::Compound(exports))
            }
        }
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("variables", &self.variables)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

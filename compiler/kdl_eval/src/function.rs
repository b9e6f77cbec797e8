//! Callable functions.

use std::fmt;
use std::rc::Rc;

use kdl_diagnostic::CompileResult;

use crate::{Expression, Value};

/// A host-provided function body.
pub type NativeFunction = Rc<dyn Fn(&[Value]) -> CompileResult<Value>>;

/// A function that can be invoked from an expression.
#[derive(Clone)]
pub enum Function {
    /// Implemented in Rust. `arity` of `None` accepts any number of arguments.
    Native {
        arity: Option<usize>,
        body: NativeFunction,
    },
    /// `@function name(a, b) = expr;`
    User {
        params: Vec<String>,
        body: Expression,
    },
    /// A type constructor. Each assignment is exported into the calling
    /// scope once all of them have been evaluated.
    Constructor {
        params: Vec<String>,
        assignments: Vec<(String, Expression)>,
    },
}

impl Function {
    pub fn native(
        arity: Option<usize>,
        body: impl Fn(&[Value]) -> CompileResult<Value> + 'static,
    ) -> Self {
        Function::Native {
            arity,
            body: Rc::new(body),
        }
    }

    pub fn arity(&self) -> Option<usize> {
        match self {
            Function::Native { arity, .. } => *arity,
            Function::User { params, .. } | Function::Constructor { params, .. } => {
                Some(params.len())
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Native { arity, .. } => {
                f.debug_struct("Native").field("arity", arity).finish_non_exhaustive()
            }
            Function::User { params, body } => f
                .debug_struct("User")
                .field("params", params)
                .field("body", body)
                .finish(),
            Function::Constructor {
                params,
                assignments,
            } => f
                .debug_struct("Constructor")
                .field("params", params)
                .field("assignments", assignments)
                .finish(),
        }
    }
}

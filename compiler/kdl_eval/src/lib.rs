//! Interpreter for KDL expressions.
//!
//! - [`Value`]: the typed result of evaluating an expression
//! - [`Scope`]: variables and functions, chained to a parent scope
//! - [`Expression`]: a compiled run of lexemes, evaluated against a scope
//! - [`builtins`]: functions installed into every root scope

pub mod builtins;
mod expression;
mod function;
mod scope;
mod stack;
mod value;

pub use expression::Expression;
pub use function::{Function, NativeFunction};
pub use scope::{AssignError, Mutability, Scope, Variable};
pub use stack::ensure_sufficient_stack;
pub use value::Value;

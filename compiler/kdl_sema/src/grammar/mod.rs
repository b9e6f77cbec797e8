//! Grammar productions.
//!
//! Each module extends [`Parser`](crate::parser::Parser) with the methods
//! for one family of constructs.

mod declaration;
mod decorator;
mod directive;
mod type_def;

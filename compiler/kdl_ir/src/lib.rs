//! Core data shared by every phase of the KDL resource compiler.
//!
//! - [`Span`] / [`Location`]: where a lexeme came from
//! - [`Lexeme`] / [`LexemeKind`]: the unit produced by the lexer
//! - [`ResourceReference`]: `#Namespace.Type.id` literals
//! - [`LexemeStream`]: cursor over lexemes with a prioritized injection queue

mod lexeme;
mod location;
mod reference;
mod span;
mod stream;

pub use lexeme::{Lexeme, LexemeKind};
pub use location::Location;
pub use reference::ResourceReference;
pub use span::Span;
pub use stream::LexemeStream;

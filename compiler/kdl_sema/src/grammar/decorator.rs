//! Decorators: `@name` or `@name(value, ...)`.

use kdl_diagnostic::CompileResult;
use kdl_ir::{LexemeKind, LexemeStream};
use kdl_types::{Decorator, Decorators};

use crate::parser::{expect, lexeme_list, Parser};

const VALUE_KINDS: &[LexemeKind] = &[
    LexemeKind::Identifier,
    LexemeKind::String,
    LexemeKind::Integer,
    LexemeKind::Percentage,
    LexemeKind::Reference,
];

impl Parser<'_> {
    pub(crate) fn parse_decorator(&mut self) -> CompileResult<Decorator> {
        parse_decorator(&mut self.stream)
    }
}

pub(crate) fn parse_decorator(stream: &mut LexemeStream) -> CompileResult<Decorator> {
    let name = expect(stream, LexemeKind::Directive, "a decorator")?;
    let values = if stream.expect(LexemeKind::LParen) {
        lexeme_list(stream, LexemeKind::LParen, LexemeKind::RParen, VALUE_KINDS)?
    } else {
        Vec::new()
    };
    Ok(Decorator::new(name.text, values, &name.location))
}

/// Every decorator at the front of the stream.
pub(crate) fn parse_decorators(stream: &mut LexemeStream) -> CompileResult<Decorators> {
    let mut decorators = Decorators::default();
    while stream.expect(LexemeKind::Directive) {
        decorators.push(parse_decorator(stream)?);
    }
    Ok(decorators)
}

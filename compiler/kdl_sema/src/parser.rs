//! The recursive-descent parser driving a compile session.
//!
//! The top level of a source file is a sequence of directives, type
//! definitions and declarations. Decorators written before any of them are
//! collected and handed to whatever follows. Grammar productions live in
//! [`crate::grammar`], each extending [`Parser`].

use std::path::Path;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_eval::Scope;
use kdl_ir::{Lexeme, LexemeKind, LexemeStream, Location};
use kdl_types::Decorators;

use crate::config::Metadata;
use crate::modules;
use crate::session::SessionState;

/// Directive names. Any other `@name` is a decorator.
const DIRECTIVES: &[&str] = &["format", "import", "var", "const", "function"];

fn is_directive(name: &str) -> bool {
    DIRECTIVES.contains(&name) || Metadata::KEYS.contains(&name)
}

pub(crate) struct Parser<'s> {
    pub(crate) stream: LexemeStream,
    pub(crate) state: &'s mut SessionState,
    /// Decorators waiting for the item they decorate.
    pending: Decorators,
}

impl<'s> Parser<'s> {
    pub(crate) fn new(lexemes: Vec<Lexeme>, state: &'s mut SessionState) -> Self {
        Parser {
            stream: LexemeStream::new(lexemes),
            state,
            pending: Decorators::default(),
        }
    }

    /// Parse every top-level item in the stream. `scope` is the session's
    /// root scope.
    pub(crate) fn parse(&mut self, scope: &mut Scope<'_>) -> CompileResult<()> {
        while !self.stream.finished() {
            let lexeme = self.stream.peek().clone();
            self.track_source(&lexeme.location);
            match lexeme.kind {
                LexemeKind::Directive if is_directive(&lexeme.text) => {
                    if !self.pending.is_empty() {
                        return Err(CompileError::unexpected(
                            "Decorators cannot be applied to a directive",
                            &lexeme,
                        ));
                    }
                    self.parse_directive(scope)?;
                }
                LexemeKind::Directive => {
                    let decorator = self.parse_decorator()?;
                    self.pending.push(decorator);
                }
                LexemeKind::Keyword if lexeme.text == "type" => {
                    let decorators = std::mem::take(&mut self.pending);
                    self.parse_type_definition(decorators, scope)?;
                }
                LexemeKind::Keyword if lexeme.text == "declare" => {
                    let decorators = std::mem::take(&mut self.pending);
                    self.parse_declaration(&decorators, scope)?;
                }
                _ => {
                    return Err(CompileError::unexpected(
                        "Expected a directive, type definition or declaration",
                        &lexeme,
                    ));
                }
            }
        }
        if let Some(decorator) = self.pending.iter().next() {
            return Err(CompileError::parse(
                format!("Decorator `@{}` is not followed by anything to decorate", decorator.name),
                &decorator.location,
            ));
        }
        Ok(())
    }

    /// Point `file()` at the directory of the source being parsed.
    fn track_source(&self, location: &Location) {
        let file = &*location.file;
        if modules::is_builtin_file(file) {
            return;
        }
        if let Some(parent) = Path::new(file).parent() {
            let mut dir = self.state.source_dir.borrow_mut();
            if dir.as_path() != parent {
                *dir = parent.to_path_buf();
            }
        }
    }

    pub(crate) fn definitions_admit(&self, decorators: &Decorators) -> bool {
        decorators.admits(&self.state.config.definitions)
    }
}

// Stream helpers shared by the grammar modules. They are free functions so
// that callers can hold borrows of the session state while reading.

/// Consume a lexeme of `kind` or fail naming `what` was expected.
pub(crate) fn expect(stream: &mut LexemeStream, kind: LexemeKind, what: &str) -> CompileResult<Lexeme> {
    stream
        .consume(kind)
        .ok_or_else(|| CompileError::unexpected(format!("Expected {what}"), stream.peek()))
}

pub(crate) fn expect_keyword(stream: &mut LexemeStream, keyword: &str) -> CompileResult<Lexeme> {
    if stream.expect_text(LexemeKind::Keyword, keyword) {
        Ok(stream.read())
    } else {
        Err(CompileError::unexpected(format!("Expected `{keyword}`"), stream.peek()))
    }
}

pub(crate) fn expect_semi(stream: &mut LexemeStream) -> CompileResult<Lexeme> {
    expect(stream, LexemeKind::Semi, "`;`")
}

/// Read a delimited, comma separated list of single lexemes, such as
/// `<1, 5>` or `(top, left)`. Each item must be one of `valid`.
pub(crate) fn lexeme_list(
    stream: &mut LexemeStream,
    open: LexemeKind,
    close: LexemeKind,
    valid: &[LexemeKind],
) -> CompileResult<Vec<Lexeme>> {
    expect(stream, open, open.describe())?;
    let mut items = Vec::new();
    if stream.consume(close).is_some() {
        return Ok(items);
    }
    loop {
        let item = stream.read();
        if !valid.contains(&item.kind) {
            return Err(CompileError::unexpected(
                format!("Unexpected item in list, expected one of: {}", describe_all(valid)),
                &item,
            ));
        }
        items.push(item);
        if stream.consume(close).is_some() {
            return Ok(items);
        }
        expect(stream, LexemeKind::Comma, &format!("`,` or {}", close.describe()))?;
    }
}

fn describe_all(kinds: &[LexemeKind]) -> String {
    kinds
        .iter()
        .map(|k| k.describe())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Skip a `{ ... }` block, including nested blocks and a trailing `;`.
pub(crate) fn skip_block(stream: &mut LexemeStream) -> CompileResult<()> {
    let open = expect(stream, LexemeKind::LBrace, "`{`")?;
    let mut depth = 1usize;
    while depth > 0 {
        let lexeme = stream.read();
        match lexeme.kind {
            LexemeKind::LBrace => depth += 1,
            LexemeKind::RBrace => depth -= 1,
            LexemeKind::Eof => {
                return Err(CompileError::Parse {
                    code: ErrorCode::E1003,
                    message: "Unclosed `{` block".to_string(),
                    location: open.location,
                });
            }
            _ => {}
        }
    }
    stream.consume(LexemeKind::Semi);
    Ok(())
}

/// Error for a `}` that never arrives.
pub(crate) fn unclosed(what: &str, open: &Lexeme) -> CompileError {
    CompileError::Parse {
        code: ErrorCode::E1003,
        message: format!("Unclosed {what}"),
        location: open.location.clone(),
    }
}

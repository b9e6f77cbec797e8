//! Lexer for KDL using logos.
//!
//! Produces a vector of [`Lexeme`]s terminated by `Eof`. Every lexeme is
//! stamped with its file, line and column. Comments are stripped according
//! to the selected [`CommentStyle`].

use std::path::Path;
use std::sync::Arc;

use kdl_diagnostic::span_utils::LineOffsetTable;
use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_ir::{Lexeme, LexemeKind, Location, Span};
use logos::Logos;
use rustc_hash::FxHashSet;

/// Which line-comment syntax the source uses.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CommentStyle {
    /// `` ` `` to end of line.
    #[default]
    Kdl,
    /// `//` to end of line.
    Cpp,
    /// `--` to end of line.
    Lua,
}

/// Words lexed as [`LexemeKind::Keyword`] unless configured otherwise.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "declare",
    "type",
    "template",
    "field",
    "repeatable",
    "new",
    "override",
    "duplicate",
    "constructor",
    "as",
];

/// Lexer configuration.
#[derive(Clone, Debug)]
pub struct LexerOptions {
    pub comment_style: CommentStyle,
    pub keywords: FxHashSet<String>,
}

impl Default for LexerOptions {
    fn default() -> Self {
        LexerOptions {
            comment_style: CommentStyle::default(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

impl LexerOptions {
    #[must_use]
    pub fn with_comment_style(mut self, style: CommentStyle) -> Self {
        self.comment_style = style;
        self
    }
}

/// Raw token from logos (before classification).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[token("`")]
    Backtick,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*")]
    AtName,

    // `#name`: a directive, or `#auto`
    #[regex(r"#[A-Za-z_][A-Za-z0-9_]*")]
    HashName,

    #[regex(r"#-?[0-9]+")]
    HashId,

    #[regex(r"#([A-Za-z_][A-Za-z0-9_]*\.){1,2}(-?[0-9]+|auto)")]
    QualifiedReference,

    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    Variable,

    #[token("$(")]
    ExprOpen,

    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexInt,

    #[regex(r"-?[0-9]+")]
    Int,

    #[regex(r"-?[0-9]+%")]
    Percentage,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    #[regex(r"'([^'\\\n]|\\.)*")]
    UnterminatedString,

    #[token(";")]
    Semi,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("=")]
    Equals,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("&")]
    Amp,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token(":")]
    Colon,
    #[token("!")]
    Exclaim,
    #[token("?")]
    Question,
    #[token("%")]
    Percent,
    #[token("~")]
    Tilde,
}

/// Tokenize `source`, attributing lexemes to `file`.
#[tracing::instrument(level = "debug", skip(source, options), fields(bytes = source.len()))]
pub fn lex(source: &str, file: &str, options: &LexerOptions) -> CompileResult<Vec<Lexeme>> {
    let file: Arc<str> = Arc::from(file);
    let lines = LineOffsetTable::build(source);
    let locate = |span: Span| {
        let (line, offset) = lines.offset_to_line_col(source, span.start);
        Location::new(Arc::clone(&file), line, offset, span)
    };

    let mut result = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        let raw = match token_result {
            Ok(raw) => raw,
            Err(()) => {
                return Err(CompileError::lexical(
                    ErrorCode::E0002,
                    format!("Unrecognised character '{slice}' encountered"),
                    locate(span),
                ));
            }
        };

        let starts_comment = match raw {
            RawToken::Backtick => {
                if options.comment_style != CommentStyle::Kdl {
                    return Err(CompileError::lexical(
                        ErrorCode::E0002,
                        "Unrecognised character '`' encountered",
                        locate(span),
                    ));
                }
                true
            }
            RawToken::Slash => {
                options.comment_style == CommentStyle::Cpp && logos.remainder().starts_with('/')
            }
            RawToken::Minus => {
                options.comment_style == CommentStyle::Lua && logos.remainder().starts_with('-')
            }
            _ => false,
        };
        if starts_comment {
            let rest = logos.remainder();
            logos.bump(rest.find('\n').unwrap_or(rest.len()));
            continue;
        }

        let (kind, text) = convert_token(raw, slice, options).map_err(|(code, message)| {
            CompileError::lexical(code, message, locate(span))
        })?;
        result.push(Lexeme::new(kind, text, locate(span)));
    }

    let eof = Span::from_range(source.len()..source.len());
    result.push(Lexeme::new(LexemeKind::Eof, "", locate(eof)));

    tracing::trace!(count = result.len(), "lexed source");
    Ok(result)
}

/// Read and tokenize a file.
pub fn lex_file(path: &Path, options: &LexerOptions) -> CompileResult<Vec<Lexeme>> {
    let display = path.display().to_string();
    let source = std::fs::read_to_string(path).map_err(|e| CompileError::io(&display, &e))?;
    lex(&source, &display, options)
}

/// Classify a raw token and produce its canonical text.
fn convert_token(
    raw: RawToken,
    slice: &str,
    options: &LexerOptions,
) -> Result<(LexemeKind, String), (ErrorCode, String)> {
    let kind = match raw {
        RawToken::Ident => {
            let kind = if options.keywords.contains(slice) {
                LexemeKind::Keyword
            } else {
                LexemeKind::Identifier
            };
            return Ok((kind, slice.to_string()));
        }
        RawToken::AtName => return Ok((LexemeKind::Directive, slice[1..].to_string())),
        RawToken::HashName => {
            let name = &slice[1..];
            let kind = if name == "auto" {
                LexemeKind::Reference
            } else {
                LexemeKind::Directive
            };
            return Ok((kind, name.to_string()));
        }
        RawToken::HashId | RawToken::QualifiedReference => {
            return Ok((LexemeKind::Reference, slice[1..].to_string()));
        }
        RawToken::Variable => return Ok((LexemeKind::Variable, slice[1..].to_string())),
        RawToken::HexInt => {
            let value = i64::from_str_radix(&slice[2..], 16).map_err(|_| {
                (
                    ErrorCode::E0003,
                    format!("Hexadecimal literal '{slice}' is out of range"),
                )
            })?;
            return Ok((LexemeKind::Integer, value.to_string()));
        }
        RawToken::Int => {
            let value = slice.parse::<i64>().map_err(|_| {
                (
                    ErrorCode::E0003,
                    format!("Integer literal '{slice}' is out of range"),
                )
            })?;
            return Ok((LexemeKind::Integer, value.to_string()));
        }
        RawToken::Percentage => {
            let digits = &slice[..slice.len() - 1];
            let value = digits.parse::<i64>().map_err(|_| {
                (
                    ErrorCode::E0003,
                    format!("Percentage literal '{slice}' is out of range"),
                )
            })?;
            return Ok((LexemeKind::Percentage, value.to_string()));
        }
        RawToken::String => {
            let content = &slice[1..slice.len() - 1];
            return Ok((LexemeKind::String, unescape_string(content)));
        }
        RawToken::UnterminatedString => {
            return Err((
                ErrorCode::E0001,
                "Unterminated string literal".to_string(),
            ));
        }
        RawToken::ExprOpen => LexemeKind::ExprOpen,
        RawToken::Semi => LexemeKind::Semi,
        RawToken::LBrace => LexemeKind::LBrace,
        RawToken::RBrace => LexemeKind::RBrace,
        RawToken::LBracket => LexemeKind::LBracket,
        RawToken::RBracket => LexemeKind::RBracket,
        RawToken::LParen => LexemeKind::LParen,
        RawToken::RParen => LexemeKind::RParen,
        RawToken::LeftShift => LexemeKind::LeftShift,
        RawToken::RightShift => LexemeKind::RightShift,
        RawToken::LAngle => LexemeKind::LAngle,
        RawToken::RAngle => LexemeKind::RAngle,
        RawToken::Equals => LexemeKind::Equals,
        RawToken::Plus => LexemeKind::Plus,
        RawToken::Minus => LexemeKind::Minus,
        RawToken::Star => LexemeKind::Star,
        RawToken::Slash => LexemeKind::Slash,
        RawToken::Amp => LexemeKind::Amp,
        RawToken::Dot => LexemeKind::Dot,
        RawToken::Comma => LexemeKind::Comma,
        RawToken::Pipe => LexemeKind::Pipe,
        RawToken::Caret => LexemeKind::Caret,
        RawToken::Colon => LexemeKind::Colon,
        RawToken::Exclaim => LexemeKind::Exclaim,
        RawToken::Question => LexemeKind::Question,
        RawToken::Percent => LexemeKind::Percent,
        RawToken::Tilde => LexemeKind::Tilde,
        // Comments are consumed by the caller before conversion.
        RawToken::Backtick => {
            return Err((
                ErrorCode::E0002,
                "Unrecognised character '`' encountered".to_string(),
            ));
        }
    };
    Ok((kind, slice.to_string()))
}

/// Process string escape sequences.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') | None => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('0') => result.push('\0'),
                Some(c) => {
                    result.push('\\');
                    result.push(c);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

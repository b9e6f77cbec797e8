//! Lexemes: the unit of exchange between the lexer and every later phase.
//!
//! A lexeme keeps its source text rather than a decoded payload. Integer
//! text is normalised to decimal by the lexer, string text is unescaped,
//! and reference text holds the dotted components without the `#`.

use std::fmt;

use crate::{Location, ResourceReference};

/// Classification of a lexeme.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LexemeKind {
    Identifier,
    Keyword,
    Integer,
    Percentage,
    String,
    /// `#128`, `#auto`, `#Type.128`, `#Namespace.Type.128`
    Reference,
    /// `@name` or `#name`
    Directive,
    /// `$name`
    Variable,
    /// `$(`, opens a compound expression
    ExprOpen,
    /// A default value injected by the synthesizer. Text is the binary field name.
    FieldDefault,

    Semi,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LAngle,
    RAngle,
    LeftShift,
    RightShift,
    Equals,
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Dot,
    Comma,
    Pipe,
    Caret,
    Colon,
    Exclaim,
    Question,
    Percent,
    Tilde,

    Eof,
}

impl LexemeKind {
    /// Human readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            LexemeKind::Identifier => "identifier",
            LexemeKind::Keyword => "keyword",
            LexemeKind::Integer => "integer",
            LexemeKind::Percentage => "percentage",
            LexemeKind::String => "string",
            LexemeKind::Reference => "resource reference",
            LexemeKind::Directive => "directive",
            LexemeKind::Variable => "variable",
            LexemeKind::ExprOpen => "`$(`",
            LexemeKind::FieldDefault => "default value",
            LexemeKind::Semi => "`;`",
            LexemeKind::LBrace => "`{`",
            LexemeKind::RBrace => "`}`",
            LexemeKind::LBracket => "`[`",
            LexemeKind::RBracket => "`]`",
            LexemeKind::LParen => "`(`",
            LexemeKind::RParen => "`)`",
            LexemeKind::LAngle => "`<`",
            LexemeKind::RAngle => "`>`",
            LexemeKind::LeftShift => "`<<`",
            LexemeKind::RightShift => "`>>`",
            LexemeKind::Equals => "`=`",
            LexemeKind::Plus => "`+`",
            LexemeKind::Minus => "`-`",
            LexemeKind::Star => "`*`",
            LexemeKind::Slash => "`/`",
            LexemeKind::Amp => "`&`",
            LexemeKind::Dot => "`.`",
            LexemeKind::Comma => "`,`",
            LexemeKind::Pipe => "`|`",
            LexemeKind::Caret => "`^`",
            LexemeKind::Colon => "`:`",
            LexemeKind::Exclaim => "`!`",
            LexemeKind::Question => "`?`",
            LexemeKind::Percent => "`%`",
            LexemeKind::Tilde => "`~`",
            LexemeKind::Eof => "end of file",
        }
    }

    /// Binding strength of a binary operator; higher binds tighter.
    pub fn precedence(self) -> Option<u8> {
        match self {
            LexemeKind::Plus | LexemeKind::Minus => Some(2),
            LexemeKind::Star | LexemeKind::Slash => Some(3),
            LexemeKind::Caret => Some(4),
            LexemeKind::LeftShift | LexemeKind::RightShift => Some(5),
            LexemeKind::Pipe => Some(6),
            LexemeKind::Amp => Some(7),
            _ => None,
        }
    }

    pub fn is_left_associative(self) -> bool {
        !matches!(self, LexemeKind::Caret)
    }

    /// Kinds that can stand alone as an expression value.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            LexemeKind::Integer
                | LexemeKind::Percentage
                | LexemeKind::String
                | LexemeKind::Reference
                | LexemeKind::Identifier
                | LexemeKind::Variable
        )
    }
}

impl fmt::Display for LexemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single token of KDL source.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub text: String,
    pub location: Location,
}

impl Lexeme {
    pub fn new(kind: LexemeKind, text: impl Into<String>, location: Location) -> Self {
        Lexeme {
            kind,
            text: text.into(),
            location,
        }
    }

    /// Build a lexeme with no source position.
    pub fn synthesized(kind: LexemeKind, text: impl Into<String>) -> Self {
        Lexeme::new(kind, text, Location::synthesized())
    }

    /// Same text and kind, reported at `location`.
    #[must_use]
    pub fn at(mut self, location: &Location) -> Self {
        self.location = location.clone();
        self
    }

    #[inline]
    pub fn is(&self, kind: LexemeKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn is_text(&self, kind: LexemeKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// Integer value of an integer or percentage lexeme.
    pub fn integer_value(&self) -> Option<i64> {
        match self.kind {
            LexemeKind::Integer | LexemeKind::Percentage => self.text.parse().ok(),
            _ => None,
        }
    }

    /// Decompose the text of a reference lexeme.
    pub fn reference(&self) -> Option<ResourceReference> {
        if self.kind == LexemeKind::Reference {
            ResourceReference::parse(&self.text)
        } else {
            None
        }
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LexemeKind::String => write!(f, "\"{}\"", self.text),
            LexemeKind::Reference => write!(f, "#{}", self.text),
            LexemeKind::Percentage => write!(f, "{}%", self.text),
            LexemeKind::Variable => write!(f, "${}", self.text),
            LexemeKind::Directive => write!(f, "@{}", self.text),
            LexemeKind::Eof => f.write_str("<eof>"),
            _ => f.write_str(&self.text),
        }
    }
}

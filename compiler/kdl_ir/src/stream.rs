//! Two-tier lexeme stream.
//!
//! Lexemes are read from a pending queue first and from the backing vector
//! second. The synthesizer pushes default values onto the queue; imports
//! splice whole files into the backing vector at the cursor. The trailing
//! `Eof` lexeme is never consumed, so `peek` always has something to return.

use std::collections::VecDeque;

use crate::{Lexeme, LexemeKind, Location};

/// Cursor over a vector of lexemes with a prioritized injection queue.
#[derive(Clone, Debug)]
pub struct LexemeStream {
    lexemes: Vec<Lexeme>,
    pos: usize,
    pending: VecDeque<Lexeme>,
    eof: Lexeme,
}

impl LexemeStream {
    /// Create a stream over `lexemes`. A trailing `Eof` is added if absent.
    pub fn new(mut lexemes: Vec<Lexeme>) -> Self {
        let eof = match lexemes.last() {
            Some(last) if last.is(LexemeKind::Eof) => last.clone(),
            Some(last) => Lexeme::new(LexemeKind::Eof, "", last.location.clone()),
            None => Lexeme::new(LexemeKind::Eof, "", Location::synthesized()),
        };
        if lexemes.last().is_some_and(|l| l.is(LexemeKind::Eof)) {
            lexemes.pop();
        }
        LexemeStream {
            lexemes,
            pos: 0,
            pending: VecDeque::new(),
            eof,
        }
    }

    /// True once both tiers are exhausted.
    #[inline]
    pub fn finished(&self) -> bool {
        self.pending.is_empty() && self.pos >= self.lexemes.len()
    }

    /// Number of lexemes left to read across both tiers.
    pub fn remaining(&self) -> usize {
        self.pending.len() + self.lexemes.len().saturating_sub(self.pos)
    }

    /// Look at the lexeme `n` places ahead without consuming anything.
    pub fn peek_at(&self, n: usize) -> &Lexeme {
        if n < self.pending.len() {
            return &self.pending[n];
        }
        let index = self.pos + (n - self.pending.len());
        self.lexemes.get(index).unwrap_or(&self.eof)
    }

    #[inline]
    pub fn peek(&self) -> &Lexeme {
        self.peek_at(0)
    }

    /// Consume and return the next lexeme. At the end, returns `Eof` forever.
    pub fn read(&mut self) -> Lexeme {
        if let Some(lexeme) = self.pending.pop_front() {
            return lexeme;
        }
        match self.lexemes.get(self.pos) {
            Some(lexeme) => {
                self.pos += 1;
                lexeme.clone()
            }
            None => self.eof.clone(),
        }
    }

    /// Consume `n` lexemes.
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.read();
        }
    }

    /// Check whether the next lexeme has the given kind.
    #[inline]
    pub fn expect(&self, kind: LexemeKind) -> bool {
        self.peek().is(kind)
    }

    /// Check whether the next lexeme has the given kind and text.
    #[inline]
    pub fn expect_text(&self, kind: LexemeKind, text: &str) -> bool {
        self.peek().is_text(kind, text)
    }

    /// Check the next lexemes against a sequence of kinds.
    pub fn expect_sequence(&self, kinds: &[LexemeKind]) -> bool {
        kinds
            .iter()
            .enumerate()
            .all(|(n, kind)| self.peek_at(n).is(*kind))
    }

    /// Consume the next lexeme if it has the given kind.
    pub fn consume(&mut self, kind: LexemeKind) -> Option<Lexeme> {
        if self.expect(kind) {
            Some(self.read())
        } else {
            None
        }
    }

    /// Queue lexemes to be read before anything else, in the given order.
    ///
    /// Lexemes already waiting in the queue stay ahead of the new ones.
    pub fn push(&mut self, lexemes: impl IntoIterator<Item = Lexeme>) {
        self.pending.extend(lexemes.into_iter().filter(|l| !l.is(LexemeKind::Eof)));
    }

    /// Splice lexemes into the backing vector at the cursor.
    ///
    /// They are read after any pending lexemes and before the rest of the
    /// current input.
    pub fn insert(&mut self, lexemes: impl IntoIterator<Item = Lexeme>) {
        let incoming = lexemes.into_iter().filter(|l| !l.is(LexemeKind::Eof));
        self.lexemes.splice(self.pos..self.pos, incoming);
    }

    /// Location of the next lexeme, for error reporting.
    pub fn location(&self) -> &Location {
        &self.peek().location
    }
}

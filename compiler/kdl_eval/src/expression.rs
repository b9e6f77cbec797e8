//! Expressions: compiled lexeme runs evaluated against a [`Scope`].
//!
//! Evaluation is precedence climbing over the flat lexeme list, using the
//! binding strengths and associativity declared on [`LexemeKind`].

use std::fmt;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_ir::{Lexeme, LexemeKind, LexemeStream, Location};

use crate::scope::AssignError;
use crate::{ensure_sufficient_stack, Scope, Value};

/// A compiled expression.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Expression {
    lexemes: Vec<Lexeme>,
}

impl Expression {
    /// Build an expression from already-collected lexemes.
    ///
    /// A negative integer literal directly after an operand is split into a
    /// minus operator and a positive literal, so `$(a -1)` subtracts.
    pub fn from_lexemes(lexemes: Vec<Lexeme>) -> Self {
        let mut normalized: Vec<Lexeme> = Vec::with_capacity(lexemes.len());
        for lexeme in lexemes {
            let follows_operand = normalized.last().is_some_and(|prev| {
                prev.kind.is_literal() || prev.is(LexemeKind::RParen)
            });
            let is_negative_number = matches!(lexeme.kind, LexemeKind::Integer | LexemeKind::Percentage)
                && lexeme.text.starts_with('-');
            if follows_operand && is_negative_number {
                normalized.push(Lexeme::new(LexemeKind::Minus, "-", lexeme.location.clone()));
                normalized.push(Lexeme::new(
                    lexeme.kind,
                    lexeme.text.trim_start_matches('-'),
                    lexeme.location,
                ));
            } else {
                normalized.push(lexeme);
            }
        }
        Expression {
            lexemes: normalized,
        }
    }

    /// An expression that evaluates to a single literal lexeme.
    pub fn literal(lexeme: Lexeme) -> Self {
        Expression {
            lexemes: vec![lexeme],
        }
    }

    /// Read one expression from the stream: a literal, a variable, a call
    /// `name(args)`, or a compound `$( ... )`.
    pub fn compile(stream: &mut LexemeStream) -> CompileResult<Self> {
        let first = stream.peek().clone();
        match first.kind {
            LexemeKind::ExprOpen => {
                stream.read();
                let inner = collect_group(stream, &first)?;
                Ok(Expression::from_lexemes(inner))
            }
            LexemeKind::Identifier if stream.peek_at(1).is(LexemeKind::LParen) => {
                let name = stream.read();
                let open = stream.read();
                let mut lexemes = vec![name, open.clone()];
                lexemes.extend(collect_group(stream, &open)?);
                lexemes.push(Lexeme::new(LexemeKind::RParen, ")", stream.location().clone()));
                Ok(Expression::from_lexemes(lexemes))
            }
            kind if kind.is_literal() => Ok(Expression::literal(stream.read())),
            _ => Err(CompileError::Parse {
                code: ErrorCode::E1002,
                message: format!("Expected an expression (found {first})"),
                location: first.location,
            }),
        }
    }

    pub fn lexemes(&self) -> &[Lexeme] {
        &self.lexemes
    }

    pub fn location(&self) -> Location {
        self.lexemes
            .first()
            .map_or_else(Location::synthesized, |l| l.location.clone())
    }

    /// Evaluate in `scope`. `name = expr` assigns (or adds) `name` in that
    /// scope and yields the assigned value.
    pub fn evaluate(&self, scope: &mut Scope<'_>) -> CompileResult<Value> {
        if let [target, eq, rest @ ..] = self.lexemes.as_slice() {
            if target.is(LexemeKind::Identifier) && eq.is(LexemeKind::Equals) {
                let value = Evaluator::new(rest, scope).run()?;
                return match scope.assign(&target.text, value.clone()) {
                    Ok(()) => Ok(value),
                    Err(AssignError::Undefined) => {
                        scope.add_variable(target.text.as_str(), value.clone());
                        Ok(value)
                    }
                    Err(AssignError::Immutable) => Err(CompileError::semantic_at(
                        ErrorCode::E2005,
                        format!("Cannot assign to constant `{}`", target.text),
                        &target.location,
                    )),
                };
            }
        }
        Evaluator::new(&self.lexemes, scope).run()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, lexeme) in self.lexemes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{lexeme}")?;
        }
        Ok(())
    }
}

/// Read up to the `)` matching `open`, which has already been consumed.
fn collect_group(stream: &mut LexemeStream, open: &Lexeme) -> CompileResult<Vec<Lexeme>> {
    let mut depth = 1usize;
    let mut lexemes = Vec::new();
    loop {
        let lexeme = stream.read();
        match lexeme.kind {
            LexemeKind::Eof => {
                return Err(CompileError::Parse {
                    code: ErrorCode::E1003,
                    message: format!("Unclosed {} in expression", open.kind.describe()),
                    location: open.location.clone(),
                });
            }
            LexemeKind::LParen | LexemeKind::ExprOpen => depth += 1,
            LexemeKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(lexemes);
                }
            }
            _ => {}
        }
        lexemes.push(lexeme);
    }
}

struct Evaluator<'a, 's, 'p> {
    lexemes: &'a [Lexeme],
    pos: usize,
    scope: &'s mut Scope<'p>,
}

impl<'a, 's, 'p> Evaluator<'a, 's, 'p> {
    fn new(lexemes: &'a [Lexeme], scope: &'s mut Scope<'p>) -> Self {
        Evaluator {
            lexemes,
            pos: 0,
            scope,
        }
    }

    fn run(mut self) -> CompileResult<Value> {
        let value = self.binary(0)?;
        match self.peek() {
            None => Ok(value),
            Some(extra) => Err(CompileError::unexpected(
                "Unexpected lexeme after expression",
                extra,
            )),
        }
    }

    fn peek(&self) -> Option<&'a Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.lexemes.get(self.pos);
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn end_location(&self) -> Location {
        self.lexemes
            .last()
            .map_or_else(Location::synthesized, |l| l.location.clone())
    }

    fn binary(&mut self, min_precedence: u8) -> CompileResult<Value> {
        ensure_sufficient_stack(|| self.binary_inner(min_precedence))
    }

    fn binary_inner(&mut self, min_precedence: u8) -> CompileResult<Value> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek() {
            let Some(precedence) = op.kind.precedence() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let next_min = if op.kind.is_left_associative() {
                precedence + 1
            } else {
                precedence
            };
            let rhs = self.binary(next_min)?;
            lhs = Value::binary(op.kind, &lhs, &rhs).map_err(|e| e.located(&op.location))?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> CompileResult<Value> {
        match self.peek() {
            Some(op) if op.is(LexemeKind::Tilde) => {
                self.pos += 1;
                self.unary()?.not().map_err(|e| e.located(&op.location))
            }
            Some(op) if op.is(LexemeKind::Minus) => {
                self.pos += 1;
                self.unary()?.negate().map_err(|e| e.located(&op.location))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> CompileResult<Value> {
        let Some(lexeme) = self.next() else {
            return Err(CompileError::Parse {
                code: ErrorCode::E1002,
                message: "Expected an operand at the end of the expression".to_string(),
                location: self.end_location(),
            });
        };

        match lexeme.kind {
            LexemeKind::LParen | LexemeKind::ExprOpen => {
                let value = self.binary(0)?;
                self.close_paren(lexeme)?;
                Ok(value)
            }
            LexemeKind::Variable => self
                .scope
                .variable(&lexeme.text)
                .map(|v| v.value.clone())
                .map_err(|e| e.located(&lexeme.location)),
            LexemeKind::Identifier if self.peek().is_some_and(|l| l.is(LexemeKind::LParen)) => {
                self.call(lexeme)
            }
            LexemeKind::Identifier => Ok(match lexeme.text.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                name => self
                    .scope
                    .get(name)
                    .map_or_else(|| Value::Identifier(name.to_string()), |v| v.value.clone()),
            }),
            _ => Value::from_lexeme(lexeme).ok_or_else(|| {
                CompileError::Parse {
                    code: ErrorCode::E1002,
                    message: format!("Expected an operand (found {lexeme})"),
                    location: lexeme.location.clone(),
                }
            }),
        }
    }

    fn call(&mut self, name: &Lexeme) -> CompileResult<Value> {
        let open = self.next();
        let mut args = Vec::new();
        if self.peek().is_some_and(|l| l.is(LexemeKind::RParen)) {
            self.pos += 1;
        } else {
            loop {
                args.push(self.binary(0)?);
                match self.next() {
                    Some(l) if l.is(LexemeKind::Comma) => {}
                    Some(l) if l.is(LexemeKind::RParen) => break,
                    Some(other) => {
                        return Err(CompileError::unexpected(
                            format!("Expected `,` or `)` in call to `{}`", name.text),
                            other,
                        ));
                    }
                    None => {
                        return Err(CompileError::Parse {
                            code: ErrorCode::E1003,
                            message: format!("Unclosed argument list in call to `{}`", name.text),
                            location: open.map_or_else(|| name.location.clone(), |l| l.location.clone()),
                        });
                    }
                }
            }
        }
        self.scope
            .call(&name.text, &args)
            .map_err(|e| e.located(&name.location))
    }

    fn close_paren(&mut self, open: &Lexeme) -> CompileResult<()> {
        match self.next() {
            Some(l) if l.is(LexemeKind::RParen) => Ok(()),
            Some(other) => Err(CompileError::unexpected("Expected `)`", other)),
            None => Err(CompileError::Parse {
                code: ErrorCode::E1003,
                message: format!("Unclosed {} in expression", open.kind.describe()),
                location: open.location.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

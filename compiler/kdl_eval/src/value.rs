//! Runtime values and operator semantics.

use std::fmt;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_ir::{Lexeme, LexemeKind, Location, ResourceReference};

/// The result of evaluating an expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Value {
    Integer(i64),
    Percentage(i64),
    String(String),
    Bool(bool),
    Reference(ResourceReference),
    /// A bare name that did not resolve to a variable.
    Identifier(String),
    /// Raw bytes, typically file contents.
    Data(Vec<u8>),
    /// Field assignments produced by a type constructor.
    Compound(Vec<(String, Value)>),
}

impl Value {
    /// Convert a literal lexeme. Returns `None` for non-literal kinds.
    pub fn from_lexeme(lexeme: &Lexeme) -> Option<Value> {
        match lexeme.kind {
            LexemeKind::Integer => lexeme.integer_value().map(Value::Integer),
            LexemeKind::Percentage => lexeme.integer_value().map(Value::Percentage),
            LexemeKind::String => Some(Value::String(lexeme.text.clone())),
            LexemeKind::Reference => lexeme.reference().map(Value::Reference),
            LexemeKind::Identifier => Some(match lexeme.text.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                name => Value::Identifier(name.to_string()),
            }),
            _ => None,
        }
    }

    /// Turn the value back into a lexeme so it can be pushed onto a stream.
    pub fn to_lexeme(&self, location: &Location) -> CompileResult<Lexeme> {
        let (kind, text) = match self {
            Value::Integer(v) => (LexemeKind::Integer, v.to_string()),
            Value::Percentage(v) => (LexemeKind::Percentage, v.to_string()),
            Value::String(s) => (LexemeKind::String, s.clone()),
            Value::Bool(b) => (LexemeKind::Identifier, b.to_string()),
            Value::Reference(r) => (
                LexemeKind::Reference,
                r.to_string().trim_start_matches('#').to_string(),
            ),
            Value::Identifier(name) => (LexemeKind::Identifier, name.clone()),
            Value::Data(_) | Value::Compound(_) => {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2005,
                    format!("A {} value cannot be written back as a lexeme", self.type_name()),
                    location,
                ));
            }
        };
        Ok(Lexeme::new(kind, text, location.clone()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Percentage(_) => "percentage",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Reference(_) => "reference",
            Value::Identifier(_) => "identifier",
            Value::Data(_) => "data",
            Value::Compound(_) => "compound",
        }
    }

    /// Integer view of integers, percentages and booleans.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) | Value::Percentage(v) => Some(*v),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Identifier(s) => Some(s),
            _ => None,
        }
    }

    /// Plain text form, used for concatenation and name extensions.
    pub fn text(&self) -> String {
        match self {
            Value::Integer(v) | Value::Percentage(v) => v.to_string(),
            Value::String(s) | Value::Identifier(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Reference(r) => r.to_string(),
            Value::Data(bytes) => bytes.iter().map(|b| format!("{b:02X}")).collect(),
            Value::Compound(fields) => fields
                .iter()
                .map(|(name, value)| format!("{name}={}", value.text()))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Apply a binary operator.
    pub fn binary(op: LexemeKind, lhs: &Value, rhs: &Value) -> CompileResult<Value> {
        if op == LexemeKind::Plus
            && (matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)))
        {
            return Ok(Value::String(format!("{}{}", lhs.text(), rhs.text())));
        }

        if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
            match op {
                LexemeKind::Amp => return Ok(Value::Bool(*a && *b)),
                LexemeKind::Pipe => return Ok(Value::Bool(*a || *b)),
                LexemeKind::Caret => return Ok(Value::Bool(*a ^ *b)),
                _ => {}
            }
        }

        let (Some(a), Some(b)) = (lhs.as_integer(), rhs.as_integer()) else {
            return Err(CompileError::semantic(
                ErrorCode::E2005,
                format!(
                    "Incompatible operands for {}: {} and {}",
                    op.describe(),
                    lhs.type_name(),
                    rhs.type_name()
                ),
            ));
        };

        let overflow = || {
            CompileError::semantic(
                ErrorCode::E2005,
                format!("Arithmetic overflow evaluating {a} {} {b}", op.describe()),
            )
        };

        let result = match op {
            LexemeKind::Plus => a.checked_add(b).ok_or_else(overflow)?,
            LexemeKind::Minus => a.checked_sub(b).ok_or_else(overflow)?,
            LexemeKind::Star => a.checked_mul(b).ok_or_else(overflow)?,
            LexemeKind::Slash => {
                if b == 0 {
                    return Err(CompileError::semantic(
                        ErrorCode::E2005,
                        format!("Division by zero evaluating {a} / {b}"),
                    ));
                }
                a.checked_div(b).ok_or_else(overflow)?
            }
            LexemeKind::Caret => a ^ b,
            LexemeKind::Pipe => a | b,
            LexemeKind::Amp => a & b,
            LexemeKind::LeftShift | LexemeKind::RightShift => {
                let shift = u32::try_from(b)
                    .ok()
                    .filter(|s| *s < 64)
                    .ok_or_else(|| {
                        CompileError::semantic(
                            ErrorCode::E2005,
                            format!("Shift amount {b} is out of range"),
                        )
                    })?;
                if op == LexemeKind::LeftShift {
                    a << shift
                } else {
                    a >> shift
                }
            }
            _ => {
                return Err(CompileError::semantic(
                    ErrorCode::E2005,
                    format!("{} is not a binary operator", op.describe()),
                ));
            }
        };

        if matches!((lhs, rhs), (Value::Percentage(_), Value::Percentage(_))) {
            Ok(Value::Percentage(result))
        } else {
            Ok(Value::Integer(result))
        }
    }

    /// Bitwise (or logical, for booleans) not.
    pub fn not(&self) -> CompileResult<Value> {
        match self {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            Value::Integer(v) => Ok(Value::Integer(!v)),
            Value::Percentage(v) => Ok(Value::Percentage(!v)),
            other => Err(CompileError::semantic(
                ErrorCode::E2005,
                format!("Cannot apply `~` to a {} value", other.type_name()),
            )),
        }
    }

    pub fn negate(&self) -> CompileResult<Value> {
        let negated = |v: i64| {
            v.checked_neg().ok_or_else(|| {
                CompileError::semantic(ErrorCode::E2005, format!("Cannot negate {v}"))
            })
        };
        match self {
            Value::Integer(v) => Ok(Value::Integer(negated(*v)?)),
            Value::Percentage(v) => Ok(Value::Percentage(negated(*v)?)),
            other => Err(CompileError::semantic(
                ErrorCode::E2005,
                format!("Cannot negate a {} value", other.type_name()),
            )),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Percentage(v) => write!(f, "{v}%"),
            Value::Data(bytes) => write!(f, "<{} bytes>", bytes.len()),
            other => f.write_str(&other.text()),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

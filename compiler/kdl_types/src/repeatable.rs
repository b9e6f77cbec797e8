//! Repetition bounds of a declared field.

use std::ops::RangeInclusive;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_ir::Location;

use crate::BinaryField;

/// `repeatable<lower, upper>`, `repeatable<upper>` or `repeatable<Count>`.
///
/// With a count field the field is a counted list: it starts empty and
/// every declaration statement appends one entry, up to `upper - lower + 1`
/// entries.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Repeatable {
    lower: i64,
    upper: i64,
    count_field: Option<String>,
}

impl Repeatable {
    pub fn new(lower: i64, upper: i64, location: &Location) -> CompileResult<Self> {
        if lower > upper {
            return Err(CompileError::semantic_at(
                ErrorCode::E2003,
                format!("Repeatable lower bound {lower} is greater than its upper bound {upper}"),
                location,
            ));
        }
        Ok(Repeatable {
            lower,
            upper,
            count_field: None,
        })
    }

    /// Bounds inferred from the width of the count field: `1` to
    /// `2^(8 * width)`.
    ///
    /// The upper bound is one past the largest count the field can hold;
    /// the encoder rejects a count that does not fit.
    pub fn inferred(count_field: &BinaryField) -> Self {
        let bits = count_field.data_type.base_size().saturating_mul(8);
        let upper = if bits < 63 { 1i64 << bits } else { i64::MAX };
        Repeatable {
            lower: 1,
            upper,
            count_field: Some(count_field.label.clone()),
        }
    }

    #[must_use]
    pub fn with_count_field(mut self, label: impl Into<String>) -> Self {
        self.count_field = Some(label.into());
        self
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    pub fn count_field(&self) -> Option<&str> {
        self.count_field.as_deref()
    }

    pub fn has_count_field(&self) -> bool {
        self.count_field.is_some()
    }

    /// Number of repetitions the bounds allow.
    pub fn capacity(&self) -> i64 {
        self.upper.saturating_sub(self.lower).saturating_add(1)
    }

    /// Every `FieldNumber` of a literal repeatable.
    pub fn field_numbers(&self) -> RangeInclusive<i64> {
        self.lower..=self.upper
    }

    /// The `FieldNumber` of the repetition at `index`, if the bounds
    /// allow it.
    pub fn field_number(&self, index: usize) -> Option<i64> {
        let offset = i64::try_from(index).ok()?;
        let number = self.lower.checked_add(offset)?;
        (number <= self.upper).then_some(number)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::DataType;

    #[test]
    fn test_bounds() {
        let r = Repeatable::new(1, 4, &Location::synthesized()).unwrap();
        assert_eq!(r.capacity(), 4);
        assert_eq!(r.field_numbers().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(r.field_number(0), Some(1));
        assert_eq!(r.field_number(3), Some(4));
        assert_eq!(r.field_number(4), None);
        assert!(!r.has_count_field());
    }

    #[test]
    fn test_inverted_bounds() {
        let err = Repeatable::new(5, 2, &Location::synthesized()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E2003);
        assert_eq!(err.message(), "Repeatable lower bound 5 is greater than its upper bound 2");
    }

    #[test]
    fn test_inferred_from_count_field() {
        let r = Repeatable::inferred(&BinaryField::new("Count", DataType::Ocnt));
        assert_eq!((r.lower(), r.upper()), (1, 65_536));
        assert_eq!(r.count_field(), Some("Count"));

        let r = Repeatable::inferred(&BinaryField::new("Count", DataType::Hbyt));
        assert_eq!(r.upper(), 256);

        let r = Repeatable::inferred(&BinaryField::new("Count", DataType::Dqad));
        assert_eq!(r.upper(), i64::MAX);
    }

    proptest! {
        #[test]
        fn balanced_bounds_yield_every_repetition(lower in -1000i64..1000, span in 0i64..500) {
            let upper = lower + span;
            let r = Repeatable::new(lower, upper, &Location::synthesized()).unwrap();
            let numbers: Vec<i64> = r.field_numbers().collect();
            prop_assert_eq!(i64::try_from(numbers.len()).unwrap(), upper - lower + 1);
            prop_assert_eq!(r.capacity(), upper - lower + 1);
            let mut distinct = numbers.clone();
            distinct.dedup();
            prop_assert_eq!(distinct, numbers);
        }

        #[test]
        fn inferred_bound_is_two_to_the_width(width in 1usize..=4) {
            let data_type = match width {
                1 => DataType::Hbyt,
                2 => DataType::Hwrd,
                _ => DataType::Hlng,
            };
            let r = Repeatable::inferred(&BinaryField::new("Count", data_type));
            prop_assert_eq!(r.upper(), 1i64 << (data_type.base_size() * 8));
            prop_assert_eq!(r.lower(), 1);
        }
    }
}

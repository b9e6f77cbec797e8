//! Binary templates: the ordered byte layout of a resource type.

use std::ops::Range;

use rustc_hash::FxHashMap;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_ir::Location;

use crate::DataType;

/// One field of a binary template.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BinaryField {
    pub label: String,
    pub data_type: DataType,
    /// The inlined type for `Nested<T>` and `RECT` fields.
    pub nested_type: Option<String>,
    pub location: Location,
}

impl BinaryField {
    pub fn new(label: impl Into<String>, data_type: DataType) -> Self {
        BinaryField {
            label: label.into(),
            data_type,
            nested_type: None,
            location: Location::synthesized(),
        }
    }

    #[must_use]
    pub fn nesting(mut self, type_name: impl Into<String>) -> Self {
        self.nested_type = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn at(mut self, location: &Location) -> Self {
        self.location = location.clone();
        self
    }
}

/// A counted list: the count field, the `LSTC`/`LSTE` markers, and the
/// fields that make up one entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ListRegion {
    /// Index of the field holding the entry count.
    pub count: usize,
    /// Indices of the entry fields, between the two markers.
    pub members: Range<usize>,
}

impl ListRegion {
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }
}

/// The ordered binary layout of a type.
#[derive(Clone, Default, Debug)]
pub struct BinaryTemplate {
    fields: Vec<BinaryField>,
    index: FxHashMap<String, usize>,
}

impl BinaryTemplate {
    pub fn new() -> Self {
        BinaryTemplate::default()
    }

    /// Append a field. `LSTE` markers reuse their `LSTC` label; any other
    /// repeated label is an error.
    pub fn add_field(&mut self, field: BinaryField) -> CompileResult<()> {
        if field.data_type != DataType::Lste && self.index.contains_key(&field.label) {
            return Err(CompileError::semantic_at(
                ErrorCode::E2006,
                format!("Binary template already has a field named '{}'", field.label),
                &field.location,
            ));
        }
        if field.data_type != DataType::Lste {
            self.index.insert(field.label.clone(), self.fields.len());
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn fields(&self) -> &[BinaryField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_field(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn index(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn at(&self, index: usize) -> Option<&BinaryField> {
        self.fields.get(index)
    }

    pub fn get(&self, label: &str) -> Option<&BinaryField> {
        self.index(label).and_then(|i| self.fields.get(i))
    }

    /// Look up a field, failing with a positioned error.
    pub fn named(&self, label: &str, location: &Location) -> CompileResult<&BinaryField> {
        self.get(label).ok_or_else(|| {
            CompileError::semantic_at(
                ErrorCode::E2001,
                format!("Field name '{label}' does not match any binary template fields."),
                location,
            )
        })
    }

    /// Fields whose label starts with `base`, used to check name-extended
    /// field values such as `Weapon<$FieldNumber>`.
    pub fn candidates(&self, base: &str) -> Vec<&BinaryField> {
        self.fields
            .iter()
            .filter(|f| !f.data_type.is_list_marker() && f.label.starts_with(base))
            .collect()
    }

    /// The list counted by `count_label`: the count field must be directly
    /// followed by an `LSTC` marker, which is closed by the `LSTE` marker
    /// with the same label.
    pub fn list_region(&self, count_label: &str) -> Option<ListRegion> {
        let count = self.index(count_label)?;
        let start = self.fields.get(count + 1)?;
        if start.data_type != DataType::Lstc {
            return None;
        }
        let end = self.fields[count + 2..]
            .iter()
            .position(|f| f.data_type == DataType::Lste && f.label == start.label)?;
        Some(ListRegion {
            count,
            members: count + 2..count + 2 + end,
        })
    }

    /// The list region `index` belongs to, if any.
    pub fn enclosing_list(&self, index: usize) -> Option<ListRegion> {
        self.fields[..index.min(self.fields.len())]
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, f)| f.data_type == DataType::Lstc)
            .find_map(|(i, _)| {
                let count = i.checked_sub(1)?;
                self.list_region(&self.fields[count].label)
            })
            .filter(|region| region.contains(index))
    }

    /// Check that every `LSTC` has a matching `LSTE` after it and is preceded
    /// by its count field.
    pub fn validate(&self) -> CompileResult<()> {
        let mut open: Vec<&BinaryField> = Vec::new();
        for (i, field) in self.fields.iter().enumerate() {
            match field.data_type {
                DataType::Lstc => {
                    let counted = i
                        .checked_sub(1)
                        .and_then(|c| self.fields.get(c))
                        .is_some_and(|c| c.data_type.is_integer());
                    if !counted {
                        return Err(CompileError::semantic_at(
                            ErrorCode::E2003,
                            format!(
                                "List '{}' must directly follow the integer field that counts its entries",
                                field.label
                            ),
                            &field.location,
                        ));
                    }
                    open.push(field);
                }
                DataType::Lste => match open.pop() {
                    Some(start) if start.label == field.label => {}
                    _ => {
                        return Err(CompileError::semantic_at(
                            ErrorCode::E2003,
                            format!("LSTE '{}' does not close an open list", field.label),
                            &field.location,
                        ));
                    }
                },
                _ => {}
            }
        }
        match open.pop() {
            Some(start) => Err(CompileError::semantic_at(
                ErrorCode::E2003,
                format!("List '{}' is never closed by a matching LSTE", start.label),
                &start.location,
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

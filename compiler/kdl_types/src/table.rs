//! The registry of types known to a compile session.

use rustc_hash::FxHashMap;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_ir::Location;
use kdl_rsrc::TypeCode;

use crate::TypeDefinition;

/// Type definitions in registration order, indexed by name.
#[derive(Clone, Default, Debug)]
pub struct TypeTable {
    types: Vec<TypeDefinition>,
    index: FxHashMap<String, usize>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable::default()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = definition.name()))]
    pub fn register(&mut self, definition: TypeDefinition) -> CompileResult<()> {
        if self.index.contains_key(definition.name()) {
            return Err(CompileError::semantic_at(
                ErrorCode::E2006,
                format!("Type `{}` is already defined", definition.name()),
                definition.location(),
            ));
        }
        tracing::debug!(code = %definition.code(), fields = definition.fields().len(), "registered type");
        self.index.insert(definition.name().to_string(), self.types.len());
        self.types.push(definition);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.index.get(name).and_then(|&i| self.types.get(i))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeDefinition> {
        self.index.get(name).and_then(|&i| self.types.get_mut(i))
    }

    /// Look up a type, failing with a positioned error.
    pub fn named(&self, name: &str, location: &Location) -> CompileResult<&TypeDefinition> {
        self.get(name).ok_or_else(|| unknown_type(name, location))
    }

    pub fn named_mut(&mut self, name: &str, location: &Location) -> CompileResult<&mut TypeDefinition> {
        match self.index.get(name) {
            Some(&i) => self.types.get_mut(i).ok_or_else(|| unknown_type(name, location)),
            None => Err(unknown_type(name, location)),
        }
    }

    /// The first type registered with `code`.
    pub fn by_code(&self, code: TypeCode) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.code() == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn unknown_type(name: &str, location: &Location) -> CompileError {
    CompileError::semantic_at(
        ErrorCode::E2001,
        format!("Unrecognised type `{name}` referenced"),
        location,
    )
}

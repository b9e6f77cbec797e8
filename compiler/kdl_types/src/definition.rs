//! Type definitions: a name, a type code, a binary template and the
//! declared fields mapped onto it.

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_eval::{Expression, Function};
use kdl_ir::Location;
use kdl_rsrc::TypeCode;

use crate::decorator::names;
use crate::{BinaryTemplate, Decorators, FieldValue, Repeatable, TypeDescriptor, TypeField};

/// The first id handed out to `#auto` resources.
pub const FIRST_AUTO_ID: i64 = 128;

/// `constructor(a, b) { Field = expression; ... };`
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Constructor {
    pub params: Vec<String>,
    pub assignments: Vec<(String, Expression)>,
    pub location: Location,
}

impl Constructor {
    pub fn function(&self) -> Function {
        Function::Constructor {
            params: self.params.clone(),
            assignments: self.assignments.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypeDefinition {
    name: String,
    code: TypeCode,
    template: BinaryTemplate,
    fields: Vec<TypeField>,
    decorators: Decorators,
    constructors: Vec<Constructor>,
    next_auto_id: i64,
    location: Location,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, code: TypeCode, location: &Location) -> Self {
        TypeDefinition {
            name: name.into(),
            code,
            template: BinaryTemplate::new(),
            fields: Vec::new(),
            decorators: Decorators::default(),
            constructors: Vec::new(),
            next_auto_id: FIRST_AUTO_ID,
            location: location.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> TypeCode {
        self.code
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn template(&self) -> &BinaryTemplate {
        &self.template
    }

    pub fn set_template(&mut self, template: BinaryTemplate) {
        self.template = template;
    }

    pub fn decorators(&self) -> &Decorators {
        &self.decorators
    }

    pub fn set_decorators(&mut self, decorators: Decorators) {
        self.decorators = decorators;
    }

    pub fn is_builtin(&self) -> bool {
        self.decorators.has(names::BUILTIN)
    }

    pub fn fields(&self) -> &[TypeField] {
        &self.fields
    }

    pub fn add_field(&mut self, field: TypeField) -> CompileResult<()> {
        if self.fields.iter().any(|f| f.name == field.name) {
            return Err(CompileError::semantic_at(
                ErrorCode::E2006,
                format!("Field `{}` is already defined in type `{}`", field.name, self.name),
                &field.location,
            ));
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn field_named(&self, name: &str, location: &Location) -> CompileResult<&TypeField> {
        self.fields.iter().find(|f| f.name == name).ok_or_else(|| {
            CompileError::semantic_at(
                ErrorCode::E2001,
                format!("The field '{name}' could not be found in type '{}'.", self.name),
                location,
            )
        })
    }

    pub fn add_constructor(&mut self, constructor: Constructor) {
        self.constructors.push(constructor);
    }

    /// The constructor in effect: the last one declared.
    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructors.last()
    }

    /// Declare one field per binary field for types without declared
    /// fields. A counted list becomes a single field named after its
    /// `LSTC` marker, with one value per list member.
    pub fn synthesize_fields(&mut self) -> CompileResult<()> {
        if !self.fields.is_empty() {
            return Ok(());
        }
        let template = &self.template;
        let mut fields = Vec::new();
        let mut index = 0;
        while let Some(binary) = template.at(index) {
            if let Some(region) = template.list_region(&binary.label) {
                let marker = &template.fields()[region.count + 1];
                let mut field = TypeField::new(marker.label.as_str(), &marker.location);
                field.repeatable = Some(Repeatable::inferred(binary));
                for member in &template.fields()[region.members.clone()] {
                    let descriptor = TypeDescriptor::infer(member)?;
                    field.add_value(FieldValue::new(member.label.as_str(), descriptor, &member.location));
                }
                fields.push(field);
                index = region.members.end + 1;
                continue;
            }
            if !binary.data_type.is_list_marker() {
                let mut field = TypeField::new(binary.label.as_str(), &binary.location);
                let descriptor = TypeDescriptor::infer(binary)?;
                field.add_value(FieldValue::new(binary.label.as_str(), descriptor, &binary.location));
                fields.push(field);
            }
            index += 1;
        }
        self.fields = fields;
        Ok(())
    }

    /// Hand out the next automatic id for which `taken` is false.
    ///
    /// Ids only ever increase across calls.
    pub fn allocate_id(&mut self, taken: impl Fn(i64) -> bool) -> i64 {
        let mut id = self.next_auto_id;
        while taken(id) {
            id = id.saturating_add(1);
        }
        self.next_auto_id = id.saturating_add(1);
        id
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

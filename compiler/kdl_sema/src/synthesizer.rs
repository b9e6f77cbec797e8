//! Resource instance synthesis: mapping declared field values and their
//! defaults onto binary fields.

use std::cell::RefCell;
use std::rc::Rc;

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_eval::{Expression, Scope, Value};
use kdl_ir::{LexemeKind, Location};
use kdl_types::{
    BinaryField, BinaryTemplate, DataType, DescriptorKind, FieldValue, TypeDefinition, TypeField,
    TypeTable,
};

use crate::config::AssetConverter;
use crate::instance::FieldSet;
use crate::session::{read_asset, resolve_path};
use crate::FIELD_NUMBER;

/// A default value waiting to be applied to a binary field path such as
/// `Value2` or `Frame.Top`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct PendingDefault {
    pub(crate) path: String,
    pub(crate) value: Value,
    pub(crate) location: Location,
}

pub(crate) struct Synthesizer<'a> {
    definition: &'a TypeDefinition,
    types: &'a TypeTable,
    converter: &'a dyn AssetConverter,
}

impl<'a> Synthesizer<'a> {
    pub(crate) fn new(
        definition: &'a TypeDefinition,
        types: &'a TypeTable,
        converter: &'a dyn AssetConverter,
    ) -> Self {
        Synthesizer {
            definition,
            types,
            converter,
        }
    }

    pub(crate) fn definition(&self) -> &'a TypeDefinition {
        self.definition
    }

    pub(crate) fn types(&self) -> &'a TypeTable {
        self.types
    }

    fn template(&self) -> &'a BinaryTemplate {
        self.definition.template()
    }

    fn binary(&self, label: &str, location: &Location) -> CompileResult<&'a BinaryField> {
        self.template().named(label, location)
    }

    fn nested_template(&self, binary: &BinaryField) -> CompileResult<&'a BinaryTemplate> {
        let name = binary.nested_type.as_deref().unwrap_or_default();
        Ok(self.types.named(name, &binary.location)?.template())
    }

    /// Defaults of every field outside a counted list, one set per
    /// repetition of literal repeatables.
    #[tracing::instrument(level = "trace", skip_all, fields(ty = self.definition.name()))]
    pub(crate) fn defaults(&self, scope: &Scope<'_>) -> CompileResult<Vec<PendingDefault>> {
        let mut pending = Vec::new();
        for field in self.definition.fields() {
            if field.count_field().is_some() {
                continue;
            }
            let numbers: Vec<Option<i64>> = match &field.repeatable {
                Some(repeatable) => repeatable.field_numbers().map(Some).collect(),
                None => vec![None],
            };
            for number in numbers {
                let number_scope = numbered(scope, number);
                for value in &field.values {
                    self.default_for(value, &number_scope, &mut pending)?;
                }
            }
        }
        Ok(pending)
    }

    /// Evaluate the default of `value` in a fresh scope.
    ///
    /// The default lands in the binary field of the last joined value. For
    /// a nested binary field, the variables written while evaluating (the
    /// exports of a type constructor) become the nested defaults.
    fn default_for(
        &self,
        value: &FieldValue,
        scope: &Scope<'_>,
        pending: &mut Vec<PendingDefault>,
    ) -> CompileResult<()> {
        let Some(expression) = &value.default_value else {
            return Ok(());
        };
        let target = value.chain().last().unwrap_or(value);
        let label = target.extended_name(scope);
        let binary = self.binary(&label, &target.location)?;
        let location = expression.location();

        let written = Rc::new(RefCell::new(Vec::new()));
        let result = {
            let mut default_scope = scope.shadow();
            bind_symbols(&mut default_scope, value);
            let sink = Rc::clone(&written);
            default_scope.on_change(move |variable| {
                sink.borrow_mut()
                    .push((variable.name.clone(), variable.value.clone()));
            });
            expression.evaluate(&mut default_scope)?
        };

        if binary.data_type.is_nested() {
            let nested = self.nested_template(binary)?;
            let written = std::mem::take(&mut *written.borrow_mut());
            if written.is_empty() && !matches!(result, Value::Compound(_)) {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2002,
                    format!(
                        "Default value of nested field '{label}' must be built by a type constructor"
                    ),
                    &location,
                ));
            }
            let exports = match result {
                Value::Compound(exports) if written.is_empty() => exports,
                _ => written,
            };
            for (name, value) in exports {
                if nested.has_field(&name) {
                    pending.push(PendingDefault {
                        path: format!("{label}.{name}"),
                        value,
                        location: location.clone(),
                    });
                }
            }
            return Ok(());
        }

        let value = self.prepare(target, binary, result, &location)?;
        pending.push(PendingDefault {
            path: label,
            value,
            location,
        });
        Ok(())
    }

    /// Apply one declaration statement to `target`.
    ///
    /// Expression `n` fills the field's value `n`. With `with_defaults`,
    /// values the statement leaves out take their defaults; this is how
    /// entries of a counted list are completed.
    pub(crate) fn apply(
        &self,
        target: &mut FieldSet,
        field: &TypeField,
        expressions: &[Expression],
        number: Option<i64>,
        scope: &Scope<'_>,
        with_defaults: bool,
    ) -> CompileResult<()> {
        if expressions.len() > field.values.len() {
            let location = expressions
                .get(field.values.len())
                .map_or_else(|| field.location.clone(), Expression::location);
            return Err(CompileError::semantic_at(
                ErrorCode::E2005,
                format!(
                    "Field '{}' takes {} value{} but {} were given",
                    field.name,
                    field.values.len(),
                    if field.values.len() == 1 { "" } else { "s" },
                    expressions.len()
                ),
                &location,
            ));
        }

        let number_scope = numbered(scope, number);
        for (index, value) in field.values.iter().enumerate() {
            match expressions.get(index) {
                Some(expression) => self.assign(target, value, expression, &number_scope)?,
                None if with_defaults => {
                    let mut pending = Vec::new();
                    self.default_for(value, &number_scope, &mut pending)?;
                    for default in pending {
                        target.assign(&default.path, default.value, &default.location)?;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Evaluate `expression` for `value` and store the result.
    ///
    /// A lone symbol of a joined value selects that value's binary field.
    /// Otherwise the result goes to the first value of the chain whose
    /// binary field can hold it.
    fn assign(
        &self,
        target: &mut FieldSet,
        value: &FieldValue,
        expression: &Expression,
        scope: &Scope<'_>,
    ) -> CompileResult<()> {
        let location = expression.location();
        if let [lexeme] = expression.lexemes() {
            if lexeme.is(LexemeKind::Identifier) {
                if let Some((index, symbol)) = value.joined_value_for(&lexeme.text) {
                    let resolved = symbol.value().ok_or_else(|| {
                        CompileError::semantic_at(
                            ErrorCode::E2005,
                            format!("Symbol `{}` does not have a literal value", symbol.name),
                            &location,
                        )
                    })?;
                    let joined = value.joined.get(index).unwrap_or(value);
                    return self.store(target, joined, resolved, scope, &location);
                }
            }
        }

        let result = {
            let mut value_scope = scope.shadow();
            bind_symbols(&mut value_scope, value);
            expression.evaluate(&mut value_scope)?
        };
        if let Value::Identifier(name) = &result {
            return Err(unrecognised_symbol(name, value, &location));
        }

        for candidate in value.chain() {
            let binary = self.binary(&candidate.extended_name(scope), &candidate.location)?;
            if accepts(binary.data_type, candidate, &result) {
                return self.store(target, candidate, result, scope, &location);
            }
        }
        let binary = self.binary(&value.extended_name(scope), &value.location)?;
        Err(CompileError::semantic_at(
            ErrorCode::E2002,
            format!(
                "Binary field '{}' is {}, which cannot store a value of type `{}`",
                binary.label,
                binary.data_type,
                result.type_name()
            ),
            &location,
        ))
    }

    fn store(
        &self,
        target: &mut FieldSet,
        value: &FieldValue,
        result: Value,
        scope: &Scope<'_>,
        location: &Location,
    ) -> CompileResult<()> {
        let label = value.extended_name(scope);
        let binary = self.binary(&label, &value.location)?;
        if let Value::Compound(exports) = result {
            let nested = target.nested_mut(&label, location)?;
            for (name, export) in exports {
                nested.assign(&name, export, location)?;
            }
            return Ok(());
        }
        let result = self.prepare(value, binary, result, location)?;
        target.assign(&label, result, location)
    }

    /// Check a value against its descriptor, loading and converting assets.
    fn prepare(
        &self,
        value: &FieldValue,
        binary: &BinaryField,
        result: Value,
        location: &Location,
    ) -> CompileResult<Value> {
        match &result {
            Value::Identifier(name) => return Err(unrecognised_symbol(name, value, location)),
            Value::Reference(reference) if reference.is_auto() => {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2005,
                    format!("An #auto reference cannot be stored in binary field '{}'", binary.label),
                    location,
                ));
            }
            _ => {}
        }

        let descriptor = &value.descriptor;
        match descriptor.kind() {
            DescriptorKind::Range => {
                if let Some(integer) = result.as_integer() {
                    descriptor.check_range(integer, &binary.label, location)?;
                }
                Ok(result)
            }
            DescriptorKind::File | DescriptorKind::Image | DescriptorKind::Sound => {
                let mut data = match result {
                    Value::String(path) => read_asset(&resolve_path(location, &path))?,
                    Value::Data(data) => data,
                    other => return Ok(other),
                };
                if let Some(conversion) = descriptor.conversion()? {
                    tracing::debug!(%conversion, field = %binary.label, "converting asset");
                    data = self
                        .converter
                        .convert(conversion, data)
                        .map_err(|e| e.located(location))?;
                }
                Ok(Value::Data(data))
            }
            _ => Ok(result),
        }
    }
}

/// A child scope with `FieldNumber` bound when `number` is given.
fn numbered<'s>(scope: &'s Scope<'_>, number: Option<i64>) -> Scope<'s> {
    let mut number_scope = scope.shadow();
    if let Some(number) = number {
        number_scope.add_variable(FIELD_NUMBER, Value::Integer(number));
    }
    number_scope
}

/// Bind the symbols of `value` and its joined values as constants. The
/// first binding of a name wins.
fn bind_symbols(scope: &mut Scope<'_>, value: &FieldValue) {
    for symbol in value.chain().flat_map(|v| v.symbols.iter()) {
        if let Some(symbol_value) = symbol.value() {
            scope.add_constant(symbol.name.as_str(), symbol_value);
        }
    }
}

/// Whether a binary field of tag `data_type` can hold `result`.
fn accepts(data_type: DataType, value: &FieldValue, result: &Value) -> bool {
    let is_asset = matches!(
        value.descriptor.kind(),
        DescriptorKind::File | DescriptorKind::Image | DescriptorKind::Sound
    );
    match result {
        Value::Integer(_) | Value::Percentage(_) | Value::Bool(_) => data_type.is_integer(),
        Value::String(_) => data_type.is_string() || data_type == DataType::Hexd || is_asset,
        Value::Reference(_) => data_type == DataType::Rsrc || data_type.is_integer(),
        Value::Data(_) => data_type == DataType::Hexd || data_type.is_string(),
        Value::Compound(_) => data_type.is_nested(),
        Value::Identifier(_) => false,
    }
}

fn unrecognised_symbol(name: &str, value: &FieldValue, location: &Location) -> CompileError {
    CompileError::semantic_at(
        ErrorCode::E2001,
        format!("Unrecognised symbol `{name}` for field value '{}'", value.base_name),
        location,
    )
}

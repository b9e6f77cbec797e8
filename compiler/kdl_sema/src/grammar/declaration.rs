//! Resource declarations.
//!
//! ```text
//! declare [Namespace.]Type {
//!     new (#128, "Name") { Field = value value; Other: value; };
//!     override (#128) { Field = 5; };
//!     duplicate (#128, #200, "Copy") { };
//! };
//! ```

use kdl_diagnostic::{CompileError, CompileResult, Diagnostic, ErrorCode};
use kdl_eval::{Expression, Scope, Value};
use kdl_ir::{Lexeme, LexemeKind, LexemeStream, ResourceReference};
use kdl_types::{Decorators, TypeField};
use rustc_hash::FxHashMap;

use super::decorator::parse_decorators;
use crate::instance::{FieldSet, ResourceInstance};
use crate::parser::{expect, expect_keyword, expect_semi, skip_block, unclosed, Parser};
use crate::synthesizer::Synthesizer;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Action {
    New,
    Override,
    Duplicate,
}

impl Action {
    fn keyword(self) -> &'static str {
        match self {
            Action::New => "new",
            Action::Override => "override",
            Action::Duplicate => "duplicate",
        }
    }
}

/// The evaluated `(#id, "name")` argument list of a resource.
#[derive(Default)]
struct Arguments {
    references: Vec<ResourceReference>,
    name: Option<String>,
}

impl Arguments {
    fn id(&self, index: usize) -> Option<i64> {
        self.references.get(index).and_then(|r| r.id)
    }
}

impl Parser<'_> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn parse_declaration(
        &mut self,
        decorators: &Decorators,
        scope: &mut Scope<'_>,
    ) -> CompileResult<()> {
        expect_keyword(&mut self.stream, "declare")?;
        let first = expect(&mut self.stream, LexemeKind::Identifier, "a type name")?;
        let (namespace, type_lexeme) = if self.stream.consume(LexemeKind::Dot).is_some() {
            let name = expect(&mut self.stream, LexemeKind::Identifier, "a type name")?;
            (Some(first.text), name)
        } else {
            (None, first)
        };
        self.state.types.named(&type_lexeme.text, &type_lexeme.location)?;

        if !self.definitions_admit(decorators) {
            tracing::debug!(ty = %type_lexeme.text, "declaration excluded by its conditions");
            return skip_block(&mut self.stream);
        }

        let open = expect(&mut self.stream, LexemeKind::LBrace, "`{`")?;
        loop {
            let decorators = parse_decorators(&mut self.stream)?;
            let lexeme = self.stream.peek().clone();
            match lexeme.kind {
                LexemeKind::RBrace if decorators.is_empty() => {
                    self.stream.read();
                    break;
                }
                LexemeKind::Keyword
                    if matches!(lexeme.text.as_str(), "new" | "override" | "duplicate") =>
                {
                    self.parse_resource(&type_lexeme.text, namespace.as_deref(), &decorators, scope)?;
                }
                LexemeKind::Eof => return Err(unclosed("declaration", &open)),
                _ => {
                    return Err(CompileError::unexpected(
                        "Expected `new`, `override` or `duplicate` in declaration",
                        &lexeme,
                    ));
                }
            }
        }
        expect_semi(&mut self.stream)?;
        Ok(())
    }

    fn parse_resource(
        &mut self,
        type_name: &str,
        namespace: Option<&str>,
        decorators: &Decorators,
        scope: &mut Scope<'_>,
    ) -> CompileResult<()> {
        let keyword = self.stream.read();
        let action = match keyword.text.as_str() {
            "override" => Action::Override,
            "duplicate" => Action::Duplicate,
            _ => Action::New,
        };
        if !self.definitions_admit(decorators) {
            tracing::debug!(ty = type_name, action = action.keyword(), "resource excluded by its conditions");
            skip_arguments(&mut self.stream)?;
            return skip_block(&mut self.stream);
        }
        let arguments = parse_arguments(&mut self.stream, scope)?;

        let (mut instance, position) = self.resolve_instance(type_name, namespace, action, &arguments, &keyword)?;
        tracing::debug!(
            ty = type_name,
            id = instance.id,
            action = action.keyword(),
            "declaring resource"
        );

        let mut instance_scope = scope.shadow();
        instance_scope.add_constant("id", Value::Reference(instance.reference()));
        instance_scope.add_constant("name", Value::String(instance.name.clone()));

        let types = &self.state.types;
        let definition = types.named(type_name, &keyword.location)?;
        let synthesizer = Synthesizer::new(definition, types, &*self.state.config.converter);

        let open = expect(&mut self.stream, LexemeKind::LBrace, "`{`")?;
        if action == Action::New {
            for default in synthesizer.defaults(&instance_scope)? {
                match default.value.to_lexeme(&default.location) {
                    Ok(value) => self.stream.push([
                        Lexeme::new(LexemeKind::FieldDefault, default.path, default.location.clone()),
                        value,
                        Lexeme::new(LexemeKind::Semi, ";", default.location),
                    ]),
                    Err(_) => instance.fields.assign(&default.path, default.value, &default.location)?,
                }
            }
        }

        let mut repetitions: FxHashMap<String, usize> = FxHashMap::default();
        loop {
            let lexeme = self.stream.peek().clone();
            match lexeme.kind {
                LexemeKind::RBrace => {
                    self.stream.read();
                    break;
                }
                LexemeKind::FieldDefault => {
                    self.stream.read();
                    let value = self.stream.read();
                    expect_semi(&mut self.stream)?;
                    let value = Value::from_lexeme(&value).ok_or_else(|| {
                        CompileError::unexpected("Expected a literal default value", &value)
                    })?;
                    instance.fields.assign(&lexeme.text, value, &lexeme.location)?;
                }
                LexemeKind::Identifier => {
                    let field = definition.field_named(&lexeme.text, &lexeme.location)?;
                    let statement = parse_statement(&mut self.stream)?;
                    if field.is_deprecated() {
                        tracing::debug!(ty = type_name, field = %field.name, "deprecated field assigned");
                        self.state.warnings.push(
                            Diagnostic::warning(ErrorCode::W2001)
                                .with_message(format!(
                                    "Field '{}' of type {type_name} is deprecated",
                                    field.name
                                ))
                                .with_label(lexeme.location.clone(), "deprecated field assigned here")
                                .with_suggestion("remove the assignment"),
                        );
                    }
                    apply_statement(
                        &synthesizer,
                        &mut instance,
                        field,
                        &statement,
                        &mut repetitions,
                        &instance_scope,
                        &lexeme,
                    )?;
                }
                LexemeKind::Eof => return Err(unclosed("resource body", &open)),
                _ => {
                    return Err(CompileError::unexpected(
                        "Expected a field name or `}` in resource body",
                        &lexeme,
                    ));
                }
            }
        }
        expect_semi(&mut self.stream)?;

        match position {
            Some(index) => self.state.instances.insert(index, instance),
            None => self.state.instances.push(instance),
        }
        Ok(())
    }

    /// The instance a resource statement works on and, for `override`, the
    /// position it is taken from.
    fn resolve_instance(
        &mut self,
        type_name: &str,
        namespace: Option<&str>,
        action: Action,
        arguments: &Arguments,
        keyword: &Lexeme,
    ) -> CompileResult<(ResourceInstance, Option<usize>)> {
        let missing = || {
            CompileError::semantic_at(
                ErrorCode::E2004,
                format!("Attempting to {} resource that does not exist.", action.keyword()),
                &keyword.location,
            )
        };

        match action {
            Action::New => {
                let id = self.claim_id(type_name, namespace, arguments.id(0), keyword)?;
                let types = &self.state.types;
                let definition = types.named(type_name, &keyword.location)?;
                let name = arguments.name.clone().unwrap_or_default();
                let instance = ResourceInstance::new(
                    definition,
                    namespace.map(str::to_string),
                    id,
                    name,
                    &keyword.location,
                    types,
                )?;
                Ok((instance, None))
            }
            Action::Override => {
                let id = arguments.id(0).ok_or_else(missing)?;
                let index = self
                    .state
                    .instance_index(type_name, namespace, id)
                    .ok_or_else(missing)?;
                let mut instance = self.state.instances.remove(index);
                instance.location.clone_from(&keyword.location);
                if let Some(name) = &arguments.name {
                    instance.name.clone_from(name);
                }
                Ok((instance, Some(index)))
            }
            Action::Duplicate => {
                let source = arguments.id(0).ok_or_else(missing)?;
                let index = self
                    .state
                    .instance_index(type_name, namespace, source)
                    .ok_or_else(missing)?;
                let id = self.claim_id(type_name, namespace, arguments.id(1), keyword)?;
                let mut instance = self.state.instances[index].clone();
                instance.id = id;
                instance.location.clone_from(&keyword.location);
                if let Some(name) = &arguments.name {
                    instance.name.clone_from(name);
                }
                Ok((instance, None))
            }
        }
    }

    /// Check an explicit id is free, or allocate the next automatic one.
    fn claim_id(
        &mut self,
        type_name: &str,
        namespace: Option<&str>,
        id: Option<i64>,
        keyword: &Lexeme,
    ) -> CompileResult<i64> {
        if let Some(id) = id {
            if self.state.instance_index(type_name, namespace, id).is_some() {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2004,
                    format!("Resource #{id} of type {type_name} already exists."),
                    &keyword.location,
                ));
            }
            return Ok(id);
        }
        let state = &mut *self.state;
        let instances = &state.instances;
        let definition = state.types.named_mut(type_name, &keyword.location)?;
        Ok(definition.allocate_id(|id| instances.iter().any(|i| i.is(type_name, namespace, id))))
    }
}

/// `( expression, ... )` evaluated in `scope`. References give ids, a
/// string gives the resource name.
fn parse_arguments(stream: &mut LexemeStream, scope: &mut Scope<'_>) -> CompileResult<Arguments> {
    let mut arguments = Arguments::default();
    let Some(open) = stream.consume(LexemeKind::LParen) else {
        return Ok(arguments);
    };
    if stream.consume(LexemeKind::RParen).is_some() {
        return Ok(arguments);
    }
    loop {
        let expression = Expression::compile(stream)?;
        match expression.evaluate(scope)? {
            Value::Reference(reference) => arguments.references.push(reference),
            Value::Integer(id) => arguments.references.push(ResourceReference::with_id(id)),
            Value::String(name) => arguments.name = Some(name),
            other => {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2005,
                    format!("Resource arguments must be references or a name, found a {}", other.type_name()),
                    &expression.location(),
                ));
            }
        }
        if stream.consume(LexemeKind::RParen).is_some() {
            return Ok(arguments);
        }
        if stream.expect(LexemeKind::Eof) {
            return Err(unclosed("argument list", &open));
        }
        expect(stream, LexemeKind::Comma, "`,` or `)`")?;
    }
}

/// Step over a `( ... )` argument list, if present, without evaluating it.
fn skip_arguments(stream: &mut LexemeStream) -> CompileResult<()> {
    let Some(open) = stream.consume(LexemeKind::LParen) else {
        return Ok(());
    };
    let mut depth = 1usize;
    while depth > 0 {
        match stream.read().kind {
            LexemeKind::LParen | LexemeKind::ExprOpen => depth += 1,
            LexemeKind::RParen => depth -= 1,
            LexemeKind::Eof => return Err(unclosed("argument list", &open)),
            _ => {}
        }
    }
    Ok(())
}

/// `Name = value value ...;` or `Name: value ...;`
fn parse_statement(stream: &mut LexemeStream) -> CompileResult<Vec<Expression>> {
    stream.read();
    if stream.consume(LexemeKind::Equals).is_none() {
        expect(stream, LexemeKind::Colon, "`=` or `:`")?;
    }
    let mut expressions = Vec::new();
    while stream.consume(LexemeKind::Semi).is_none() {
        expressions.push(Expression::compile(stream)?);
    }
    Ok(expressions)
}

/// Route a statement to its field: a new list entry for count driven
/// repeatables, the next repetition for literal ones, or the field itself.
fn apply_statement(
    synthesizer: &Synthesizer<'_>,
    instance: &mut ResourceInstance,
    field: &TypeField,
    expressions: &[Expression],
    repetitions: &mut FxHashMap<String, usize>,
    scope: &Scope<'_>,
    lexeme: &Lexeme,
) -> CompileResult<()> {
    let Some(repeatable) = &field.repeatable else {
        return synthesizer.apply(&mut instance.fields, field, expressions, None, scope, false);
    };

    let too_many = |capacity: i64| {
        CompileError::semantic_at(
            ErrorCode::E2003,
            format!("Field '{}' may be repeated at most {capacity} times", field.name),
            &lexeme.location,
        )
    };

    if let Some(count_label) = repeatable.count_field() {
        let definition = synthesizer.definition();
        let region = definition.template().list_region(count_label).ok_or_else(|| {
            CompileError::semantic_at(
                ErrorCode::E2003,
                format!("Count field '{count_label}' is not followed by a list"),
                &lexeme.location,
            )
        })?;
        let entries = instance.fields.list(count_label).len();
        let number = repeatable
            .field_number(entries)
            .ok_or_else(|| too_many(repeatable.capacity()))?;
        let mut entry = FieldSet::entry(definition, &region, synthesizer.types())?;
        synthesizer.apply(&mut entry, field, expressions, Some(number), scope, true)?;
        instance.fields.list_mut(count_label, &lexeme.location)?.push(entry);
        return Ok(());
    }

    let count = repetitions.entry(field.name.clone()).or_default();
    let number = repeatable
        .field_number(*count)
        .ok_or_else(|| too_many(repeatable.capacity()))?;
    *count += 1;
    synthesizer.apply(&mut instance.fields, field, expressions, Some(number), scope, false)
}

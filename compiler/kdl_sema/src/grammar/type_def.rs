//! Type definitions.
//!
//! ```text
//! type Name : "CODE" {
//!     template { DWRD Value; Nested<Other> Child; ... };
//!     field("Name") repeatable<1, 4> { Value<$FieldNumber> as Integer = 0; };
//!     constructor(a) { Value = $a; };
//! };
//! ```

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_eval::{Expression, Scope};
use kdl_ir::{Lexeme, LexemeKind, LexemeStream, Location};
use kdl_rsrc::TypeCode;
use kdl_types::{
    decorator_names, BinaryField, BinaryTemplate, Constructor, DataType, Decorators, FieldValue,
    Repeatable, Symbol, TypeDefinition, TypeDescriptor, TypeField, TypeTable,
};

use super::decorator::parse_decorators;
use crate::parser::{expect, expect_keyword, expect_semi, lexeme_list, skip_block, unclosed, Parser};

/// The type every `RECT` binary field nests.
const RECT_TYPE: &str = "Rect";

const HINT_KINDS: &[LexemeKind] = &[
    LexemeKind::Identifier,
    LexemeKind::Integer,
    LexemeKind::Percentage,
    LexemeKind::Reference,
    LexemeKind::String,
];

impl Parser<'_> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn parse_type_definition(
        &mut self,
        decorators: Decorators,
        scope: &mut Scope<'_>,
    ) -> CompileResult<()> {
        expect_keyword(&mut self.stream, "type")?;
        let name = expect(&mut self.stream, LexemeKind::Identifier, "a type name")?;
        expect(&mut self.stream, LexemeKind::Colon, "`:` followed by a type code")?;
        let code_lexeme = expect(&mut self.stream, LexemeKind::String, "a type code string")?;
        let code = TypeCode::new(&code_lexeme.text).map_err(|e| e.located(&code_lexeme.location))?;

        if !self.definitions_admit(&decorators) {
            tracing::debug!(name = %name.text, "type excluded by its conditions");
            return skip_block(&mut self.stream);
        }

        let mut definition = TypeDefinition::new(name.text.as_str(), code, &name.location);
        definition.set_decorators(decorators);

        let open = expect(&mut self.stream, LexemeKind::LBrace, "`{`")?;
        loop {
            let decorators = parse_decorators(&mut self.stream)?;
            let lexeme = self.stream.peek().clone();
            match lexeme.kind {
                LexemeKind::RBrace if decorators.is_empty() => {
                    self.stream.read();
                    break;
                }
                LexemeKind::Keyword if lexeme.text == "template" => {
                    let template = parse_template(&mut self.stream, &self.state.types)?;
                    definition.set_template(template);
                }
                LexemeKind::Keyword if lexeme.text == "field" => {
                    let field = parse_field(&mut self.stream, definition.template(), decorators, scope)?;
                    definition.add_field(field)?;
                }
                LexemeKind::Keyword if lexeme.text == "constructor" => {
                    let constructor = parse_constructor(&mut self.stream, definition.template())?;
                    definition.add_constructor(constructor);
                }
                LexemeKind::Eof => return Err(unclosed("type definition", &open)),
                _ => {
                    return Err(CompileError::unexpected(
                        "Expected `template`, `field` or `constructor` in type definition",
                        &lexeme,
                    ));
                }
            }
        }
        expect_semi(&mut self.stream)?;

        definition.synthesize_fields()?;
        if let Some(constructor) = definition.constructor() {
            scope
                .add_function(definition.name(), constructor.function())
                .map_err(|e| e.located(&constructor.location))?;
        }
        tracing::debug!(
            name = definition.name(),
            code = %definition.code(),
            fields = definition.fields().len(),
            "type defined"
        );
        self.state.types.register(definition)
    }
}

/// `template { TAG label; ... };`
fn parse_template(stream: &mut LexemeStream, types: &TypeTable) -> CompileResult<BinaryTemplate> {
    expect_keyword(stream, "template")?;
    let open = expect(stream, LexemeKind::LBrace, "`{`")?;
    let mut template = BinaryTemplate::new();
    loop {
        if stream.consume(LexemeKind::RBrace).is_some() {
            break;
        }
        if stream.expect(LexemeKind::Eof) {
            return Err(unclosed("template", &open));
        }
        template.add_field(parse_binary_field(stream, types)?)?;
    }
    expect_semi(stream)?;
    template.validate()?;
    Ok(template)
}

/// `DWRD Label;`, `Nested<Type> Label;` or `RSRC<Type> Label;`
fn parse_binary_field(stream: &mut LexemeStream, types: &TypeTable) -> CompileResult<BinaryField> {
    let tag = expect(stream, LexemeKind::Identifier, "a binary field type")?;
    let data_type = DataType::for_name(&tag.text).ok_or_else(|| {
        CompileError::semantic_at(
            ErrorCode::E2002,
            format!("Unrecognised binary field type `{}`", tag.text),
            &tag.location,
        )
    })?;
    let argument = if stream.expect(LexemeKind::LAngle) {
        let items = lexeme_list(stream, LexemeKind::LAngle, LexemeKind::RAngle, &[LexemeKind::Identifier])?;
        match <[Lexeme; 1]>::try_from(items) {
            Ok([name]) => Some(name),
            Err(_) => {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2002,
                    format!("Binary field type `{}` takes exactly one type name", tag.text),
                    &tag.location,
                ));
            }
        }
    } else {
        None
    };
    let label = expect(stream, LexemeKind::Identifier, "a binary field label")?;
    expect_semi(stream)?;

    let field = BinaryField::new(label.text.as_str(), data_type).at(&label.location);
    match (data_type, argument) {
        (DataType::Nested, Some(name)) => {
            types.named(&name.text, &name.location)?;
            Ok(field.nesting(name.text))
        }
        (DataType::Nested, None) => Err(CompileError::semantic_at(
            ErrorCode::E2002,
            format!("Nested binary field '{}' must name the type it nests", label.text),
            &tag.location,
        )),
        (DataType::Rect, None) => {
            types.named(RECT_TYPE, &tag.location)?;
            Ok(field.nesting(RECT_TYPE))
        }
        (DataType::Rsrc, Some(name)) => Ok(field.nesting(name.text)),
        (_, None) => Ok(field),
        (_, Some(_)) => Err(CompileError::semantic_at(
            ErrorCode::E2002,
            format!("Binary field type `{}` does not take a type name", tag.text),
            &tag.location,
        )),
    }
}

/// `field("Name") [repeatable<...>] { values; ... };` or
/// `@synthesize field("Name");`
fn parse_field(
    stream: &mut LexemeStream,
    template: &BinaryTemplate,
    decorators: Decorators,
    scope: &Scope<'_>,
) -> CompileResult<TypeField> {
    expect_keyword(stream, "field")?;
    expect(stream, LexemeKind::LParen, "`(`")?;
    let name = expect(stream, LexemeKind::String, "the field name as a string")?;
    expect(stream, LexemeKind::RParen, "`)`")?;

    let mut field = TypeField::new(name.text.as_str(), &name.location);
    field.decorators = decorators;

    if stream.expect_text(LexemeKind::Keyword, "repeatable") {
        let keyword = stream.read();
        let items = lexeme_list(
            stream,
            LexemeKind::LAngle,
            LexemeKind::RAngle,
            &[LexemeKind::Integer, LexemeKind::Identifier, LexemeKind::Variable],
        )?;
        field.repeatable = Some(parse_repeatable(&items, template, scope, &keyword.location)?);
    }

    if let Some(open) = stream.consume(LexemeKind::LBrace) {
        loop {
            if stream.consume(LexemeKind::RBrace).is_some() {
                break;
            }
            if stream.expect(LexemeKind::Eof) {
                return Err(unclosed("field definition", &open));
            }
            let value = parse_joined_values(stream, template, &field, scope)?;
            expect_semi(stream)?;
            field.add_value(value);
        }
        expect_semi(stream)?;
    } else if stream.expect(LexemeKind::Semi) {
        if !field.is_synthesized() {
            return Err(CompileError::semantic_at(
                ErrorCode::E2003,
                "Field definition must explicitly specify the binary fields that compose it, or be decorated by @synthesize.",
                &name.location,
            ));
        }
        stream.read();
        let binary = template.named(&name.text, &name.location)?;
        check_list_membership(template, &field, binary, &name.location)?;
        let descriptor = TypeDescriptor::infer(binary)?;
        field.add_value(FieldValue::new(name.text.as_str(), descriptor, &name.location));
    } else {
        return Err(CompileError::unexpected(
            "Missing field values after field definition",
            stream.peek(),
        ));
    }
    Ok(field)
}

/// The arguments of `repeatable<...>`:
///
/// - `<lower, upper, Count>` bounded list counted by `Count`
/// - `<lower, upper>` literal bounds
/// - `<Count>` list counted by `Count`, bounds inferred from its width
/// - `<upper>` literal bounds from zero
fn parse_repeatable(
    items: &[Lexeme],
    template: &BinaryTemplate,
    scope: &Scope<'_>,
    location: &Location,
) -> CompileResult<Repeatable> {
    match items {
        [lower, upper, count] => {
            let count = count_field(template, count)?;
            Ok(Repeatable::new(bound(lower, scope)?, bound(upper, scope)?, &lower.location)?
                .with_count_field(count.label.as_str()))
        }
        [lower, upper] => Repeatable::new(bound(lower, scope)?, bound(upper, scope)?, &lower.location),
        [count] if count.is(LexemeKind::Identifier) => {
            Ok(Repeatable::inferred(count_field(template, count)?))
        }
        [upper] => Repeatable::new(0, bound(upper, scope)?, &upper.location),
        _ => Err(CompileError::semantic_at(
            ErrorCode::E2003,
            "Field repeatable clause has incorrect number of arguments.",
            location,
        )),
    }
}

fn bound(lexeme: &Lexeme, scope: &Scope<'_>) -> CompileResult<i64> {
    let value = match lexeme.kind {
        LexemeKind::Integer => lexeme.integer_value(),
        LexemeKind::Variable => scope
            .variable(&lexeme.text)
            .map_err(|e| e.located(&lexeme.location))?
            .value
            .as_integer(),
        _ => {
            return Err(CompileError::unexpected(
                "Repeatable bounds must be integers or variables",
                lexeme,
            ));
        }
    };
    value.ok_or_else(|| {
        CompileError::semantic_at(
            ErrorCode::E2005,
            format!("Repeatable bound `{lexeme}` is not an integer"),
            &lexeme.location,
        )
    })
}

fn count_field<'t>(template: &'t BinaryTemplate, lexeme: &Lexeme) -> CompileResult<&'t BinaryField> {
    if !lexeme.is(LexemeKind::Identifier) {
        return Err(CompileError::unexpected(
            "Count field name for field repeatable clause should be an identifier",
            lexeme,
        ));
    }
    let binary = template.get(&lexeme.text).ok_or_else(|| {
        CompileError::semantic_at(
            ErrorCode::E2001,
            "The specified count field name, does not exist in binary template.",
            &lexeme.location,
        )
    })?;
    if template.list_region(&lexeme.text).is_none() {
        return Err(CompileError::semantic_at(
            ErrorCode::E2003,
            format!(
                "Count field '{}' must be directly followed by the LSTC marker of the list it counts",
                lexeme.text
            ),
            &lexeme.location,
        ));
    }
    Ok(binary)
}

/// A value reference followed by any `| value` joined to it.
fn parse_joined_values(
    stream: &mut LexemeStream,
    template: &BinaryTemplate,
    field: &TypeField,
    scope: &Scope<'_>,
) -> CompileResult<FieldValue> {
    let mut value = parse_value_reference(stream, template, field, scope)?;
    while stream.consume(LexemeKind::Pipe).is_some() {
        let joined = parse_value_reference(stream, template, field, scope)?;
        value.joined.push(joined);
    }
    Ok(value)
}

/// `[@decorators] Name[<$Ext>] [as Descriptor] [= default] [[Sym = value, ...]]`
fn parse_value_reference(
    stream: &mut LexemeStream,
    template: &BinaryTemplate,
    field: &TypeField,
    scope: &Scope<'_>,
) -> CompileResult<FieldValue> {
    let decorators = parse_decorators(stream)?;
    let base = expect(
        stream,
        LexemeKind::Identifier,
        "a field value naming one of the binary template fields",
    )?;
    let extensions = if stream.expect(LexemeKind::LAngle) {
        lexeme_list(stream, LexemeKind::LAngle, LexemeKind::RAngle, &[LexemeKind::Variable])?
    } else {
        Vec::new()
    };

    let binary = if extensions.is_empty() {
        template.named(&base.text, &base.location)?
    } else {
        let candidates = template.candidates(&base.text);
        let Some(first) = candidates.first().copied() else {
            return Err(CompileError::semantic_at(
                ErrorCode::E2001,
                format!("Field name '{}' does not match any binary template fields.", base.text),
                &base.location,
            ));
        };
        for candidate in &candidates {
            if candidate.data_type != first.data_type || candidate.nested_type != first.nested_type {
                return Err(CompileError::semantic_at(
                    ErrorCode::E2002,
                    "Matching binary template fields have differing types.",
                    &base.location,
                ));
            }
            check_list_membership(template, field, candidate, &base.location)?;
        }
        first
    };
    check_list_membership(template, field, binary, &base.location)?;

    let descriptor = if stream.expect_text(LexemeKind::Keyword, "as") {
        stream.read();
        let descriptor = parse_descriptor(stream)?;
        descriptor.verify_binary_type(binary)?;
        descriptor
    } else {
        TypeDescriptor::infer(binary).map_err(|e| e.located(&base.location))?
    };

    let mut value = FieldValue::new(base.text.as_str(), descriptor, &base.location);
    value.name_extensions = extensions.into_iter().map(|l| l.text).collect();
    value.decorators = decorators;

    if stream.consume(LexemeKind::Equals).is_some() {
        let expression = Expression::compile(stream)?;
        value.default_value = Some(if value.decorators.has(decorator_names::CONSTEXPR) {
            let mut constant_scope = scope.shadow();
            let result = expression.evaluate(&mut constant_scope)?;
            Expression::literal(result.to_lexeme(&expression.location())?)
        } else {
            expression
        });
    }

    if stream.expect(LexemeKind::LBracket) {
        value.symbols = parse_symbols(stream)?;
    }
    Ok(value)
}

/// Values of a counted list must live inside that list, and values of
/// any other field outside every list.
fn check_list_membership(
    template: &BinaryTemplate,
    field: &TypeField,
    binary: &BinaryField,
    location: &Location,
) -> CompileResult<()> {
    let enclosing = template
        .index(&binary.label)
        .and_then(|index| template.enclosing_list(index))
        .and_then(|region| template.at(region.count))
        .map(|count| count.label.as_str());
    match (field.count_field(), enclosing) {
        (Some(count), Some(list)) if count == list => Ok(()),
        (None, None) => Ok(()),
        (Some(count), _) => Err(CompileError::semantic_at(
            ErrorCode::E2003,
            format!("Binary field '{}' is not part of the list counted by '{count}'", binary.label),
            location,
        )),
        (None, Some(list)) => Err(CompileError::semantic_at(
            ErrorCode::E2003,
            format!(
                "Binary field '{}' is inside the list counted by '{list}', so field '{}' must be declared repeatable<{list}>",
                binary.label, field.name
            ),
            location,
        )),
    }
}

/// `Integer`, `Range<0, 100>`, `Image<PNG, PICT>`, `Ship&` or `&`.
fn parse_descriptor(stream: &mut LexemeStream) -> CompileResult<TypeDescriptor> {
    if let Some(amp) = stream.consume(LexemeKind::Amp) {
        return Ok(TypeDescriptor::reference("", &amp.location));
    }
    let name = expect(stream, LexemeKind::Identifier, "a type descriptor")?;
    let hints = if stream.expect(LexemeKind::LAngle) {
        lexeme_list(stream, LexemeKind::LAngle, LexemeKind::RAngle, HINT_KINDS)?
    } else {
        Vec::new()
    };
    let descriptor = if stream.consume(LexemeKind::Amp).is_some() {
        TypeDescriptor::reference(name.text.as_str(), &name.location)
    } else {
        TypeDescriptor::new(name.text.as_str(), &name.location)
    };
    Ok(descriptor.with_hints(hints))
}

/// `[ Name = literal, ... ]`
fn parse_symbols(stream: &mut LexemeStream) -> CompileResult<Vec<Symbol>> {
    expect(stream, LexemeKind::LBracket, "`[`")?;
    let mut symbols = Vec::new();
    loop {
        if stream.consume(LexemeKind::RBracket).is_some() {
            break;
        }
        let name = expect(stream, LexemeKind::Identifier, "a symbol name")?;
        expect(stream, LexemeKind::Equals, "`=`")?;
        let value = stream.read();
        if !matches!(
            value.kind,
            LexemeKind::Integer
                | LexemeKind::Percentage
                | LexemeKind::String
                | LexemeKind::Reference
                | LexemeKind::Identifier
        ) {
            return Err(CompileError::unexpected("Symbol values must be literals", &value));
        }
        symbols.push(Symbol::new(name.text, value));
        if stream.consume(LexemeKind::Comma).is_none() {
            expect(stream, LexemeKind::RBracket, "`,` or `]`")?;
            break;
        }
    }
    Ok(symbols)
}

/// `constructor(a, b) { Label = expression; ... };`
fn parse_constructor(stream: &mut LexemeStream, template: &BinaryTemplate) -> CompileResult<Constructor> {
    let keyword = expect_keyword(stream, "constructor")?;
    let params = lexeme_list(
        stream,
        LexemeKind::LParen,
        LexemeKind::RParen,
        &[LexemeKind::Identifier, LexemeKind::Variable],
    )?;
    let open = expect(stream, LexemeKind::LBrace, "`{`")?;
    let mut assignments = Vec::new();
    loop {
        if stream.consume(LexemeKind::RBrace).is_some() {
            break;
        }
        if stream.expect(LexemeKind::Eof) {
            return Err(unclosed("constructor", &open));
        }
        let label = expect(stream, LexemeKind::Identifier, "a binary field label")?;
        template.named(&label.text, &label.location)?;
        expect(stream, LexemeKind::Equals, "`=`")?;
        let expression = Expression::compile(stream)?;
        expect_semi(stream)?;
        assignments.push((label.text, expression));
    }
    expect_semi(stream)?;
    Ok(Constructor {
        params: params.into_iter().map(|p| p.text).collect(),
        assignments,
        location: keyword.location,
    })
}

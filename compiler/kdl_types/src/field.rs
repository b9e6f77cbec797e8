//! Declared fields and the values that compose them.

use kdl_eval::{Expression, Scope, Value};
use kdl_ir::{Lexeme, Location};
use smallvec::SmallVec;

use crate::decorator::names;
use crate::{Decorators, Repeatable, TypeDescriptor};

/// `Name = value` inside a value's `[ ... ]` symbol list.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    pub name: String,
    pub value: Lexeme,
}

impl Symbol {
    pub fn new(name: impl Into<String>, value: Lexeme) -> Self {
        Symbol {
            name: name.into(),
            value,
        }
    }

    pub fn value(&self) -> Option<Value> {
        Value::from_lexeme(&self.value)
    }
}

/// One value of a declared field, bound to a binary field by name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FieldValue {
    pub base_name: String,
    /// Variables whose values are appended to `base_name`, such as
    /// `$FieldNumber` in `Weapon<$FieldNumber>`.
    pub name_extensions: SmallVec<[String; 1]>,
    pub descriptor: TypeDescriptor,
    pub default_value: Option<Expression>,
    pub symbols: Vec<Symbol>,
    /// Values joined with `|`; they share the declaration statement.
    pub joined: Vec<FieldValue>,
    pub decorators: Decorators,
    pub location: Location,
}

impl FieldValue {
    pub fn new(base_name: impl Into<String>, descriptor: TypeDescriptor, location: &Location) -> Self {
        FieldValue {
            base_name: base_name.into(),
            name_extensions: SmallVec::new(),
            descriptor,
            default_value: None,
            symbols: Vec::new(),
            joined: Vec::new(),
            decorators: Decorators::default(),
            location: location.clone(),
        }
    }

    /// The binary field name for the current repetition. Each extension
    /// variable present in `scope` appends its text.
    pub fn extended_name(&self, scope: &Scope<'_>) -> String {
        let mut name = self.base_name.clone();
        for extension in &self.name_extensions {
            if let Some(variable) = scope.get(extension) {
                name.push_str(&variable.value.text());
            }
        }
        name
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// The joined value declaring `symbol`, with its position in
    /// [`FieldValue::joined`]. Symbols of this value shadow joined ones.
    pub fn joined_value_for(&self, symbol: &str) -> Option<(usize, &Symbol)> {
        if self.symbol(symbol).is_some() {
            return None;
        }
        self.joined
            .iter()
            .enumerate()
            .find_map(|(i, value)| value.symbol(symbol).map(|s| (i, s)))
    }

    /// This value followed by its joined values.
    pub fn chain(&self) -> impl Iterator<Item = &FieldValue> {
        std::iter::once(self).chain(self.joined.iter())
    }

    /// The name the value is published under by `@api("Name")`.
    pub fn export_name(&self) -> &str {
        self.decorators
            .value(names::API)
            .map_or(self.base_name.as_str(), |l| l.text.as_str())
    }
}

/// A user-facing field of a type definition.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeField {
    pub name: String,
    pub decorators: Decorators,
    pub repeatable: Option<Repeatable>,
    pub values: Vec<FieldValue>,
    pub location: Location,
}

impl TypeField {
    pub fn new(name: impl Into<String>, location: &Location) -> Self {
        TypeField {
            name: name.into(),
            decorators: Decorators::default(),
            repeatable: None,
            values: Vec::new(),
            location: location.clone(),
        }
    }

    pub fn add_value(&mut self, value: FieldValue) {
        self.values.push(value);
    }

    /// The count field label when this field is a counted list.
    pub fn count_field(&self) -> Option<&str> {
        self.repeatable.as_ref().and_then(Repeatable::count_field)
    }

    pub fn is_synthesized(&self) -> bool {
        self.decorators.has(names::SYNTHESIZE)
    }

    pub fn is_deprecated(&self) -> bool {
        self.decorators.has(names::DEPRECATED)
    }
}

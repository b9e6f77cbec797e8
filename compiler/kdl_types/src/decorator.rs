//! Decorators: `@name` or `@name(value, ...)` attached to types, fields,
//! field values and resource declarations.

use kdl_ir::{Lexeme, Location};
use rustc_hash::FxHashSet;

/// Names with a meaning to the compiler. Any other decorator is kept and
/// ignored.
pub mod names {
    pub const SYNTHESIZE: &str = "synthesize";
    pub const CONSTEXPR: &str = "constexpr";
    pub const CONDITION: &str = "condition";
    pub const NOT_CONDITION: &str = "notCondition";
    pub const DEPRECATED: &str = "deprecated";
    pub const API: &str = "api";
    pub const BUILTIN: &str = "builtin";
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Decorator {
    pub name: String,
    pub values: Vec<Lexeme>,
    pub location: Location,
}

impl Decorator {
    pub fn new(name: impl Into<String>, values: Vec<Lexeme>, location: &Location) -> Self {
        Decorator {
            name: name.into(),
            values,
            location: location.clone(),
        }
    }
}

/// An ordered collection of decorators.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Decorators(Vec<Decorator>);

impl Decorators {
    pub fn new(decorators: Vec<Decorator>) -> Self {
        Decorators(decorators)
    }

    pub fn push(&mut self, decorator: Decorator) {
        self.0.push(decorator);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decorator> {
        self.0.iter()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Decorator> {
        self.0.iter().find(|d| d.name == name)
    }

    /// First associated value of the named decorator.
    pub fn value(&self, name: &str) -> Option<&Lexeme> {
        self.get(name).and_then(|d| d.values.first())
    }

    /// Whether `@condition` and `@notCondition` allow the decorated item
    /// under the given definitions. Every listed condition must hold.
    pub fn admits(&self, definitions: &FxHashSet<String>) -> bool {
        self.0.iter().all(|d| match d.name.as_str() {
            names::CONDITION => d.values.iter().all(|v| definitions.contains(&v.text)),
            names::NOT_CONDITION => d.values.iter().all(|v| !definitions.contains(&v.text)),
            _ => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use kdl_ir::LexemeKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn decorator(name: &str, values: &[&str]) -> Decorator {
        let values = values
            .iter()
            .map(|v| Lexeme::synthesized(LexemeKind::Identifier, *v))
            .collect();
        Decorator::new(name, values, &Location::synthesized())
    }

    #[test]
    fn test_lookup() {
        let decorators = Decorators::new(vec![
            decorator("api", &["Title"]),
            decorator("synthesize", &[]),
        ]);
        assert!(decorators.has(names::SYNTHESIZE));
        assert!(!decorators.has(names::CONSTEXPR));
        assert_eq!(decorators.value(names::API).map(|l| l.text.as_str()), Some("Title"));
    }

    #[test]
    fn test_conditions() {
        let definitions: FxHashSet<String> = ["debug".to_string()].into_iter().collect();

        let when_debug = Decorators::new(vec![decorator("condition", &["debug"])]);
        assert!(when_debug.admits(&definitions));
        assert!(!when_debug.admits(&FxHashSet::default()));

        let unless_debug = Decorators::new(vec![decorator("notCondition", &["debug"])]);
        assert!(!unless_debug.admits(&definitions));

        let both = Decorators::new(vec![
            decorator("condition", &["debug"]),
            decorator("notCondition", &["release"]),
        ]);
        assert!(both.admits(&definitions));
        assert!(Decorators::default().admits(&definitions));
    }
}

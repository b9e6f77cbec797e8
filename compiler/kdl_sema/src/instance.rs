//! Resource instances: the field values of one declared resource.
//!
//! Values are keyed by binary field label. Nested types get a child
//! [`FieldSet`]; a counted list keeps one [`FieldSet`] per entry under the
//! label of its count field.

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_eval::{ensure_sufficient_stack, Value};
use kdl_ir::{Location, ResourceReference};
use kdl_types::{DataType, ListRegion, TypeDefinition, TypeTable};
use rustc_hash::FxHashMap;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Slot {
    /// No value; encodes as zeros.
    Empty,
    Value(Value, Location),
    Nested(FieldSet),
    List(Vec<FieldSet>),
}

/// Slots of one level of a binary template.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct FieldSet {
    slots: FxHashMap<String, Slot>,
}

impl FieldSet {
    /// Slots for every binary field of `def`, recursing into nested types.
    pub fn skeleton(def: &TypeDefinition, types: &TypeTable) -> CompileResult<Self> {
        FieldSet::for_range(def, 0..def.template().len(), types)
    }

    /// Slots for one entry of a counted list.
    pub fn entry(def: &TypeDefinition, region: &ListRegion, types: &TypeTable) -> CompileResult<Self> {
        FieldSet::for_range(def, region.members.clone(), types)
    }

    fn for_range(
        def: &TypeDefinition,
        range: std::ops::Range<usize>,
        types: &TypeTable,
    ) -> CompileResult<Self> {
        let template = def.template();
        let mut set = FieldSet::default();
        let mut index = range.start;
        while index < range.end {
            let Some(field) = template.at(index) else {
                break;
            };
            if let Some(region) = template.list_region(&field.label) {
                set.insert(field.label.as_str(), Slot::List(Vec::new()));
                index = region.members.end + 1;
                continue;
            }
            match field.data_type {
                DataType::Lstc | DataType::Lste => {}
                DataType::Nested | DataType::Rect => {
                    let name = field.nested_type.as_deref().unwrap_or_default();
                    let nested = types.named(name, &field.location)?;
                    let child = ensure_sufficient_stack(|| FieldSet::skeleton(nested, types))?;
                    set.insert(field.label.as_str(), Slot::Nested(child));
                }
                _ => set.insert(field.label.as_str(), Slot::Empty),
            }
            index += 1;
        }
        Ok(set)
    }

    pub fn insert(&mut self, label: impl Into<String>, slot: Slot) {
        self.slots.insert(label.into(), slot);
    }

    pub fn get(&self, label: &str) -> Option<&Slot> {
        self.slots.get(label)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn value(&self, label: &str) -> Option<&Value> {
        match self.slots.get(label) {
            Some(Slot::Value(value, _)) => Some(value),
            _ => None,
        }
    }

    pub fn nested(&self, label: &str) -> Option<&FieldSet> {
        match self.slots.get(label) {
            Some(Slot::Nested(set)) => Some(set),
            _ => None,
        }
    }

    pub fn list(&self, label: &str) -> &[FieldSet] {
        match self.slots.get(label) {
            Some(Slot::List(entries)) => entries,
            _ => &[],
        }
    }

    pub fn nested_mut(&mut self, label: &str, location: &Location) -> CompileResult<&mut FieldSet> {
        match self.slots.get_mut(label) {
            Some(Slot::Nested(set)) => Ok(set),
            _ => Err(not_a(label, "nested type", location)),
        }
    }

    pub fn list_mut(&mut self, label: &str, location: &Location) -> CompileResult<&mut Vec<FieldSet>> {
        match self.slots.get_mut(label) {
            Some(Slot::List(entries)) => Ok(entries),
            _ => Err(not_a(label, "counted list", location)),
        }
    }

    /// Store a value at a dotted path such as `Frame.Top`.
    pub fn assign(&mut self, path: &str, value: Value, location: &Location) -> CompileResult<()> {
        match path.split_once('.') {
            Some((label, rest)) => self.nested_mut(label, location)?.assign(rest, value, location),
            None => match self.slots.get_mut(path) {
                Some(slot @ (Slot::Empty | Slot::Value(..))) => {
                    *slot = Slot::Value(value, location.clone());
                    Ok(())
                }
                Some(_) => Err(CompileError::semantic_at(
                    ErrorCode::E2002,
                    format!("Binary field '{path}' does not hold a single value"),
                    location,
                )),
                None => Err(CompileError::semantic_at(
                    ErrorCode::E2001,
                    format!("Field name '{path}' does not match any binary template fields."),
                    location,
                )),
            },
        }
    }
}

fn not_a(label: &str, what: &str, location: &Location) -> CompileError {
    CompileError::semantic_at(
        ErrorCode::E2002,
        format!("Binary field '{label}' is not a {what}"),
        location,
    )
}

/// A declared resource, ready to be encoded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResourceInstance {
    pub type_name: String,
    pub namespace: Option<String>,
    pub id: i64,
    pub name: String,
    pub fields: FieldSet,
    /// Where the resource was declared.
    pub location: Location,
}

impl ResourceInstance {
    pub fn new(
        def: &TypeDefinition,
        namespace: Option<String>,
        id: i64,
        name: impl Into<String>,
        location: &Location,
        types: &TypeTable,
    ) -> CompileResult<Self> {
        Ok(ResourceInstance {
            type_name: def.name().to_string(),
            namespace,
            id,
            name: name.into(),
            fields: FieldSet::skeleton(def, types)?,
            location: location.clone(),
        })
    }

    /// `#Namespace.Type.id` for this resource.
    pub fn reference(&self) -> ResourceReference {
        ResourceReference {
            namespace: self.namespace.clone(),
            type_name: Some(self.type_name.clone()),
            id: Some(self.id),
        }
    }

    pub fn is(&self, type_name: &str, namespace: Option<&str>, id: i64) -> bool {
        self.type_name == type_name && self.namespace.as_deref() == namespace && self.id == id
    }
}

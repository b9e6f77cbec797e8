//! A single resource record.

use std::collections::BTreeMap;

use crate::TypeCode;

/// Attribute key under which a resource's namespace is recorded.
pub const NAMESPACE_ATTRIBUTE: &str = "namespace";

/// String attributes attached to a resource. Ordered, so that files encode
/// deterministically.
pub type Attributes = BTreeMap<String, String>;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Resource {
    pub type_code: TypeCode,
    pub id: i64,
    pub name: String,
    pub attributes: Attributes,
    pub data: Vec<u8>,
}

impl Resource {
    pub fn new(type_code: TypeCode, id: i64, name: impl Into<String>, data: Vec<u8>) -> Self {
        Resource {
            type_code,
            id,
            name: name.into(),
            attributes: Attributes::new(),
            data,
        }
    }

    /// Record `namespace` as an attribute. The global namespace is left
    /// implicit.
    #[must_use]
    pub fn in_namespace(mut self, namespace: Option<&str>) -> Self {
        if let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) {
            self.attributes
                .insert(NAMESPACE_ATTRIBUTE.to_string(), namespace.to_string());
        }
        self
    }

    pub fn namespace(&self) -> Option<&str> {
        self.attributes.get(NAMESPACE_ATTRIBUTE).map(String::as_str)
    }
}

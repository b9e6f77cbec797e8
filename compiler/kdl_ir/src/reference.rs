//! Resource references: `#128`, `#Ship.128`, `#Nova.Ship.auto`.

use std::fmt;

use smallvec::SmallVec;

/// A reference to a resource by namespace, type and id.
///
/// An absent `id` is the `auto` sentinel, resolved to the type's next free
/// id when a resource is constructed.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ResourceReference {
    pub namespace: Option<String>,
    pub type_name: Option<String>,
    pub id: Option<i64>,
}

impl ResourceReference {
    /// A plain `#id` reference.
    pub fn with_id(id: i64) -> Self {
        ResourceReference {
            id: Some(id),
            ..ResourceReference::default()
        }
    }

    /// The `#auto` reference.
    pub fn auto() -> Self {
        ResourceReference::default()
    }

    /// Parse `128`, `auto`, `Type.128` or `Namespace.Type.128`.
    pub fn parse(text: &str) -> Option<Self> {
        let components: SmallVec<[&str; 3]> = text.split('.').collect();
        let (id_text, qualifiers) = components.split_last()?;
        let id = if *id_text == "auto" {
            None
        } else {
            Some(id_text.parse::<i64>().ok()?)
        };
        let (namespace, type_name) = match qualifiers {
            [] => (None, None),
            [type_name] => (None, Some((*type_name).to_string())),
            [namespace, type_name] => (
                Some((*namespace).to_string()),
                Some((*type_name).to_string()),
            ),
            _ => return None,
        };
        Some(ResourceReference {
            namespace,
            type_name,
            id,
        })
    }

    pub fn is_auto(&self) -> bool {
        self.id.is_none()
    }

    /// Same qualifiers with a concrete id.
    #[must_use]
    pub fn resolved(&self, id: i64) -> Self {
        ResourceReference {
            id: Some(id),
            ..self.clone()
        }
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        if let Some(namespace) = &self.namespace {
            write!(f, "{namespace}.")?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, "{type_name}.")?;
        }
        match self.id {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("auto"),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

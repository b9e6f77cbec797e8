//! An in-memory resource container.

use crate::{Attributes, Resource, TypeCode};

/// The resources of one type code and attribute set, sorted by id.
#[derive(Debug)]
pub struct TypeGroup<'a> {
    pub type_code: TypeCode,
    pub attributes: &'a Attributes,
    pub resources: Vec<&'a Resource>,
}

/// A set of resources, unique by type code, id and attributes.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct ResourceFile {
    resources: Vec<Resource>,
}

impl ResourceFile {
    pub fn new() -> Self {
        ResourceFile::default()
    }

    fn position(&self, type_code: TypeCode, id: i64, attributes: &Attributes) -> Option<usize> {
        self.resources
            .iter()
            .position(|r| r.type_code == type_code && r.id == id && &r.attributes == attributes)
    }

    /// Add a resource, replacing and returning any resource with the same
    /// type code, id and attributes.
    pub fn add(&mut self, resource: Resource) -> Option<Resource> {
        match self.position(resource.type_code, resource.id, &resource.attributes) {
            Some(i) => Some(std::mem::replace(&mut self.resources[i], resource)),
            None => {
                self.resources.push(resource);
                None
            }
        }
    }

    pub fn get(&self, type_code: TypeCode, id: i64, attributes: &Attributes) -> Option<&Resource> {
        self.position(type_code, id, attributes)
            .map(|i| &self.resources[i])
    }

    pub fn contains(&self, type_code: TypeCode, id: i64, attributes: &Attributes) -> bool {
        self.position(type_code, id, attributes).is_some()
    }

    pub fn remove(&mut self, type_code: TypeCode, id: i64, attributes: &Attributes) -> Option<Resource> {
        self.position(type_code, id, attributes)
            .map(|i| self.resources.remove(i))
    }

    /// Resources in the order they were added.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Group resources for encoding: groups ordered by type code then
    /// attributes, resources within a group ordered by id.
    pub fn type_groups(&self) -> Vec<TypeGroup<'_>> {
        let mut groups: Vec<TypeGroup<'_>> = Vec::new();
        for resource in &self.resources {
            match groups
                .iter_mut()
                .find(|g| g.type_code == resource.type_code && *g.attributes == resource.attributes)
            {
                Some(group) => group.resources.push(resource),
                None => groups.push(TypeGroup {
                    type_code: resource.type_code,
                    attributes: &resource.attributes,
                    resources: vec![resource],
                }),
            }
        }
        groups.sort_by(|a, b| {
            a.type_code
                .cmp(&b.type_code)
                .then_with(|| a.attributes.cmp(b.attributes))
        });
        for group in &mut groups {
            group.resources.sort_by_key(|r| r.id);
        }
        groups
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

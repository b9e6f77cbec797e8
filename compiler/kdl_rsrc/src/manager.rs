//! Lookups across several loaded resource files.

use std::path::Path;

use rustc_hash::FxHashSet;

use kdl_diagnostic::CompileResult;

use crate::{codec, Attributes, Resource, ResourceFile, TypeCode};

/// An ordered stack of resource files. Files added later take precedence.
#[derive(Default, Debug)]
pub struct ResourceManager {
    files: Vec<ResourceFile>,
}

impl ResourceManager {
    pub fn new() -> Self {
        ResourceManager::default()
    }

    pub fn push(&mut self, file: ResourceFile) {
        self.files.push(file);
    }

    /// Decode a container from disk and add it on top of the stack.
    pub fn load(&mut self, path: &Path) -> CompileResult<()> {
        let (format, file) = codec::read_file(path)?;
        tracing::debug!(path = %path.display(), %format, resources = file.len(), "loaded resource file");
        self.push(file);
        Ok(())
    }

    pub fn files(&self) -> &[ResourceFile] {
        &self.files
    }

    /// The resource with this type, id and attributes from the most
    /// recently added file that has one.
    pub fn find(&self, type_code: TypeCode, id: i64, attributes: &Attributes) -> Option<&Resource> {
        self.files
            .iter()
            .rev()
            .find_map(|file| file.get(type_code, id, attributes))
    }

    /// Every resource of a type and attribute set, one per id, sorted by id.
    pub fn get_type(&self, type_code: TypeCode, attributes: &Attributes) -> Vec<&Resource> {
        let mut seen = FxHashSet::default();
        let mut resources: Vec<&Resource> = self
            .files
            .iter()
            .rev()
            .flat_map(ResourceFile::resources)
            .filter(|r| r.type_code == type_code && &r.attributes == attributes)
            .filter(|r| seen.insert(r.id))
            .collect();
        resources.sort_by_key(|r| r.id);
        resources
    }
}

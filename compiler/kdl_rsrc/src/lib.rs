//! Resource containers.
//!
//! The logical model is shared by every container format: a resource is a
//! `{type code, id, name, attributes, bytes}` record, and a
//! [`ResourceFile`] groups resources by type code and attributes.
//!
//! [`codec`] serializes a file as a classic resource fork, the extended
//! format, or a rez archive. [`ResourceManager`] answers lookups across
//! several loaded files.

pub mod codec;
mod file;
mod flags;
mod format;
pub mod mac_roman;
mod manager;
mod resource;
mod type_code;

pub use file::{ResourceFile, TypeGroup};
pub use flags::ReferenceFlags;
pub use format::Format;
pub use manager::ResourceManager;
pub use resource::{Attributes, Resource, NAMESPACE_ATTRIBUTE};
pub use type_code::TypeCode;

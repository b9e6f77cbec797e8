//! The KDL type system.
//!
//! A resource type pairs a [`BinaryTemplate`] (the byte layout, as an ordered
//! list of typed binary fields) with declared [`TypeField`]s that map the
//! names used in declarations onto one or more binary fields.
//!
//! - [`DataType`]: the closed set of binary field tags
//! - [`TypeDescriptor`]: the semantic type written after `as`
//! - [`Repeatable`]: repetition bounds of a declared field
//! - [`Conversion`]: the asset conversion matrix
//! - [`TypeTable`]: every type known to a compile session

mod conversion;
mod data_type;
mod decorator;
mod definition;
mod descriptor;
mod field;
mod repeatable;
mod table;
mod template;

pub use conversion::{AssetFormat, Conversion};
pub use data_type::DataType;
pub use decorator::{names as decorator_names, Decorator, Decorators};
pub use definition::{Constructor, TypeDefinition, FIRST_AUTO_ID};
pub use descriptor::{names as descriptor_names, DescriptorKind, TypeDescriptor};
pub use field::{FieldValue, Symbol, TypeField};
pub use repeatable::Repeatable;
pub use table::TypeTable;
pub use template::{BinaryField, BinaryTemplate, ListRegion};

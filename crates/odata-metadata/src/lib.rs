//! Convention-based hypermedia metadata for OData wire entities.
//!
//! A serialized entity often omits its id, edit and read links, etag, media
//! resource, stream properties and advertised operations, because a client
//! can derive them from the service model and the URL conventions. This
//! crate derives them.
//!
//! # Overview
//!
//! Each [`WireEntity`] owns one [`EntityMetadataBuilder`]:
//! - **`NoOp`**: every accessor reports the explicit value, or nothing
//! - **`Conventional`**: explicit values (including explicit nulls) win;
//!   anything else is computed once from the model and cached
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use odata_metadata::{
//!     EntityMetadataBuilder, MetadataContext, ModelEntryContext, Property, SchemaBuilder,
//!     TypeContext, WireEntity, WireValues,
//! };
//! use url::Url;
//!
//! let model = Arc::new(
//!     SchemaBuilder::new("Sales")
//!         .entity_type("Customer", |t| t.key("ID").etag_property("Version"))
//!         .entity_set("Customers", "Sales.Customer")
//!         .action("Archive", Some("Sales.Customer"), &[])
//!         .build(),
//! );
//! let base = Url::parse("http://host/service.svc/").unwrap();
//! let metadata = MetadataContext::new(model.clone(), base).unwrap();
//!
//! let values = WireValues {
//!     properties: vec![Property::primitive("ID", 42), Property::primitive("Version", 7)],
//!     ..Default::default()
//! };
//! let type_context = TypeContext::entity_set("Customers", "Sales.Customer");
//! let entry = ModelEntryContext::for_entry(model, type_context, &values).unwrap();
//! let entity = WireEntity::from_values(values)
//!     .with_metadata_builder(EntityMetadataBuilder::conventional(metadata, entry));
//!
//! let edit_link = entity.edit_link().unwrap().unwrap();
//! assert_eq!(edit_link.as_str(), "http://host/service.svc/Customers(42)");
//! assert_eq!(entity.etag(), Some("W/\"7\""));
//!
//! let actions = entity.actions();
//! assert_eq!(actions[0].metadata(), "#Sales.Archive");
//! assert_eq!(
//!     actions[0].target().unwrap().unwrap().as_str(),
//!     "http://host/service.svc/Customers(42)/Sales.Archive"
//! );
//! ```
//!
//! # Modules
//!
//! - [`model`]: Type model boundary, wire entities, values and operations
//! - [`context`]: Per-model configuration and per-entry facts
//! - [`metadata`]: The metadata builders and missing-operation generation
//! - [`uri`]: URL conventions, URI construction and metadata references
//! - [`validate`]: Entity type validation for entries and resource sets
//! - [`error`]: Error types

pub mod context;
pub mod error;
pub mod metadata;
pub mod model;
pub mod uri;
pub mod validate;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root
pub use context::{
    EntryMetadataContext, MetadataContext, ModelEntryContext, NavigationSourceKind, Selection,
    TypeContext,
};
pub use error::{MetadataError, ValidationError};
pub use metadata::{
    ConventionalMetadataBuilder, EntityMetadataBuilder, IdForSerialization,
    MissingOperationGenerator, MissingOperations, NavigationLinkInfo, UnprocessedNavigationLinks,
};
pub use model::{
    BoundOperation, BoundStream, EdmModel, EntitySet, EntityType, Explicit, InMemoryModel,
    NavigationProperty, Operation, OperationDescriptor, OperationKind, OperationOrigin,
    PrimitiveValue, Property, PropertyValue, SchemaBuilder, Singleton, StreamReferenceValue,
    WireEntity, WireValues,
};
pub use uri::{ConventionalUriBuilder, UrlConvention};
pub use validate::{validate_entity_type, ResourceSetTypeValidator};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Data model types.
//!
//! This module contains:
//! - The declared type model boundary ([`EdmModel`]) and an in-memory implementation
//! - Primitive values and their literal forms
//! - Wire entities, properties, streams and advertised operations

pub mod edm;
pub mod entity;
pub mod operation;
pub mod schema;
pub mod value;

pub use edm::{
    EdmModel, EntitySet, EntityType, NavigationProperty, Operation, OperationKind, PropertyKind,
    Singleton, StructuralProperty,
};
pub use entity::{
    BoundStream, Explicit, Property, PropertyValue, StreamReferenceValue, WireEntity, WireValues,
};
pub use operation::{BoundOperation, OperationDescriptor, OperationOrigin};
pub use schema::{EntityTypeBuilder, InMemoryModel, SchemaBuilder};
pub use value::PrimitiveValue;

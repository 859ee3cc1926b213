//! Error types for metadata computation and type validation.

use thiserror::Error;

/// Error while computing convention-based metadata for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    // === Usage errors ===
    #[error("stream property name must not be empty")]
    EmptyStreamPropertyName,

    // === Model lookups ===
    #[error("entity type {type_name} not found in model")]
    EntityTypeNotFound { type_name: String },

    #[error("entity type {type_name} declares no key properties")]
    NoKeyProperties { type_name: String },

    #[error("key property {property} of entity type {type_name} has no value")]
    MissingKeyValue { type_name: String, property: String },

    #[error("key property {property} of entity type {type_name} is null")]
    NullKeyValue { type_name: String, property: String },

    #[error("no entity set, singleton or containing navigation property is known for type {type_name}")]
    MissingNavigationSource { type_name: String },

    // === URI construction ===
    #[error("URI {uri} cannot be used as a base for path segments")]
    CannotBeABase { uri: String },
}

/// Error reported by the entity type validators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entity type {type_name} is not declared in the model")]
    UnknownEntityType { type_name: String },

    #[error("entity type {actual} is not compatible with expected type {expected}")]
    IncompatibleEntityType { expected: String, actual: String },

    #[error("entity type {actual} shares no common base type with {previous}")]
    NoCommonBaseType { previous: String, actual: String },
}

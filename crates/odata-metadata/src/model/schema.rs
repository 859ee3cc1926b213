//! In-memory type model with a fluent builder.
//!
//! # Example
//!
//! ```rust
//! use odata_metadata::model::schema::SchemaBuilder;
//! use odata_metadata::model::EdmModel;
//!
//! let model = SchemaBuilder::new("Sales")
//!     .entity_type("Customer", |t| t
//!         .key("ID")
//!         .property("Name")
//!         .etag_property("Version")
//!         .navigation("Orders", "Sales.Order", true)
//!     )
//!     .entity_type("Order", |t| t.key("OrderID"))
//!     .entity_set("Customers", "Sales.Customer")
//!     .action("Archive", Some("Sales.Customer"), &[])
//!     .build();
//!
//! assert_eq!(model.key_properties("Sales.Customer"), vec!["ID"]);
//! assert_eq!(model.bindable_operations("Sales.Customer").len(), 1);
//! ```

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;

use crate::model::edm::{
    EdmModel, EntitySet, EntityType, NavigationProperty, Operation, OperationKind,
    PropertyKind, Singleton, StructuralProperty,
};
use crate::uri::UrlConvention;

/// An [`EdmModel`] held entirely in memory.
///
/// The annotation-derived URL convention is resolved once and cached for the
/// lifetime of the model.
#[derive(Debug, Default)]
pub struct InMemoryModel {
    entity_types: FxHashMap<String, EntityType>,
    operations: Vec<Operation>,
    entity_sets: FxHashMap<String, EntitySet>,
    singletons: FxHashMap<String, Singleton>,
    annotations: FxHashMap<String, String>,
    url_convention: OnceCell<UrlConvention>,
}

impl InMemoryModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EdmModel for InMemoryModel {
    fn find_entity_type(&self, full_name: &str) -> Option<&EntityType> {
        self.entity_types.get(full_name)
    }

    fn find_operations(&self, full_name: &str) -> Vec<&Operation> {
        self.operations
            .iter()
            .filter(|op| op.full_name() == full_name)
            .collect()
    }

    fn operations(&self) -> Vec<&Operation> {
        self.operations.iter().collect()
    }

    fn find_entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.get(name)
    }

    fn find_singleton(&self, name: &str) -> Option<&Singleton> {
        self.singletons.get(name)
    }

    fn container_annotation(&self, term: &str) -> Option<&str> {
        self.annotations.get(term).map(String::as_str)
    }

    fn url_convention(&self) -> UrlConvention {
        *self.url_convention.get_or_init(|| {
            UrlConvention::from_annotation(
                self.container_annotation(crate::uri::convention::URL_CONVENTIONS_TERM),
            )
        })
    }
}

/// Builder for an [`InMemoryModel`] within one namespace.
#[derive(Debug)]
pub struct SchemaBuilder {
    namespace: String,
    model: InMemoryModel,
}

impl SchemaBuilder {
    /// Creates a builder for the given namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            model: InMemoryModel::new(),
        }
    }

    /// Declares an entity type using a builder function.
    pub fn entity_type<F>(mut self, name: &str, f: F) -> Self
    where
        F: FnOnce(EntityTypeBuilder) -> EntityTypeBuilder,
    {
        let builder = f(EntityTypeBuilder::new(&self.namespace, name));
        let ty = builder.build();
        self.model.entity_types.insert(ty.full_name(), ty);
        self
    }

    /// Declares an entity set of the given entity type (full name).
    pub fn entity_set(mut self, name: &str, entity_type: &str) -> Self {
        self.model.entity_sets.insert(
            name.to_string(),
            EntitySet {
                name: name.to_string(),
                entity_type: entity_type.to_string(),
            },
        );
        self
    }

    /// Declares a singleton of the given entity type (full name).
    pub fn singleton(mut self, name: &str, entity_type: &str) -> Self {
        self.model.singletons.insert(
            name.to_string(),
            Singleton {
                name: name.to_string(),
                entity_type: entity_type.to_string(),
            },
        );
        self
    }

    /// Declares an action, optionally bound to an entity type.
    pub fn action(self, name: &str, binding_type: Option<&str>, parameters: &[&str]) -> Self {
        self.operation(OperationKind::Action, name, binding_type, parameters)
    }

    /// Declares a function, optionally bound to an entity type.
    ///
    /// Declaring the same name again adds an overload.
    pub fn function(self, name: &str, binding_type: Option<&str>, parameters: &[&str]) -> Self {
        self.operation(OperationKind::Function, name, binding_type, parameters)
    }

    fn operation(
        mut self,
        kind: OperationKind,
        name: &str,
        binding_type: Option<&str>,
        parameters: &[&str],
    ) -> Self {
        self.model.operations.push(Operation {
            namespace: self.namespace.clone(),
            name: name.to_string(),
            kind,
            binding_type: binding_type.map(str::to_string),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    /// Adds a string-valued vocabulary annotation to the entity container.
    pub fn container_annotation(mut self, term: &str, value: &str) -> Self {
        self.model
            .annotations
            .insert(term.to_string(), value.to_string());
        self
    }

    /// Marks the container with the key-as-segment URL convention.
    pub fn key_as_segment(self) -> Self {
        self.container_annotation(
            crate::uri::convention::URL_CONVENTIONS_TERM,
            crate::uri::convention::KEY_AS_SEGMENT,
        )
    }

    /// Builds the final model.
    pub fn build(self) -> InMemoryModel {
        self.model
    }
}

/// Builder for one entity type declaration.
#[derive(Debug, Clone)]
pub struct EntityTypeBuilder {
    ty: EntityType,
}

impl EntityTypeBuilder {
    fn new(namespace: &str, name: &str) -> Self {
        Self {
            ty: EntityType {
                namespace: namespace.to_string(),
                name: name.to_string(),
                base_type: None,
                key: Vec::new(),
                properties: Vec::new(),
                navigation_properties: Vec::new(),
                has_stream: false,
            },
        }
    }

    /// Derives this type from a base type (full name).
    pub fn base(mut self, base_type: &str) -> Self {
        self.ty.base_type = Some(base_type.to_string());
        self
    }

    /// Appends a key property. Call repeatedly for composite keys.
    pub fn key(mut self, name: &str) -> Self {
        self.ty.key.push(name.to_string());
        self.push_property(name, PropertyKind::Primitive, false)
    }

    /// Declares a primitive property.
    pub fn property(self, name: &str) -> Self {
        self.push_property(name, PropertyKind::Primitive, false)
    }

    /// Declares a primitive property that participates in the etag.
    pub fn etag_property(self, name: &str) -> Self {
        self.push_property(name, PropertyKind::Primitive, true)
    }

    /// Declares a named stream property.
    pub fn stream(self, name: &str) -> Self {
        self.push_property(name, PropertyKind::Stream, false)
    }

    /// Marks the type as a media-link entry.
    pub fn media_link_entry(mut self) -> Self {
        self.ty.has_stream = true;
        self
    }

    /// Declares a navigation property.
    pub fn navigation(self, name: &str, target_type: &str, is_collection: bool) -> Self {
        self.push_navigation(name, target_type, is_collection, false)
    }

    /// Declares a containment navigation property.
    pub fn contained(self, name: &str, target_type: &str, is_collection: bool) -> Self {
        self.push_navigation(name, target_type, is_collection, true)
    }

    fn push_property(mut self, name: &str, kind: PropertyKind, concurrency_token: bool) -> Self {
        if let Some(existing) = self.ty.properties.iter_mut().find(|p| p.name == name) {
            existing.kind = kind;
            existing.concurrency_token |= concurrency_token;
        } else {
            self.ty.properties.push(StructuralProperty {
                name: name.to_string(),
                kind,
                concurrency_token,
            });
        }
        self
    }

    fn push_navigation(
        mut self,
        name: &str,
        target_type: &str,
        is_collection: bool,
        contains_target: bool,
    ) -> Self {
        self.ty.navigation_properties.push(NavigationProperty {
            name: name.to_string(),
            target_type: target_type.to_string(),
            is_collection,
            contains_target,
        });
        self
    }

    fn build(self) -> EntityType {
        self.ty
    }
}

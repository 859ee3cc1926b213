//! Declared type model boundary.
//!
//! The metadata engine never parses schema documents itself. It asks an
//! [`EdmModel`] for the facts it needs: entity types and their keys,
//! navigation and stream properties, concurrency properties, bindable
//! operations and container annotations.

use std::fmt;

use crate::uri::UrlConvention;

/// Whether a bindable operation is an action or a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Action,
    Function,
}

/// Kind of a declared structural property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Primitive or complex value carried inline.
    Primitive,
    /// Named binary stream (`Edm.Stream`).
    Stream,
}

/// A declared structural property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralProperty {
    pub name: String,
    pub kind: PropertyKind,
    /// Participates in the entity's etag.
    pub concurrency_token: bool,
}

/// A declared navigation property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationProperty {
    pub name: String,
    /// Full name of the target entity type.
    pub target_type: String,
    pub is_collection: bool,
    /// Target entities are contained in (addressed through) the source.
    pub contains_target: bool,
}

/// A declared entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    pub namespace: String,
    pub name: String,
    /// Full name of the base type, if derived.
    pub base_type: Option<String>,
    /// Declared key property names, in declaration order.
    pub key: Vec<String>,
    pub properties: Vec<StructuralProperty>,
    pub navigation_properties: Vec<NavigationProperty>,
    /// Media-link entry: the type exposes a default stream.
    pub has_stream: bool,
}

impl EntityType {
    /// Returns `Namespace.Name`.
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// A declared action or function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub namespace: String,
    pub name: String,
    pub kind: OperationKind,
    /// Full name of the binding parameter's entity type; `None` for unbound operations.
    pub binding_type: Option<String>,
    /// Names of the non-binding parameters, in declaration order.
    pub parameters: Vec<String>,
}

impl Operation {
    /// Returns `Namespace.Name`.
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Returns `Namespace.Name(p1,p2,...)` with the non-binding parameter names.
    pub fn full_name_with_parameters(&self) -> String {
        format!("{}({})", self.full_name(), self.parameters.join(","))
    }
}

/// A declared entity set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: String,
}

/// A declared singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Singleton {
    pub name: String,
    pub entity_type: String,
}

/// Joins a namespace and a simple name.
pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

/// The declared type model consumed by the metadata builders.
///
/// Implementors supply the lookups; the provided methods derive the
/// inheritance-aware views the builders actually need.
pub trait EdmModel: fmt::Debug + Send + Sync {
    /// Looks up an entity type by full name.
    fn find_entity_type(&self, full_name: &str) -> Option<&EntityType>;

    /// Returns every declared operation (all overloads) with the given full name.
    fn find_operations(&self, full_name: &str) -> Vec<&Operation>;

    /// Returns every declared operation.
    fn operations(&self) -> Vec<&Operation>;

    /// Looks up an entity set in the default container.
    fn find_entity_set(&self, name: &str) -> Option<&EntitySet>;

    /// Looks up a singleton in the default container.
    fn find_singleton(&self, name: &str) -> Option<&Singleton>;

    /// Returns the string value of a vocabulary annotation on the entity container.
    fn container_annotation(&self, term: &str) -> Option<&str>;

    /// Returns the URL convention declared by the model.
    ///
    /// The default reads the container annotation on every call; models that
    /// are shared across requests should override this to cache the result.
    fn url_convention(&self) -> UrlConvention {
        UrlConvention::from_annotation(
            self.container_annotation(crate::uri::convention::URL_CONVENTIONS_TERM),
        )
    }

    // =========================================================================
    // Provided
    // =========================================================================

    /// Returns the type followed by its base types, most derived first.
    ///
    /// Stops at the first unknown base type and guards against cycles.
    fn type_chain(&self, full_name: &str) -> Vec<&EntityType> {
        let mut chain: Vec<&EntityType> = Vec::new();
        let mut next = self.find_entity_type(full_name);
        while let Some(ty) = next {
            if chain.iter().any(|seen| seen.full_name() == ty.full_name()) {
                break;
            }
            chain.push(ty);
            next = ty.base_type.as_deref().and_then(|b| self.find_entity_type(b));
        }
        chain
    }

    /// Returns the declared key of the type, inherited from the nearest base declaring one.
    fn key_properties(&self, full_name: &str) -> Vec<&str> {
        self.type_chain(full_name)
            .into_iter()
            .find(|ty| !ty.key.is_empty())
            .map(|ty| ty.key.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns all navigation properties, base type declarations first.
    fn navigation_properties(&self, full_name: &str) -> Vec<&NavigationProperty> {
        self.type_chain(full_name)
            .into_iter()
            .rev()
            .flat_map(|ty| ty.navigation_properties.iter())
            .collect()
    }

    /// Returns all stream properties, base type declarations first.
    fn stream_properties(&self, full_name: &str) -> Vec<&StructuralProperty> {
        self.type_chain(full_name)
            .into_iter()
            .rev()
            .flat_map(|ty| ty.properties.iter())
            .filter(|p| p.kind == PropertyKind::Stream)
            .collect()
    }

    /// Returns the ordered etag-participating properties.
    fn etag_properties(&self, full_name: &str) -> Vec<&StructuralProperty> {
        self.type_chain(full_name)
            .into_iter()
            .rev()
            .flat_map(|ty| ty.properties.iter())
            .filter(|p| p.concurrency_token)
            .collect()
    }

    /// Returns true if the type, or any base type, is a media-link entry.
    fn is_media_link_entry(&self, full_name: &str) -> bool {
        self.type_chain(full_name).iter().any(|ty| ty.has_stream)
    }

    /// Returns true if `full_name` is `ancestor` or derives from it.
    fn is_derived_from(&self, full_name: &str, ancestor: &str) -> bool {
        full_name == ancestor
            || self
                .type_chain(full_name)
                .iter()
                .any(|ty| ty.full_name() == ancestor)
    }

    /// Returns the operations bindable to the type (bound to it or to a base type).
    fn bindable_operations(&self, full_name: &str) -> Vec<&Operation> {
        let chain: Vec<String> = self
            .type_chain(full_name)
            .iter()
            .map(|ty| ty.full_name())
            .collect();
        self.operations()
            .into_iter()
            .filter(|op| {
                op.binding_type
                    .as_deref()
                    .is_some_and(|b| chain.iter().any(|t| t == b))
            })
            .collect()
    }
}

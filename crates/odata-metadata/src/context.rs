//! Contexts supplying model-level and per-entry facts to metadata builders.
//!
//! [`MetadataContext`] describes the service (model, base URI, metadata
//! document, URL convention override) and is typically created once per
//! request. [`EntryMetadataContext`] describes one entry: its actual type,
//! where it lives, its key and etag values, and what the request selected.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use url::Url;

use crate::error::MetadataError;
use crate::model::{EdmModel, NavigationProperty, Operation, PrimitiveValue, WireValues};
use crate::uri::builder::append_segment;
use crate::uri::{ConventionalUriBuilder, UrlConvention};

/// Path of the metadata document relative to the service root.
pub const METADATA_SEGMENT: &str = "$metadata";

/// Service-level configuration for metadata computation.
#[derive(Debug, Clone)]
pub struct MetadataContext {
    model: Arc<dyn EdmModel>,
    service_base_uri: Url,
    metadata_document_uri: Url,
    url_convention: Option<UrlConvention>,
}

impl MetadataContext {
    /// Creates a context whose metadata document lives at `base/$metadata`.
    pub fn new(model: Arc<dyn EdmModel>, service_base_uri: Url) -> Result<Self, MetadataError> {
        let metadata_document_uri = append_segment(&service_base_uri, METADATA_SEGMENT)?;
        Ok(Self {
            model,
            service_base_uri,
            metadata_document_uri,
            url_convention: None,
        })
    }

    /// Overrides the metadata document URI.
    pub fn with_metadata_document_uri(mut self, uri: Url) -> Self {
        self.metadata_document_uri = uri;
        self
    }

    /// Overrides the URL convention declared by the model.
    pub fn with_url_convention(mut self, convention: UrlConvention) -> Self {
        self.url_convention = Some(convention);
        self
    }

    pub fn model(&self) -> &dyn EdmModel {
        self.model.as_ref()
    }

    /// Returns a shared handle to the model.
    pub fn shared_model(&self) -> Arc<dyn EdmModel> {
        Arc::clone(&self.model)
    }

    pub fn service_base_uri(&self) -> &Url {
        &self.service_base_uri
    }

    pub fn metadata_document_uri(&self) -> &Url {
        &self.metadata_document_uri
    }

    /// The effective URL convention: the override if any, else the model's.
    pub fn url_convention(&self) -> UrlConvention {
        UrlConvention::resolve(self.url_convention, self.model.as_ref())
    }

    /// Creates a URI builder for this service.
    pub fn uri_builder(&self) -> ConventionalUriBuilder {
        ConventionalUriBuilder::new(self.service_base_uri.clone(), self.url_convention())
    }
}

/// How the entry's navigation source is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationSourceKind {
    EntitySet,
    Singleton,
    /// Contained in another entity; `parent` is that entity's URI.
    Contained { parent: Url, is_collection: bool },
}

/// Where an entry lives and which element type its navigation source declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeContext {
    /// Entity set, singleton, or containing navigation property name.
    pub navigation_source_name: Option<String>,
    pub kind: NavigationSourceKind,
    /// Full name of the navigation source's declared element type.
    pub navigation_source_entity_type: String,
}

impl TypeContext {
    pub fn entity_set(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            navigation_source_name: Some(name.into()),
            kind: NavigationSourceKind::EntitySet,
            navigation_source_entity_type: entity_type.into(),
        }
    }

    pub fn singleton(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            navigation_source_name: Some(name.into()),
            kind: NavigationSourceKind::Singleton,
            navigation_source_entity_type: entity_type.into(),
        }
    }

    /// Entries reached through the containment navigation property `name` of `parent`.
    pub fn contained(
        parent: Url,
        name: impl Into<String>,
        entity_type: impl Into<String>,
        is_collection: bool,
    ) -> Self {
        Self {
            navigation_source_name: Some(name.into()),
            kind: NavigationSourceKind::Contained {
                parent,
                is_collection,
            },
            navigation_source_entity_type: entity_type.into(),
        }
    }

    /// An entry whose navigation source is unknown; no URIs can be computed for it.
    pub fn unknown(entity_type: impl Into<String>) -> Self {
        Self {
            navigation_source_name: None,
            kind: NavigationSourceKind::EntitySet,
            navigation_source_entity_type: entity_type.into(),
        }
    }

    /// Looks up an entity set or singleton by name in the model.
    pub fn from_model(model: &dyn EdmModel, name: &str) -> Option<Self> {
        if let Some(set) = model.find_entity_set(name) {
            return Some(Self::entity_set(&set.name, &set.entity_type));
        }
        model
            .find_singleton(name)
            .map(|s| Self::singleton(&s.name, &s.entity_type))
    }

    pub fn is_singleton(&self) -> bool {
        self.kind == NavigationSourceKind::Singleton
    }

    /// Entries reached through the containment navigation property `name`
    /// declared on `parent_type` (or a base type), addressed under `parent`.
    ///
    /// Returns `None` if the property is unknown or does not contain its target.
    pub fn from_containment(
        model: &dyn EdmModel,
        parent_type: &str,
        parent: Url,
        name: &str,
    ) -> Option<Self> {
        let property = model
            .navigation_properties(parent_type)
            .into_iter()
            .find(|p| p.name == name)
            .filter(|p| p.contains_target)?;
        Some(Self::contained(
            parent,
            &property.name,
            &property.target_type,
            property.is_collection,
        ))
    }
}

/// Which navigation properties, streams and operations a request selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No projection: everything is selected.
    #[default]
    All,
    /// Only the named items. Operations match by full name or `Namespace.*`.
    Only(FxHashSet<String>),
}

impl Selection {
    /// Selects exactly the given items.
    pub fn only<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(items.into_iter().map(Into::into).collect())
    }

    /// Returns true if a property with this name is selected.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(items) => items.contains(name) || items.contains("*"),
        }
    }

    /// Returns true if the operation is selected.
    pub fn includes_operation(&self, operation: &Operation) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(items) => {
                items.contains(&operation.full_name())
                    || items.contains(&format!("{}.*", operation.namespace))
            }
        }
    }
}

/// Per-entry facts consumed by the conventional metadata builder.
pub trait EntryMetadataContext: fmt::Debug {
    /// Full name of the entry's runtime type.
    fn actual_type_name(&self) -> &str;

    /// Where the entry lives.
    fn type_context(&self) -> &TypeContext;

    /// Key values in declared key order.
    fn key_properties(
        &self,
        values: &WireValues,
    ) -> Result<Vec<(String, PrimitiveValue)>, MetadataError>;

    /// Etag-participating values in declared order; missing values are null.
    fn etag_properties(&self, values: &WireValues) -> Vec<(String, PrimitiveValue)>;

    fn selected_navigation_properties(&self) -> Vec<NavigationProperty>;

    /// Names of the selected stream properties.
    fn selected_stream_properties(&self) -> Vec<String>;

    fn selected_bindable_operations(&self) -> Vec<Operation>;

    /// True if the entry's type exposes a default stream.
    fn is_media_link_entry(&self) -> bool;
}

/// [`EntryMetadataContext`] backed by an [`EdmModel`].
#[derive(Debug, Clone)]
pub struct ModelEntryContext {
    model: Arc<dyn EdmModel>,
    type_context: TypeContext,
    actual_type_name: String,
    selection: Selection,
}

impl ModelEntryContext {
    /// Creates a context for an entry of the given actual type.
    pub fn new(
        model: Arc<dyn EdmModel>,
        type_context: TypeContext,
        actual_type_name: impl Into<String>,
    ) -> Result<Self, MetadataError> {
        let actual_type_name = actual_type_name.into();
        if model.find_entity_type(&actual_type_name).is_none() {
            return Err(MetadataError::EntityTypeNotFound {
                type_name: actual_type_name,
            });
        }
        Ok(Self {
            model,
            type_context,
            actual_type_name,
            selection: Selection::All,
        })
    }

    /// Creates a context using the payload's type name, falling back to the
    /// navigation source's declared type.
    pub fn for_entry(
        model: Arc<dyn EdmModel>,
        type_context: TypeContext,
        values: &WireValues,
    ) -> Result<Self, MetadataError> {
        let actual = values
            .type_name
            .clone()
            .unwrap_or_else(|| type_context.navigation_source_entity_type.clone());
        Self::new(model, type_context, actual)
    }

    /// Applies a request's projection.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }
}

impl EntryMetadataContext for ModelEntryContext {
    fn actual_type_name(&self) -> &str {
        &self.actual_type_name
    }

    fn type_context(&self) -> &TypeContext {
        &self.type_context
    }

    fn key_properties(
        &self,
        values: &WireValues,
    ) -> Result<Vec<(String, PrimitiveValue)>, MetadataError> {
        let key = self.model.key_properties(&self.actual_type_name);
        if key.is_empty() {
            return Err(MetadataError::NoKeyProperties {
                type_name: self.actual_type_name.clone(),
            });
        }
        key.into_iter()
            .map(|name| match values.primitive(name) {
                None => Err(MetadataError::MissingKeyValue {
                    type_name: self.actual_type_name.clone(),
                    property: name.to_string(),
                }),
                Some(PrimitiveValue::Null) => Err(MetadataError::NullKeyValue {
                    type_name: self.actual_type_name.clone(),
                    property: name.to_string(),
                }),
                Some(value) => Ok((name.to_string(), value.clone())),
            })
            .collect()
    }

    fn etag_properties(&self, values: &WireValues) -> Vec<(String, PrimitiveValue)> {
        self.model
            .etag_properties(&self.actual_type_name)
            .into_iter()
            .map(|p| {
                let value = values.primitive(&p.name).cloned().unwrap_or(PrimitiveValue::Null);
                (p.name.clone(), value)
            })
            .collect()
    }

    fn selected_navigation_properties(&self) -> Vec<NavigationProperty> {
        self.model
            .navigation_properties(&self.actual_type_name)
            .into_iter()
            .filter(|p| self.selection.includes(&p.name))
            .cloned()
            .collect()
    }

    fn selected_stream_properties(&self) -> Vec<String> {
        self.model
            .stream_properties(&self.actual_type_name)
            .into_iter()
            .filter(|p| self.selection.includes(&p.name))
            .map(|p| p.name.clone())
            .collect()
    }

    fn selected_bindable_operations(&self) -> Vec<Operation> {
        self.model
            .bindable_operations(&self.actual_type_name)
            .into_iter()
            .filter(|op| self.selection.includes_operation(op))
            .cloned()
            .collect()
    }

    fn is_media_link_entry(&self) -> bool {
        self.model.is_media_link_entry(&self.actual_type_name)
    }
}

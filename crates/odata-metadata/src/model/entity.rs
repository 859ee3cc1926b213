//! Wire entities: the explicit state of one serialized entity.
//!
//! A [`WireEntity`] only holds what a producer set or a consumer read. All
//! public accessors delegate to the entity's [`EntityMetadataBuilder`], which
//! decides whether to return the explicit value or compute one.

use url::Url;

use crate::error::MetadataError;
use crate::metadata::{
    EntityMetadataBuilder, IdForSerialization, NavigationLinkInfo, UnprocessedNavigationLinks,
};
use crate::model::{BoundOperation, OperationDescriptor, PrimitiveValue};

/// A value that may have been explicitly supplied.
///
/// `Null` is an explicit null: it was supplied, and it suppresses any computed
/// value just like `Value` does.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Explicit<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> Explicit<T> {
    /// Returns true if a value (possibly null) was supplied.
    pub fn is_set(&self) -> bool {
        !matches!(self, Explicit::Unset)
    }

    /// Returns the supplied non-null value.
    pub fn value(&self) -> Option<&T> {
        match self {
            Explicit::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `None` when unset, `Some(None)` for explicit null.
    pub fn get(&self) -> Option<Option<&T>> {
        match self {
            Explicit::Unset => None,
            Explicit::Null => Some(None),
            Explicit::Value(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Explicit<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Explicit::Null, Explicit::Value)
    }
}

/// A binary stream exposed by an entity (default media stream or named stream property).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamReferenceValue {
    pub edit_link: Explicit<Url>,
    pub read_link: Explicit<Url>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

impl StreamReferenceValue {
    /// Creates a stream value with no explicit links.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Value of a wire property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Primitive(PrimitiveValue),
    Stream(StreamReferenceValue),
}

/// A named property of a wire entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    /// Creates a primitive property.
    pub fn primitive(name: impl Into<String>, value: impl Into<PrimitiveValue>) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Primitive(value.into()),
        }
    }

    /// Creates a stream property.
    pub fn stream(name: impl Into<String>, value: StreamReferenceValue) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Stream(value),
        }
    }

    /// Returns the primitive value, if this is a primitive property.
    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match &self.value {
            PropertyValue::Primitive(v) => Some(v),
            PropertyValue::Stream(_) => None,
        }
    }

    /// Returns the stream value, if this is a stream property.
    pub fn as_stream(&self) -> Option<&StreamReferenceValue> {
        match &self.value {
            PropertyValue::Stream(s) => Some(s),
            PropertyValue::Primitive(_) => None,
        }
    }
}

/// Explicit state of a wire entity.
///
/// Lists are always concatenated with computed items, so an empty list and
/// an unset list behave the same.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireValues {
    /// Type name annotated on the payload, if any.
    pub type_name: Option<String>,
    pub id: Explicit<Url>,
    pub etag: Explicit<String>,
    pub edit_link: Explicit<Url>,
    pub read_link: Explicit<Url>,
    pub media_resource: Explicit<StreamReferenceValue>,
    pub properties: Vec<Property>,
    pub actions: Vec<OperationDescriptor>,
    pub functions: Vec<OperationDescriptor>,
    /// Transient entities have no identity and never get one computed.
    pub is_transient: bool,
}

impl WireValues {
    /// Looks up an explicit property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Looks up an explicit primitive property value by name.
    pub fn primitive(&self, name: &str) -> Option<&PrimitiveValue> {
        self.property(name).and_then(Property::as_primitive)
    }
}

/// One serializable entity, bound to exactly one metadata builder.
#[derive(Debug, Default)]
pub struct WireEntity {
    values: WireValues,
    builder: EntityMetadataBuilder,
}

impl WireEntity {
    /// Creates an empty entity with the no-op builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity from explicit values with the no-op builder.
    pub fn from_values(values: WireValues) -> Self {
        Self {
            values,
            builder: EntityMetadataBuilder::NoOp,
        }
    }

    /// Binds the metadata builder, replacing the previous one.
    pub fn set_metadata_builder(&mut self, builder: EntityMetadataBuilder) {
        self.builder = builder;
    }

    /// Binds the metadata builder (builder style).
    pub fn with_metadata_builder(mut self, builder: EntityMetadataBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn metadata_builder(&self) -> &EntityMetadataBuilder {
        &self.builder
    }

    pub fn values(&self) -> &WireValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut WireValues {
        &mut self.values
    }

    // =========================================================================
    // Explicit setters (`None` is an explicit null)
    // =========================================================================

    pub fn set_id(&mut self, id: Option<Url>) {
        self.values.id = id.into();
    }

    pub fn set_etag(&mut self, etag: Option<String>) {
        self.values.etag = etag.into();
    }

    pub fn set_edit_link(&mut self, link: Option<Url>) {
        self.values.edit_link = link.into();
    }

    pub fn set_read_link(&mut self, link: Option<Url>) {
        self.values.read_link = link.into();
    }

    pub fn set_media_resource(&mut self, stream: Option<StreamReferenceValue>) {
        self.values.media_resource = stream.into();
    }

    pub fn set_transient(&mut self, transient: bool) {
        self.values.is_transient = transient;
    }

    pub fn add_property(&mut self, property: Property) {
        self.values.properties.push(property);
    }

    pub fn add_action(&mut self, action: OperationDescriptor) {
        self.values.actions.push(action);
    }

    pub fn add_function(&mut self, function: OperationDescriptor) {
        self.values.functions.push(function);
    }

    // =========================================================================
    // Metadata accessors
    // =========================================================================

    pub fn id(&self) -> Result<Option<&Url>, MetadataError> {
        self.builder.id(&self.values)
    }

    pub fn etag(&self) -> Option<&str> {
        self.builder.etag(&self.values)
    }

    pub fn edit_link(&self) -> Result<Option<&Url>, MetadataError> {
        self.builder.edit_link(&self.values)
    }

    pub fn read_link(&self) -> Result<Option<&Url>, MetadataError> {
        self.builder.read_link(&self.values)
    }

    /// The default stream of a media-link entry.
    pub fn media_resource(&self) -> Option<BoundStream<'_>> {
        self.builder
            .media_resource(&self.values)
            .map(|stream| BoundStream::new(self, None, stream))
    }

    /// Explicit properties followed by computed stream properties.
    pub fn properties(&self) -> Vec<&Property> {
        self.builder.properties(&self.values)
    }

    /// Looks up a stream property (explicit or computed) by name.
    pub fn stream_property(&self, name: &str) -> Option<BoundStream<'_>> {
        self.properties()
            .into_iter()
            .find(|p| p.name == name)
            .and_then(|p| p.as_stream().map(|s| BoundStream::new(self, Some(p.name.as_str()), s)))
    }

    /// Explicit actions followed by missing bindable actions.
    pub fn actions(&self) -> Vec<BoundOperation<'_>> {
        self.builder
            .actions(&self.values)
            .into_iter()
            .map(|op| BoundOperation::new(self, op))
            .collect()
    }

    /// Explicit functions followed by missing bindable functions.
    pub fn functions(&self) -> Vec<BoundOperation<'_>> {
        self.builder
            .functions(&self.values)
            .into_iter()
            .map(|op| BoundOperation::new(self, op))
            .collect()
    }

    /// Navigation link for `name`; `explicit` wins verbatim when set.
    pub fn navigation_link(
        &self,
        name: &str,
        explicit: &Explicit<Url>,
    ) -> Result<Option<Url>, MetadataError> {
        self.builder.navigation_link_uri(&self.values, name, explicit)
    }

    /// Association link for `name`; `explicit` wins verbatim when set.
    pub fn association_link(
        &self,
        name: &str,
        explicit: &Explicit<Url>,
    ) -> Result<Option<Url>, MetadataError> {
        self.builder.association_link_uri(&self.values, name, explicit)
    }

    pub fn id_for_serialization(&self) -> Result<IdForSerialization, MetadataError> {
        self.builder.id_for_serialization(&self.values)
    }

    pub fn mark_navigation_link_processed(&mut self, name: &str) {
        self.builder.mark_navigation_link_processed(name);
    }

    pub fn next_unprocessed_navigation_link(&mut self) -> Option<NavigationLinkInfo> {
        self.builder.next_unprocessed_navigation_link()
    }

    pub fn unprocessed_navigation_links(&mut self) -> UnprocessedNavigationLinks<'_> {
        self.builder.unprocessed_navigation_links()
    }
}

/// A stream viewed through the entity that exposes it.
///
/// Missing links are computed by the entity's metadata builder.
#[derive(Debug, Clone, Copy)]
pub struct BoundStream<'e> {
    entity: &'e WireEntity,
    name: Option<&'e str>,
    stream: &'e StreamReferenceValue,
}

impl<'e> BoundStream<'e> {
    fn new(entity: &'e WireEntity, name: Option<&'e str>, stream: &'e StreamReferenceValue) -> Self {
        Self {
            entity,
            name,
            stream,
        }
    }

    /// Property name; `None` for the default media stream.
    pub fn name(&self) -> Option<&'e str> {
        self.name
    }

    pub fn value(&self) -> &'e StreamReferenceValue {
        self.stream
    }

    pub fn content_type(&self) -> Option<&'e str> {
        self.stream.content_type.as_deref()
    }

    pub fn etag(&self) -> Option<&'e str> {
        self.stream.etag.as_deref()
    }

    pub fn edit_link(&self) -> Result<Option<Url>, MetadataError> {
        match &self.stream.edit_link {
            Explicit::Value(link) => Ok(Some(link.clone())),
            Explicit::Null => Ok(None),
            Explicit::Unset => self
                .entity
                .metadata_builder()
                .stream_edit_link(self.entity.values(), self.name),
        }
    }

    pub fn read_link(&self) -> Result<Option<Url>, MetadataError> {
        match &self.stream.read_link {
            Explicit::Value(link) => Ok(Some(link.clone())),
            Explicit::Null => Ok(None),
            Explicit::Unset => self
                .entity
                .metadata_builder()
                .stream_read_link(self.entity.values(), self.name),
        }
    }
}

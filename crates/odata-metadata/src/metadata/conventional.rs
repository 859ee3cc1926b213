//! Convention-based metadata builder.
//!
//! Precedence is the same for every accessor: an explicit value (including an
//! explicit null) wins; otherwise the value is computed once from the model
//! and the URL conventions and cached for the builder's lifetime.

use once_cell::unsync::OnceCell;
use tracing::trace;
use url::Url;

use crate::context::{EntryMetadataContext, MetadataContext, NavigationSourceKind};
use crate::error::MetadataError;
use crate::metadata::missing_operations::{MissingOperationGenerator, MissingOperations};
use crate::metadata::navigation::{NavigationLinkInfo, NavigationLinkTracker};
use crate::model::{Explicit, OperationDescriptor, Property, StreamReferenceValue, WireValues};
use crate::uri::builder::escape_literal;
use crate::uri::fragment::operation_name_from_metadata_reference;
use crate::uri::ConventionalUriBuilder;

/// Memoized computations. Each slot is filled at most once; failures are not cached.
#[derive(Debug, Default)]
struct MetadataCache {
    entity_instance_uri: OnceCell<Url>,
    edit_link: OnceCell<Url>,
    read_link: OnceCell<Option<Url>>,
    id: OnceCell<Option<Url>>,
    etag: OnceCell<Option<String>>,
    media_resource: OnceCell<Option<StreamReferenceValue>>,
    stream_properties: OnceCell<Vec<Property>>,
    missing_operations: OnceCell<MissingOperations>,
}

/// Computes omitted metadata from the model and URL conventions.
#[derive(Debug)]
pub struct ConventionalMetadataBuilder {
    metadata: MetadataContext,
    entry: Box<dyn EntryMetadataContext>,
    uri_builder: ConventionalUriBuilder,
    cache: MetadataCache,
    navigation: NavigationLinkTracker,
}

impl ConventionalMetadataBuilder {
    /// Creates a builder for one entry.
    pub fn new(metadata: MetadataContext, entry: Box<dyn EntryMetadataContext>) -> Self {
        let uri_builder = metadata.uri_builder();
        Self {
            metadata,
            entry,
            uri_builder,
            cache: MetadataCache::default(),
            navigation: NavigationLinkTracker::default(),
        }
    }

    /// Returns the service-level context.
    pub fn metadata_context(&self) -> &MetadataContext {
        &self.metadata
    }

    /// Returns the per-entry context.
    pub fn entry_context(&self) -> &dyn EntryMetadataContext {
        self.entry.as_ref()
    }

    // =========================================================================
    // Identity and links
    // =========================================================================

    /// The entity-instance URI: navigation source plus key, without type segment.
    pub fn entity_instance_uri(&self, values: &WireValues) -> Result<&Url, MetadataError> {
        self.cache
            .entity_instance_uri
            .get_or_try_init(|| self.compute_entity_instance_uri(values))
    }

    fn compute_entity_instance_uri(&self, values: &WireValues) -> Result<Url, MetadataError> {
        let type_context = self.entry.type_context();
        let actual = self.entry.actual_type_name();
        let Some(source) = type_context.navigation_source_name.as_deref() else {
            return Err(MetadataError::MissingNavigationSource {
                type_name: actual.to_string(),
            });
        };

        let ub = &self.uri_builder;
        let uri = match &type_context.kind {
            NavigationSourceKind::EntitySet => {
                let set = ub.build_entity_set_uri(ub.base_uri(), source)?;
                let keys = self.entry.key_properties(values)?;
                ub.build_entity_instance_uri(&set, &keys, actual)?
            }
            NavigationSourceKind::Singleton => ub.build_entity_set_uri(ub.base_uri(), source)?,
            NavigationSourceKind::Contained {
                parent,
                is_collection,
            } => {
                let nested = ub.build_navigation_link(parent, source)?;
                if *is_collection {
                    let keys = self.entry.key_properties(values)?;
                    ub.build_entity_instance_uri(&nested, &keys, actual)?
                } else {
                    nested
                }
            }
        };
        trace!(type_name = actual, uri = %uri, "computed entity instance uri");
        Ok(uri)
    }

    /// Returns the explicit edit link, else the identity base plus any type segment.
    pub fn edit_link<'a>(&'a self, values: &'a WireValues) -> Result<Option<&'a Url>, MetadataError> {
        if let Some(explicit) = values.edit_link.get() {
            return Ok(explicit);
        }
        self.cache
            .edit_link
            .get_or_try_init(|| self.compute_edit_link(values))
            .map(Some)
    }

    /// The explicit non-null id if one was supplied, else the entity-instance URI.
    fn identity_base<'a>(&'a self, values: &'a WireValues) -> Result<&'a Url, MetadataError> {
        match values.id.value() {
            Some(id) => Ok(id),
            None => self.entity_instance_uri(values),
        }
    }

    fn compute_edit_link(&self, values: &WireValues) -> Result<Url, MetadataError> {
        let base = self.identity_base(values)?.clone();
        let actual = self.entry.actual_type_name();
        let link = if actual != self.entry.type_context().navigation_source_entity_type {
            self.uri_builder.append_type_segment(&base, actual)?
        } else {
            base
        };
        trace!(type_name = actual, edit_link = %link, "computed edit link");
        Ok(link)
    }

    /// Returns the explicit read link, else the edit link.
    pub fn read_link<'a>(&'a self, values: &'a WireValues) -> Result<Option<&'a Url>, MetadataError> {
        if let Some(explicit) = values.read_link.get() {
            return Ok(explicit);
        }
        self.cache
            .read_link
            .get_or_try_init(|| Ok::<_, MetadataError>(self.edit_link(values)?.cloned()))
            .map(Option::as_ref)
    }

    /// Id precedence: explicit id, explicit read link, explicit edit link, computed.
    pub fn id<'a>(&'a self, values: &'a WireValues) -> Result<Option<&'a Url>, MetadataError> {
        if let Some(explicit) = values.id.get() {
            return Ok(explicit);
        }
        if let Some(link) = values.read_link.value() {
            return Ok(Some(link));
        }
        if let Some(link) = values.edit_link.value() {
            return Ok(Some(link));
        }
        self.cache
            .id
            .get_or_try_init(|| {
                if values.is_transient {
                    return Ok(None);
                }
                self.entity_instance_uri(values).map(|uri| Some(uri.clone()))
            })
            .map(Option::as_ref)
    }

    /// Returns the explicit etag, else `W/"..."` built from the etag properties.
    pub fn etag<'a>(&'a self, values: &'a WireValues) -> Option<&'a str> {
        if let Some(explicit) = values.etag.get() {
            return explicit.map(String::as_str);
        }
        self.cache
            .etag
            .get_or_init(|| self.compute_etag(values))
            .as_deref()
    }

    fn compute_etag(&self, values: &WireValues) -> Option<String> {
        let properties = self.entry.etag_properties(values);
        if properties.is_empty() {
            return None;
        }
        let literals: Vec<String> = properties
            .iter()
            .map(|(_, value)| escape_literal(&value.to_literal()))
            .collect();
        let etag = format!("W/\"{}\"", literals.join(","));
        trace!(type_name = self.entry.actual_type_name(), etag = %etag, "computed etag");
        Some(etag)
    }

    // =========================================================================
    // Streams and properties
    // =========================================================================

    /// Returns the explicit media resource, else an empty one for media-link entries.
    pub fn media_resource<'a>(&'a self, values: &'a WireValues) -> Option<&'a StreamReferenceValue> {
        if let Some(explicit) = values.media_resource.get() {
            return explicit;
        }
        self.cache
            .media_resource
            .get_or_init(|| {
                self.entry
                    .is_media_link_entry()
                    .then(StreamReferenceValue::new)
            })
            .as_ref()
    }

    /// Explicit properties followed by selected stream properties they lack.
    pub fn properties<'a>(&'a self, values: &'a WireValues) -> Vec<&'a Property> {
        let computed = self
            .cache
            .stream_properties
            .get_or_init(|| self.compute_stream_properties(values));
        values.properties.iter().chain(computed).collect()
    }

    fn compute_stream_properties(&self, values: &WireValues) -> Vec<Property> {
        self.entry
            .selected_stream_properties()
            .into_iter()
            .filter(|name| values.property(name).is_none())
            .map(|name| Property::stream(name, StreamReferenceValue::new()))
            .collect()
    }

    /// Returns `editLink/name`, or `editLink/$value` for the default stream.
    pub fn stream_edit_link(
        &self,
        values: &WireValues,
        name: Option<&str>,
    ) -> Result<Option<Url>, MetadataError> {
        match self.edit_link(values)? {
            Some(edit_link) => Ok(Some(self.uri_builder.build_stream_edit_link(edit_link, name)?)),
            None => Ok(None),
        }
    }

    /// Returns `readLink/name`, or `readLink/$value` for the default stream.
    pub fn stream_read_link(
        &self,
        values: &WireValues,
        name: Option<&str>,
    ) -> Result<Option<Url>, MetadataError> {
        match self.read_link(values)? {
            Some(read_link) => Ok(Some(self.uri_builder.build_stream_read_link(read_link, name)?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    fn missing_operations(&self, values: &WireValues) -> &MissingOperations {
        self.cache.missing_operations.get_or_init(|| {
            MissingOperationGenerator::new(&self.metadata, self.entry.as_ref()).generate(values)
        })
    }

    /// Returns explicit actions followed by the synthesized ones.
    pub fn actions<'a>(&'a self, values: &'a WireValues) -> Vec<&'a OperationDescriptor> {
        let missing = self.missing_operations(values);
        values.actions.iter().chain(&missing.actions).collect()
    }

    /// Returns explicit functions followed by the synthesized ones.
    pub fn functions<'a>(&'a self, values: &'a WireValues) -> Vec<&'a OperationDescriptor> {
        let missing = self.missing_operations(values);
        values.functions.iter().chain(&missing.functions).collect()
    }

    /// Resolves a metadata reference against the metadata document URI.
    pub fn operation_name(&self, metadata: &str) -> Option<String> {
        operation_name_from_metadata_reference(Some(self.metadata.metadata_document_uri()), metadata)
    }

    /// Target of an operation advertised on this entity.
    ///
    /// With a binding parameter type and no explicit edit link, the target
    /// hangs off the identity base (explicit id, else the entity-instance URI)
    /// so the type segment is not doubled.
    pub fn operation_target_uri(
        &self,
        values: &WireValues,
        operation_name: &str,
        binding_parameter_type: Option<&str>,
    ) -> Result<Option<Url>, MetadataError> {
        let has_binding_type = binding_parameter_type.is_some_and(|t| !t.is_empty());
        let base = if has_binding_type && values.edit_link.value().is_none() {
            self.identity_base(values)?
        } else {
            match self.edit_link(values)? {
                Some(edit_link) => edit_link,
                None => return Ok(None),
            }
        };
        let target = self
            .uri_builder
            .build_operation_target(base, operation_name, binding_parameter_type)?;
        Ok(Some(target))
    }

    /// The title is the operation name.
    // TODO: replace with the title convention once the protocol defines one.
    pub fn operation_title(&self, operation_name: &str) -> Option<String> {
        Some(operation_name.to_string())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Returns the explicit navigation link, else `editLink/name`.
    pub fn navigation_link_uri(
        &self,
        values: &WireValues,
        name: &str,
        explicit: &Explicit<Url>,
    ) -> Result<Option<Url>, MetadataError> {
        if let Some(explicit) = explicit.get() {
            return Ok(explicit.cloned());
        }
        match self.edit_link(values)? {
            Some(edit_link) => Ok(Some(self.uri_builder.build_navigation_link(edit_link, name)?)),
            None => Ok(None),
        }
    }

    /// Returns the explicit association link, else `editLink/name/$ref`.
    pub fn association_link_uri(
        &self,
        values: &WireValues,
        name: &str,
        explicit: &Explicit<Url>,
    ) -> Result<Option<Url>, MetadataError> {
        if let Some(explicit) = explicit.get() {
            return Ok(explicit.cloned());
        }
        match self.edit_link(values)? {
            Some(edit_link) => Ok(Some(self.uri_builder.build_association_link(edit_link, name)?)),
            None => Ok(None),
        }
    }

    /// Records that the navigation link `name` was written or read.
    pub fn mark_navigation_link_processed(&mut self, name: &str) {
        self.navigation.mark_processed(name);
    }

    /// Advances the unprocessed navigation link cursor.
    pub fn next_unprocessed_navigation_link(&mut self) -> Option<NavigationLinkInfo> {
        let entry = self.entry.as_ref();
        self.navigation
            .next(|| entry.selected_navigation_properties())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ModelEntryContext, Selection, TypeContext};
    use crate::metadata::{EntityMetadataBuilder, IdForSerialization};
    use crate::model::{OperationOrigin, SchemaBuilder, WireEntity};
    use crate::test_support::{base_uri, sample_model, sample_schema};
    use crate::uri::UrlConvention;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn entity_in(
        metadata: MetadataContext,
        type_context: TypeContext,
        actual: &str,
        values: WireValues,
    ) -> WireEntity {
        let entry = ModelEntryContext::new(metadata.shared_model(), type_context, actual).unwrap();
        WireEntity::from_values(values)
            .with_metadata_builder(EntityMetadataBuilder::conventional(metadata, entry))
    }

    fn entity(type_context: TypeContext, actual: &str, values: WireValues) -> WireEntity {
        let metadata = MetadataContext::new(sample_model(), base_uri()).unwrap();
        entity_in(metadata, type_context, actual, values)
    }

    fn customers() -> TypeContext {
        TypeContext::entity_set("Customers", "NS.Customer")
    }

    fn customer_values(id: i32) -> WireValues {
        WireValues {
            properties: vec![Property::primitive("ID", id), Property::primitive("Version", 3)],
            ..Default::default()
        }
    }

    fn customer(values: WireValues) -> WireEntity {
        entity(customers(), "NS.Customer", values)
    }

    fn link(result: Result<Option<&Url>, MetadataError>) -> Option<String> {
        result.unwrap().map(Url::to_string)
    }

    fn owned(result: Result<Option<Url>, MetadataError>) -> Option<String> {
        result.unwrap().map(String::from)
    }

    // =========================================================================
    // Identity and links
    // =========================================================================

    #[test]
    fn test_computed_links_follow_key_convention() {
        let e = customer(customer_values(42));
        let expected = Some("http://host/service.svc/Customers(42)".to_string());
        assert_eq!(link(e.edit_link()), expected);
        assert_eq!(link(e.read_link()), expected);
        assert_eq!(link(e.id()), expected);
    }

    #[test]
    fn test_explicit_values_win() {
        let mut values = customer_values(42);
        values.edit_link = Explicit::Value(url("http://other/edit"));
        values.read_link = Explicit::Value(url("http://other/read"));
        values.etag = Explicit::Value("W/\"x\"".to_string());
        let e = customer(values);

        assert_eq!(link(e.edit_link()).as_deref(), Some("http://other/edit"));
        assert_eq!(link(e.read_link()).as_deref(), Some("http://other/read"));
        assert_eq!(e.etag(), Some("W/\"x\""));
    }

    #[test]
    fn test_explicit_null_suppresses_computation() {
        let mut values = customer_values(42);
        values.edit_link = Explicit::Null;
        values.etag = Explicit::Null;
        values.id = Explicit::Null;
        let e = customer(values);

        assert_eq!(link(e.edit_link()), None);
        assert_eq!(link(e.read_link()), None);
        assert_eq!(link(e.id()), None);
        assert_eq!(e.etag(), None);
        assert_eq!(
            owned(e.navigation_link("Orders", &Explicit::Unset)),
            None
        );
    }

    #[test]
    fn test_computed_values_are_cached() {
        let e = customer(customer_values(42));
        let first = e.edit_link().unwrap().unwrap();
        let second = e.edit_link().unwrap().unwrap();
        assert!(std::ptr::eq(first, second));

        let etag = e.etag().unwrap();
        assert!(std::ptr::eq(etag, e.etag().unwrap()));
    }

    #[test]
    fn test_id_falls_back_to_read_link_then_edit_link() {
        let mut values = customer_values(42);
        values.read_link = Explicit::Value(url("http://other/read"));
        values.edit_link = Explicit::Value(url("http://other/edit"));
        assert_eq!(link(customer(values).id()).as_deref(), Some("http://other/read"));

        let mut values = customer_values(42);
        values.edit_link = Explicit::Value(url("http://other/edit"));
        assert_eq!(link(customer(values).id()).as_deref(), Some("http://other/edit"));

        assert_eq!(
            link(customer(customer_values(42)).id()).as_deref(),
            Some("http://host/service.svc/Customers(42)")
        );
    }

    #[test]
    fn test_id_skips_null_read_link() {
        let mut values = customer_values(42);
        values.read_link = Explicit::Null;
        values.edit_link = Explicit::Value(url("http://other/edit"));
        let e = customer(values);
        assert_eq!(link(e.read_link()), None);
        assert_eq!(link(e.id()).as_deref(), Some("http://other/edit"));
    }

    #[test]
    fn test_cached_values_are_reused() {
        let e = entity(customers(), "NS.VipCustomer", customer_values(42));

        let read = e.read_link().unwrap().unwrap();
        assert!(std::ptr::eq(read, e.read_link().unwrap().unwrap()));

        let id = e.id().unwrap().unwrap();
        assert!(std::ptr::eq(id, e.id().unwrap().unwrap()));

        let first = e.actions();
        let second = e.actions();
        assert_eq!(first.len(), second.len());
        assert!(first
            .iter()
            .zip(&second)
            .all(|(a, b)| std::ptr::eq(a.descriptor(), b.descriptor())));

        let first = e.properties();
        let second = e.properties();
        assert_eq!(first.len(), second.len());
        assert!(first.iter().zip(&second).all(|(a, b)| std::ptr::eq(*a, *b)));
    }

    #[test]
    fn test_explicit_id_is_edit_link_base() {
        let mut values = customer_values(42);
        values.id = Explicit::Value(url("http://other/svc/Customers(9)"));
        values.type_name = Some("NS.VipCustomer".to_string());
        let e = entity(customers(), "NS.VipCustomer", values);
        assert_eq!(
            link(e.edit_link()).as_deref(),
            Some("http://other/svc/Customers(9)/NS.VipCustomer")
        );
    }

    #[test]
    fn test_type_segment_only_for_derived_types() {
        let derived = entity(customers(), "NS.VipCustomer", customer_values(42));
        assert_eq!(
            link(derived.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers(42)/NS.VipCustomer")
        );
        assert_eq!(
            link(derived.id()).as_deref(),
            Some("http://host/service.svc/Customers(42)")
        );

        let base = customer(customer_values(42));
        assert_eq!(
            link(base.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers(42)")
        );
    }

    #[test]
    fn test_transient_entity_has_no_computed_id() {
        let mut values = customer_values(42);
        values.is_transient = true;
        let e = customer(values);
        assert_eq!(link(e.id()), None);
        assert_eq!(e.id_for_serialization().unwrap(), IdForSerialization::Transient);

        let persisted = customer(customer_values(42));
        assert_eq!(
            persisted.id_for_serialization().unwrap(),
            IdForSerialization::Id(url("http://host/service.svc/Customers(42)"))
        );
    }

    #[test]
    fn test_missing_key_is_an_error_and_not_cached() {
        let mut e = customer(WireValues::default());
        assert_eq!(
            e.edit_link(),
            Err(MetadataError::MissingKeyValue {
                type_name: "NS.Customer".to_string(),
                property: "ID".to_string(),
            })
        );

        e.add_property(Property::primitive("ID", 5));
        assert_eq!(
            link(e.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers(5)")
        );
    }

    #[test]
    fn test_unknown_navigation_source() {
        let e = entity(
            TypeContext::unknown("NS.Customer"),
            "NS.Customer",
            customer_values(1),
        );
        assert_eq!(
            e.edit_link(),
            Err(MetadataError::MissingNavigationSource {
                type_name: "NS.Customer".to_string(),
            })
        );
    }

    #[test]
    fn test_singleton_uri_has_no_key() {
        let e = entity(
            TypeContext::singleton("Company", "NS.Company"),
            "NS.Company",
            WireValues::default(),
        );
        assert_eq!(
            link(e.edit_link()).as_deref(),
            Some("http://host/service.svc/Company")
        );
        assert_eq!(e.etag(), None);
    }

    #[test]
    fn test_contained_uri_nests_under_parent() {
        let parent = url("http://host/service.svc/Orders(7)");
        let values = WireValues {
            properties: vec![Property::primitive("LineNo", 2)],
            ..Default::default()
        };
        let lines =
            TypeContext::from_containment(sample_model().as_ref(), "NS.Order", parent, "Lines")
                .unwrap();
        let e = entity(lines, "NS.Line", values);
        assert_eq!(
            link(e.id()).as_deref(),
            Some("http://host/service.svc/Orders(7)/Lines(2)")
        );
    }

    // =========================================================================
    // URL conventions
    // =========================================================================

    #[test]
    fn test_key_as_segment_override() {
        let metadata = MetadataContext::new(sample_model(), base_uri())
            .unwrap()
            .with_url_convention(UrlConvention::key_as_segment());
        let e = entity_in(metadata, customers(), "NS.Customer", customer_values(42));
        assert_eq!(
            link(e.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers/42")
        );
    }

    #[test]
    fn test_annotation_enables_key_as_segment_unless_overridden() {
        let model: Arc<dyn crate::model::EdmModel> =
            Arc::new(sample_schema().key_as_segment().build());

        let annotated = MetadataContext::new(model.clone(), base_uri()).unwrap();
        let e = entity_in(annotated, customers(), "NS.Customer", customer_values(42));
        assert_eq!(
            link(e.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers/42")
        );

        let overridden = MetadataContext::new(model, base_uri())
            .unwrap()
            .with_url_convention(UrlConvention::parentheses());
        let e = entity_in(overridden, customers(), "NS.Customer", customer_values(42));
        assert_eq!(
            link(e.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers(42)")
        );
    }

    // =========================================================================
    // ETags
    // =========================================================================

    #[test]
    fn test_etag_from_ordered_properties() {
        let e = customer(customer_values(42));
        assert_eq!(e.etag(), Some("W/\"3\""));

        let values = WireValues {
            properties: vec![
                Property::primitive("OrderID", 7),
                Property::primitive("Status", "in progress"),
                Property::primitive("Total", 120),
            ],
            ..Default::default()
        };
        let order = entity(
            TypeContext::entity_set("Orders", "NS.Order"),
            "NS.Order",
            values,
        );
        assert_eq!(order.etag(), Some("W/\"120,'in%20progress'\""));
    }

    #[test]
    fn test_etag_renders_missing_values_as_null() {
        let values = WireValues {
            properties: vec![Property::primitive("OrderID", 7)],
            ..Default::default()
        };
        let order = entity(
            TypeContext::entity_set("Orders", "NS.Order"),
            "NS.Order",
            values,
        );
        assert_eq!(order.etag(), Some("W/\"null,null\""));
    }

    // =========================================================================
    // Streams and properties
    // =========================================================================

    #[test]
    fn test_media_resource_only_for_media_link_entries() {
        assert!(customer(customer_values(42)).media_resource().is_none());

        let vip = entity(customers(), "NS.VipCustomer", customer_values(42));
        let media = vip.media_resource().unwrap();
        assert_eq!(media.name(), None);
        assert_eq!(
            owned(media.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers(42)/NS.VipCustomer/$value")
        );

        let mut values = customer_values(42);
        values.media_resource = Explicit::Null;
        let suppressed = entity(customers(), "NS.VipCustomer", values);
        assert!(suppressed.media_resource().is_none());
    }

    #[test]
    fn test_explicit_media_resource_wins() {
        let mut media = StreamReferenceValue::new();
        media.content_type = Some("image/png".to_string());
        media.edit_link = Explicit::Value(url("http://cdn/media"));
        let mut values = customer_values(42);
        values.media_resource = Explicit::Value(media);
        let e = entity(customers(), "NS.VipCustomer", values);

        let media = e.media_resource().unwrap();
        assert_eq!(media.content_type(), Some("image/png"));
        assert_eq!(owned(media.edit_link()).as_deref(), Some("http://cdn/media"));
        assert_eq!(
            owned(media.read_link()).as_deref(),
            Some("http://host/service.svc/Customers(42)/NS.VipCustomer/$value")
        );
    }

    #[test]
    fn test_explicit_media_resource_on_plain_entity() {
        let mut values = customer_values(42);
        values.media_resource = Explicit::Value(StreamReferenceValue::new());
        let e = customer(values);
        assert!(e.media_resource().is_some());
    }

    #[test]
    fn test_explicit_stream_links_win() {
        let mut stream = StreamReferenceValue::new();
        stream.read_link = Explicit::Value(url("http://cdn/photo.jpg"));
        let mut values = customer_values(42);
        values.properties.push(Property::stream("Photo", stream));
        let e = customer(values);

        let photo = e.stream_property("Photo").unwrap();
        assert_eq!(owned(photo.read_link()).as_deref(), Some("http://cdn/photo.jpg"));
        assert_eq!(
            owned(photo.edit_link()).as_deref(),
            Some("http://host/service.svc/Customers(42)/Photo")
        );
    }

    #[test]
    fn test_selected_stream_properties_are_synthesized() {
        let e = customer(customer_values(42));
        let names: Vec<&str> = e.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ID", "Version", "Photo"]);
    }

    #[test]
    fn test_explicit_stream_property_is_not_duplicated() {
        let mut values = customer_values(42);
        values
            .properties
            .push(Property::stream("Photo", StreamReferenceValue::new()));
        let e = customer(values);
        let photos = e.properties().iter().filter(|p| p.name == "Photo").count();
        assert_eq!(photos, 1);
    }

    #[test]
    fn test_unselected_stream_properties_are_skipped() {
        let model = sample_model();
        let metadata = MetadataContext::new(model.clone(), base_uri()).unwrap();
        let entry = ModelEntryContext::new(model, customers(), "NS.Customer")
            .unwrap()
            .with_selection(Selection::only(["ID"]));
        let e = WireEntity::from_values(customer_values(42))
            .with_metadata_builder(EntityMetadataBuilder::conventional(metadata, entry));
        assert!(e.stream_property("Photo").is_none());
        assert_eq!(e.properties().len(), 2);
    }

    #[test]
    fn test_empty_stream_name_is_rejected() {
        let e = customer(customer_values(42));
        assert_eq!(
            e.metadata_builder().stream_edit_link(e.values(), Some("")),
            Err(MetadataError::EmptyStreamPropertyName)
        );
    }

    // =========================================================================
    // Operations
    // =========================================================================

    #[test]
    fn test_explicit_operations_come_first_without_duplicates() {
        let mut values = customer_values(42);
        values.actions.push(OperationDescriptor::action("#NS.Archive"));
        let e = entity(customers(), "NS.VipCustomer", values);

        let actions = e.actions();
        let summary: Vec<(&str, OperationOrigin)> = actions
            .iter()
            .map(|op| (op.metadata(), op.descriptor().origin()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("#NS.Archive", OperationOrigin::Wire),
                ("#NS.Promote", OperationOrigin::Synthesized),
            ]
        );
    }

    #[test]
    fn test_operation_targets() {
        let e = entity(customers(), "NS.VipCustomer", customer_values(42));
        let actions = e.actions();

        let archive = actions.iter().find(|op| op.metadata() == "#NS.Archive").unwrap();
        assert_eq!(
            owned(archive.target()).as_deref(),
            Some("http://host/service.svc/Customers(42)/NS.VipCustomer/NS.Archive")
        );
        assert_eq!(archive.title().as_deref(), Some("NS.Archive"));

        let promote = actions.iter().find(|op| op.metadata() == "#NS.Promote").unwrap();
        assert_eq!(
            owned(promote.target()).as_deref(),
            Some("http://host/service.svc/Customers(42)/NS.VipCustomer/NS.Promote")
        );
    }

    #[test]
    fn test_overloaded_function_target_drops_parameters() {
        let e = customer(customer_values(42));
        let functions = e.functions();
        assert_eq!(functions.len(), 2);
        for function in &functions {
            assert_eq!(
                owned(function.target()).as_deref(),
                Some("http://host/service.svc/Customers(42)/NS.TopOrders")
            );
        }
    }

    #[test]
    fn test_explicit_operation_target_and_title_win() {
        let mut values = customer_values(42);
        values.actions.push(
            OperationDescriptor::action("#NS.Archive")
                .with_target(Some(url("http://other/archive")))
                .with_title(None),
        );
        let e = customer(values);
        let actions = e.actions();
        assert_eq!(owned(actions[0].target()).as_deref(), Some("http://other/archive"));
        assert_eq!(actions[0].title(), None);
    }

    #[test]
    fn test_bound_operation_targets_share_explicit_id() {
        let mut values = customer_values(42);
        values.id = Explicit::Value(url("http://other/svc/Customers(9)"));
        let e = entity(customers(), "NS.VipCustomer", values);
        let actions = e.actions();

        for (metadata, expected) in [
            ("#NS.Archive", "http://other/svc/Customers(9)/NS.VipCustomer/NS.Archive"),
            ("#NS.Promote", "http://other/svc/Customers(9)/NS.VipCustomer/NS.Promote"),
        ] {
            let action = actions.iter().find(|op| op.metadata() == metadata).unwrap();
            assert_eq!(owned(action.target()).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_bound_operation_target_with_explicit_id_needs_no_key() {
        let values = WireValues {
            id: Explicit::Value(url("http://other/svc/Customers(9)")),
            ..Default::default()
        };
        let e = entity(customers(), "NS.VipCustomer", values);
        let actions = e.actions();
        let promote = actions.iter().find(|op| op.metadata() == "#NS.Promote").unwrap();
        assert_eq!(
            owned(promote.target()).as_deref(),
            Some("http://other/svc/Customers(9)/NS.VipCustomer/NS.Promote")
        );
    }

    #[test]
    fn test_bound_operation_target_uses_explicit_edit_link() {
        let mut values = customer_values(42);
        values.edit_link = Explicit::Value(url("http://other/edit/Customers(42)"));
        let e = entity(customers(), "NS.VipCustomer", values);
        let actions = e.actions();
        let promote = actions.iter().find(|op| op.metadata() == "#NS.Promote").unwrap();
        assert_eq!(
            owned(promote.target()).as_deref(),
            Some("http://other/edit/Customers(42)/NS.VipCustomer/NS.Promote")
        );
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn test_navigation_and_association_links() {
        let e = customer(customer_values(42));
        assert_eq!(
            owned(e.navigation_link("Orders", &Explicit::Unset)).as_deref(),
            Some("http://host/service.svc/Customers(42)/Orders")
        );
        assert_eq!(
            owned(e.association_link("Orders", &Explicit::Unset)).as_deref(),
            Some("http://host/service.svc/Customers(42)/Orders/$ref")
        );
        assert_eq!(
            owned(e.navigation_link("Orders", &Explicit::Value(url("http://other/o")))).as_deref(),
            Some("http://other/o")
        );
        assert_eq!(owned(e.association_link("Orders", &Explicit::Null)), None);
    }

    #[test]
    fn test_unprocessed_navigation_links_single_pass() {
        let mut e = entity(customers(), "NS.VipCustomer", customer_values(42));
        e.mark_navigation_link_processed("Orders");

        let first = e.next_unprocessed_navigation_link().unwrap();
        assert_eq!(first.name, "BestFriend");
        assert!(!first.is_collection);

        e.mark_navigation_link_processed("Perks");
        assert_eq!(e.unprocessed_navigation_links().count(), 0);
        assert_eq!(e.next_unprocessed_navigation_link(), None);
    }

    #[test]
    fn test_unprocessed_navigation_links_resume() {
        let mut e = entity(customers(), "NS.VipCustomer", customer_values(42));
        let names: Vec<String> = e
            .unprocessed_navigation_links()
            .take(1)
            .map(|link| link.name)
            .collect();
        assert_eq!(names, vec!["Orders"]);

        let rest: Vec<String> = e.unprocessed_navigation_links().map(|link| link.name).collect();
        assert_eq!(rest, vec!["BestFriend", "Perks"]);
    }

    #[test]
    fn test_custom_model_without_annotations() {
        let model: Arc<dyn crate::model::EdmModel> = Arc::new(
            SchemaBuilder::new("Shop")
                .entity_type("Item", |t| t.key("Sku"))
                .entity_set("Items", "Shop.Item")
                .build(),
        );
        let metadata = MetadataContext::new(model, url("http://shop/api/")).unwrap();
        let values = WireValues {
            properties: vec![Property::primitive("Sku", "A/1")],
            ..Default::default()
        };
        let e = entity_in(
            metadata,
            TypeContext::entity_set("Items", "Shop.Item"),
            "Shop.Item",
            values,
        );
        assert_eq!(
            link(e.id()).as_deref(),
            Some("http://shop/api/Items('A%2F1')")
        );
        assert!(e.actions().is_empty());
        assert_eq!(e.etag(), None);
    }
}

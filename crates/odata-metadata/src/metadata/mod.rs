//! Entity metadata builders.
//!
//! Every [`WireEntity`](crate::model::WireEntity) owns one
//! [`EntityMetadataBuilder`]. The builder answers every metadata accessor of
//! the entity: the `NoOp` variant only reports explicit values, while the
//! `Conventional` variant fills the gaps from the model and URL conventions.

pub mod conventional;
pub mod missing_operations;
pub mod navigation;

pub use conventional::ConventionalMetadataBuilder;
pub use missing_operations::{MissingOperationGenerator, MissingOperations};
pub use navigation::{NavigationLinkInfo, UnprocessedNavigationLinks};

use url::Url;

use crate::context::{EntryMetadataContext, MetadataContext};
use crate::error::MetadataError;
use crate::model::{Explicit, OperationDescriptor, Property, StreamReferenceValue, WireValues};

/// Whether and what to write as an entry's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdForSerialization {
    /// Transient entry: write an explicit null id.
    Transient,
    /// Write this id.
    Id(Url),
    /// No id could be determined: write nothing.
    Unavailable,
}

impl IdForSerialization {
    /// Returns true if an id (possibly null) should be written.
    pub fn should_write(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// Returns the id to write, if any.
    pub fn id(&self) -> Option<&Url> {
        match self {
            Self::Id(id) => Some(id),
            Self::Transient | Self::Unavailable => None,
        }
    }
}

/// The metadata strategy of one wire entity.
#[derive(Debug, Default)]
pub enum EntityMetadataBuilder {
    /// Reports explicit values only.
    #[default]
    NoOp,
    /// Computes and caches omitted values by convention.
    Conventional(Box<ConventionalMetadataBuilder>),
}

impl EntityMetadataBuilder {
    /// Creates a conventional builder for one entry.
    pub fn conventional(
        metadata: MetadataContext,
        entry: impl EntryMetadataContext + 'static,
    ) -> Self {
        Self::Conventional(Box::new(ConventionalMetadataBuilder::new(
            metadata,
            Box::new(entry),
        )))
    }

    /// Returns true for the conventional variant.
    pub fn is_conventional(&self) -> bool {
        matches!(self, Self::Conventional(_))
    }

    // =========================================================================
    // Identity and links
    // =========================================================================

    /// Returns the edit link: explicit, else computed.
    pub fn edit_link<'a>(&'a self, values: &'a WireValues) -> Result<Option<&'a Url>, MetadataError> {
        match self {
            Self::NoOp => Ok(values.edit_link.value()),
            Self::Conventional(builder) => builder.edit_link(values),
        }
    }

    /// Returns the read link: explicit, else computed.
    pub fn read_link<'a>(&'a self, values: &'a WireValues) -> Result<Option<&'a Url>, MetadataError> {
        match self {
            Self::NoOp => Ok(values.read_link.value()),
            Self::Conventional(builder) => builder.read_link(values),
        }
    }

    /// Returns the id: explicit, else computed.
    pub fn id<'a>(&'a self, values: &'a WireValues) -> Result<Option<&'a Url>, MetadataError> {
        match self {
            Self::NoOp => Ok(values.id.value()),
            Self::Conventional(builder) => builder.id(values),
        }
    }

    /// Returns the etag: explicit, else computed from the etag properties.
    pub fn etag<'a>(&'a self, values: &'a WireValues) -> Option<&'a str> {
        match self {
            Self::NoOp => values.etag.value().map(String::as_str),
            Self::Conventional(builder) => builder.etag(values),
        }
    }

    /// Returns the default stream of a media-link entry.
    pub fn media_resource<'a>(&'a self, values: &'a WireValues) -> Option<&'a StreamReferenceValue> {
        match self {
            Self::NoOp => values.media_resource.value(),
            Self::Conventional(builder) => builder.media_resource(values),
        }
    }

    /// Decides whether an id is written and which one.
    ///
    /// Transient entries always yield [`IdForSerialization::Transient`].
    pub fn id_for_serialization(
        &self,
        values: &WireValues,
    ) -> Result<IdForSerialization, MetadataError> {
        if values.is_transient {
            return Ok(IdForSerialization::Transient);
        }
        Ok(match self.id(values)? {
            Some(id) => IdForSerialization::Id(id.clone()),
            None => IdForSerialization::Unavailable,
        })
    }

    // =========================================================================
    // Properties and streams
    // =========================================================================

    /// Returns explicit properties followed by computed stream properties.
    pub fn properties<'a>(&'a self, values: &'a WireValues) -> Vec<&'a Property> {
        match self {
            Self::NoOp => values.properties.iter().collect(),
            Self::Conventional(builder) => builder.properties(values),
        }
    }

    /// Edit link of a named stream, or of the default stream when `name` is `None`.
    pub fn stream_edit_link(
        &self,
        values: &WireValues,
        name: Option<&str>,
    ) -> Result<Option<Url>, MetadataError> {
        check_stream_name(name)?;
        match self {
            Self::NoOp => Ok(None),
            Self::Conventional(builder) => builder.stream_edit_link(values, name),
        }
    }

    /// Read link of a named stream, or of the default stream when `name` is `None`.
    pub fn stream_read_link(
        &self,
        values: &WireValues,
        name: Option<&str>,
    ) -> Result<Option<Url>, MetadataError> {
        check_stream_name(name)?;
        match self {
            Self::NoOp => Ok(None),
            Self::Conventional(builder) => builder.stream_read_link(values, name),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Returns explicit actions followed by missing bindable actions.
    pub fn actions<'a>(&'a self, values: &'a WireValues) -> Vec<&'a OperationDescriptor> {
        match self {
            Self::NoOp => values.actions.iter().collect(),
            Self::Conventional(builder) => builder.actions(values),
        }
    }

    /// Returns explicit functions followed by missing bindable functions.
    pub fn functions<'a>(&'a self, values: &'a WireValues) -> Vec<&'a OperationDescriptor> {
        match self {
            Self::NoOp => values.functions.iter().collect(),
            Self::Conventional(builder) => builder.functions(values),
        }
    }

    /// Full operation name from a metadata reference such as `#NS.Op`.
    pub fn operation_name(&self, metadata: &str) -> Option<String> {
        match self {
            Self::NoOp => crate::uri::fragment::operation_name_from_metadata_reference(None, metadata),
            Self::Conventional(builder) => builder.operation_name(metadata),
        }
    }

    /// Returns the conventional target of an operation advertised on the entity.
    pub fn operation_target_uri(
        &self,
        values: &WireValues,
        operation_name: &str,
        binding_parameter_type: Option<&str>,
    ) -> Result<Option<Url>, MetadataError> {
        match self {
            Self::NoOp => Ok(None),
            Self::Conventional(builder) => {
                builder.operation_target_uri(values, operation_name, binding_parameter_type)
            }
        }
    }

    /// Returns the conventional title of an operation.
    pub fn operation_title(&self, operation_name: &str) -> Option<String> {
        match self {
            Self::NoOp => None,
            Self::Conventional(builder) => builder.operation_title(operation_name),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Navigation link for `name`. An explicit value, including null, wins verbatim.
    pub fn navigation_link_uri(
        &self,
        values: &WireValues,
        name: &str,
        explicit: &Explicit<Url>,
    ) -> Result<Option<Url>, MetadataError> {
        match self {
            Self::NoOp => Ok(explicit.value().cloned()),
            Self::Conventional(builder) => builder.navigation_link_uri(values, name, explicit),
        }
    }

    /// Association link for `name`. An explicit value, including null, wins verbatim.
    pub fn association_link_uri(
        &self,
        values: &WireValues,
        name: &str,
        explicit: &Explicit<Url>,
    ) -> Result<Option<Url>, MetadataError> {
        match self {
            Self::NoOp => Ok(explicit.value().cloned()),
            Self::Conventional(builder) => builder.association_link_uri(values, name, explicit),
        }
    }

    /// Records that the navigation link `name` was written or read.
    pub fn mark_navigation_link_processed(&mut self, name: &str) {
        if let Self::Conventional(builder) = self {
            builder.mark_navigation_link_processed(name);
        }
    }

    /// Advances the unprocessed navigation link cursor. The cursor never restarts.
    pub fn next_unprocessed_navigation_link(&mut self) -> Option<NavigationLinkInfo> {
        match self {
            Self::NoOp => None,
            Self::Conventional(builder) => builder.next_unprocessed_navigation_link(),
        }
    }

    /// Returns the remaining unprocessed navigation links.
    pub fn unprocessed_navigation_links(&mut self) -> UnprocessedNavigationLinks<'_> {
        UnprocessedNavigationLinks::new(self)
    }
}

fn check_stream_name(name: Option<&str>) -> Result<(), MetadataError> {
    match name {
        Some("") => Err(MetadataError::EmptyStreamPropertyName),
        _ => Ok(()),
    }
}

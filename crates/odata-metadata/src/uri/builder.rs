//! Conventional URI construction.
//!
//! Builds entity-set, entity-instance, type-cast, stream, navigation and
//! operation URIs from a service base URI, following the protocol's URL
//! conventions. Segments passed in are escaped here; the resulting [`Url`]s
//! never double-escape.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::MetadataError;
use crate::model::PrimitiveValue;
use crate::uri::UrlConvention;

/// Characters kept verbatim in literals and identifiers: unreserved plus `'`.
pub(crate) const LITERAL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'\'');

/// Segment addressing the default stream of a media-link entry.
pub const VALUE_SEGMENT: &str = "$value";

/// Segment addressing an entity reference.
pub const REF_SEGMENT: &str = "$ref";

/// Percent-escapes a literal or identifier for use inside a path segment.
pub fn escape_literal(text: &str) -> String {
    utf8_percent_encode(text, LITERAL).to_string()
}

/// Builds conventional URIs relative to a service base URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalUriBuilder {
    service_base_uri: Url,
    convention: UrlConvention,
}

impl ConventionalUriBuilder {
    /// Creates a builder for the given service root.
    pub fn new(service_base_uri: Url, convention: UrlConvention) -> Self {
        Self {
            service_base_uri,
            convention,
        }
    }

    /// Returns the service root.
    pub fn base_uri(&self) -> &Url {
        &self.service_base_uri
    }

    /// Returns the key rendering convention.
    pub fn convention(&self) -> UrlConvention {
        self.convention
    }

    /// Returns `base/EntitySet`.
    pub fn build_entity_set_uri(&self, base: &Url, entity_set: &str) -> Result<Url, MetadataError> {
        append_segment(base, &escape_literal(entity_set))
    }

    /// Returns the entity-set URI followed by the key expression.
    ///
    /// Keys are rendered in the order given, which callers take from the
    /// model's declared key order.
    pub fn build_entity_instance_uri(
        &self,
        entity_set_uri: &Url,
        keys: &[(String, PrimitiveValue)],
        type_name: &str,
    ) -> Result<Url, MetadataError> {
        if keys.is_empty() {
            return Err(MetadataError::NoKeyProperties {
                type_name: type_name.to_string(),
            });
        }

        if self.convention.generate_key_as_segment() {
            let mut uri = entity_set_uri.clone();
            for (_, value) in keys {
                uri = append_segment(&uri, &escape_literal(&value.to_segment_literal()))?;
            }
            return Ok(uri);
        }

        let expression = if let [(_, value)] = keys {
            escape_literal(&value.to_literal())
        } else {
            keys.iter()
                .map(|(name, value)| {
                    format!("{}={}", escape_literal(name), escape_literal(&value.to_literal()))
                })
                .collect::<Vec<_>>()
                .join(",")
        };
        append_to_last_segment(entity_set_uri, &format!("({expression})"))
    }

    /// Returns `uri/Namespace.Type`.
    pub fn append_type_segment(&self, uri: &Url, type_name: &str) -> Result<Url, MetadataError> {
        append_segment(uri, &escape_literal(type_name))
    }

    /// Returns the edit link of a named stream, or of the default stream when `name` is `None`.
    pub fn build_stream_edit_link(
        &self,
        edit_link: &Url,
        name: Option<&str>,
    ) -> Result<Url, MetadataError> {
        stream_link(edit_link, name)
    }

    /// Returns the read link of a named stream, or of the default stream when `name` is `None`.
    pub fn build_stream_read_link(
        &self,
        read_link: &Url,
        name: Option<&str>,
    ) -> Result<Url, MetadataError> {
        stream_link(read_link, name)
    }

    /// Returns `base/NavigationProperty`.
    pub fn build_navigation_link(&self, base: &Url, name: &str) -> Result<Url, MetadataError> {
        append_segment(base, &escape_literal(name))
    }

    /// Returns `base/NavigationProperty/$ref`.
    pub fn build_association_link(&self, base: &Url, name: &str) -> Result<Url, MetadataError> {
        let navigation = self.build_navigation_link(base, name)?;
        append_segment(&navigation, REF_SEGMENT)
    }

    /// Returns `base[/BindingType]/Namespace.Operation`.
    pub fn build_operation_target(
        &self,
        base: &Url,
        operation_name: &str,
        binding_type: Option<&str>,
    ) -> Result<Url, MetadataError> {
        let base = match binding_type.filter(|t| !t.is_empty()) {
            Some(ty) => self.append_type_segment(base, ty)?,
            None => base.clone(),
        };
        append_segment(&base, &escape_literal(operation_name))
    }
}

fn stream_link(base: &Url, name: Option<&str>) -> Result<Url, MetadataError> {
    match name {
        Some(name) => append_segment(base, &escape_literal(name)),
        None => append_segment(base, VALUE_SEGMENT),
    }
}

/// Appends an already-escaped segment to the path of `base`.
pub(crate) fn append_segment(base: &Url, segment: &str) -> Result<Url, MetadataError> {
    let path = base.path().trim_end_matches('/');
    with_path(base, &format!("{path}/{segment}"))
}

/// Appends already-escaped text to the last path segment of `base`.
fn append_to_last_segment(base: &Url, suffix: &str) -> Result<Url, MetadataError> {
    let path = base.path().trim_end_matches('/');
    with_path(base, &format!("{path}{suffix}"))
}

fn with_path(base: &Url, path: &str) -> Result<Url, MetadataError> {
    if base.cannot_be_a_base() {
        return Err(MetadataError::CannotBeABase {
            uri: base.to_string(),
        });
    }
    let mut uri = base.clone();
    uri.set_path(path);
    Ok(uri)
}

//! URL conventions for rendering entity keys.

use crate::model::EdmModel;

/// Container annotation term carrying the service's URL conventions.
pub const URL_CONVENTIONS_TERM: &str = "Com.Microsoft.OData.Service.Conventions.V1.UrlConventions";

/// Annotation (and header) value selecting key-as-segment URLs.
pub const KEY_AS_SEGMENT: &str = "KeyAsSegment";

/// How entity keys are rendered in conventional URLs.
///
/// The default renders keys in parentheses (`Customers(42)`); key-as-segment
/// renders them as path segments (`Customers/42`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UrlConvention {
    key_as_segment: bool,
}

impl UrlConvention {
    /// Parenthesized keys.
    pub const fn parentheses() -> Self {
        Self {
            key_as_segment: false,
        }
    }

    /// Keys as path segments.
    pub const fn key_as_segment() -> Self {
        Self {
            key_as_segment: true,
        }
    }

    /// Creates a convention from an explicit flag.
    pub const fn with_key_as_segment(key_as_segment: bool) -> Self {
        Self { key_as_segment }
    }

    /// Returns true if keys are rendered as path segments.
    pub const fn generate_key_as_segment(&self) -> bool {
        self.key_as_segment
    }

    /// Reads the convention from the value of the [`URL_CONVENTIONS_TERM`] annotation.
    pub fn from_annotation(value: Option<&str>) -> Self {
        Self::with_key_as_segment(value.is_some_and(|v| v == KEY_AS_SEGMENT))
    }

    /// Reads the convention from a client's URL-conventions request header value.
    pub fn from_header_value(value: Option<&str>) -> Option<Self> {
        value.map(|v| Self::with_key_as_segment(v.trim().eq_ignore_ascii_case(KEY_AS_SEGMENT)))
    }

    /// Resolves the convention for a model.
    ///
    /// An explicit override wins outright; otherwise the model's container
    /// annotation decides.
    pub fn resolve(explicit: Option<UrlConvention>, model: &dyn EdmModel) -> Self {
        explicit.unwrap_or_else(|| model.url_convention())
    }
}

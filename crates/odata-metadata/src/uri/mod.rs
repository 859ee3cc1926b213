//! URI conventions and construction primitives.
//!
//! - [`convention`]: key rendering convention (parentheses vs. key-as-segment)
//! - [`builder`]: conventional entity, stream, navigation and operation URIs
//! - [`fragment`]: metadata-reference names for operations

pub mod builder;
pub mod convention;
pub mod fragment;

pub use builder::{escape_literal, ConventionalUriBuilder, REF_SEGMENT, VALUE_SEGMENT};
pub use convention::{UrlConvention, KEY_AS_SEGMENT, URL_CONVENTIONS_TERM};
pub use fragment::{
    escape_fragment, metadata_reference_name, operation_name_from_metadata_reference,
    resolve_operations, unescape_fragment,
};

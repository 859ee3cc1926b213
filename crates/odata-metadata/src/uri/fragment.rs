//! Metadata-reference property names.
//!
//! An operation advertised on an entity is keyed by a metadata reference:
//! `#Namespace.Operation`, optionally with non-binding parameter names for
//! overloaded functions (`#Namespace.Fn(a,b)`), or an absolute form pointing
//! into the metadata document (`http://host/svc/$metadata#Namespace.Operation`).
//!
//! The fragment grammar is `#` followed by a dot-qualified name. Fragments are
//! percent-escaped with the URL fragment set, so dot-qualified names pass
//! through unchanged.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::model::{EdmModel, Operation, OperationKind};

/// Characters escaped inside a fragment (WHATWG fragment set plus `#` and `%`).
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%');

/// Percent-escapes an operation name for use as a fragment.
pub fn escape_fragment(name: &str) -> String {
    utf8_percent_encode(name, FRAGMENT).to_string()
}

/// Reverses [`escape_fragment`]. Invalid UTF-8 sequences are replaced.
pub fn unescape_fragment(fragment: &str) -> String {
    percent_decode_str(fragment).decode_utf8_lossy().into_owned()
}

/// Returns the metadata reference property name for an operation.
///
/// Overloaded functions carry their non-binding parameter names so each
/// overload has a distinct reference.
pub fn metadata_reference_name(model: &dyn EdmModel, operation: &Operation) -> String {
    let full_name = operation.full_name();
    let overloaded = operation.kind == OperationKind::Function
        && model.find_operations(&full_name).len() > 1;
    let name = if overloaded {
        operation.full_name_with_parameters()
    } else {
        full_name
    };
    format!("#{}", escape_fragment(&name))
}

/// Extracts the (unescaped) operation name from a metadata reference.
///
/// `#`-relative references need no base. Other relative references are
/// resolved against `metadata_document_uri` when one is given. Returns `None`
/// when the reference has no fragment or cannot be parsed.
pub fn operation_name_from_metadata_reference(
    metadata_document_uri: Option<&Url>,
    reference: &str,
) -> Option<String> {
    if let Some(fragment) = reference.strip_prefix('#') {
        return non_empty(unescape_fragment(fragment));
    }

    let absolute = match Url::parse(reference) {
        Ok(uri) => uri,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            metadata_document_uri?.join(reference).ok()?
        }
        Err(_) => return None,
    };
    non_empty(unescape_fragment(absolute.fragment()?))
}

fn non_empty(name: String) -> Option<String> {
    if name.is_empty() { None } else { Some(name) }
}

/// Splits `Namespace.Fn(a,b)` into the full name and the optional parameter list.
pub fn split_parameters(name: &str) -> (&str, Option<Vec<&str>>) {
    match name.find('(') {
        Some(open) if name.ends_with(')') => {
            let inner = &name[open + 1..name.len() - 1];
            let params = if inner.trim().is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(str::trim).collect()
            };
            (&name[..open], Some(params))
        }
        _ => (name, None),
    }
}

/// Resolves an operation name (as extracted from a metadata reference) against the model.
///
/// A name without a parameter list matches every overload; a name with one
/// matches only the overload with exactly those non-binding parameters.
pub fn resolve_operations<'m>(model: &'m dyn EdmModel, name: &str) -> Vec<&'m Operation> {
    let (full_name, parameters) = split_parameters(name);
    let candidates = model.find_operations(full_name);
    match parameters {
        None => candidates,
        Some(params) => candidates
            .into_iter()
            .filter(|op| {
                op.parameters.len() == params.len()
                    && op.parameters.iter().zip(&params).all(|(a, b)| a == b)
            })
            .collect(),
    }
}

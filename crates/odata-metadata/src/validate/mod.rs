//! Entity type validation for entries and resource sets.
//!
//! Metadata computation assumes an entry's actual type is compatible with the
//! navigation source it was read from. These checks report violations as
//! [`ValidationError`]s; nothing here recovers from them.

use tracing::debug;

use crate::context::TypeContext;
use crate::error::ValidationError;
use crate::model::EdmModel;

/// Validates that `actual` is a known entity type assignable to the
/// navigation source's declared element type.
pub fn validate_entity_type(
    model: &dyn EdmModel,
    type_context: &TypeContext,
    actual: &str,
) -> Result<(), ValidationError> {
    validate_assignable(model, &type_context.navigation_source_entity_type, actual)
}

fn validate_assignable(
    model: &dyn EdmModel,
    expected: &str,
    actual: &str,
) -> Result<(), ValidationError> {
    if model.find_entity_type(actual).is_none() {
        return Err(ValidationError::UnknownEntityType {
            type_name: actual.to_string(),
        });
    }
    if !model.is_derived_from(actual, expected) {
        return Err(ValidationError::IncompatibleEntityType {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Validates the entry types of a heterogeneous resource set.
///
/// With an expected type every entry must derive from it. Without one, all
/// entries seen so far must share a common base type.
#[derive(Debug)]
pub struct ResourceSetTypeValidator<'m> {
    model: &'m dyn EdmModel,
    expected: Option<String>,
    common_base: Option<String>,
}

impl<'m> ResourceSetTypeValidator<'m> {
    pub fn new(model: &'m dyn EdmModel, expected: Option<String>) -> Self {
        Self {
            model,
            expected,
            common_base: None,
        }
    }

    /// The most derived type shared by every entry validated so far.
    pub fn common_base_type(&self) -> Option<&str> {
        self.common_base.as_deref()
    }

    /// Validates the next entry's actual type.
    pub fn validate(&mut self, actual: &str) -> Result<(), ValidationError> {
        if let Some(expected) = &self.expected {
            return validate_assignable(self.model, expected, actual);
        }
        if self.model.find_entity_type(actual).is_none() {
            return Err(ValidationError::UnknownEntityType {
                type_name: actual.to_string(),
            });
        }

        let common = match &self.common_base {
            None => actual.to_string(),
            Some(previous) => self.common_base_of(previous, actual).ok_or_else(|| {
                ValidationError::NoCommonBaseType {
                    previous: previous.clone(),
                    actual: actual.to_string(),
                }
            })?,
        };
        if self.common_base.as_deref() != Some(common.as_str()) {
            debug!(common_base = %common, "resource set common base type changed");
        }
        self.common_base = Some(common);
        Ok(())
    }

    fn common_base_of(&self, a: &str, b: &str) -> Option<String> {
        let b_chain: Vec<String> = self
            .model
            .type_chain(b)
            .iter()
            .map(|ty| ty.full_name())
            .collect();
        self.model
            .type_chain(a)
            .iter()
            .map(|ty| ty.full_name())
            .find(|name| b_chain.contains(name))
    }
}

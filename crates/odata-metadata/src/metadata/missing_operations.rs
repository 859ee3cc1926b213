//! Reconstruction of bindable operations omitted from a payload.
//!
//! Services may leave out operations that conventions always make available.
//! The generator reconciles what was serialized against what the model
//! declares as bindable and selected, and synthesizes descriptors for the
//! rest. Explicit operations always come first and are never duplicated.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::context::{EntryMetadataContext, MetadataContext};
use crate::model::{Operation, OperationDescriptor, OperationKind, WireValues};
use crate::uri::fragment::{
    metadata_reference_name, operation_name_from_metadata_reference, resolve_operations,
};

/// Synthesized operations, partitioned by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingOperations {
    pub actions: Vec<OperationDescriptor>,
    pub functions: Vec<OperationDescriptor>,
}

/// Computes the bindable operations missing from an entry.
#[derive(Debug, Clone, Copy)]
pub struct MissingOperationGenerator<'a> {
    metadata: &'a MetadataContext,
    entry: &'a dyn EntryMetadataContext,
}

impl<'a> MissingOperationGenerator<'a> {
    pub fn new(metadata: &'a MetadataContext, entry: &'a dyn EntryMetadataContext) -> Self {
        Self { metadata, entry }
    }

    /// Synthesizes descriptors for selected bindable operations not already
    /// present among the explicit actions and functions.
    pub fn generate(&self, values: &WireValues) -> MissingOperations {
        let present = self.explicit_operations(values);
        let declared_type = &self.entry.type_context().navigation_source_entity_type;
        let model = self.metadata.model();

        let mut missing = MissingOperations::default();
        for operation in self.entry.selected_bindable_operations() {
            if present.contains(&operation) {
                debug!(
                    operation = %operation.full_name(),
                    "bindable operation already present in payload"
                );
                continue;
            }

            let binding_parameter_type = operation
                .binding_type
                .clone()
                .filter(|binding| binding != declared_type);
            let descriptor = OperationDescriptor::synthesized(
                operation.kind,
                metadata_reference_name(model, &operation),
                binding_parameter_type,
            );
            match operation.kind {
                OperationKind::Action => missing.actions.push(descriptor),
                OperationKind::Function => missing.functions.push(descriptor),
            }
        }
        missing
    }

    /// Resolves every explicit action and function against the model.
    ///
    /// An ambiguous reference excludes every overload it resolves to; an
    /// unresolvable one excludes nothing.
    fn explicit_operations(&self, values: &WireValues) -> FxHashSet<Operation> {
        let model = self.metadata.model();
        let metadata_document_uri = self.metadata.metadata_document_uri();

        let mut present = FxHashSet::default();
        for descriptor in values.actions.iter().chain(&values.functions) {
            let Some(name) =
                operation_name_from_metadata_reference(Some(metadata_document_uri), &descriptor.metadata)
            else {
                debug!(reference = %descriptor.metadata, "metadata reference has no operation name");
                continue;
            };
            let resolved = resolve_operations(model, &name);
            if resolved.is_empty() {
                debug!(operation = %name, "metadata reference does not resolve to a model operation");
            }
            present.extend(resolved.into_iter().cloned());
        }
        present
    }
}

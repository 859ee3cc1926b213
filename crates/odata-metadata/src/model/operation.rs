//! Advertised operations (actions and functions) on a wire entity.

use url::Url;

use crate::error::MetadataError;
use crate::model::{Explicit, OperationKind, WireEntity};
use crate::uri::fragment::split_parameters;

/// Where an operation descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationOrigin {
    /// Read from, or explicitly written to, the payload.
    Wire,
    /// Reconstructed from the model's bindable operations.
    Synthesized,
}

/// An action or function advertised on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub kind: OperationKind,
    /// Metadata reference property name, e.g. `#NS.Archive`.
    pub metadata: String,
    /// Type segment to insert before the operation name in the target URI.
    pub binding_parameter_type: Option<String>,
    pub title: Explicit<String>,
    pub target: Explicit<Url>,
    origin: OperationOrigin,
}

impl OperationDescriptor {
    /// Creates an explicit action descriptor.
    pub fn action(metadata: impl Into<String>) -> Self {
        Self::new(OperationKind::Action, metadata.into(), OperationOrigin::Wire)
    }

    /// Creates an explicit function descriptor.
    pub fn function(metadata: impl Into<String>) -> Self {
        Self::new(OperationKind::Function, metadata.into(), OperationOrigin::Wire)
    }

    pub(crate) fn synthesized(
        kind: OperationKind,
        metadata: String,
        binding_parameter_type: Option<String>,
    ) -> Self {
        Self {
            binding_parameter_type,
            ..Self::new(kind, metadata, OperationOrigin::Synthesized)
        }
    }

    fn new(kind: OperationKind, metadata: String, origin: OperationOrigin) -> Self {
        Self {
            kind,
            metadata,
            binding_parameter_type: None,
            title: Explicit::Unset,
            target: Explicit::Unset,
            origin,
        }
    }

    /// Sets an explicit target (`None` is an explicit null).
    pub fn with_target(mut self, target: Option<Url>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets an explicit title (`None` is an explicit null).
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the binding parameter type.
    pub fn with_binding_parameter_type(mut self, type_name: impl Into<String>) -> Self {
        self.binding_parameter_type = Some(type_name.into());
        self
    }

    pub fn origin(&self) -> OperationOrigin {
        self.origin
    }

    pub fn is_synthesized(&self) -> bool {
        self.origin == OperationOrigin::Synthesized
    }
}

/// An operation viewed through the entity that advertises it.
///
/// Missing title and target are computed by the entity's metadata builder.
#[derive(Debug, Clone, Copy)]
pub struct BoundOperation<'e> {
    entity: &'e WireEntity,
    operation: &'e OperationDescriptor,
}

impl<'e> BoundOperation<'e> {
    pub(crate) fn new(entity: &'e WireEntity, operation: &'e OperationDescriptor) -> Self {
        Self { entity, operation }
    }

    /// The underlying descriptor.
    pub fn descriptor(&self) -> &'e OperationDescriptor {
        self.operation
    }

    pub fn kind(&self) -> OperationKind {
        self.operation.kind
    }

    pub fn metadata(&self) -> &'e str {
        &self.operation.metadata
    }

    /// The operation's name taken from its metadata reference.
    pub fn name(&self) -> Option<String> {
        self.entity
            .metadata_builder()
            .operation_name(&self.operation.metadata)
    }

    /// The explicit target, or the conventional one.
    ///
    /// Conventional targets name the operation without its overload parameters.
    pub fn target(&self) -> Result<Option<Url>, MetadataError> {
        match &self.operation.target {
            Explicit::Value(target) => Ok(Some(target.clone())),
            Explicit::Null => Ok(None),
            Explicit::Unset => {
                let Some(name) = self.name() else {
                    return Ok(None);
                };
                let (name, _) = split_parameters(&name);
                self.entity.metadata_builder().operation_target_uri(
                    self.entity.values(),
                    name,
                    self.operation.binding_parameter_type.as_deref(),
                )
            }
        }
    }

    /// The explicit title, or the conventional one.
    pub fn title(&self) -> Option<String> {
        match &self.operation.title {
            Explicit::Value(title) => Some(title.clone()),
            Explicit::Null => None,
            Explicit::Unset => self
                .name()
                .and_then(|name| self.entity.metadata_builder().operation_title(&name)),
        }
    }
}

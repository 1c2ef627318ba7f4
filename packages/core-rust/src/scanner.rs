//! Descriptor scanning: turns a [`TypeDecl`] into routable operation descriptors.

use crate::error::RegistrationError;
use crate::schema::{MethodDecl, ParamDecl, TypeDecl};
use crate::types::{ParamType, ReturnShape, Verb};

/// One routable operation, derived from a declared method.
///
/// Built once at registration time and shared read-only with the route
/// handlers afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub verb: Verb,
    pub enabled: bool,
    pub params: Vec<ParameterDescriptor>,
    pub returns: ReturnShape,
    /// Index of the parameter bound from the request body, if any.
    pub body_param: Option<usize>,
}

/// One operation parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub ty: ParamType,
    pub body_marker: bool,
}

impl ParameterDescriptor {
    fn from_decl(decl: &ParamDecl) -> Self {
        Self {
            name: decl.name,
            ty: decl.ty.clone(),
            body_marker: decl.body_marker,
        }
    }

    /// Whether this parameter's type can be read from a JSON body.
    #[must_use]
    pub fn is_body_eligible(&self) -> bool {
        self.ty.is_body_eligible()
    }
}

impl OperationDescriptor {
    /// Whether parameter `index` is the one bound from the body.
    #[must_use]
    pub fn is_body_param(&self, index: usize) -> bool {
        self.body_param == Some(index)
    }
}

/// Describes a single method. Returns `None` for methods without a verb.
///
/// Disabled methods are described with `enabled == false`; [`scan`] drops them.
#[must_use]
pub fn describe(method: &MethodDecl) -> Option<OperationDescriptor> {
    let verb = method.verb?;
    let params: Vec<ParameterDescriptor> =
        method.params.iter().map(ParameterDescriptor::from_decl).collect();
    let body_param = select_body_param(&params);

    Some(OperationDescriptor {
        name: method.name,
        verb,
        enabled: !method.disabled,
        params,
        returns: method.returns,
        body_param,
    })
}

/// Scans a capability declaration into its routable operations.
///
/// Methods without a verb and disabled methods are skipped silently.
/// Declaration order is preserved. A capability with no eligible method
/// yields an empty list.
///
/// # Errors
///
/// Returns [`RegistrationError::InvalidCapabilityType`] when `decl` does not
/// carry the capability marker.
pub fn scan(decl: &TypeDecl) -> Result<Vec<OperationDescriptor>, RegistrationError> {
    if !decl.is_capability() {
        return Err(RegistrationError::InvalidCapabilityType {
            type_name: decl.name.to_string(),
        });
    }

    let operations: Vec<_> = decl
        .methods
        .iter()
        .filter_map(describe)
        .filter(|op| op.enabled)
        .collect();

    tracing::debug!(
        type_name = decl.name,
        declared = decl.methods.len(),
        routable = operations.len(),
        "scanned capability"
    );

    Ok(operations)
}

/// The first body-eligible parameter carrying the body marker, else the
/// first body-eligible parameter. Ineligible parameters are never selected,
/// marker or not.
fn select_body_param(params: &[ParameterDescriptor]) -> Option<usize> {
    params
        .iter()
        .position(|p| p.body_marker && p.is_body_eligible())
        .or_else(|| params.iter().position(ParameterDescriptor::is_body_eligible))
}

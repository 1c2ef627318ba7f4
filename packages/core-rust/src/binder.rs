//! Parameter binding: resolves every operation parameter from an inbound request.
//!
//! Each parameter is resolved from the first source that applies:
//!
//! 1. **Body** -- only the operation's selected body parameter; it never
//!    falls through to the other sources
//! 2. **Query** -- a query value with the parameter's name
//! 3. **Route** -- a route value with the parameter's name
//! 4. **Default** -- the type's zero value, or null
//!
//! Binding is all-or-nothing: the first failure aborts the request.

use tracing::{debug, warn};

use crate::args::Args;
use crate::body::decode_body;
use crate::config::BindingConfig;
use crate::convert::convert;
use crate::error::BindError;
use crate::scanner::{OperationDescriptor, ParameterDescriptor};
use crate::traits::RequestSource;
use crate::types::ArgValue;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Binds all parameters of `op` from `request`, in declared order.
///
/// # Errors
///
/// Returns the first [`BindError`] raised by any parameter; no partial
/// argument list is ever produced.
pub async fn bind<R>(
    op: &OperationDescriptor,
    request: &mut R,
    config: &BindingConfig,
) -> Result<Args, BindError>
where
    R: RequestSource + ?Sized,
{
    let mut values = Vec::with_capacity(op.params.len());

    for (index, param) in op.params.iter().enumerate() {
        let value = if op.is_body_param(index) {
            bind_body(param, request, config).await
        } else if let Some(raw) = request.query(param.name) {
            convert(param.name, &raw, &param.ty)
        } else if let Some(raw) = request.route_value(param.name) {
            convert(param.name, &raw, &param.ty)
        } else {
            Ok(param.ty.zero_value())
        };

        match value {
            Ok(value) => values.push(value),
            Err(err) => {
                warn!(
                    operation = op.name,
                    parameter = param.name,
                    error = %err,
                    "parameter binding failed"
                );
                return Err(err);
            }
        }
    }

    Ok(Args::new(values))
}

async fn bind_body<R>(
    param: &ParameterDescriptor,
    request: &mut R,
    config: &BindingConfig,
) -> Result<ArgValue, BindError>
where
    R: RequestSource + ?Sized,
{
    let Some(length) = request.content_length().filter(|&len| len > 0) else {
        debug!(parameter = param.name, "no request body; binding null");
        return Ok(ArgValue::Null);
    };

    let is_json = request
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_MEDIA_TYPE));
    if !is_json {
        debug!(parameter = param.name, "non-JSON request body; binding null");
        return Ok(ArgValue::Null);
    }

    let limit = config.max_body_bytes;
    if usize::try_from(length).map_or(true, |len| len > limit) {
        return Err(BindError::PayloadTooLarge { limit });
    }

    let bytes = request.read_body(limit).await?;
    if bytes.is_empty() {
        return Ok(ArgValue::Null);
    }

    decode_body(&bytes, &param.ty, config.max_depth)
}

//! Invocation dispatch: runs a target operation and normalizes its result.

use std::time::Instant;

use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::args::Args;
use crate::error::OperationError;
use crate::scanner::OperationDescriptor;
use crate::traits::{Capability, Invocation};

/// Normalizes an [`Invocation`] into an optional payload.
///
/// Unit and payload-less deferred results are absent; deferred values are
/// awaited and unwrapped. A JSON `null` payload also counts as absent.
///
/// # Errors
///
/// Errors raised by the operation's future propagate unchanged.
pub async fn complete(invocation: Invocation<'_>) -> Result<Option<Value>, OperationError> {
    let value = match invocation {
        Invocation::Unit => None,
        Invocation::Value(value) => Some(value),
        Invocation::Deferred(future) => {
            future.await?;
            None
        }
        Invocation::DeferredValue(future) => Some(future.await?),
    };
    Ok(value.filter(|v| !v.is_null()))
}

/// Invokes `op` on `target` with `args` and waits for its result.
///
/// Runs inside an `operation` span recording duration and outcome.
///
/// # Errors
///
/// Any error from the target is returned as-is; nothing is retried.
pub async fn dispatch<C>(
    target: &C,
    resource: &str,
    op: &OperationDescriptor,
    args: Args,
) -> Result<Option<Value>, OperationError>
where
    C: Capability + ?Sized,
{
    let span = info_span!(
        "operation",
        resource = resource,
        operation = op.name,
        duration_ms = tracing::field::Empty,
        outcome = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();

        let result = match target.invoke(op.name, args) {
            Ok(invocation) => {
                if invocation.shape() != op.returns {
                    tracing::warn!(
                        declared = ?op.returns,
                        actual = ?invocation.shape(),
                        "operation returned a different shape than declared"
                    );
                }
                complete(invocation).await
            }
            Err(err) => Err(err),
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::Span::current().record("outcome", outcome);
        tracing::debug!(duration_ms, outcome, "operation complete");

        result
    }
    .instrument(span)
    .await
}

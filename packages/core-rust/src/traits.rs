use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;

use crate::args::Args;
use crate::error::{BindError, OperationError};
use crate::schema::TypeDecl;
use crate::types::ReturnShape;

/// A type whose methods are exposed as remote operations.
///
/// `declaration()` lists the operations and their metadata; `invoke()`
/// runs one of them by name with already-bound arguments. Implementations
/// are usually thin adapters over a client or service object.
pub trait Capability: Send + Sync + 'static {
    /// Declares the type and its methods. Called once at registration.
    fn declaration() -> TypeDecl
    where
        Self: Sized;

    /// Invokes `operation` with `args`, in declared parameter order.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::UnknownOperation`] for names the type does
    /// not implement, or any error raised by the operation itself.
    fn invoke(&self, operation: &str, args: Args) -> Result<Invocation<'_>, OperationError>;
}

/// What an invoked operation hands back, before normalization.
pub enum Invocation<'a> {
    /// No return value.
    Unit,
    /// A value produced synchronously.
    Value(serde_json::Value),
    /// An awaitable without payload.
    Deferred(BoxFuture<'a, Result<(), OperationError>>),
    /// An awaitable carrying a payload.
    DeferredValue(BoxFuture<'a, Result<serde_json::Value, OperationError>>),
}

impl<'a> Invocation<'a> {
    /// Serializes `value` into a synchronous result.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Internal`] if `value` cannot be serialized.
    pub fn value<T: Serialize>(value: &T) -> Result<Self, OperationError> {
        Ok(Self::Value(to_json(value)?))
    }

    /// Wraps a payload-less future.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), OperationError>> + Send + 'a,
    {
        Self::Deferred(future.boxed())
    }

    /// Wraps a future whose output is serialized once it resolves.
    pub fn deferred_value<F, T>(future: F) -> Self
    where
        F: Future<Output = Result<T, OperationError>> + Send + 'a,
        T: Serialize + 'a,
    {
        Self::DeferredValue(
            async move {
                let value = future.await?;
                to_json(&value)
            }
            .boxed(),
        )
    }

    /// The return shape this invocation represents.
    #[must_use]
    pub fn shape(&self) -> ReturnShape {
        match self {
            Self::Unit => ReturnShape::Unit,
            Self::Value(_) => ReturnShape::Value,
            Self::Deferred(_) => ReturnShape::Deferred,
            Self::DeferredValue(_) => ReturnShape::DeferredValue,
        }
    }
}

impl std::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unit => f.write_str("Unit"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::DeferredValue(_) => f.write_str("DeferredValue(..)"),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, OperationError> {
    serde_json::to_value(value).map_err(|e| OperationError::Internal(e.into()))
}

/// Inbound request data the binder reads parameters from.
///
/// Implemented by the HTTP layer for its request type; tests implement it
/// over plain maps.
#[async_trait]
pub trait RequestSource: Send {
    /// Query value for `name`. Repeated keys are joined with `,`.
    fn query(&self, name: &str) -> Option<String>;

    /// Route value captured for `name`.
    fn route_value(&self, name: &str) -> Option<String>;

    /// Declared body length, if the request carried one.
    fn content_length(&self) -> Option<u64>;

    /// Declared content type, if any.
    fn content_type(&self) -> Option<&str>;

    /// Reads the whole body, failing once more than `limit` bytes arrive.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::PayloadTooLarge`] past `limit`, or
    /// [`BindError::InvalidBody`] if the stream fails.
    async fn read_body(&mut self, limit: usize) -> Result<Bytes, BindError>;
}

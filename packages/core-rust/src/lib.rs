//! `dynapi` Core: operation declarations, descriptor scanning, parameter binding and dispatch.

pub mod args;
pub mod binder;
pub mod body;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod naming;
pub mod scanner;
pub mod schema;
pub mod traits;
pub mod types;

pub use args::{Args, FromArg, Variant};
pub use binder::bind;
pub use catalog::{CapabilityCatalog, CatalogEntry, InstanceProvider};
pub use config::BindingConfig;
pub use dispatch::dispatch;
pub use error::{BindError, OperationError, RegistrationError};
pub use naming::resource_name;
pub use scanner::{describe, scan, OperationDescriptor, ParameterDescriptor};
pub use schema::{MethodDecl, ParamDecl, TypeDecl, TypeKind};
pub use traits::{Capability, Invocation, RequestSource};
pub use types::{ArgValue, EnumType, ObjectKind, ObjectType, ParamType, ReturnShape, Verb};

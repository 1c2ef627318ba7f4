//! Networking types, configuration, middleware, and the server lifecycle.

pub mod config;
pub mod middleware;
pub mod module;

pub use config::*;
pub use middleware::{with_http_layers, REQUEST_ID_HEADER};
pub use module::ApiServer;

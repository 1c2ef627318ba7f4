//! Route compilation and request handling.
//!
//! 1. **Compilation** (`compiler`): capability declarations -> route table + axum router
//! 2. **Route table** (`route_table`): registered `(verb, path)` pairs, duplicate detection
//! 3. **Requests** (`request`): axum request -> binder request source
//! 4. **Responses** (`response`): dispatch results and errors -> HTTP responses

pub mod compiler;
pub mod request;
pub mod response;
pub mod route_table;

pub use compiler::{normalize_base_route, route_path, RouteCompiler};
pub use request::HttpRequest;
pub use response::{success, ApiError};
pub use route_table::{RouteEntry, RouteTable};

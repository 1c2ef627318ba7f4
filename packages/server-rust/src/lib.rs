//! `dynapi` Server: serves capability declarations as HTTP endpoints via axum.

pub mod network;
pub mod service;

pub use network::{ApiServer, NetworkConfig};
pub use service::{ApiError, RouteCompiler, RouteEntry, RouteTable};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}

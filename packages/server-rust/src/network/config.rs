//! Network configuration types for the `dynapi` server.

use std::time::Duration;

use dynapi_core::BindingConfig;

/// Top-level configuration for serving compiled routes.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Prefix for every compiled route, e.g. `/api`.
    pub base_route: String,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Maximum time to wait for a request to complete.
    pub request_timeout: Duration,
    /// Hard cap on any request body, enforced before routing.
    pub max_request_bytes: usize,
    /// Limits applied while binding parameters.
    pub binding: BindingConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            base_route: "/api".to_string(),
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            max_request_bytes: 2 * 1024 * 1024, // 2 MiB
            binding: BindingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_config_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 0);
        assert_eq!(config.base_route, "/api");
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_request_bytes, 2_097_152);
        assert_eq!(config.binding, BindingConfig::default());
    }

    #[test]
    fn request_cap_exceeds_binding_limit() {
        let config = NetworkConfig::default();
        assert!(config.max_request_bytes > config.binding.max_body_bytes);
    }
}

/// Default maximum accepted JSON body size (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default maximum JSON nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Limits applied while binding request data to parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    /// Bodies declaring or streaming more bytes than this are rejected.
    pub max_body_bytes: usize,
    /// Maximum nesting of arrays and objects in a JSON body.
    pub max_depth: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_config_defaults() {
        let config = BindingConfig::default();
        assert_eq!(config.max_body_bytes, 1_048_576);
        assert_eq!(config.max_depth, 32);
    }
}

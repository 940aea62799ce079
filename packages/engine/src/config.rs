//! Engine Configuration
//!
//! Explicit configuration passed into service constructors. Nothing in
//! the engine reads process-global state; callers own where these values
//! come from.

/// Tunables for the relationship engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Page size used when a `Page` pagination carries no explicit limit
    pub default_page_size: u32,

    /// Hard cap on page size; larger requests are clamped
    pub max_page_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

impl EngineConfig {
    /// Clamp a requested page limit into the configured bounds
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        let config = EngineConfig::default();

        assert_eq!(config.clamp_limit(None), 50);
        assert_eq!(config.clamp_limit(Some(10)), 10);
        assert_eq!(config.clamp_limit(Some(10_000)), 500);
    }
}

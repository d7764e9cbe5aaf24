//! Server configuration.

use serde::Deserialize;

/// Configuration for the reference record server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Page size when a query does not ask for one.
    pub default_page_size: usize,
    /// Largest page the server returns.
    pub max_page_size: usize,
    /// Continuation cursors kept before the oldest is forgotten.
    pub max_open_cursors: usize,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 400,
            max_open_cursors: 1024,
        }
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    /// Sets the maximum page size.
    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = size.max(1);
        self
    }

    /// Sets how many continuation cursors are kept.
    pub fn with_max_open_cursors(mut self, count: usize) -> Self {
        self.max_open_cursors = count.max(1);
        self
    }

    /// Returns the page size for a requested limit.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_builder() {
        let config = ServerConfig::new()
            .with_default_page_size(10)
            .with_max_page_size(50)
            .with_max_open_cursors(8);

        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.max_open_cursors, 8);
    }

    #[test]
    fn page_size_is_clamped() {
        let config = ServerConfig::new()
            .with_default_page_size(10)
            .with_max_page_size(50);
        assert_eq!(config.page_size(None), 10);
        assert_eq!(config.page_size(Some(20)), 20);
        assert_eq!(config.page_size(Some(500)), 50);
        assert_eq!(config.page_size(Some(0)), 1);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"max_page_size":5}"#).unwrap();
        assert_eq!(config.max_page_size, 5);
        assert_eq!(config.default_page_size, 100);
    }
}

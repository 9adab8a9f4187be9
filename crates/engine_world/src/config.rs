//! World configuration.

/// Configuration for a [`World`](crate::World).
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Human-readable world name, used in logs.
    pub name: String,
    /// Evict unreferenced cached resources every this many ticks
    /// (0 = never).
    pub gc_interval_ticks: u64,
}

impl WorldConfig {
    /// Create a config with the given name and default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Override the resource eviction interval.
    #[must_use]
    pub fn with_gc_interval_ticks(mut self, ticks: u64) -> Self {
        self.gc_interval_ticks = ticks;
        self
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "world".to_string(),
            gc_interval_ticks: 60,
        }
    }
}

//! Service tuning parameters.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for `CraftdexService`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Maximum cached crafting queries (0 = unbounded)
    pub query_cache_capacity: usize,
    /// Maximum cached item searches (0 = unbounded)
    pub items_cache_capacity: usize,
    /// Page size used when a caller passes a limit of 0
    pub default_page_limit: usize,
    /// Largest page a caller may request
    pub max_page_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            query_cache_capacity: 4096,
            items_cache_capacity: 1024,
            default_page_limit: 20,
            max_page_limit: 200,
        }
    }
}

impl ServiceConfig {
    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        if self.max_page_limit == 0 {
            warn!("max_page_limit of 0 is not usable, falling back to default");
            self.max_page_limit = Self::default().max_page_limit;
        }
        self.default_page_limit = self.default_page_limit.clamp(1, self.max_page_limit);
    }

    /// Resolve a requested page size.
    #[must_use]
    pub fn page_limit(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_page_limit
        } else {
            requested.min(self.max_page_limit)
        }
    }
}

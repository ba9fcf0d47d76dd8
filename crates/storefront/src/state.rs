//! Application state shared across handlers.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::catalog::CatalogStore;
use crate::config::StorefrontConfig;
use crate::gateway::{Gateway, activity};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the session gateway.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gateway: Arc<Gateway>,
}

impl AppState {
    /// Create a new application state over the given catalog store.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Arc<dyn CatalogStore>) -> Self {
        let gateway = Arc::new(Gateway::new(catalog, config.client_buffer));
        Self {
            inner: Arc::new(AppStateInner { config, gateway }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session gateway.
    #[must_use]
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.inner.gateway
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.gateway.catalog()
    }

    /// Start the live activity feed in the background.
    ///
    /// The returned handle should be aborted on shutdown.
    #[must_use]
    pub fn start_activity_feed(&self) -> JoinHandle<()> {
        activity::spawn(Arc::clone(&self.inner.gateway), self.inner.config.activity_interval)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[test]
    fn test_state_exposes_config_and_shares_gateway() {
        let config = StorefrontConfig {
            activity_interval: Duration::from_secs(2),
            client_buffer: 8,
            ..StorefrontConfig::default()
        };
        let state = AppState::new(config, Arc::new(InMemoryCatalog::default()));

        assert_eq!(state.config().activity_interval, Duration::from_secs(2));
        assert_eq!(state.config().client_buffer, 8);

        let clone = state.clone();
        assert!(Arc::ptr_eq(state.gateway(), clone.gateway()));
        assert_eq!(state.catalog().snapshot().unwrap().len(), 4);
    }
}

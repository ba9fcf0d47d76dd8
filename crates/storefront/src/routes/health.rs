//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog cannot be read.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().snapshot() {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use aether_core::{CartLine, Identity, Product};

    use super::*;
    use crate::catalog::{CatalogError, CatalogStore, InMemoryCatalog};
    use crate::config::StorefrontConfig;

    /// Store whose state is always unusable.
    struct BrokenCatalog;

    impl CatalogStore for BrokenCatalog {
        fn snapshot(&self) -> Result<Vec<Product>, CatalogError> {
            Err(CatalogError::Unavailable)
        }

        fn purchase(&self, _lines: &[CartLine]) -> Result<Vec<Product>, CatalogError> {
            Err(CatalogError::Unavailable)
        }

        fn register(&self, _name: &str, _email: &str) -> Result<Identity, CatalogError> {
            Err(CatalogError::Unavailable)
        }

        fn login(&self, _email: &str) -> Result<Identity, CatalogError> {
            Err(CatalogError::Unavailable)
        }

        fn identity_count(&self) -> Result<usize, CatalogError> {
            Err(CatalogError::Unavailable)
        }
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn test_readiness() {
        let state = AppState::new(
            StorefrontConfig::default(),
            Arc::new(InMemoryCatalog::default()),
        );
        assert_eq!(readiness(State(state)).await, StatusCode::OK);

        let state = AppState::new(StorefrontConfig::default(), Arc::new(BrokenCatalog));
        assert_eq!(
            readiness(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

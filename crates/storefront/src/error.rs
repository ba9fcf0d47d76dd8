//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All HTTP route handlers should return
//! `Result<T, AppError>`. WebSocket requests report failures in their `ack`
//! reply instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::catalog::CatalogError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Catalog(err) => !err.is_validation(),
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => match err {
                CatalogError::ProductNotFound { .. } | CatalogError::IdentityNotFound => {
                    StatusCode::NOT_FOUND
                }
                CatalogError::InsufficientStock { .. } | CatalogError::IdentityExists => {
                    StatusCode::CONFLICT
                }
                CatalogError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                CatalogError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let Self::Catalog(err) = &self;
        let message = err.to_string();

        (self.status(), message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for client actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb(
///     "purchase",
///     "Purchase committed",
///     Some(&[("connection_id", &id.to_string()), ("lines", "2")]),
/// );
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    sentry::add_breadcrumb(breadcrumb(category, message, data));
}

fn breadcrumb(
    category: &str,
    message: &str,
    data: Option<&[(&str, &str)]>,
) -> sentry::Breadcrumb {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    breadcrumb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: CatalogError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(CatalogError::IdentityNotFound);
        assert_eq!(err.to_string(), "Catalog error: Identity not found.");
    }

    #[test]
    fn test_catalog_error_status_codes() {
        assert_eq!(get_status(CatalogError::IdentityExists), StatusCode::CONFLICT);
        assert_eq!(
            get_status(CatalogError::InsufficientStock {
                name: "Quantum Core".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CatalogError::ProductNotFound {
                name: "Ghost Item".to_string()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CatalogError::Unavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AppError::Catalog(CatalogError::Unavailable).is_server_error());
        assert!(!AppError::Catalog(CatalogError::IdentityExists).is_server_error());
    }

    #[test]
    fn test_breadcrumb_carries_data() {
        let crumb = breadcrumb(
            "purchase",
            "Purchase committed",
            Some(&[("connection_id", "c-1"), ("lines", "3")]),
        );
        assert_eq!(crumb.category.as_deref(), Some("purchase"));
        assert_eq!(crumb.message.as_deref(), Some("Purchase committed"));
        assert_eq!(crumb.data["connection_id"], "c-1");
        assert_eq!(crumb.data["lines"], "3");
    }

    #[test]
    fn test_breadcrumb_without_data() {
        let crumb = breadcrumb("purchase", "Purchase committed", None);
        assert!(crumb.data.is_empty());
    }
}

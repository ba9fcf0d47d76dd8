//! Read-only catalog endpoint.
//!
//! Mirrors the `inventory_init` snapshot for clients that only need a
//! one-off read and do not want to hold a WebSocket open.

use aether_core::Product;
use axum::{Json, extract::State};

use crate::error::Result;
use crate::state::AppState;

/// `GET /api/inventory`: every product with its current stock, in seed order.
pub async fn snapshot(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().snapshot()?;
    Ok(Json(products))
}

//! HTTP middleware stack for the storefront backend.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. CORS (the storefront client is served from another origin)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (tag each request and WebSocket upgrade)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

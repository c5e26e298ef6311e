//! HTTP middleware module.
//!
//! This module provides HTTP-level middleware for:
//! - CORS configuration
//! - Security headers
//! - A process-wide request rate limit
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{create_permissive_cors_layer, security_headers, with_global_rate_limit};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(create_permissive_cors_layer());
//! let app = with_global_rate_limit(app)?;
//! ```

pub mod cors;
pub mod rate_limit;
pub mod security;

pub use cors::{cors_layer_from_env, create_cors_layer, create_permissive_cors_layer};
pub use rate_limit::{RATE_LIMIT_BURST, RATE_LIMIT_REPLENISH_SECS, with_global_rate_limit};
pub use security::security_headers;

//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! ## Modules
//!
//! - **[`auth`]**: HS256 bearer tokens and `Authorization` header parsing
//! - **[`server`]**: Router setup, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers, rate limit)
//! - **[`errors`]**: The `{ "error": true, "message": ... }` envelope
//! - **[`response`]**: The matching success envelopes
//! - **[`extractors`]**: Validated JSON/query and integer id extractors
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let router = create_router::<ApiDoc>(Router::new())?;
//!     create_production_app(router, &ServerConfig::default(), Duration::from_secs(30), async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod response;
pub mod server;

pub use auth::{ACCESS_TOKEN_TTL, ACCESS_TOKEN_TTL_LABEL, JwtAuth, JwtClaims, JwtConfig, bearer_token};

pub use server::{
    API_PREFIX, HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{
    cors_layer_from_env, create_cors_layer, create_permissive_cors_layer, security_headers,
    with_global_rate_limit,
};

pub use errors::{AppError, ErrorResponse, validation_message};

pub use response::{ApiResponse, MessageResponse, PaginatedResponse};

pub use extractors::{IdPath, ValidatedJson, ValidatedQuery};

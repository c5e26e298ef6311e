use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{cors_layer_from_env, security::security_headers, with_global_rate_limit};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Version prefix every domain route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - Swagger UI at `/swagger-ui`, serving `/api-docs/openapi.json`
/// - API routes nested under [`API_PREFIX`]
/// - A JSON 404 fallback
/// - Request tracing, security headers, CORS and response compression
/// - The global rate limit
///
/// Health endpoints (`/health`, `/ready`) are merged by the app afterwards
/// so that they are not nested under the version prefix.
///
/// CORS is driven by the optional `CORS_ALLOWED_ORIGIN` variable, see
/// [`cors_layer_from_env`].
///
/// # Errors
/// Returns an error if `CORS_ALLOWED_ORIGIN` holds a value that is not a
/// valid header value.
///
/// # Example
/// ```ignore
/// #[derive(OpenApi)]
/// #[openapi(paths(/* your paths */))]
/// struct ApiDoc;
///
/// let api_routes = Router::new()
///     .route("/example", get(handler))
///     .with_state(my_state);
///
/// let router = create_router::<ApiDoc>(api_routes)?;
/// ```
pub fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .nest(API_PREFIX, apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer_from_env()?)
        .layer(CompressionLayer::new());

    with_global_rate_limit(router)
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup`.
///
/// In-flight requests are drained before the server future resolves. The
/// cleanup future (closing the connection pool, for instance) is given at
/// most `shutdown_timeout` to finish.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     db.close().await.ok();
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::default();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let signal_coordinator = coordinator.clone();
    let serve = async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { signal_coordinator.wait_for_signal().await })
            .await
    };

    let serve_result = serve_then_cleanup(serve, shutdown_timeout, cleanup).await;

    // Wake any remaining subscribers if the server stopped on its own.
    coordinator.shutdown();
    serve_result
}

/// Await `serve` to completion, then give `cleanup` at most
/// `shutdown_timeout`. Cleanup never overlaps request draining.
async fn serve_then_cleanup<S, F>(serve: S, shutdown_timeout: Duration, cleanup: F) -> io::Result<()>
where
    S: std::future::Future<Output = io::Result<()>>,
    F: std::future::Future<Output = ()>,
{
    let serve_result = serve.await.inspect_err(|e| {
        tracing::error!("Server encountered an error: {:?}", e);
    });

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(_) => info!("Cleanup completed successfully"),
        Err(_) => {
            tracing::warn!(
                "Cleanup exceeded timeout of {:?}, forcing shutdown",
                shutdown_timeout
            );
        }
    }

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(info(title = "test"))]
    struct TestDoc;

    fn router() -> Router {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            create_router::<TestDoc>(Router::new().route("/ping", get(|| async { "pong" })))
                .unwrap()
        })
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_version_prefix() {
        let response = router()
            .oneshot(Request::get("/api/v1/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_unknown_route_gets_json_404() {
        let response = router()
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_cleanup_starts_after_server_drains() {
        let drained = Arc::new(AtomicBool::new(false));
        let cleaned = Arc::new(AtomicBool::new(false));

        let serve = {
            let drained = drained.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                drained.store(true, Ordering::SeqCst);
                Ok(())
            }
        };
        let cleanup = {
            let drained = drained.clone();
            let cleaned = cleaned.clone();
            async move {
                assert!(drained.load(Ordering::SeqCst), "cleanup ran before drain");
                cleaned.store(true, Ordering::SeqCst);
            }
        };

        serve_then_cleanup(serve, Duration::from_secs(1), cleanup)
            .await
            .unwrap();
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_slow_cleanup_is_cut_off_and_serve_error_kept() {
        let serve = async { Err(io::Error::other("listener closed")) };
        let cleanup = std::future::pending::<()>();

        let result = serve_then_cleanup(serve, Duration::from_millis(10), cleanup).await;
        assert_eq!(result.unwrap_err().to_string(), "listener closed");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = router()
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}

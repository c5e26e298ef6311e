//! Process-wide request limiter.
//!
//! All clients share a single bucket: up to [`RATE_LIMIT_BURST`] requests
//! back to back, then one more every [`RATE_LIMIT_REPLENISH_SECS`] seconds
//! (about ten a minute). Requests over the limit get a 429 with the usual
//! error envelope.

use crate::errors::AppError;
use axum::{Router, body::Body, http::Response, response::IntoResponse};
use std::io;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder,
    key_extractor::GlobalKeyExtractor,
};

pub const RATE_LIMIT_BURST: u32 = 10;
pub const RATE_LIMIT_REPLENISH_SECS: u64 = 6;

/// Wrap every route of `router` in the global limiter.
pub fn with_global_rate_limit(router: Router) -> io::Result<Router> {
    let config = GovernorConfigBuilder::default()
        .per_second(RATE_LIMIT_REPLENISH_SECS)
        .burst_size(RATE_LIMIT_BURST)
        .key_extractor(GlobalKeyExtractor)
        .finish()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "rate limit period and burst size must be non-zero",
            )
        })?;

    tracing::info!(
        burst = RATE_LIMIT_BURST,
        replenish_secs = RATE_LIMIT_REPLENISH_SECS,
        "Global rate limit configured"
    );

    Ok(router.layer(GovernorLayer::new(Arc::new(config)).error_handler(rate_limit_error)))
}

fn rate_limit_error(err: GovernorError) -> Response<Body> {
    match err {
        GovernorError::TooManyRequests { .. } => AppError::TooManyRequests.into_response(),
        other => {
            tracing::warn!("Rate limiter rejected request: {:?}", other);
            AppError::InternalServerError(format!("{:?}", other)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_requests_beyond_burst_are_rejected() {
        let app = with_global_rate_limit(Router::new().route("/", get(|| async { "ok" }))).unwrap();

        for _ in 0..RATE_LIMIT_BURST {
            let response = app
                .clone()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

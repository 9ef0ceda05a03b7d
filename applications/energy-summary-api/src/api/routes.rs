use crate::api::handlers::{get_summary, health_check, AppState};
use axum::{
    extract::Request,
    routing::any,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Every path other than /health serves the summary
    Router::new()
        .route("/health", any(health_check))
        .route("/", any(get_summary))
        .fallback(get_summary)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request| {
                            // The query string carries the api-key, keep it out of logs
                            tracing::span!(
                                Level::INFO,
                                "http_request",
                                method = %request.method(),
                                path = %request.uri().path(),
                            )
                        })
                        .on_request(|_request: &Request, _span: &tracing::Span| {
                            tracing::event!(Level::DEBUG, "received request");
                        })
                        .on_response(
                            |response: &axum::response::Response,
                             latency: std::time::Duration,
                             _span: &tracing::Span| {
                                tracing::event!(
                                    Level::INFO,
                                    status = response.status().as_u16(),
                                    latency = ?latency,
                                    "request completed"
                                );
                            },
                        )
                        .on_failure(
                            |_error: tower_http::classify::ServerErrorsFailureClass,
                             _latency: std::time::Duration,
                             _span: &tracing::Span| {
                                tracing::event!(Level::ERROR, "request failed");
                            },
                        ),
                )
                .layer(CorsLayer::permissive()),
        )
}

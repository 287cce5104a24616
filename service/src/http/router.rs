use core::time::Duration;
use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware as ax_middleware,
    routing::{self, get_service},
};
use tower::ServiceBuilder;
use tower_http::{
    ServiceBuilderExt as _, request_id::MakeRequestUuid, services::ServeFile,
    timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::http::{AppState, api, middleware::secure_headers};

/// Routes: the signup API under `/api/v1` and the static signup form at `/`.
pub(crate) fn create_routes(index: &Path) -> Router<AppState> {
    Router::new()
        .nest("/api/v1", api::routes())
        .route("/", get_service(ServeFile::new(index)))
}

/// Builds the complete application with state, fallback and middleware.
pub(crate) fn create_app(app_state: AppState, index: &Path) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .propagate_x_request_id()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(ax_middleware::from_fn(secure_headers));

    create_routes(index)
        .with_state(app_state)
        .fallback(routing::any(|req: Request<Body>| async move {
            tracing::warn!(method = %req.method(), uri = %req.uri(), "Unhandled request");
            StatusCode::NOT_FOUND
        }))
        .layer(middleware_stack)
}

// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{admin, exam, submission},
    state::AppState,
    utils::admin_token::{ADMIN_TOKEN_HEADER, admin_token_middleware},
};

/// Assembles the main application router.
///
/// * Exam routes (list, start, submit, result) and the admin seed route.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(ADMIN_TOKEN_HEADER),
        ])
        .allow_credentials(true);

    let exam_routes = Router::new()
        .route("/exam", get(exam::list_questions))
        .route("/exam/start", get(exam::start_exam))
        .route("/exam/submit", post(submission::submit_exam))
        .route("/exam/result/{attempt_id}", get(exam::view_result));

    let admin_routes = Router::new()
        .route("/seed", post(admin::run_seed))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_token_middleware,
        ));

    Router::new()
        .route("/health", get(exam::health))
        .merge(exam_routes)
        .nest("/admin", admin_routes)
        .nest_service("/static", ServeDir::new("static"))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

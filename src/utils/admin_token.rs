// src/utils/admin_token.rs

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{config::Config, error::AppError};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Axum Middleware: shared-secret admin check.
///
/// Compares the `X-Admin-Token` header with the configured `ADMIN_TOKEN`.
/// Without a configured token every admin request is rejected.
/// This is a placeholder, not real credential-based authorization.
pub async fn admin_token_middleware(
    State(config): State<Config>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = config.admin_token.as_deref() else {
        return Err(AppError::AuthError("Admin access is disabled.".to_string()));
    };

    let supplied = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match supplied {
        Some(token) if token == expected => Ok(next.run(req).await),
        _ => Err(AppError::AuthError("Invalid admin token.".to_string())),
    }
}

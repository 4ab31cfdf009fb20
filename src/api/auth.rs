use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use std::time::Instant;

use super::types::{LoginRequest, LoginResponse, LoginUser};
use super::{ApiError, AppState};
use crate::auth::AuthError;
use crate::auth::session::{clear_session_cookie, extract_session_email, session_cookie};

// ============================================================================
// Middleware
// ============================================================================

/// The route gate in front of everything under the dashboard prefix.
///
/// A request passes only when the session cookie is present and its value is
/// currently in the admin directory; the check runs on every request with no
/// caching, so a cookie for a since-removed admin stops working immediately.
/// Missing and unrecognized cookies get the same redirect.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(email) = extract_session_email(request.headers())
        && state.directory().is_authorized(&email)
    {
        tracing::Span::current().record("user_id", email.as_str());
        return next.run(request).await;
    }

    Redirect::to(state.login_path()).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Check credentials against the admin allow-list and set the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let admin = state
        .session_issuer()
        .login(&payload.email, &payload.password, Instant::now())
        .map_err(|err| match err {
            AuthError::RateLimited => ApiError::RateLimited,
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
        })?;

    let cookie = session_cookie(&admin.email, state.secure_cookies())
        .map_err(|e| ApiError::internal(format!("Failed to build session cookie: {e}")))?;

    tracing::info!(email = %admin.email, "Admin logged in");

    let body = Json(LoginResponse {
        success: true,
        user: LoginUser {
            email: admin.email,
            name: admin.name,
        },
    });

    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

/// POST /api/auth/logout
/// Expire the session cookie. Succeeds whether or not one was set.
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let cookie = clear_session_cookie(state.secure_cookies())
        .map_err(|e| ApiError::internal(format!("Failed to build session cookie: {e}")))?;

    Ok(([(SET_COOKIE, cookie)], (StatusCode::OK, "Logged out")).into_response())
}

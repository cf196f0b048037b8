//! services/portal/src/web/auth.rs
//!
//! Sign-in, sign-out and session endpoints. These are the only routes that
//! run without the session guard.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use manager_portal_core::commands::account;
use manager_portal_core::guard::{SessionStatus, SIGN_IN_ROUTE};
use manager_portal_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::rest::{fail, message, ErrorBody, HandlerResult, MessageBody};
use crate::web::session::cleared_cookie;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Tells a client where and how to post credentials.
#[derive(Serialize, ToSchema)]
pub struct SignInHint {
    pub action: String,
    pub fields: Vec<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /auth/signin - Describe the sign-in form
#[utoipa::path(
    get,
    path = "/auth/signin",
    responses((status = 200, description = "Sign-in form description", body = SignInHint))
)]
pub async fn signin_page_handler() -> Json<SignInHint> {
    Json(SignInHint {
        action: SIGN_IN_ROUTE.to_string(),
        fields: vec!["email".to_string(), "password".to_string()],
    })
}

/// POST /auth/signin - Authenticate a manager and set the session cookie
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; the body is the new session status"),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials or not a manager", body = ErrorBody),
        (status = 502, description = "Backend unavailable", body = ErrorBody)
    )
)]
pub async fn signin_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> HandlerResult<impl IntoResponse> {
    let user = account::authenticate(state.gateway.as_ref(), &req.email, &req.password)
        .await
        .map_err(|e| match e {
            PortError::Authorization(reason) => {
                let (_, body) = fail("sign in", PortError::Authorization(reason));
                (StatusCode::UNAUTHORIZED, body)
            }
            other => fail("sign in", other),
        })?;

    let token = state.sessions.issue(&user).map_err(|e| {
        error!("Failed to issue session token: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Failed to create session".to_string(),
            }),
        )
    })?;
    let cookie = state.sessions.cookie(&token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionStatus::Authenticated(user)),
    ))
}

/// POST /auth/signout - Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/signout",
    responses((status = 200, description = "Signed out", body = MessageBody))
)]
pub async fn signout_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_cookie())],
        message("Signed out"),
    )
}

/// GET /unauthorized - Where signed-in non-managers are sent
#[utoipa::path(
    get,
    path = "/unauthorized",
    responses((status = 403, description = "The session is not a manager's", body = ErrorBody))
)]
pub async fn unauthorized_handler() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorBody {
            error: "You are not authorized to use the manager portal".to_string(),
        }),
    )
}

/// GET /api/session - The current session status
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "`{status, user}` for the request's session cookie"))
)]
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<SessionStatus> {
    Json(state.sessions.status(&headers))
}

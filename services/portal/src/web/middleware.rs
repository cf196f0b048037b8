//! services/portal/src/web/middleware.rs
//!
//! The session guard for every protected route.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use manager_portal_core::guard::{self, GuardDecision};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::web::state::AppState;

/// Resolves the session cookie and runs the guard on every request.
///
/// A manager's `SessionUser` is inserted into the request extensions for the
/// handlers. Anyone else is redirected (303) to sign-in or to the
/// unauthorized page, and the handler never runs.
pub async fn require_manager(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let status = state.sessions.status(req.headers());
    match guard::evaluate(&status) {
        GuardDecision::Render(user) => {
            req.extensions_mut().insert(user.clone());
            next.run(req).await
        }
        GuardDecision::Redirect(target) => {
            if let Some(user) = status.user() {
                warn!(user_id = %user.id, role = %user.role, path = %req.uri().path(), "non-manager refused");
            } else {
                debug!(path = %req.uri().path(), "no session, redirecting to sign-in");
            }
            Redirect::to(target).into_response()
        }
        // A cookie resolves synchronously, so the server never sees `Loading`;
        // the arm only keeps the match exhaustive.
        GuardDecision::Wait => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

//! crates/manager_portal_core/src/guard.rs
//!
//! The session guard: decides, on every protected navigation, whether the
//! visitor may see the page, must wait, or must be sent elsewhere.

use serde::Serialize;

use crate::domain::SessionUser;
use crate::ports::{PortError, PortResult};

pub const SIGN_IN_ROUTE: &str = "/auth/signin";
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// What is known about the visitor's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "kebab-case")]
pub enum SessionStatus {
    Loading,
    Unauthenticated,
    Authenticated(SessionUser),
}

/// The four observable guard states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Unauthenticated,
    AuthenticatedUnauthorized,
    AuthenticatedAuthorized,
}

/// What the caller must do with the protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<'a> {
    /// Show a neutral placeholder; never the protected content.
    Wait,
    Redirect(&'static str),
    Render(&'a SessionUser),
}

impl SessionStatus {
    pub fn guard_state(&self) -> GuardState {
        match self {
            Self::Loading => GuardState::Loading,
            Self::Unauthenticated => GuardState::Unauthenticated,
            Self::Authenticated(user) if user.is_manager() => GuardState::AuthenticatedAuthorized,
            Self::Authenticated(_) => GuardState::AuthenticatedUnauthorized,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Evaluates the guard. Nothing is cached; call it on every protected request.
pub fn evaluate(status: &SessionStatus) -> GuardDecision<'_> {
    match (status.guard_state(), status.user()) {
        (GuardState::AuthenticatedAuthorized, Some(user)) => GuardDecision::Render(user),
        (GuardState::AuthenticatedUnauthorized, _) => GuardDecision::Redirect(UNAUTHORIZED_ROUTE),
        (GuardState::Loading, _) => GuardDecision::Wait,
        _ => GuardDecision::Redirect(SIGN_IN_ROUTE),
    }
}

/// Role check used at sign-in: anyone but a manager is refused a session.
pub fn authorize(user: &SessionUser) -> PortResult<()> {
    if user.is_manager() {
        Ok(())
    } else {
        Err(PortError::Authorization(format!(
            "role '{}' may not use the manager portal",
            user.role
        )))
    }
}

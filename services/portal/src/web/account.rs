//! services/portal/src/web/account.rs
//!
//! The signed-in manager's own account settings.

use axum::{extract::State, Extension, Json};
use manager_portal_core::commands::account;
use manager_portal_core::domain::{Account, SessionUser};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::rest::{
    fail, message, saved, ErrorBody, FieldChanges, HandlerResult, MessageBody, SaveBody,
};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// GET /account - Name and email of the signed-in manager
#[utoipa::path(
    get,
    path = "/account",
    responses((status = 200, description = "The account"))
)]
pub async fn get_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<Account>> {
    account::fetch_account(state.gateway.as_ref(), &user.id)
        .await
        .map(Json)
        .map_err(|e| fail("load account", e))
}

/// PATCH /account - Save edited account fields
#[utoipa::path(
    patch,
    path = "/account",
    request_body = FieldChanges,
    responses(
        (status = 200, description = "Saved, or nothing to save", body = SaveBody),
        (status = 400, description = "Unknown field", body = ErrorBody)
    )
)]
pub async fn update_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(FieldChanges(changes)): Json<FieldChanges>,
) -> HandlerResult<Json<SaveBody>> {
    let gateway = state.gateway.as_ref();
    let current = account::fetch_account(gateway, &user.id)
        .await
        .map_err(|e| fail("load account", e))?;
    let outcome = account::update_account(gateway, &current, changes)
        .await
        .map_err(|e| fail("update account", e))?;
    Ok(saved(&outcome, "Account"))
}

/// POST /account/password - Change the manager's password
#[utoipa::path(
    post,
    path = "/account/password",
    request_body = PasswordChange,
    responses(
        (status = 200, description = "Changed", body = MessageBody),
        (status = 400, description = "A password is missing", body = ErrorBody),
        (status = 502, description = "Rejected by the backend", body = ErrorBody)
    )
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(req): Json<PasswordChange>,
) -> HandlerResult<Json<MessageBody>> {
    account::change_password(
        state.gateway.as_ref(),
        &user.id,
        &req.current_password,
        &req.new_password,
    )
    .await
    .map_err(|e| fail("change password", e))?;
    Ok(message("Password updated successfully"))
}

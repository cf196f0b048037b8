//! services/portal/src/web/business.rs
//!
//! The business profile page: the whole form and its three panels.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use manager_portal_core::commands::business::{self, BusinessPanel};
use manager_portal_core::domain::{Business, SessionUser};
use std::sync::Arc;

use crate::web::rest::{fail, saved, ErrorBody, FieldChanges, HandlerResult, SaveBody};
use crate::web::state::AppState;

/// GET /business-profile - The manager's business profile
#[utoipa::path(
    get,
    path = "/business-profile",
    responses(
        (status = 200, description = "The profile"),
        (status = 404, description = "The manager has no business", body = ErrorBody)
    )
)]
pub async fn get_business_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<Business>> {
    business::fetch_business(state.gateway.as_ref(), &user.id)
        .await
        .map(Json)
        .map_err(|e| fail("load business profile", e))
}

/// PATCH /business-profile - Save the edited profile fields
#[utoipa::path(
    patch,
    path = "/business-profile",
    request_body = FieldChanges,
    responses(
        (status = 200, description = "Saved, or nothing to save", body = SaveBody),
        (status = 400, description = "Unknown field or non-numeric number", body = ErrorBody)
    )
)]
pub async fn update_business_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(FieldChanges(changes)): Json<FieldChanges>,
) -> HandlerResult<Json<SaveBody>> {
    let gateway = state.gateway.as_ref();
    let profile = business::fetch_business(gateway, &user.id)
        .await
        .map_err(|e| fail("load business profile", e))?;
    let outcome = business::update_business(gateway, &profile, changes)
        .await
        .map_err(|e| fail("update business profile", e))?;
    Ok(saved(&outcome, "Business profile"))
}

/// PATCH /business-profile/{panel} - Save one panel of the profile
#[utoipa::path(
    patch,
    path = "/business-profile/{panel}",
    params(("panel" = String, Path, description = "`basic`, `contact` or `operations`")),
    request_body = FieldChanges,
    responses(
        (status = 200, description = "Saved, or nothing to save", body = SaveBody),
        (status = 400, description = "Unknown panel or a field outside the panel", body = ErrorBody)
    )
)]
pub async fn update_panel_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(panel): Path<String>,
    Json(FieldChanges(changes)): Json<FieldChanges>,
) -> HandlerResult<Json<SaveBody>> {
    let panel: BusinessPanel = panel.parse().map_err(|e| fail("update business profile", e))?;
    let gateway = state.gateway.as_ref();
    let profile = business::fetch_business(gateway, &user.id)
        .await
        .map_err(|e| fail("load business profile", e))?;
    let outcome = business::update_business_panel(gateway, &profile, panel, changes)
        .await
        .map_err(|e| fail("update business profile", e))?;
    Ok(saved(&outcome, "Business profile"))
}

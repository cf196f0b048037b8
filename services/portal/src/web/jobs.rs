//! services/portal/src/web/jobs.rs

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use manager_portal_core::commands::jobs;
use manager_portal_core::domain::{JobListing, SessionUser};
use manager_portal_core::ports::PortError;
use manager_portal_core::selection::{delete_selected, fetch_owned};
use std::sync::Arc;

use crate::web::rest::{
    fail, saved, ErrorBody, FieldChanges, HandlerResult, MassDeleteRequest, MassDeleteResponse,
    SaveBody,
};
use crate::web::state::AppState;

/// GET /job-listings - Job listings across the manager's businesses
#[utoipa::path(
    get,
    path = "/job-listings",
    responses(
        (status = 200, description = "The listings"),
        (status = 502, description = "Backend unavailable", body = ErrorBody)
    )
)]
pub async fn list_job_listings_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<Vec<JobListing>>> {
    fetch_owned(state.gateway.as_ref(), &user.id)
        .await
        .map(Json)
        .map_err(|e| fail("load job listings", e))
}

/// PATCH /job-listings/{id} - Save an inline edit of one listing
#[utoipa::path(
    patch,
    path = "/job-listings/{id}",
    params(("id" = String, Path, description = "Job listing id")),
    request_body = FieldChanges,
    responses(
        (status = 200, description = "Saved, or nothing to save", body = SaveBody),
        (status = 400, description = "Non-numeric salary or unknown field", body = ErrorBody),
        (status = 404, description = "Not one of the manager's listings", body = ErrorBody)
    )
)]
pub async fn update_job_listing_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Json(FieldChanges(changes)): Json<FieldChanges>,
) -> HandlerResult<Json<SaveBody>> {
    let gateway = state.gateway.as_ref();
    let listings: Vec<JobListing> = fetch_owned(gateway, &user.id)
        .await
        .map_err(|e| fail("load job listings", e))?;
    let listing = listings
        .iter()
        .find(|listing| listing.id == id)
        .ok_or_else(|| fail("update job listing", PortError::NotFound(format!("job listing {id}"))))?;
    let outcome = jobs::update_job_listing(gateway, listing, changes)
        .await
        .map_err(|e| fail("update job listing", e))?;
    Ok(saved(&outcome, "Job listing"))
}

/// POST /job-listings/delete - Delete the selected listings one by one
#[utoipa::path(
    post,
    path = "/job-listings/delete",
    request_body = MassDeleteRequest,
    responses((status = 200, description = "Outcome and the re-fetched list"))
)]
pub async fn delete_job_listings_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(req): Json<MassDeleteRequest>,
) -> HandlerResult<Json<MassDeleteResponse<JobListing>>> {
    let (result, items) =
        delete_selected::<JobListing>(state.gateway.as_ref(), &user.id, &req.ids, req.confirmed)
            .await
            .map_err(|e| fail("load job listings", e))?;
    Ok(Json(MassDeleteResponse { result, items }))
}

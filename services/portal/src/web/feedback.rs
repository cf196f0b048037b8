//! services/portal/src/web/feedback.rs
//!
//! Review and complaint pages: lists with mass delete, detail views,
//! moderation and replies. Statuses are returned with their display labels.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use manager_portal_core::domain::{
    Complaint, ComplaintStatus, Reply, Review, ReviewModeration, SessionUser,
};
use manager_portal_core::moderation;
use manager_portal_core::selection::{delete_selected, ensure_owned, fetch_owned};
use serde::Serialize;
use std::sync::Arc;

use crate::web::rest::{
    fail, ErrorBody, HandlerResult, MassDeleteRequest, MassDeleteResponse, ReplyRequest,
    StatusChange,
};
use crate::web::state::AppState;

const ANONYMOUS: &str = "Anonymous";

//=========================================================================================
// Views
//=========================================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub author: String,
    pub stars: String,
    pub status_label: &'static str,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            author: author(review.is_anonymous, review.user.as_ref().and_then(|u| u.name.clone())),
            stars: review.stars(),
            status_label: review.moderation_status.label(),
            review,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub author: String,
    pub status_label: &'static str,
}

impl From<Complaint> for ComplaintView {
    fn from(complaint: Complaint) -> Self {
        Self {
            author: author(
                complaint.is_anonymous,
                complaint.user.as_ref().and_then(|u| u.name.clone()),
            ),
            status_label: complaint.status.label(),
            complaint,
        }
    }
}

fn author(is_anonymous: bool, name: Option<String>) -> String {
    if is_anonymous {
        ANONYMOUS.to_string()
    } else {
        name.unwrap_or_else(|| ANONYMOUS.to_string())
    }
}

//=========================================================================================
// Reviews
//=========================================================================================

/// GET /reviews - Reviews across the manager's businesses
#[utoipa::path(
    get,
    path = "/reviews",
    responses(
        (status = 200, description = "Reviews with status labels, in fetch order"),
        (status = 502, description = "Backend unavailable", body = ErrorBody)
    )
)]
pub async fn list_reviews_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<Vec<ReviewView>>> {
    let reviews: Vec<Review> = fetch_owned(state.gateway.as_ref(), &user.id)
        .await
        .map_err(|e| fail("load reviews", e))?;
    Ok(Json(reviews.into_iter().map(ReviewView::from).collect()))
}

/// POST /reviews/delete - Delete the selected reviews one by one
#[utoipa::path(
    post,
    path = "/reviews/delete",
    request_body = MassDeleteRequest,
    responses((status = 200, description = "Outcome and the re-fetched list"))
)]
pub async fn delete_reviews_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(req): Json<MassDeleteRequest>,
) -> HandlerResult<Json<MassDeleteResponse<ReviewView>>> {
    let (result, items) =
        delete_selected::<Review>(state.gateway.as_ref(), &user.id, &req.ids, req.confirmed)
            .await
            .map_err(|e| fail("load reviews", e))?;
    Ok(Json(MassDeleteResponse {
        result,
        items: items.into_iter().map(ReviewView::from).collect(),
    }))
}

/// GET /review/{id} - One review with its replies
#[utoipa::path(
    get,
    path = "/review/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "The review"),
        (status = 404, description = "No such review", body = ErrorBody)
    )
)]
pub async fn get_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> HandlerResult<Json<ReviewView>> {
    let gateway = state.gateway.as_ref();
    ensure_owned::<Review>(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("load review", e))?;
    moderation::fetch_review(gateway, &id)
        .await
        .map(|review| Json(review.into()))
        .map_err(|e| fail("load review", e))
}

/// PUT /review/{id}/status - Approve, deny or return a review to pending
#[utoipa::path(
    put,
    path = "/review/{id}/status",
    params(("id" = String, Path, description = "Review id")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "The re-fetched review"),
        (status = 400, description = "Not a moderation status token", body = ErrorBody),
        (status = 404, description = "Not one of the manager's reviews", body = ErrorBody)
    )
)]
pub async fn moderate_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> HandlerResult<Json<ReviewView>> {
    let status =
        ReviewModeration::from_wire(&change.status).map_err(|e| fail("moderate review", e))?;
    let gateway = state.gateway.as_ref();
    ensure_owned::<Review>(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("moderate review", e))?;
    moderation::set_review_moderation(gateway, &id, status)
        .await
        .map(|review| Json(review.into()))
        .map_err(|e| fail("moderate review", e))
}

/// POST /review/{id}/replies - Reply to a review
#[utoipa::path(
    post,
    path = "/review/{id}/replies",
    params(("id" = String, Path, description = "Review id")),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "The created reply"),
        (status = 400, description = "Empty reply", body = ErrorBody),
        (status = 404, description = "Not one of the manager's items", body = ErrorBody)
    )
)]
pub async fn reply_to_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Json(req): Json<ReplyRequest>,
) -> HandlerResult<(StatusCode, Json<Reply>)> {
    moderation::reply_content(&req.content).map_err(|e| fail("reply to review", e))?;
    let gateway = state.gateway.as_ref();
    ensure_owned::<Review>(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("reply to review", e))?;
    let reply = moderation::reply_to_review(gateway, &id, &req.content)
        .await
        .map_err(|e| fail("reply to review", e))?;
    Ok((StatusCode::CREATED, Json(reply)))
}

//=========================================================================================
// Complaints
//=========================================================================================

/// GET /complaints - Complaints across the manager's businesses
#[utoipa::path(
    get,
    path = "/complaints",
    responses(
        (status = 200, description = "Complaints with status labels, in fetch order"),
        (status = 502, description = "Backend unavailable", body = ErrorBody)
    )
)]
pub async fn list_complaints_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<Vec<ComplaintView>>> {
    let complaints: Vec<Complaint> = fetch_owned(state.gateway.as_ref(), &user.id)
        .await
        .map_err(|e| fail("load complaints", e))?;
    Ok(Json(complaints.into_iter().map(ComplaintView::from).collect()))
}

/// POST /complaints/delete - Delete the selected complaints one by one
#[utoipa::path(
    post,
    path = "/complaints/delete",
    request_body = MassDeleteRequest,
    responses((status = 200, description = "Outcome and the re-fetched list"))
)]
pub async fn delete_complaints_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(req): Json<MassDeleteRequest>,
) -> HandlerResult<Json<MassDeleteResponse<ComplaintView>>> {
    let (result, items) =
        delete_selected::<Complaint>(state.gateway.as_ref(), &user.id, &req.ids, req.confirmed)
            .await
            .map_err(|e| fail("load complaints", e))?;
    Ok(Json(MassDeleteResponse {
        result,
        items: items.into_iter().map(ComplaintView::from).collect(),
    }))
}

/// GET /complaint/{id} - One complaint with its replies
#[utoipa::path(
    get,
    path = "/complaint/{id}",
    params(("id" = String, Path, description = "Complaint id")),
    responses(
        (status = 200, description = "The complaint"),
        (status = 404, description = "No such complaint", body = ErrorBody)
    )
)]
pub async fn get_complaint_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> HandlerResult<Json<ComplaintView>> {
    let gateway = state.gateway.as_ref();
    ensure_owned::<Complaint>(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("load complaint", e))?;
    moderation::fetch_complaint(gateway, &id)
        .await
        .map(|complaint| Json(complaint.into()))
        .map_err(|e| fail("load complaint", e))
}

/// PUT /complaint/{id}/status - Resolve or reopen a complaint
#[utoipa::path(
    put,
    path = "/complaint/{id}/status",
    params(("id" = String, Path, description = "Complaint id")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "The re-fetched complaint"),
        (status = 400, description = "Not a complaint status token", body = ErrorBody),
        (status = 404, description = "Not one of the manager's complaints", body = ErrorBody)
    )
)]
pub async fn set_complaint_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> HandlerResult<Json<ComplaintView>> {
    let status =
        ComplaintStatus::from_wire(&change.status).map_err(|e| fail("update complaint", e))?;
    let gateway = state.gateway.as_ref();
    ensure_owned::<Complaint>(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("update complaint", e))?;
    moderation::set_complaint_status(gateway, &id, status)
        .await
        .map(|complaint| Json(complaint.into()))
        .map_err(|e| fail("update complaint", e))
}

/// POST /complaint/{id}/replies - Reply to a complaint
#[utoipa::path(
    post,
    path = "/complaint/{id}/replies",
    params(("id" = String, Path, description = "Complaint id")),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "The created reply"),
        (status = 400, description = "Empty reply", body = ErrorBody),
        (status = 404, description = "Not one of the manager's items", body = ErrorBody)
    )
)]
pub async fn reply_to_complaint_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Json(req): Json<ReplyRequest>,
) -> HandlerResult<(StatusCode, Json<Reply>)> {
    moderation::reply_content(&req.content).map_err(|e| fail("reply to complaint", e))?;
    let gateway = state.gateway.as_ref();
    ensure_owned::<Complaint>(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("reply to complaint", e))?;
    let reply = moderation::reply_to_complaint(gateway, &id, &req.content)
        .await
        .map_err(|e| fail("reply to complaint", e))?;
    Ok((StatusCode::CREATED, Json(reply)))
}

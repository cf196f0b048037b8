//! services/portal/src/web/dashboard.rs

use axum::{extract::State, Extension, Json};
use manager_portal_core::commands::dashboard::{self, DashboardSummary};
use manager_portal_core::domain::SessionUser;
use std::sync::Arc;

use crate::web::rest::{fail, ErrorBody, HandlerResult};
use crate::web::state::AppState;

/// GET /dashboard - Counts across the manager's businesses
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Product, listing, review and complaint counts"),
        (status = 303, description = "No manager session; redirected"),
        (status = 502, description = "Backend unavailable", body = ErrorBody)
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<DashboardSummary>> {
    dashboard::summary(state.gateway.as_ref(), &user.id)
        .await
        .map(Json)
        .map_err(|e| fail("load dashboard", e))
}

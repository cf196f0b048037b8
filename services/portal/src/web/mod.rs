//! services/portal/src/web/mod.rs
//!
//! Route table of the portal. Everything except the sign-in flow and the
//! session probe sits behind `require_manager`.

pub mod account;
pub mod auth;
pub mod business;
pub mod dashboard;
pub mod feedback;
pub mod jobs;
pub mod middleware;
pub mod products;
pub mod rest;
pub mod session;
pub mod state;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_manager;
pub use state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route(
            "/auth/signin",
            get(auth::signin_page_handler).post(auth::signin_handler),
        )
        .route("/auth/signout", post(auth::signout_handler))
        .route("/unauthorized", get(auth::unauthorized_handler))
        .route("/api/session", get(auth::session_handler));

    // Protected routes (manager session required)
    let protected_routes = Router::new()
        .route("/api/upload", post(upload::upload_handler))
        .route("/dashboard", get(dashboard::dashboard_handler))
        .route(
            "/business-profile",
            get(business::get_business_handler).patch(business::update_business_handler),
        )
        .route("/business-profile/{panel}", patch(business::update_panel_handler))
        .route("/products", get(products::list_products_handler))
        .route("/products/{id}", delete(products::delete_product_handler))
        .route(
            "/add-product",
            get(products::add_product_form_handler).post(products::create_product_handler),
        )
        .route(
            "/add-product/images",
            post(products::attach_new_product_image_handler),
        )
        .route(
            "/edit-product/{id}",
            get(products::get_product_handler).patch(products::update_product_handler),
        )
        .route(
            "/edit-product/{id}/images",
            post(products::attach_product_image_handler),
        )
        .route(
            "/edit-product/{id}/images/{image_id}",
            delete(products::delete_product_image_handler),
        )
        .route(
            "/edit-product/{id}/reviews/{review_id}/status",
            put(products::moderate_product_review_handler),
        )
        .route(
            "/edit-product/{id}/complaints/{complaint_id}/status",
            put(products::set_product_complaint_status_handler),
        )
        .route("/reviews", get(feedback::list_reviews_handler))
        .route("/reviews/delete", post(feedback::delete_reviews_handler))
        .route("/review/{id}", get(feedback::get_review_handler))
        .route("/review/{id}/status", put(feedback::moderate_review_handler))
        .route("/review/{id}/replies", post(feedback::reply_to_review_handler))
        .route("/complaints", get(feedback::list_complaints_handler))
        .route("/complaints/delete", post(feedback::delete_complaints_handler))
        .route("/complaint/{id}", get(feedback::get_complaint_handler))
        .route(
            "/complaint/{id}/status",
            put(feedback::set_complaint_status_handler),
        )
        .route(
            "/complaint/{id}/replies",
            post(feedback::reply_to_complaint_handler),
        )
        .route("/job-listings", get(jobs::list_job_listings_handler))
        .route("/job-listings/{id}", patch(jobs::update_job_listing_handler))
        .route("/job-listings/delete", post(jobs::delete_job_listings_handler))
        .route(
            "/account",
            get(account::get_account_handler).patch(account::update_account_handler),
        )
        .route("/account/password", post(account::change_password_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_manager,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

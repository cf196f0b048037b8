//! services/portal/src/web/rest.rs
//!
//! Shared request/response payloads, the error mapping every handler uses, and
//! the master definition for the OpenAPI specification.

use axum::{http::StatusCode, Json};
use manager_portal_core::form::SubmitOutcome;
use manager_portal_core::ports::PortError;
use manager_portal_core::selection::MassDeleteOutcome;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

use crate::web::{account, auth, business, dashboard, feedback, jobs, products, upload};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signin_page_handler,
        auth::signin_handler,
        auth::signout_handler,
        auth::unauthorized_handler,
        auth::session_handler,
        upload::upload_handler,
        dashboard::dashboard_handler,
        business::get_business_handler,
        business::update_business_handler,
        business::update_panel_handler,
        products::list_products_handler,
        products::delete_product_handler,
        products::add_product_form_handler,
        products::create_product_handler,
        products::attach_new_product_image_handler,
        products::get_product_handler,
        products::update_product_handler,
        products::attach_product_image_handler,
        products::delete_product_image_handler,
        products::moderate_product_review_handler,
        products::set_product_complaint_status_handler,
        feedback::list_reviews_handler,
        feedback::delete_reviews_handler,
        feedback::get_review_handler,
        feedback::moderate_review_handler,
        feedback::reply_to_review_handler,
        feedback::list_complaints_handler,
        feedback::delete_complaints_handler,
        feedback::get_complaint_handler,
        feedback::set_complaint_status_handler,
        feedback::reply_to_complaint_handler,
        jobs::list_job_listings_handler,
        jobs::update_job_listing_handler,
        jobs::delete_job_listings_handler,
        account::get_account_handler,
        account::update_account_handler,
        account::change_password_handler,
    ),
    components(
        schemas(
            MessageBody,
            ErrorBody,
            SaveBody,
            FieldChanges,
            StatusChange,
            MassDeleteRequest,
            ReplyRequest,
            auth::SignInRequest,
            auth::SignInHint,
            account::PasswordChange,
            products::NewProductRequest,
            upload::UploadResponse,
        )
    ),
    tags(
        (name = "Manager Portal API", description = "Business management endpoints for managers.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payloads
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// The reply to a form submission. `changed` is false when nothing was touched.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveBody {
    pub message: String,
    pub changed: bool,
}

/// Edited fields of a form, keyed by their backend names.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct FieldChanges(pub Map<String, Value>);

/// A status token as the backend stores it, e.g. `"0"`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MassDeleteRequest {
    #[serde(default)]
    pub ids: Vec<String>,
    /// Must be `true`; anything else cancels the delete without a call.
    #[serde(default)]
    pub confirmed: bool,
}

/// The result of a mass delete and the list as re-fetched afterwards.
#[derive(Debug, Serialize)]
pub struct MassDeleteResponse<V> {
    pub result: MassDeleteOutcome,
    pub items: Vec<V>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplyRequest {
    pub content: String,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type HandlerError = (StatusCode, Json<ErrorBody>);
pub type HandlerResult<T> = Result<T, HandlerError>;

pub fn status_for(e: &PortError) -> StatusCode {
    match e {
        PortError::Validation(_) => StatusCode::BAD_REQUEST,
        PortError::Authorization(_) => StatusCode::FORBIDDEN,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Transport(_)
        | PortError::Protocol(_)
        | PortError::Api(_)
        | PortError::Upload(_)
        | PortError::Link { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Logs a failed operation and turns it into a short message for the client.
pub fn fail(context: &str, e: PortError) -> HandlerError {
    let status = status_for(&e);
    if status.is_client_error() {
        warn!("Rejected request to {context}: {e}");
    } else {
        error!("Failed to {context}: {e:?}");
    }
    let message = match e {
        PortError::Transport(_) | PortError::Protocol(_) => format!("Failed to {context}"),
        other => other.to_string(),
    };
    (status, Json(ErrorBody { error: message }))
}

pub fn bad_request(message: impl Into<String>) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

pub fn message(text: impl Into<String>) -> Json<MessageBody> {
    Json(MessageBody {
        message: text.into(),
    })
}

pub fn saved(outcome: &SubmitOutcome, what: &str) -> Json<SaveBody> {
    let body = match outcome {
        SubmitOutcome::Unchanged => SaveBody {
            message: "No changes to save".to_string(),
            changed: false,
        },
        SubmitOutcome::Saved(_) => SaveBody {
            message: format!("{what} updated successfully"),
            changed: true,
        },
    };
    Json(body)
}

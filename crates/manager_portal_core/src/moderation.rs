//! crates/manager_portal_core/src/moderation.rs
//!
//! Review moderation and complaint resolution, for both business-level and
//! product-level feedback, plus manager replies.
//!
//! Every status change is followed by a full re-fetch of the parent view.
//! Status changes feed server-side aggregates (the dashboard's pending
//! counts, filtered queries) that the client cannot predict locally.

use serde_json::json;
use tracing::info;

use crate::commands::products::fetch_product;
use crate::domain::{Complaint, ComplaintStatus, ProductDetail, Reply, Review, ReviewModeration};
use crate::graphql::{self, documents, Operation};
use crate::ports::{GraphQlGateway, PortError, PortResult};
use crate::selection::ListedEntity;

impl ListedEntity for Review {
    const COLLECTION: &'static str = "reviews";
    const LIST: Operation = documents::MANAGER_REVIEWS;
    const DELETE: Operation = documents::DELETE_REVIEW;

    fn id(&self) -> &str {
        &self.id
    }
}

impl ListedEntity for Complaint {
    const COLLECTION: &'static str = "complaints";
    const LIST: Operation = documents::MANAGER_COMPLAINTS;
    const DELETE: Operation = documents::DELETE_COMPLAINT;

    fn id(&self) -> &str {
        &self.id
    }
}

//=========================================================================================
// Business Reviews
//=========================================================================================

pub async fn fetch_review(gateway: &dyn GraphQlGateway, id: &str) -> PortResult<Review> {
    graphql::run(gateway, &documents::REVIEW, graphql::where_id(id), "review").await
}

/// Persists a new moderation status and returns the re-fetched review.
pub async fn set_review_moderation(
    gateway: &dyn GraphQlGateway,
    review_id: &str,
    status: ReviewModeration,
) -> PortResult<Review> {
    send_status(gateway, &documents::UPDATE_REVIEW, review_id, "moderationStatus", status.as_wire())
        .await?;
    info!(review_id, status = status.label(), "review moderation updated");
    fetch_review(gateway, review_id).await
}

//=========================================================================================
// Business Complaints
//=========================================================================================

pub async fn fetch_complaint(gateway: &dyn GraphQlGateway, id: &str) -> PortResult<Complaint> {
    graphql::run(gateway, &documents::COMPLAINT, graphql::where_id(id), "complaint").await
}

/// Persists a new complaint status and returns the re-fetched complaint.
pub async fn set_complaint_status(
    gateway: &dyn GraphQlGateway,
    complaint_id: &str,
    status: ComplaintStatus,
) -> PortResult<Complaint> {
    send_status(gateway, &documents::UPDATE_COMPLAINT, complaint_id, "status", status.as_wire())
        .await?;
    info!(complaint_id, status = status.label(), "complaint status updated");
    fetch_complaint(gateway, complaint_id).await
}

/// Flips a complaint between resolved and unresolved.
pub async fn toggle_complaint(
    gateway: &dyn GraphQlGateway,
    complaint: &Complaint,
) -> PortResult<Complaint> {
    set_complaint_status(gateway, &complaint.id, complaint.status.toggled()).await
}

//=========================================================================================
// Product Feedback
//=========================================================================================

/// Moderates a review inside the product edit view, then re-fetches the product.
pub async fn set_product_review_moderation(
    gateway: &dyn GraphQlGateway,
    product_id: &str,
    review_id: &str,
    status: ReviewModeration,
) -> PortResult<ProductDetail> {
    let product = fetch_product(gateway, product_id).await?;
    if !product.reviews.iter().any(|r| r.id == review_id) {
        return Err(PortError::NotFound(format!(
            "review {review_id} on product {product_id}"
        )));
    }
    send_status(
        gateway,
        &documents::UPDATE_PRODUCT_REVIEW,
        review_id,
        "moderationStatus",
        status.as_wire(),
    )
    .await?;
    info!(product_id, review_id, status = status.label(), "product review moderation updated");
    fetch_product(gateway, product_id).await
}

/// Sets a product complaint's status, then re-fetches the product.
pub async fn set_product_complaint_status(
    gateway: &dyn GraphQlGateway,
    product_id: &str,
    complaint_id: &str,
    status: ComplaintStatus,
) -> PortResult<ProductDetail> {
    let product = fetch_product(gateway, product_id).await?;
    if !product.complaints.iter().any(|c| c.id == complaint_id) {
        return Err(PortError::NotFound(format!(
            "complaint {complaint_id} on product {product_id}"
        )));
    }
    send_status(
        gateway,
        &documents::UPDATE_PRODUCT_COMPLAINT,
        complaint_id,
        "status",
        status.as_wire(),
    )
    .await?;
    info!(product_id, complaint_id, status = status.label(), "product complaint status updated");
    fetch_product(gateway, product_id).await
}

//=========================================================================================
// Replies
//=========================================================================================

pub async fn reply_to_review(
    gateway: &dyn GraphQlGateway,
    review_id: &str,
    content: &str,
) -> PortResult<Reply> {
    let content = reply_content(content)?;
    let variables = json!({
        "data": { "content": content, "review": { "connect": { "id": review_id } } }
    });
    graphql::run(gateway, &documents::CREATE_REVIEW_REPLY, variables, "createReviewReply").await
}

pub async fn reply_to_complaint(
    gateway: &dyn GraphQlGateway,
    complaint_id: &str,
    content: &str,
) -> PortResult<Reply> {
    let content = reply_content(content)?;
    let variables = json!({
        "data": { "content": content, "complaint": { "connect": { "id": complaint_id } } }
    });
    graphql::run(
        gateway,
        &documents::CREATE_COMPLAINT_REPLY,
        variables,
        "createComplaintReply",
    )
    .await
}

/// The trimmed reply text, or a ValidationError when there is none.
pub fn reply_content(content: &str) -> PortResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(PortError::Validation("a reply cannot be empty".to_string()));
    }
    Ok(trimmed)
}

async fn send_status(
    gateway: &dyn GraphQlGateway,
    operation: &Operation,
    id: &str,
    field: &str,
    token: &str,
) -> PortResult<()> {
    let variables = json!({ "where": { "id": id }, "data": { field: token } });
    graphql::send(gateway, operation, variables).await?;
    Ok(())
}

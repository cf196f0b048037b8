//! services/portal/src/web/products.rs
//!
//! Product list, add-product and edit-product pages, including image
//! attachment and the moderation of a product's own reviews and complaints.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use manager_portal_core::attachment::{self, AttachedAsset};
use manager_portal_core::commands::products::{self, NewProduct};
use manager_portal_core::domain::{
    BusinessRef, ComplaintStatus, Product, ProductDetail, ReviewModeration, SessionUser,
};
use manager_portal_core::moderation;
use manager_portal_core::ports::{GraphQlGateway, PortError, PortResult};
use manager_portal_core::selection::fetch_owned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::web::rest::{
    fail, message, saved, ErrorBody, FieldChanges, HandlerResult, MessageBody, SaveBody,
    StatusChange,
};
use crate::web::state::AppState;
use crate::web::upload::{read_upload_form, require_file};

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub business_id: String,
}

/// One row of the product list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub review_count: usize,
    pub average_rating: Option<f64>,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Prefixes relative image URLs with the configured asset host.
fn asset_url(base: Option<&str>, url: &str) -> String {
    match base {
        Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => {
            format!("{base}/{}", url.trim_start_matches('/'))
        }
        _ => url.to_string(),
    }
}

fn summarize(product: Product, base: Option<&str>) -> ProductSummary {
    let average_rating = product.average_rating();
    ProductSummary {
        image_urls: product
            .images
            .iter()
            .filter_map(|image| image.file.as_ref())
            .map(|file| asset_url(base, &file.url))
            .collect(),
        review_count: product.reviews.len(),
        average_rating,
        id: product.id,
        name: product.name,
        description: product.description,
    }
}

fn present(mut product: ProductDetail, base: Option<&str>) -> ProductDetail {
    for file in product.images.iter_mut().filter_map(|image| image.file.as_mut()) {
        file.url = asset_url(base, &file.url);
    }
    product
}

/// Loads a product, refusing products of businesses the manager does not own.
pub(crate) async fn owned_product(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
    product_id: &str,
) -> PortResult<ProductDetail> {
    let product = products::fetch_product(gateway, product_id).await?;
    let businesses: Vec<BusinessRef> = products::list_businesses(gateway, user_id).await?;
    let owned = product
        .business
        .as_ref()
        .is_some_and(|b| businesses.iter().any(|mine| mine.id == b.id));
    if !owned {
        return Err(PortError::NotFound(format!("product {product_id}")));
    }
    Ok(product)
}

//=========================================================================================
// Product List
//=========================================================================================

/// GET /products - The manager's products with average ratings
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Products across the manager's businesses"),
        (status = 502, description = "Backend unavailable", body = ErrorBody)
    )
)]
pub async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<Vec<ProductSummary>>> {
    let items: Vec<Product> = fetch_owned(state.gateway.as_ref(), &user.id)
        .await
        .map_err(|e| fail("load products", e))?;
    let base = state.config.asset_base_url.as_deref();
    Ok(Json(items.into_iter().map(|p| summarize(p, base)).collect()))
}

/// DELETE /products/{id} - Delete one product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Deleted", body = MessageBody),
        (status = 404, description = "Not one of the manager's products", body = ErrorBody)
    )
)]
pub async fn delete_product_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> HandlerResult<Json<MessageBody>> {
    let gateway = state.gateway.as_ref();
    let items: Vec<Product> = fetch_owned(gateway, &user.id)
        .await
        .map_err(|e| fail("load products", e))?;
    if !items.iter().any(|p| p.id == id) {
        return Err(fail("delete product", PortError::NotFound(format!("product {id}"))));
    }
    products::delete_product(gateway, &id)
        .await
        .map_err(|e| fail("delete product", e))?;
    Ok(message("Product deleted successfully"))
}

//=========================================================================================
// Add Product
//=========================================================================================

/// GET /add-product - Businesses a new product can belong to
#[utoipa::path(
    get,
    path = "/add-product",
    responses((status = 200, description = "The manager's businesses"))
)]
pub async fn add_product_form_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> HandlerResult<Json<Vec<BusinessRef>>> {
    products::list_businesses(state.gateway.as_ref(), &user.id)
        .await
        .map(Json)
        .map_err(|e| fail("load businesses", e))
}

/// POST /add-product - Create a product under one of the manager's businesses
#[utoipa::path(
    post,
    path = "/add-product",
    request_body = NewProductRequest,
    responses(
        (status = 201, description = "Created; images can now be attached"),
        (status = 400, description = "Missing name or foreign business", body = ErrorBody)
    )
)]
pub async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(req): Json<NewProductRequest>,
) -> HandlerResult<impl IntoResponse> {
    let input = NewProduct {
        name: req.name,
        description: req.description,
        business_id: req.business_id,
    };
    let created = products::create_product(state.gateway.as_ref(), &user.id, &input)
        .await
        .map_err(|e| fail("create product", e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /add-product/images - Attach an image to a product just created
#[utoipa::path(
    post,
    path = "/add-product/images",
    request_body(content_type = "multipart/form-data", description = "`file` and `productId` parts."),
    responses(
        (status = 201, description = "Stored and linked"),
        (status = 400, description = "No product id yet, or no file", body = ErrorBody),
        (status = 404, description = "Not one of the manager's products", body = ErrorBody),
        (status = 502, description = "Upload or link failed", body = ErrorBody)
    )
)]
pub async fn attach_new_product_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    multipart: Multipart,
) -> HandlerResult<(StatusCode, Json<AttachedAsset>)> {
    let mut form = read_upload_form(multipart).await?;
    let file = require_file(&mut form)?;
    let gateway = state.gateway.as_ref();
    if let Some(id) = form.product_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        owned_product(gateway, &user.id, id)
            .await
            .map_err(|e| fail("load product", e))?;
    }
    let attached = attachment::attach_product_image(
        gateway,
        state.assets.as_ref(),
        form.product_id.as_deref(),
        file,
    )
    .await
    .map_err(|e| fail("attach image", e))?;
    Ok((StatusCode::CREATED, Json(attached)))
}

//=========================================================================================
// Edit Product
//=========================================================================================

/// GET /edit-product/{id} - Everything the edit view shows
#[utoipa::path(
    get,
    path = "/edit-product/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product with images, reviews and complaints"),
        (status = 404, description = "Not one of the manager's products", body = ErrorBody)
    )
)]
pub async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> HandlerResult<Json<ProductDetail>> {
    let product = owned_product(state.gateway.as_ref(), &user.id, &id)
        .await
        .map_err(|e| fail("load product", e))?;
    Ok(Json(present(product, state.config.asset_base_url.as_deref())))
}

/// PATCH /edit-product/{id} - Save the edited product fields
#[utoipa::path(
    patch,
    path = "/edit-product/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = FieldChanges,
    responses(
        (status = 200, description = "Saved, or nothing to save", body = SaveBody),
        (status = 400, description = "Field not editable", body = ErrorBody)
    )
)]
pub async fn update_product_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Json(FieldChanges(changes)): Json<FieldChanges>,
) -> HandlerResult<Json<SaveBody>> {
    let gateway = state.gateway.as_ref();
    let product = owned_product(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("load product", e))?;
    let outcome = products::update_product(gateway, &user.id, &product, changes)
        .await
        .map_err(|e| fail("update product", e))?;
    Ok(saved(&outcome, "Product"))
}

/// POST /edit-product/{id}/images - Attach an image to an existing product
#[utoipa::path(
    post,
    path = "/edit-product/{id}/images",
    params(("id" = String, Path, description = "Product id")),
    request_body(content_type = "multipart/form-data", description = "A `file` part."),
    responses(
        (status = 201, description = "Stored and linked"),
        (status = 502, description = "Upload or link failed", body = ErrorBody)
    )
)]
pub async fn attach_product_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> HandlerResult<(StatusCode, Json<AttachedAsset>)> {
    let gateway = state.gateway.as_ref();
    owned_product(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("load product", e))?;
    let mut form = read_upload_form(multipart).await?;
    let file = require_file(&mut form)?;
    let attached =
        attachment::attach_product_image(gateway, state.assets.as_ref(), Some(&id), file)
            .await
            .map_err(|e| fail("attach image", e))?;
    Ok((StatusCode::CREATED, Json(attached)))
}

/// DELETE /edit-product/{id}/images/{image_id} - Remove an image
#[utoipa::path(
    delete,
    path = "/edit-product/{id}/images/{image_id}",
    params(
        ("id" = String, Path, description = "Product id"),
        ("image_id" = String, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "The re-fetched product"),
        (status = 404, description = "Image not on this product", body = ErrorBody)
    )
)]
pub async fn delete_product_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path((id, image_id)): Path<(String, String)>,
) -> HandlerResult<Json<ProductDetail>> {
    let gateway = state.gateway.as_ref();
    let product = owned_product(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("load product", e))?;
    let product = products::delete_image(gateway, &product, &image_id)
        .await
        .map_err(|e| fail("delete image", e))?;
    Ok(Json(present(product, state.config.asset_base_url.as_deref())))
}

/// PUT /edit-product/{id}/reviews/{review_id}/status - Moderate a product review
#[utoipa::path(
    put,
    path = "/edit-product/{id}/reviews/{review_id}/status",
    params(
        ("id" = String, Path, description = "Product id"),
        ("review_id" = String, Path, description = "Review id")
    ),
    request_body = StatusChange,
    responses(
        (status = 200, description = "The re-fetched product"),
        (status = 400, description = "Not a moderation status token", body = ErrorBody)
    )
)]
pub async fn moderate_product_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path((id, review_id)): Path<(String, String)>,
    Json(change): Json<StatusChange>,
) -> HandlerResult<Json<ProductDetail>> {
    let status = ReviewModeration::from_wire(&change.status)
        .map_err(|e| fail("moderate review", e))?;
    let gateway = state.gateway.as_ref();
    owned_product(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("load product", e))?;
    let product = moderation::set_product_review_moderation(gateway, &id, &review_id, status)
        .await
        .map_err(|e| fail("moderate review", e))?;
    Ok(Json(present(product, state.config.asset_base_url.as_deref())))
}

/// PUT /edit-product/{id}/complaints/{complaint_id}/status - Resolve or reopen a product complaint
#[utoipa::path(
    put,
    path = "/edit-product/{id}/complaints/{complaint_id}/status",
    params(
        ("id" = String, Path, description = "Product id"),
        ("complaint_id" = String, Path, description = "Complaint id")
    ),
    request_body = StatusChange,
    responses(
        (status = 200, description = "The re-fetched product"),
        (status = 400, description = "Not a complaint status token", body = ErrorBody)
    )
)]
pub async fn set_product_complaint_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path((id, complaint_id)): Path<(String, String)>,
    Json(change): Json<StatusChange>,
) -> HandlerResult<Json<ProductDetail>> {
    let status = ComplaintStatus::from_wire(&change.status)
        .map_err(|e| fail("update complaint", e))?;
    let gateway = state.gateway.as_ref();
    owned_product(gateway, &user.id, &id)
        .await
        .map_err(|e| fail("load product", e))?;
    let product = moderation::set_product_complaint_status(gateway, &id, &complaint_id, status)
        .await
        .map_err(|e| fail("update complaint", e))?;
    Ok(Json(present(product, state.config.asset_base_url.as_deref())))
}

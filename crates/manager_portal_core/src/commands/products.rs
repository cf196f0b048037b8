//! Product catalogue commands: list, create, edit, delete, and image removal.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::domain::{BusinessRef, Product, ProductDetail};
use crate::form::{self, FieldSpec, FormSchema, FormState, SubmitOutcome};
use crate::graphql::{self, documents, Operation};
use crate::ports::{GraphQlGateway, PortError, PortResult};
use crate::selection::ListedEntity;

pub static PRODUCT_FORM: FormSchema = FormSchema {
    entity: "product",
    fields: &[
        FieldSpec::text("name"),
        FieldSpec::text("description"),
        FieldSpec::relation("business"),
    ],
};

impl ListedEntity for Product {
    const COLLECTION: &'static str = "products";
    const LIST: Operation = documents::MANAGER_PRODUCTS;
    const DELETE: Operation = documents::DELETE_PRODUCT;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Input for the add-product form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub business_id: String,
}

/// The backend's echo of a freshly created product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProduct {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct OwnedBusinesses {
    businesses: Vec<BusinessRef>,
}

/// The businesses the manager may attach products to.
pub async fn list_businesses(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
) -> PortResult<Vec<BusinessRef>> {
    let owned: OwnedBusinesses = graphql::run(
        gateway,
        &documents::MANAGER_BUSINESS_NAMES,
        graphql::where_id(user_id),
        "user",
    )
    .await?;
    Ok(owned.businesses)
}

pub async fn fetch_product(gateway: &dyn GraphQlGateway, id: &str) -> PortResult<ProductDetail> {
    graphql::run(gateway, &documents::PRODUCT, graphql::where_id(id), "product").await
}

/// Creates a product under one of the manager's own businesses.
pub async fn create_product(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
    input: &NewProduct,
) -> PortResult<CreatedProduct> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(PortError::Validation("a product needs a name".to_string()));
    }
    let businesses = list_businesses(gateway, user_id).await?;
    if !businesses.iter().any(|b| b.id == input.business_id) {
        return Err(PortError::Validation(format!(
            "business {} is not one of yours",
            input.business_id
        )));
    }

    let variables = json!({
        "data": {
            "name": name,
            "description": input.description,
            "business": { "connect": { "id": input.business_id } }
        }
    });
    let created: CreatedProduct =
        graphql::run(gateway, &documents::CREATE_PRODUCT, variables, "createProduct").await?;
    info!(product_id = %created.id, business_id = %input.business_id, "product created");
    Ok(created)
}

/// Applies the manager's edits to a product, sending only the touched fields.
///
/// Re-linking the product is limited to businesses `user_id` owns.
pub async fn update_product(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
    product: &ProductDetail,
    changes: Map<String, Value>,
) -> PortResult<SubmitOutcome> {
    let mut form = FormState::initialize(&PRODUCT_FORM, product)?;
    form.apply_changes(changes)?;

    if form.touched().any(|field| field == "business") {
        let target = form
            .value("business")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        let businesses = list_businesses(gateway, user_id).await?;
        if !businesses.iter().any(|b| b.id == target) {
            warn!(product_id = %product.id, business_id = target, "refusing re-link to a foreign business");
            return Err(PortError::NotFound(format!("business {target}")));
        }
    }

    form::submit(gateway, &documents::UPDATE_PRODUCT, "updateProduct", &product.id, &form).await
}

pub async fn delete_product(gateway: &dyn GraphQlGateway, id: &str) -> PortResult<()> {
    graphql::send(gateway, &documents::DELETE_PRODUCT, graphql::where_id(id)).await?;
    info!(product_id = id, "product deleted");
    Ok(())
}

/// Removes an image from a product and returns the re-fetched product.
pub async fn delete_image(
    gateway: &dyn GraphQlGateway,
    product: &ProductDetail,
    image_id: &str,
) -> PortResult<ProductDetail> {
    if !product.images.iter().any(|image| image.id == image_id) {
        return Err(PortError::NotFound(format!(
            "image {image_id} on product {}",
            product.id
        )));
    }
    graphql::send(gateway, &documents::DELETE_IMAGE, graphql::where_id(image_id)).await?;
    info!(product_id = %product.id, image_id, "product image deleted");
    fetch_product(gateway, &product.id).await
}

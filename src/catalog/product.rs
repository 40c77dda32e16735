//! Product resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::validate::Rule;
use crate::request::Request;
use crate::response::{Created, Json};
use crate::store::Collection;

pub type ProductStore = Collection<Product>;

/// Client-supplied product fields, camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub brand: String,
    pub price: f64,
    pub quantity: u64,
    pub category_id: String,
    pub sub_category_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ProductInput,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body rules shared by create and update.
pub fn rules() -> Vec<Rule> {
    let required = ["title", "description", "imageUrl", "brand", "price", "quantity", "categoryId", "subCategoryId"];
    required
        .into_iter()
        .map(|field| {
            let rule = Rule::body(field).not_empty().message(format!("{field} is required"));
            match field {
                "price" => rule.numeric().message("price must be a number"),
                "quantity" => rule.integer().message("quantity must be a whole number"),
                _ => rule,
            }
        })
        .collect()
}

fn product_id(req: &Request) -> Result<Uuid, ApiError> {
    req.param("productId")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| ApiError::not_found("product"))
}

/// `POST /api/products`
pub async fn create(store: ProductStore, req: Request) -> Result<Created<serde_json::Value>, ApiError> {
    let fields: ProductInput = req.json()?;
    let now = Utc::now();
    let product = Product { id: Uuid::new_v4(), fields, created_at: now, updated_at: now };
    store.insert(product.id, product.clone());

    tracing::info!(product_id = %product.id, by = ?req.identity().map(|i| &i.id), "product created");
    Ok(Created(json!({ "msg": "Product is created", "product": product })))
}

/// `PUT /api/products/:productId`
///
/// Replaces every client field. Sending the same body twice leaves the
/// product (including `updatedAt`) exactly as the first call did.
pub async fn update(store: ProductStore, req: Request) -> Result<Json<serde_json::Value>, ApiError> {
    let id = product_id(&req)?;
    let fields: ProductInput = req.json()?;

    let product = store
        .update(&id, |product| {
            if product.fields != fields {
                product.fields = fields;
                product.updated_at = Utc::now();
            }
        })
        .ok_or_else(|| ApiError::not_found("product"))?;

    Ok(Json(json!({ "msg": "Product is updated", "product": product })))
}

/// `GET /api/products`, oldest first. Empty store gives `[]`.
pub async fn list(store: ProductStore, _req: Request) -> Json<Vec<Product>> {
    Json(sorted(store.all()))
}

/// `GET /api/products/:productId`
pub async fn get(store: ProductStore, req: Request) -> Result<Json<Product>, ApiError> {
    let id = product_id(&req)?;
    store.get(&id).map(Json).ok_or_else(|| ApiError::not_found("product"))
}

/// `DELETE /api/products/:productId`
pub async fn delete(store: ProductStore, req: Request) -> Result<Json<serde_json::Value>, ApiError> {
    let id = product_id(&req)?;
    let product = store.remove(&id).ok_or_else(|| ApiError::not_found("product"))?;

    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(json!({ "msg": "Product is deleted", "product": product })))
}

/// `GET /api/products/categories/:categoryId`
pub async fn list_by_category(store: ProductStore, req: Request) -> Json<Vec<Product>> {
    let category = req.param("categoryId").unwrap_or_default();
    Json(sorted(store.filter(|p| p.fields.category_id == category)))
}

fn sorted(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    products
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::middleware::validate::validate;

    #[test]
    fn rules_require_every_field_in_order() {
        let result = validate(&rules(), &json!({}));
        let fields: Vec<_> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "description", "imageUrl", "brand", "price", "quantity", "categoryId", "subCategoryId"]);
        assert_eq!(result.errors()[0].message, "title is required");
    }

    #[test]
    fn serialises_with_mongo_style_id_and_camel_case() {
        let now = Utc::now();
        let product = Product {
            id: Uuid::nil(),
            fields: ProductInput {
                title: "Lamp".into(),
                description: "Desk lamp".into(),
                image_url: "https://img/lamp.png".into(),
                brand: "Lumo".into(),
                price: 19.5,
                quantity: 3,
                category_id: "c1".into(),
                sub_category_id: "s1".into(),
            },
            created_at: now,
            updated_at: now,
        };
        let value: Value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["_id"], Uuid::nil().to_string());
        assert_eq!(value["imageUrl"], "https://img/lamp.png");
        assert_eq!(value["subCategoryId"], "s1");
        assert!(value.get("fields").is_none());
    }
}

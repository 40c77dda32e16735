//! Category resource. Same route shape as products, fewer fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::validate::Rule;
use crate::request::Request;
use crate::response::{Created, Json};
use crate::store::Collection;

pub type CategoryStore = Collection<Category>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: CategoryInput,
    pub created_at: DateTime<Utc>,
}

pub fn rules() -> Vec<Rule> {
    vec![Rule::body("name").not_empty().message("name is required")]
}

fn category_id(req: &Request) -> Result<Uuid, ApiError> {
    req.param("categoryId")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| ApiError::not_found("category"))
}

/// `POST /api/categories`
///
/// Names are unique, compared case-insensitively.
pub async fn create(store: CategoryStore, req: Request) -> Result<Created<Value>, ApiError> {
    let fields: CategoryInput = req.json()?;
    let taken = !store.filter(|c| c.fields.name.eq_ignore_ascii_case(&fields.name)).is_empty();
    if taken {
        return Err(ApiError::Domain {
            status: http::StatusCode::CONFLICT,
            message: format!("category `{}` already exists", fields.name),
        });
    }

    let category = Category { id: Uuid::new_v4(), fields, created_at: Utc::now() };
    store.insert(category.id, category.clone());
    Ok(Created(json!({ "msg": "Category is created", "category": category })))
}

/// `GET /api/categories`
pub async fn list(store: CategoryStore, _req: Request) -> Json<Vec<Category>> {
    let mut categories = store.all();
    categories.sort_by(|a, b| a.fields.name.cmp(&b.fields.name));
    Json(categories)
}

/// `GET /api/categories/:categoryId`
pub async fn get(store: CategoryStore, req: Request) -> Result<Json<Category>, ApiError> {
    let id = category_id(&req)?;
    store.get(&id).map(Json).ok_or_else(|| ApiError::not_found("category"))
}

/// `DELETE /api/categories/:categoryId`
pub async fn delete(store: CategoryStore, req: Request) -> Result<Json<Value>, ApiError> {
    let id = category_id(&req)?;
    let category = store.remove(&id).ok_or_else(|| ApiError::not_found("category"))?;
    Ok(Json(json!({ "msg": "Category is deleted", "category": category })))
}

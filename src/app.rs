//! The storefront route table.
//!
//! Every `/api` route is private. Routes that take a body run
//! `Validate → ValidationOutcome → Authenticate`, so a request that fails
//! both checks is reported as a validation failure; read and delete routes
//! only authenticate.

use std::sync::Arc;

use crate::catalog::{Catalog, category, product};
use crate::handler::with_state;
use crate::health;
use crate::method::Method;
use crate::middleware::Chain;
use crate::middleware::auth::{Authenticate, Verifier};
use crate::middleware::validate::{Rule, Validate, ValidationOutcome};
use crate::router::Router;

/// Gates for a body-carrying private route.
pub fn validated(rules: Vec<Rule>, auth: &Authenticate) -> Chain {
    Chain::new()
        .gate(Validate::new(rules))
        .gate(ValidationOutcome)
        .gate(auth.clone())
}

/// Gates for a body-less private route.
pub fn authenticated(auth: &Authenticate) -> Chain {
    Chain::new().gate(auth.clone())
}

pub fn router(catalog: Catalog, verifier: Arc<dyn Verifier>) -> Router {
    let auth = Authenticate::shared(verifier);
    let private = authenticated(&auth);
    let products = catalog.products;
    let categories = catalog.categories;

    Router::new()
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz",  health::readiness)
        // products
        .route(Method::Post,   "/api/products",                        validated(product::rules(), &auth), with_state(products.clone(), product::create))
        .route(Method::Put,    "/api/products/:productId",             validated(product::rules(), &auth), with_state(products.clone(), product::update))
        .route(Method::Get,    "/api/products",                        private.clone(), with_state(products.clone(), product::list))
        .route(Method::Get,    "/api/products/:productId",             private.clone(), with_state(products.clone(), product::get))
        .route(Method::Delete, "/api/products/:productId",             private.clone(), with_state(products.clone(), product::delete))
        .route(Method::Get,    "/api/products/categories/:categoryId", private.clone(), with_state(products, product::list_by_category))
        // categories
        .route(Method::Post,   "/api/categories",             validated(category::rules(), &auth), with_state(categories.clone(), category::create))
        .route(Method::Get,    "/api/categories",             private.clone(), with_state(categories.clone(), category::list))
        .route(Method::Get,    "/api/categories/:categoryId", private.clone(), with_state(categories.clone(), category::get))
        .route(Method::Delete, "/api/categories/:categoryId", private, with_state(categories, category::delete))
}

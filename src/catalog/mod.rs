//! Catalog resources and their in-memory stores.
//!
//! Controllers are plain `async fn(store, Request)` functions; the route
//! table in [`crate::app`] binds them to their store with
//! [`with_state`](crate::with_state).

pub mod category;
pub mod product;

use category::CategoryStore;
use product::ProductStore;

/// Every store the service owns. Cheap to clone.
#[derive(Clone, Default)]
pub struct Catalog {
    pub products: ProductStore,
    pub categories: CategoryStore,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }
}

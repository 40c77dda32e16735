//! # storefront
//!
//! REST backend for a small shop: products and categories over JSON, every
//! API route guarded by an explicit gate pipeline.
//!
//! ## The pipeline
//!
//! ```text
//! request → Router (method + pattern) → Validate → ValidationOutcome → Authenticate → handler
//!                 │ no match: 404              │ errors: 400       │ bad token: 401
//! ```
//!
//! Each gate returns [`middleware::Flow`]: `Continue`, or `Terminate(response)`.
//! The router stops at the first `Terminate`, so a handler only ever runs with
//! a clean validation result and a resolved [`middleware::auth::Identity`].
//!
//! What the reverse proxy in front already owns is left out: TLS, body-size
//! limits, rate limiting, slow-client timeouts.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use storefront::{Server, app, catalog::Catalog, jwt::JwtVerifier};
//!
//! #[tokio::main]
//! async fn main() {
//!     let verifier = JwtVerifier::new(b"0123456789abcdef0123456789abcdef", "storefront");
//!     let app = app::router(Catalog::new(), Arc::new(verifier));
//!
//!     Server::try_bind("0.0.0.0:9000").unwrap().serve(app).await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod catalog;
pub mod config;
pub mod health;
pub mod jwt;
pub mod middleware;
pub mod store;
pub mod telemetry;

pub use error::{ApiError, Error};
pub use handler::{BoxFuture, Handler, with_state};
pub use method::Method;
pub use request::Request;
pub use response::{Created, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

//! Route table and per-request dispatch.
//!
//! One radix tree per HTTP method, built once at startup. Each route is a
//! [`Chain`] of gates followed by a terminal handler; [`Router::call`] runs
//! the gates in registration order and reaches the handler only if none of
//! them terminated.

use std::collections::HashMap;

use bytes::Bytes;
use http::StatusCode;
use matchit::Router as MatchitRouter;
use serde_json::json;
use tracing::debug;

use crate::error::ApiError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Chain, Flow};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

struct Route {
    chain: Chain,
    handler: BoxedHandler,
}

/// The application router.
///
/// Each registration call returns `self` so they chain naturally:
///
/// ```rust,no_run
/// # use storefront::{Method, Request, Response, Router};
/// # use storefront::middleware::Chain;
/// # async fn list(_: Request) -> Response { Response::text("") }
/// # async fn get(_: Request) -> Response { Response::text("") }
/// # let guarded = Chain::new();
/// Router::new()
///     .route(Method::Get, "/api/products",            guarded.clone(), list)
///     .route(Method::Get, "/api/products/:productId", guarded,         get);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register an ungated handler.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.route(method, path, Chain::new(), handler)
    }

    /// Register a handler behind an ordered gate chain.
    ///
    /// Dynamic segments are written `:name` or `{name}` and match any
    /// non-empty path component; `req.param("name")` retrieves them
    /// percent-decoded.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting pattern. Routes are fixed at
    /// startup, so this is a programming error.
    pub fn route(mut self, method: Method, path: &str, chain: Chain, handler: impl Handler) -> Self {
        let pattern = normalise_pattern(path);
        let route = Route { chain, handler: handler.into_boxed_handler() };
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern.as_str(), route)
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(&Route, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| Some((k.to_owned(), decode_segment(v)?)))
            .collect::<Option<_>>()?;
        Some((matched.value, params))
    }

    /// Routes one request and produces exactly one response.
    ///
    /// Transport-free: the server collects the body first, tests call this
    /// directly.
    pub async fn call(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();

        let Ok(method) = Method::try_from(&parts.method) else {
            return Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .json(&json!({ "message": format!("method {} not allowed", parts.method) }));
        };
        let path = normalise_path(parts.uri.path());

        let Some((route, params)) = self.lookup(method, path) else {
            return ApiError::not_found(format!("route {method} {path}")).into_response();
        };

        let mut req = Request::new(method, path.to_owned(), parts.headers, body, params);
        match route.chain.run(&mut req).await {
            Flow::Terminate(res) => res,
            Flow::Continue => route.handler.call(req).await,
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// `/api/products/:productId/` → `/api/products/{productId}`
fn normalise_pattern(path: &str) -> String {
    normalise_path(path)
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `home%20decor` → `home decor`. A segment that does not decode to UTF-8
/// cannot name anything, so the route does not match.
fn decode_segment(raw: &str) -> Option<String> {
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(e) => {
            debug!(segment = raw, "path parameter is not UTF-8: {e}");
            None
        }
    }
}

/// A trailing slash is insignificant, except for the root itself.
fn normalise_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

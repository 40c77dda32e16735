//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve traffic? |
//!
//! Both are mounted ungated by [`crate::app::router`].

use serde_json::json;

use crate::{Request, Response};

/// Always `200 OK` with `{"status":"ok"}`.
pub async fn liveness(_req: Request) -> Response {
    Response::json(&json!({ "status": "ok" }))
}

/// `200 OK` with `{"status":"ready"}`. The catalog lives in memory, so
/// there is nothing to warm up.
pub async fn readiness(_req: Request) -> Response {
    Response::json(&json!({ "status": "ready" }))
}

//! Gates: the stages a request passes through before its handler runs.
//!
//! A [`Gate`] inspects (and may annotate) the [`Request`], then answers with
//! a [`Flow`]: keep going, or stop here with this response. A [`Chain`] is
//! an ordered list of gates attached to a route at registration time; the
//! router runs it strictly in order and stops at the first `Terminate`.
//!
//! Built-in gates:
//! - [`validate::Validate`]: applies field rules, records errors, always continues
//! - [`validate::ValidationOutcome`]: terminates with `400` if any error was recorded
//! - [`auth::Authenticate`]: resolves a bearer credential into an identity, or `401`

use std::sync::Arc;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub mod auth;
pub mod validate;

/// What a gate decided.
#[derive(Debug)]
pub enum Flow {
    Continue,
    Terminate(Response),
}

impl Flow {
    pub fn terminate(res: impl IntoResponse) -> Self {
        Self::Terminate(res.into_response())
    }
}

/// A pipeline stage.
///
/// Gates are shared across every request hitting their route, so they hold
/// only immutable configuration; all per-request state lives in the
/// [`Request`].
pub trait Gate: Send + Sync + 'static {
    fn check<'a>(&'a self, req: &'a mut Request) -> BoxFuture<'a, Flow>;
}

pub type BoxedGate = Arc<dyn Gate>;

/// An ordered, immutable list of gates.
///
/// Cloning is cheap: the gates themselves are behind `Arc`, so one
/// `Authenticate` can guard many routes.
#[derive(Clone, Default)]
pub struct Chain {
    gates: Vec<BoxedGate>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a gate. Gates run in the order they were added.
    pub fn gate(mut self, gate: impl Gate) -> Self {
        self.gates.push(Arc::new(gate));
        self
    }

    pub fn len(&self) -> usize { self.gates.len() }
    pub fn is_empty(&self) -> bool { self.gates.is_empty() }

    /// Runs each gate to completion before the next one starts.
    pub(crate) async fn run(&self, req: &mut Request) -> Flow {
        for gate in &self.gates {
            if let Flow::Terminate(res) = gate.check(req).await {
                return Flow::Terminate(res);
            }
        }
        Flow::Continue
    }
}

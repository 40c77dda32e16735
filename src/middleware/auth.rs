//! Bearer-credential authentication.
//!
//! [`Authenticate`] pulls the token out of `Authorization: Bearer <token>`,
//! hands it to an injected [`Verifier`], and stores the resulting
//! [`Identity`] on the request. Every failure reason is logged on its own
//! but answered with the same `401`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::handler::BoxFuture;
use crate::middleware::{Flow, Gate};
use crate::request::Request;

/// The caller a credential resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingHeader,

    #[error("authorization header is not a bearer credential")]
    MalformedHeader,

    #[error("credential expired")]
    Expired,

    #[error("credential signature mismatch")]
    BadSignature,

    #[error("invalid credential: {0}")]
    Invalid(String),
}

impl AuthError {
    /// Short, stable label for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingHeader   => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::Expired         => "expired",
            Self::BadSignature    => "bad_signature",
            Self::Invalid(_)      => "invalid",
        }
    }
}

/// Turns an opaque bearer token into an [`Identity`].
///
/// Async so that key lookups or remote introspection only suspend the
/// request being authenticated.
pub trait Verifier: Send + Sync + 'static {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, AuthError>>;
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; an empty token is malformed.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let (scheme, token) = header.trim().split_once(' ').ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Gate that requires a valid bearer credential.
#[derive(Clone)]
pub struct Authenticate {
    verifier: Arc<dyn Verifier>,
}

impl Authenticate {
    pub fn new(verifier: impl Verifier) -> Self {
        Self { verifier: Arc::new(verifier) }
    }

    pub fn shared(verifier: Arc<dyn Verifier>) -> Self {
        Self { verifier }
    }

    async fn resolve(&self, req: &Request) -> Result<Identity, AuthError> {
        let token = bearer_token(req.header("authorization"))?;
        self.verifier.verify(token).await
    }
}

impl Gate for Authenticate {
    fn check<'a>(&'a self, req: &'a mut Request) -> BoxFuture<'a, Flow> {
        Box::pin(async move {
            match self.resolve(req).await {
                Ok(identity) => {
                    debug!(user_id = %identity.id, "authenticated");
                    req.set_identity(identity);
                    Flow::Continue
                }
                Err(e) => {
                    warn!(reason = e.reason(), path = %req.path(), "authentication failed: {e}");
                    Flow::terminate(ApiError::Unauthenticated)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::method::Method;
    use crate::request::test_request;

    /// Accepts exactly one token.
    struct Fixed;

    impl Verifier for Fixed {
        fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, AuthError>> {
            let result = match token {
                "good" => Ok(Identity { id: "u1".into(), name: None }),
                "old" => Err(AuthError::Expired),
                _ => Err(AuthError::BadSignature),
            };
            Box::pin(std::future::ready(result))
        }
    }

    fn with_auth(value: &str) -> Request {
        let mut req = test_request(Method::Get, "");
        req.headers.insert("authorization", value.parse().unwrap());
        req
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("bearer  abc ")), Ok("abc"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingHeader));
        for bad in ["abc", "Basic abc", "Bearer ", "Bearer a b"] {
            assert_eq!(bearer_token(Some(bad)), Err(AuthError::MalformedHeader), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let mut req = with_auth("Bearer good");
        let flow = Authenticate::new(Fixed).check(&mut req).await;
        assert!(matches!(flow, Flow::Continue));
        assert_eq!(req.identity().map(|i| i.id.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn every_failure_is_a_plain_401() {
        let gate = Authenticate::new(Fixed);
        let mut requests = vec![test_request(Method::Get, "")];
        requests.extend(["Token good", "Bearer old", "Bearer forged"].map(with_auth));

        for mut req in requests {
            match gate.check(&mut req).await {
                Flow::Terminate(res) => {
                    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
                    assert!(req.identity().is_none());
                }
                Flow::Continue => panic!("request should be rejected"),
            }
        }
    }
}

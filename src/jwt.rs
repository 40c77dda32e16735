//! HS256 JSON Web Tokens.
//!
//! [`JwtVerifier`] is the production [`Verifier`]; [`TokenIssuer`] mints the
//! matching credentials (used by `storefront token`).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::middleware::auth::{AuthError, Identity, Verifier};

/// Claims carried in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub, name: claims.name }
    }
}

/// Verifies signature, expiry and issuer.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &[u8], issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);
        Self { key: DecodingKey::from_secret(secret), validation }
    }

    pub fn verify_sync(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            _ => AuthError::Invalid(e.to_string()),
        })?;
        Ok(data.claims.into())
    }
}

impl Verifier for JwtVerifier {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, AuthError>> {
        Box::pin(std::future::ready(self.verify_sync(token)))
    }
}

/// Mints HS256 tokens.
pub struct TokenIssuer {
    key: EncodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Self {
        Self { key: EncodingKey::from_secret(secret), issuer: issuer.into(), ttl }
    }

    pub fn issue(&self, user_id: &str, name: Option<&str>) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_owned(),
            name: name.map(str::to_owned),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.key)?)
    }
}

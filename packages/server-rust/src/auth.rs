//! HS256 bearer-token verification.
//!
//! Token semantics are delegated to `jsonwebtoken`; this module only binds
//! the configured secret, issuer and leeway, and maps claims onto a
//! [`Principal`].

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use routekit_core::{Principal, UserRole};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Errors from signing or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token rejected: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by a routekit bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier).
    pub sub: String,
    /// Expiration time (Unix timestamp, seconds).
    pub exp: u64,
    /// Issued-at time (Unix timestamp, seconds).
    pub iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Claims {
    /// Converts the verified claims into the request principal.
    #[must_use]
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.sub,
            roles: self.roles,
            tenant_id: self.tenant_id,
        }
    }
}

/// Verifies (and signs) HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl JwtVerifier {
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = config.secret_key.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            // `iss` is only checked when present unless it is required.
            validation.set_required_spec_claims(&["exp", "iss"]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            encoding_key: EncodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
        }
    }

    /// Verifies signature, expiry and (when configured) issuer.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Token`] for malformed, expired, or forged tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Signs arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Token`] if encoding fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }

    /// Issues a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Token`] if encoding fails.
    pub fn issue(
        &self,
        subject: &str,
        roles: Vec<UserRole>,
        tenant_id: Option<String>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = jsonwebtoken::get_current_timestamp();
        self.sign(&Claims {
            sub: subject.to_string(),
            exp: now + ttl.as_secs(),
            iat: now,
            iss: self.issuer.clone(),
            roles,
            tenant_id,
        })
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("issuer", &self.issuer)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
#[must_use]
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

//! Bearer-token authentication middleware.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use tracing::{debug, warn};

use super::guard::{context_mut, Guard, GuardLayer};
use crate::auth::{bearer_token, JwtVerifier};
use crate::config::AuthConfig;
use crate::error::ApiError;

/// Requires a valid `Authorization: Bearer <token>` header and stores the
/// token's principal in the request context.
pub type AuthLayer = GuardLayer<BearerAuth>;

impl AuthLayer {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_guard(BearerAuth {
            verifier: Arc::new(JwtVerifier::from_config(config)),
        })
    }
}

/// Guard verifying bearer tokens with a shared [`JwtVerifier`].
#[derive(Debug, Clone)]
pub struct BearerAuth {
    verifier: Arc<JwtVerifier>,
}

impl Guard for BearerAuth {
    fn admit(&self, req: &mut Request) -> Result<(), ApiError> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;
        let value = header
            .to_str()
            .map_err(|_| ApiError::unauthorized("invalid authorization header"))?;
        let token = bearer_token(value)
            .ok_or_else(|| ApiError::unauthorized("authorization header must use the Bearer scheme"))?;

        let claims = self.verifier.verify(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            ApiError::unauthorized("invalid or expired token")
        })?;

        debug!(subject = %claims.sub, roles = ?claims.roles, "authenticated request");
        context_mut(req).principal = Some(claims.into_principal());
        Ok(())
    }
}

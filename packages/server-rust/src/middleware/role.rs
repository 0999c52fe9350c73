//! Role-based authorization middleware.
//!
//! Runs after authentication; a request without a principal is treated as
//! unauthenticated rather than forbidden.

use std::sync::Arc;

use axum::extract::Request;
use routekit_core::{RequestContext, UserRole};
use tracing::debug;

use super::guard::{Guard, GuardLayer};
use crate::error::ApiError;

/// Admits principals holding at least one of the allowed roles.
pub type RoleLayer = GuardLayer<RoleCheck>;

impl RoleLayer {
    #[must_use]
    pub fn new(allowed: Vec<UserRole>) -> Self {
        Self::from_guard(RoleCheck {
            allowed: allowed.into(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RoleCheck {
    allowed: Arc<[UserRole]>,
}

impl RoleCheck {
    pub fn allowed(&self) -> &[UserRole] {
        &self.allowed
    }
}

impl Guard for RoleCheck {
    fn admit(&self, req: &mut Request) -> Result<(), ApiError> {
        let principal = req
            .extensions()
            .get::<RequestContext>()
            .and_then(|ctx| ctx.principal.as_ref())
            .ok_or_else(|| ApiError::unauthorized("no authenticated principal"))?;

        if principal.has_any_role(&self.allowed) {
            return Ok(());
        }

        debug!(
            subject = %principal.id,
            roles = ?principal.roles,
            allowed = ?self.allowed,
            "role check failed"
        );
        Err(ApiError::forbidden("insufficient role"))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use routekit_core::Principal;

    use super::*;

    fn request_as(roles: Option<Vec<UserRole>>) -> Request {
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        if let Some(roles) = roles {
            req.extensions_mut().insert(RequestContext {
                principal: Some(Principal {
                    id: "u-1".to_string(),
                    roles,
                    tenant_id: None,
                }),
                ..RequestContext::default()
            });
        }
        req
    }

    fn admins_only() -> RoleCheck {
        RoleLayer::new(vec![UserRole::SuperAdmin, UserRole::Admin])
            .guard()
            .clone()
    }

    #[test]
    fn allowed_role_is_admitted() {
        let mut req = request_as(Some(vec![UserRole::User, UserRole::Admin]));
        assert!(admins_only().admit(&mut req).is_ok());
    }

    #[test]
    fn other_role_is_forbidden() {
        let err = admins_only()
            .admit(&mut request_as(Some(vec![UserRole::User])))
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { .. }));
    }

    #[test]
    fn principal_without_roles_is_forbidden() {
        let err = admins_only()
            .admit(&mut request_as(Some(vec![])))
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { .. }));
    }

    #[test]
    fn missing_principal_is_unauthorized() {
        let err = admins_only().admit(&mut request_as(None)).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }

    #[test]
    fn layer_keeps_allowed_roles() {
        assert_eq!(
            admins_only().allowed(),
            &[UserRole::SuperAdmin, UserRole::Admin]
        );
    }
}

//! Tenant resolution middleware.
//!
//! The tenant comes from the `X-Tenant-ID` header. When an authenticated
//! principal is bound to a tenant, the header must name that tenant unless
//! the principal is a super admin.

use axum::extract::Request;
use routekit_core::{RequestContext, UserRole};
use tracing::debug;

use super::guard::{context_mut, Guard, GuardLayer};
use crate::error::ApiError;

/// Header carrying the tenant identifier.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Resolves the request tenant into the request context.
pub type TenantLayer = GuardLayer<TenantResolver>;

impl TenantLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::from_guard(TenantResolver)
    }
}

impl Default for TenantLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TenantResolver;

impl Guard for TenantResolver {
    fn admit(&self, req: &mut Request) -> Result<(), ApiError> {
        let tenant = req
            .headers()
            .get(TENANT_HEADER)
            .map(|value| value.to_str().map(str::trim))
            .transpose()
            .map_err(|_| ApiError::bad_request("X-Tenant-ID must be visible ASCII"))?
            .filter(|tenant| !tenant.is_empty())
            .ok_or_else(|| ApiError::bad_request("missing X-Tenant-ID header"))?
            .to_string();

        let ctx = context_mut(req);
        check_principal_tenant(ctx, &tenant)?;
        ctx.tenant_id = Some(tenant);
        Ok(())
    }
}

fn check_principal_tenant(ctx: &RequestContext, tenant: &str) -> Result<(), ApiError> {
    let Some(principal) = &ctx.principal else {
        return Ok(());
    };
    match principal.tenant_id.as_deref() {
        Some(bound) if bound != tenant && !principal.roles.contains(&UserRole::SuperAdmin) => {
            debug!(subject = %principal.id, bound, requested = tenant, "tenant mismatch");
            Err(ApiError::forbidden(format!("not a member of tenant {tenant}")))
        }
        _ => Ok(()),
    }
}

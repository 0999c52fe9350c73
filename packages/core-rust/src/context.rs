use crate::types::Principal;

/// Per-request context carrying identity, tenancy, and job correlation.
///
/// Middleware layers fill in the fields they own; handlers read them.
/// A request that passed through no middleware carries the default (all `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated principal, set by the authentication layer.
    pub principal: Option<Principal>,
    /// Tenant scope, set by the tenant layer.
    pub tenant_id: Option<String>,
    /// Job correlation identifier, set by the job layer.
    pub job_id: Option<String>,
}

impl RequestContext {
    /// Returns the authenticated principal's id, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserRole;

    #[test]
    fn default_context_is_empty() {
        let ctx = RequestContext::default();
        assert!(ctx.principal.is_none());
        assert!(ctx.tenant_id.is_none());
        assert!(ctx.job_id.is_none());
        assert_eq!(ctx.subject(), None);
    }

    #[test]
    fn subject_reads_principal_id() {
        let ctx = RequestContext {
            principal: Some(Principal {
                id: "alice".to_string(),
                roles: vec![UserRole::Admin],
                tenant_id: None,
            }),
            ..RequestContext::default()
        };
        assert_eq!(ctx.subject(), Some("alice"));
    }
}

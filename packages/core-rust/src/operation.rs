//! Declarative operation descriptors and the records derived from them.
//!
//! An [`Operation`] says what a route needs (authentication, tenancy, a job
//! context, roles) and how it is documented. Registration turns it into an
//! [`OperationRecord`] for a concrete method and path, together with the
//! ordered middleware plan the router must apply.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::method::HttpMethod;
use crate::security::{self, SecurityRequirement};
use crate::types::UserRole;

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Declarative description of one route, supplied at registration time.
///
/// All flags default to off, so callers spell out only what they need:
///
/// ```
/// use routekit_core::{Operation, UserRole};
///
/// let op = Operation {
///     summary: "Create job".to_string(),
///     requires_auth: true,
///     requires_job: true,
///     allowed_roles: vec![UserRole::Admin],
///     ..Operation::default()
/// };
/// assert_eq!(op.middleware_plan().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// Short summary shown in the API documentation.
    pub summary: String,
    /// Longer free-text description.
    pub description: String,
    /// Documentation grouping labels, in display order.
    pub tags: Vec<String>,
    /// Attach bearer-token authentication.
    pub requires_auth: bool,
    /// Attach tenant resolution.
    pub requires_tenant: bool,
    /// Attach job-context injection.
    pub requires_job: bool,
    /// Roles allowed to call the operation. Empty means no role check.
    pub allowed_roles: Vec<UserRole>,
    /// Vendor extensions for the API document. Keys without the `x-`
    /// prefix get it added when the record is built.
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl Operation {
    /// Security requirements advertised for this operation.
    ///
    /// Always exactly one alternative: `{"bearerAuth": []}` when
    /// authentication is required, the empty alternative `{}` otherwise.
    #[must_use]
    pub fn security(&self) -> Vec<SecurityRequirement> {
        if self.requires_auth {
            security::bearer_only()
        } else {
            security::anonymous()
        }
    }

    /// Middleware to attach, outermost first.
    ///
    /// The order is fixed at auth, tenant, job, role regardless of how the
    /// descriptor was built, so role checks always see an authenticated
    /// principal.
    #[must_use]
    pub fn middleware_plan(&self) -> Vec<MiddlewareKind> {
        let mut plan = Vec::with_capacity(4);
        if self.requires_auth {
            plan.push(MiddlewareKind::Auth);
        }
        if self.requires_tenant {
            plan.push(MiddlewareKind::Tenant);
        }
        if self.requires_job {
            plan.push(MiddlewareKind::Job);
        }
        if !self.allowed_roles.is_empty() {
            plan.push(MiddlewareKind::Role);
        }
        plan
    }

    /// Consumes the descriptor and produces the record registered for
    /// `method` and `path`.
    #[must_use]
    pub fn into_record(self, method: HttpMethod, path: &str) -> OperationRecord {
        let security = self.security();
        let middleware = self.middleware_plan();
        OperationRecord {
            operation_id: operation_id(method, path),
            method,
            path: path.to_string(),
            summary: self.summary,
            description: self.description,
            tags: self.tags,
            security,
            extensions: self
                .extensions
                .into_iter()
                .map(|(key, value)| (extension_key(key), value))
                .collect(),
            middleware,
        }
    }
}

fn extension_key(key: String) -> String {
    if key.starts_with("x-") {
        key
    } else {
        format!("x-{key}")
    }
}

/// Derives the operation identifier: lower-case method, `-`, literal path.
///
/// ```
/// use routekit_core::{operation_id, HttpMethod};
///
/// assert_eq!(operation_id(HttpMethod::Get, "/users/{id}"), "get-/users/{id}");
/// ```
#[must_use]
pub fn operation_id(method: HttpMethod, path: &str) -> String {
    format!("{}-{}", method.as_str().to_ascii_lowercase(), path)
}

// ---------------------------------------------------------------------------
// MiddlewareKind
// ---------------------------------------------------------------------------

/// Cross-cutting middleware an operation may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiddlewareKind {
    /// Bearer-token authentication.
    Auth,
    /// Tenant resolution.
    Tenant,
    /// Job-context injection.
    Job,
    /// Role-based authorization.
    Role,
}

impl MiddlewareKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MiddlewareKind::Auth => "auth",
            MiddlewareKind::Tenant => "tenant",
            MiddlewareKind::Job => "job",
            MiddlewareKind::Role => "role",
        }
    }
}

impl fmt::Display for MiddlewareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OperationRecord
// ---------------------------------------------------------------------------

/// A registered operation, as handed to the router and the API document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    pub operation_id: String,
    pub method: HttpMethod,
    pub path: String,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub security: Vec<SecurityRequirement>,
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// Middleware chain attached to the route, outermost first.
    pub middleware: Vec<MiddlewareKind>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

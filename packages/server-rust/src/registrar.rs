//! Route registration with declarative per-operation middleware.
//!
//! [`ApiRouter`] is the API surface handlers are registered on. Each
//! registration derives an isolated scope, attaches the middleware the
//! [`Operation`] asks for (auth, tenant, job, role, in that order), registers
//! the route on the scope, merges the scope into the surface router and adds
//! the operation to the OpenAPI document.

use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;
use routekit_core::{HttpMethod, MiddlewareKind, Operation, OperationRecord, UserRole};
use tracing::debug;
use utoipa::openapi::OpenApi;

use crate::config::AuthConfig;
use crate::middleware::{AuthLayer, JobLayer, RoleLayer, TenantLayer};
use crate::openapi::{self, ApiInfo};

// ---------------------------------------------------------------------------
// ApiRouter
// ---------------------------------------------------------------------------

/// Collects routes, their middleware and their API documentation.
///
/// `S` is the axum state type the handlers extract; call
/// [`Router::with_state`] on the result of [`ApiRouter::into_router`].
pub struct ApiRouter<S = ()> {
    router: Router<S>,
    openapi: OpenApi,
    operations: Vec<OperationRecord>,
    auth: Arc<AuthConfig>,
}

impl<S> ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty surface. `auth` supplies the secret for every
    /// bearer-authenticated route registered later.
    #[must_use]
    pub fn new(info: ApiInfo, auth: Arc<AuthConfig>) -> Self {
        Self {
            router: Router::new(),
            openapi: openapi::empty_document(info),
            operations: Vec::new(),
            auth,
        }
    }

    /// Registers `handler` for `method` and `path` with the middleware and
    /// documentation described by `operation`.
    ///
    /// # Panics
    ///
    /// Panics (inside axum) if `path` is not a valid route path or if the
    /// same method is registered twice for one path.
    pub fn register<H, T>(
        &mut self,
        path: &str,
        method: HttpMethod,
        operation: Operation,
        handler: H,
    ) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let allowed_roles = operation.allowed_roles.clone();
        let record = operation.into_record(method, path);

        let mut scope = Scope::new();
        for kind in &record.middleware {
            scope.use_middleware(self.build_middleware(*kind, &allowed_roles));
        }

        let routed = scope.route(path, method, handler);
        self.router = std::mem::take(&mut self.router).merge(routed);

        let documented = openapi::add_operation(&mut self.openapi, &record);
        debug!(
            operation_id = %record.operation_id,
            method = %record.method,
            path = %record.path,
            middleware = ?record.middleware,
            documented,
            "registered operation"
        );
        self.operations.push(record);
        self
    }

    fn build_middleware(&self, kind: MiddlewareKind, allowed_roles: &[UserRole]) -> RouteMiddleware {
        match kind {
            MiddlewareKind::Auth => RouteMiddleware::Auth(AuthLayer::new(&self.auth)),
            MiddlewareKind::Tenant => RouteMiddleware::Tenant(TenantLayer::new()),
            MiddlewareKind::Job => RouteMiddleware::Job(JobLayer::new()),
            MiddlewareKind::Role => RouteMiddleware::Role(RoleLayer::new(allowed_roles.to_vec())),
        }
    }

    /// Operations registered so far, in registration order.
    #[must_use]
    pub fn operations(&self) -> &[OperationRecord] {
        &self.operations
    }

    /// Looks up a registered operation by its identifier.
    #[must_use]
    pub fn operation(&self, operation_id: &str) -> Option<&OperationRecord> {
        self.operations
            .iter()
            .find(|record| record.operation_id == operation_id)
    }

    /// The OpenAPI document for every documented operation.
    #[must_use]
    pub fn openapi(&self) -> &OpenApi {
        &self.openapi
    }

    /// The OpenAPI document rendered as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn openapi_json(&self) -> Result<String, serde_json::Error> {
        self.openapi.to_pretty_json()
    }

    /// Consumes the surface and returns the assembled router.
    #[must_use]
    pub fn into_router(self) -> Router<S> {
        self.router
    }

    /// Consumes the surface and returns the router and the document.
    #[must_use]
    pub fn into_parts(self) -> (Router<S>, OpenApi) {
        (self.router, self.openapi)
    }
}

macro_rules! verb_methods {
    ($($name:ident => $method:ident),* $(,)?) => {
        impl<S> ApiRouter<S>
        where
            S: Clone + Send + Sync + 'static,
        {
            $(
                #[doc = concat!("Registers a `", stringify!($method), "` operation. See [`ApiRouter::register`].")]
                pub fn $name<H, T>(&mut self, path: &str, operation: Operation, handler: H) -> &mut Self
                where
                    H: Handler<T, S>,
                    T: 'static,
                {
                    self.register(path, HttpMethod::$method, operation, handler)
                }
            )*
        }
    };
}

verb_methods! {
    get => Get,
    post => Post,
    put => Put,
    patch => Patch,
    delete => Delete,
    head => Head,
    options => Options,
    trace => Trace,
    connect => Connect,
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// One middleware layer selected for a route.
#[derive(Debug, Clone)]
enum RouteMiddleware {
    Auth(AuthLayer),
    Tenant(TenantLayer),
    Job(JobLayer),
    Role(RoleLayer),
}

/// Isolated registration scope: the middleware attached so far, outermost
/// first. Nothing attached here reaches sibling routes.
#[derive(Debug, Default)]
struct Scope {
    middleware: Vec<RouteMiddleware>,
}

impl Scope {
    fn new() -> Self {
        Self::default()
    }

    fn use_middleware(&mut self, middleware: RouteMiddleware) {
        self.middleware.push(middleware);
    }

    /// Builds a router holding only this route, wrapped in the scope's
    /// middleware.
    fn route<S, H, T>(self, path: &str, method: HttpMethod, handler: H) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
        H: Handler<T, S>,
        T: 'static,
    {
        let mut method_router: MethodRouter<S> = on(method_filter(method), handler);
        // Each layer wraps everything applied before it, so apply innermost
        // first to leave the first attached middleware outermost.
        for middleware in self.middleware.into_iter().rev() {
            method_router = match middleware {
                RouteMiddleware::Auth(layer) => method_router.route_layer(layer),
                RouteMiddleware::Tenant(layer) => method_router.route_layer(layer),
                RouteMiddleware::Job(layer) => method_router.route_layer(layer),
                RouteMiddleware::Role(layer) => method_router.route_layer(layer),
            };
        }
        Router::new().route(path, method_router)
    }
}

/// Maps a method onto axum's method filter.
#[must_use]
pub fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Head => MethodFilter::HEAD,
        HttpMethod::Options => MethodFilter::OPTIONS,
        HttpMethod::Trace => MethodFilter::TRACE,
        HttpMethod::Connect => MethodFilter::CONNECT,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use routekit_core::SecurityRequirement;
    use serde_json::json;

    use super::*;

    async fn ok() -> &'static str {
        "ok"
    }

    fn api() -> ApiRouter {
        ApiRouter::new(
            ApiInfo::new("registrar-test", "0.1.0"),
            Arc::new(AuthConfig::new("registrar-secret")),
        )
    }

    #[test]
    fn get_user_scenario() {
        let mut api = api();
        api.get(
            "/users/{id}",
            Operation {
                requires_auth: true,
                ..Operation::default()
            },
            ok,
        );

        let record = api.operation("get-/users/{id}").unwrap();
        assert_eq!(record.method, HttpMethod::Get);
        assert_eq!(
            record.security,
            vec![SecurityRequirement::from([("bearerAuth".to_string(), vec![])])]
        );
        assert_eq!(record.middleware, vec![MiddlewareKind::Auth]);
    }

    #[test]
    fn post_jobs_scenario() {
        let mut api = api();
        api.post(
            "/jobs",
            Operation {
                requires_auth: true,
                requires_job: true,
                allowed_roles: vec![UserRole::Admin],
                ..Operation::default()
            },
            ok,
        );

        let record = api.operation("post-/jobs").unwrap();
        assert_eq!(
            record.middleware,
            vec![MiddlewareKind::Auth, MiddlewareKind::Job, MiddlewareKind::Role]
        );
    }

    #[test]
    fn put_tenant_scenario() {
        let mut api = api();
        api.put(
            "/tenants/{id}",
            Operation {
                requires_tenant: true,
                ..Operation::default()
            },
            ok,
        );

        let record = api.operation("put-/tenants/{id}").unwrap();
        assert_eq!(record.security, vec![SecurityRequirement::new()]);
        assert_eq!(record.middleware, vec![MiddlewareKind::Tenant]);
    }

    #[test]
    fn every_verb_registers_its_method() {
        let mut api = api();
        api.get("/v", Operation::default(), ok)
            .post("/v", Operation::default(), ok)
            .put("/v", Operation::default(), ok)
            .patch("/v", Operation::default(), ok)
            .delete("/v", Operation::default(), ok)
            .head("/v", Operation::default(), ok)
            .options("/v", Operation::default(), ok)
            .trace("/v", Operation::default(), ok)
            .connect("/v", Operation::default(), ok);

        let methods: Vec<HttpMethod> = api.operations().iter().map(|r| r.method).collect();
        assert_eq!(methods, HttpMethod::ALL.to_vec());

        let ids: Vec<&str> = api
            .operations()
            .iter()
            .map(|r| r.operation_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "get-/v", "post-/v", "put-/v", "patch-/v", "delete-/v", "head-/v", "options-/v",
                "trace-/v", "connect-/v",
            ]
        );
    }

    #[test]
    fn openapi_document_tracks_registrations() {
        let mut api = api();
        api.get(
            "/users",
            Operation {
                summary: "List users".to_string(),
                requires_auth: true,
                ..Operation::default()
            },
            ok,
        )
        .connect("/tunnel", Operation::default(), ok);

        let doc = serde_json::to_value(api.openapi()).unwrap();
        assert_eq!(doc["info"]["title"], "registrar-test");
        assert_eq!(doc["paths"]["/users"]["get"]["summary"], "List users");
        assert_eq!(
            doc["paths"]["/users"]["get"]["security"],
            json!([{ "bearerAuth": [] }])
        );
        assert!(doc["paths"].get("/tunnel").is_none());
        assert!(api.operation("connect-/tunnel").is_some());

        let rendered = api.openapi_json().unwrap();
        assert!(rendered.contains("\"get-/users\""));
    }

    #[test]
    fn method_filter_covers_every_method() {
        for method in HttpMethod::ALL {
            let _filter = method_filter(method);
        }
        assert_eq!(method_filter(HttpMethod::Connect), MethodFilter::CONNECT);
    }
}

//! Axum extractor for the request context filled in by route middleware.

use std::convert::Infallible;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use routekit_core::RequestContext;

/// The [`RequestContext`] of the current request.
///
/// Never rejects: routes registered without middleware see an empty context.
#[derive(Debug, Clone, Default)]
pub struct Context(pub RequestContext);

impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Context(
            parts
                .extensions
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

impl Deref for Context {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[tokio::test]
    async fn missing_context_extracts_default() {
        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();
        let Context(ctx) = Context::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx, RequestContext::default());
    }

    #[tokio::test]
    async fn stored_context_is_extracted() {
        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(RequestContext {
            tenant_id: Some("acme".to_string()),
            ..RequestContext::default()
        });
        let ctx = Context::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.tenant_id.as_deref(), Some("acme"));
    }
}

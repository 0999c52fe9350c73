//! Shared layer/service pair for middleware that admits or rejects a request
//! before it reaches the handler.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use routekit_core::RequestContext;
use tower::{Layer, Service};

use crate::error::ApiError;

/// A request check run by [`GuardService`].
///
/// `admit` may enrich the request (usually its [`RequestContext`]) and
/// returns an [`ApiError`] to short-circuit with an error response.
pub trait Guard: Clone + Send + Sync + 'static {
    fn admit(&self, req: &mut Request) -> Result<(), ApiError>;
}

/// Returns the request's context, inserting an empty one if absent.
pub(crate) fn context_mut(req: &mut Request) -> &mut RequestContext {
    req.extensions_mut().get_or_insert_default::<RequestContext>()
}

// ---------------------------------------------------------------------------
// GuardLayer
// ---------------------------------------------------------------------------

/// Tower layer wrapping services with a [`Guard`].
#[derive(Debug, Clone)]
pub struct GuardLayer<G> {
    guard: G,
}

impl<G: Guard> GuardLayer<G> {
    #[must_use]
    pub fn from_guard(guard: G) -> Self {
        Self { guard }
    }

    /// The guard this layer applies.
    pub fn guard(&self) -> &G {
        &self.guard
    }
}

impl<S, G: Clone> Layer<S> for GuardLayer<G> {
    type Service = GuardService<S, G>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardService {
            inner,
            guard: self.guard.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// GuardService
// ---------------------------------------------------------------------------

/// Service wrapper that runs the guard and either forwards or rejects.
#[derive(Debug, Clone)]
pub struct GuardService<S, G> {
    inner: S,
    guard: G,
}

impl<S, G> Service<Request> for GuardService<S, G>
where
    S: Service<Request, Response = Response, Error = Infallible> + Send,
    S::Future: Send + 'static,
    G: Guard,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        match self.guard.admit(&mut req) {
            Ok(()) => Box::pin(self.inner.call(req)),
            Err(err) => Box::pin(async move { Ok(err.into_response()) }),
        }
    }
}

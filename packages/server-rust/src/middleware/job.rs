//! Job-context middleware.
//!
//! Binds every request to a job identifier: the caller's `X-Job-ID` when
//! present, a fresh UUID v4 otherwise. The identifier is stored in the
//! request context and echoed on the response.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use uuid::Uuid;

use super::guard::context_mut;
use crate::error::ApiError;

/// Header carrying the job identifier.
pub const JOB_HEADER: &str = "x-job-id";

// ---------------------------------------------------------------------------
// JobLayer
// ---------------------------------------------------------------------------

/// Tower layer injecting a job context into each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobLayer;

impl JobLayer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for JobLayer {
    type Service = JobService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JobService { inner }
    }
}

// ---------------------------------------------------------------------------
// JobService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct JobService<S> {
    inner: S,
}

impl<S> Service<Request> for JobService<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Send,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let job_id = match resolve_job_id(&req) {
            Ok(id) => id,
            Err(err) => return Box::pin(async move { Ok(err.into_response()) }),
        };
        let echoed = HeaderValue::from_str(&job_id).ok();
        context_mut(&mut req).job_id = Some(job_id);

        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut response = fut.await?;
            if let Some(value) = echoed {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(JOB_HEADER), value);
            }
            Ok(response)
        })
    }
}

fn resolve_job_id(req: &Request) -> Result<String, ApiError> {
    let supplied = req
        .headers()
        .get(JOB_HEADER)
        .map(|value| value.to_str().map(str::trim))
        .transpose()
        .map_err(|_| ApiError::bad_request("X-Job-ID must be visible ASCII"))?;

    Ok(match supplied {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

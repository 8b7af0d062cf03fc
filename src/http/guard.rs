use super::NOT_READY_MESSAGE;
use crate::bootstrap::ReadinessGate;
use crate::common::ApiResponse;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that answers 503 until the readiness gate opens.
#[derive(Clone)]
pub struct RequireReadyLayer {
    readiness: ReadinessGate,
}

impl RequireReadyLayer {
    pub fn new(readiness: ReadinessGate) -> Self {
        Self { readiness }
    }
}

impl<S> Layer<S> for RequireReadyLayer {
    type Service = RequireReady<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireReady {
            inner,
            readiness: self.readiness.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequireReady<S> {
    inner: S,
    readiness: ReadinessGate,
}

impl<S> Service<Request<Body>> for RequireReady<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if !self.readiness.is_ready() {
            tracing::debug!(path = %req.uri().path(), "Rejecting request, bootstrap still running");
            return Box::pin(async {
                Ok(ApiResponse::<()>::error(StatusCode::SERVICE_UNAVAILABLE, NOT_READY_MESSAGE)
                    .into_response())
            });
        }

        // The clone is not necessarily ready; keep the one `poll_ready` was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

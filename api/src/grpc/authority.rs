//! Captures the call authority for tenant resolution.
//!
//! tonic hands services the request headers as metadata but drops the HTTP/2
//! `:authority` pseudo-header. This layer copies it (or the `host` header) into a
//! [`CallAuthority`] request extension before the call is routed.

use axum::http::{header, Request};
use shared::tenancy::CallAuthority;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer installing [`AuthorityService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityLayer;

impl<S> Layer<S> for AuthorityLayer {
    type Service = AuthorityService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorityService { inner }
    }
}

/// Service inserting the request authority as a [`CallAuthority`] extension.
#[derive(Debug, Clone)]
pub struct AuthorityService<S> {
    inner: S,
}

/// Returns the authority a request was addressed to.
pub fn request_authority<B>(request: &Request<B>) -> Option<String> {
    request
        .uri()
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            request
                .headers()
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

impl<S, B> Service<Request<B>> for AuthorityService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if let Some(authority) = request_authority(&request) {
            request.extensions_mut().insert(CallAuthority(authority));
        }
        self.inner.call(request)
    }
}

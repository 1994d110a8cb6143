use super::client::HttpClient;
use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::Arc;
use tracing::{debug, warn};

/// Hooks run on every outgoing request and every incoming response or error.
///
/// Both hooks default to passing their input through untouched.
pub trait Interceptor: Send + Sync {
    fn on_request(&self, req: Request) -> Request {
        req
    }

    fn on_response(&self, result: reqwest::Result<Response>) -> reqwest::Result<Response> {
        result
    }
}

/// Pass-through interceptor that only traces what goes by.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn on_request(&self, req: Request) -> Request {
        debug!(method = %req.method(), url = %req.url(), "Sending request");
        req
    }

    fn on_response(&self, result: reqwest::Result<Response>) -> reqwest::Result<Response> {
        match &result {
            Ok(resp) => debug!(status = %resp.status(), "Response received"),
            Err(e) => warn!(error = %e, status = ?e.status(), "Request failed"),
        }
        result
    }
}

/// An [`HttpClient`] wrapper that runs one [`Interceptor`] around `inner`.
///
/// Non-2xx responses are turned into the transport's status error before the
/// response hook sees them, so the hook gets every failure on one channel.
pub struct Intercepted<C> {
    inner: C,
    interceptor: Arc<dyn Interceptor>,
}

impl<C> Intercepted<C> {
    pub fn new(inner: C, interceptor: impl Interceptor + 'static) -> Self {
        Self {
            inner,
            interceptor: Arc::new(interceptor),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for Intercepted<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        let req = self.interceptor.on_request(req);
        let result = self
            .inner
            .execute(req)
            .await
            .and_then(Response::error_for_status);
        self.interceptor.on_response(result)
    }
}

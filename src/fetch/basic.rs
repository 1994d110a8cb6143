use super::client::HttpClient;
use async_trait::async_trait;

/// [`HttpClient`] backed by a single shared `reqwest::Client`.
///
/// No cookie store is enabled, so credentials are never attached implicitly.
#[derive(Clone, Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }

    /// Wraps an already configured client (proxies, TLS roots, ...).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self(client)
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

//! Generic client for the storefront REST API.
//!
//! Every call goes through [`BaseService::request`], which builds one
//! `reqwest::Request`, sends it through the intercepted transport and returns
//! only the decoded body. Failures come back unchanged: callers can downcast
//! the `anyhow::Error` to the original `reqwest::Error` or `serde_json::Error`.

use anyhow::Result;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::fetch::{BasicClient, HttpClient, Intercepted, Interceptor, LoggingInterceptor};
use crate::infra::storage::{FileTokenStore, TokenProvider};
use crate::services::form::FormData;
use crate::services::params::Params;

pub const APPLICATION_JSON: &str = "application/json";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Body of an outgoing request, already encoded for the wire.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Vec<u8>),
    Form(FormData),
}

impl RequestBody {
    /// JSON unless `has_attachment`, in which case the payload is flattened
    /// into multipart fields.
    pub fn encode<P: Serialize + ?Sized>(payload: &P, has_attachment: bool) -> Result<Self> {
        if has_attachment {
            Ok(RequestBody::Form(FormData::from_serialize(payload)?))
        } else {
            Ok(RequestBody::Json(serde_json::to_vec(payload)?))
        }
    }
}

/// Call-specific parts of a request, merged with method and path on dispatch.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Option<Params>,
    pub body: Option<RequestBody>,
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

pub struct BaseService<C = BasicClient> {
    base_url: String,
    builder: reqwest::Client,
    http: Intercepted<C>,
    tokens: Arc<dyn TokenProvider>,
}

impl BaseService<BasicClient> {
    /// Client over a fresh `reqwest` transport, reading the token from the
    /// configured storage file. A configured timeout applies to every request
    /// the transport sends.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let mut client = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            client = client.timeout(timeout);
        }
        Ok(Self::new(
            config.base_url.as_str(),
            BasicClient::from_client(client.build()?),
            FileTokenStore::new(&config.storage_path),
        ))
    }
}

impl<C: HttpClient> BaseService<C> {
    /// Creates the client and registers the default [`LoggingInterceptor`].
    pub fn new(
        base_url: impl Into<String>,
        transport: C,
        tokens: impl TokenProvider + 'static,
    ) -> Self {
        Self::with_interceptor(base_url, transport, tokens, LoggingInterceptor)
    }

    /// Creates the client with a custom interceptor.
    ///
    /// The interceptor is installed here and only here; a client never runs
    /// more than one interceptor pair.
    pub fn with_interceptor(
        base_url: impl Into<String>,
        transport: C,
        tokens: impl TokenProvider + 'static,
        interceptor: impl Interceptor + 'static,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            builder: reqwest::Client::new(),
            http: Intercepted::new(transport, interceptor),
            tokens: Arc::new(tokens),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &C {
        self.http.inner()
    }

    /// Issues a GET.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&Params>,
        has_attachment: bool,
    ) -> Result<T> {
        let options = RequestOptions {
            params: params.cloned(),
            headers: self.setup_headers(has_attachment)?,
            ..Default::default()
        };
        self.request(Method::GET, path, options).await
    }

    /// Issues a POST with `payload` as the body.
    pub async fn post<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
        params: Option<&Params>,
        has_attachment: bool,
    ) -> Result<T> {
        let options = RequestOptions {
            params: params.cloned(),
            body: Some(RequestBody::encode(payload, has_attachment)?),
            headers: self.setup_headers(has_attachment)?,
            timeout: None,
        };
        self.request(Method::POST, path, options).await
    }

    /// Issues a PUT with `payload` as the body.
    pub async fn update<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
        params: Option<&Params>,
        has_attachment: bool,
    ) -> Result<T> {
        let options = RequestOptions {
            params: params.cloned(),
            body: Some(RequestBody::encode(payload, has_attachment)?),
            headers: self.setup_headers(has_attachment)?,
            timeout: None,
        };
        self.request(Method::PUT, path, options).await
    }

    /// Issues a DELETE.
    pub async fn remove<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&Params>,
        has_attachment: bool,
    ) -> Result<T> {
        let options = RequestOptions {
            params: params.cloned(),
            headers: self.setup_headers(has_attachment)?,
            ..Default::default()
        };
        self.request(Method::DELETE, path, options).await
    }

    /// POSTs a multipart form carrying files.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: FormData,
        params: Option<&Params>,
    ) -> Result<T> {
        let options = RequestOptions {
            params: params.cloned(),
            body: Some(RequestBody::Form(form)),
            headers: self.setup_headers(true)?,
            timeout: None,
        };
        self.request(Method::POST, path, options).await
    }

    /// PUTs a multipart form carrying files.
    pub async fn update_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: FormData,
        params: Option<&Params>,
    ) -> Result<T> {
        let options = RequestOptions {
            params: params.cloned(),
            body: Some(RequestBody::Form(form)),
            headers: self.setup_headers(true)?,
            timeout: None,
        };
        self.request(Method::PUT, path, options).await
    }

    /// Content-Type plus, when a token is stored, `Authorization: Bearer <token>`.
    ///
    /// The token is read from the provider on every call.
    pub fn setup_headers(&self, has_attachment: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let content_type = if has_attachment {
            MULTIPART_FORM_DATA
        } else {
            APPLICATION_JSON
        };
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));

        if let Some(token) = self.tokens.current_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Sends one request and decodes the response body into `T`.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<_>` accept
    /// `204 No Content`.
    #[tracing::instrument(skip(self, options))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let mut url = Url::parse(&self.resolve(path))?;
        if let Some(params) = &options.params {
            params.append_to(&mut url);
        }

        let mut builder = self.builder.request(method, url);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match options.body {
            Some(RequestBody::Json(bytes)) => builder.body(bytes),
            Some(RequestBody::Form(form)) => builder.multipart(form.into_multipart()?),
            None => builder,
        };
        let mut req = builder.build()?;

        // A multipart body already carries its boundary-qualified content type.
        for (name, value) in &options.headers {
            if name == CONTENT_TYPE && req.headers().contains_key(CONTENT_TYPE) {
                continue;
            }
            req.headers_mut().insert(name.clone(), value.clone());
        }

        let resp = self.http.execute(req).await?;
        let body = resp.bytes().await?;
        debug!(bytes = body.len(), "Response body received");

        if body.is_empty() {
            Ok(serde_json::from_value(serde_json::Value::Null)?)
        } else {
            Ok(serde_json::from_slice(&body)?)
        }
    }

    fn resolve(&self, path: &str) -> String {
        if is_absolute_url(path) {
            return path.to_string();
        }
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// `scheme://...` with an RFC 3986 scheme.
fn is_absolute_url(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

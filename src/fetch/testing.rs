//! Recording transport used by unit tests.

use super::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response, Url};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

/// Records every request it is handed and answers with a canned response.
#[derive(Clone)]
pub(crate) struct RecordingClient {
    requests: Arc<Mutex<Vec<Recorded>>>,
    status: u16,
    body: String,
}

impl RecordingClient {
    pub fn ok(body: &str) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            status,
            body: body.to_string(),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests()
            .pop()
            .expect("no request reached the transport")
    }
}

#[async_trait]
impl HttpClient for RecordingClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.requests.lock().unwrap().push(Recorded {
            method: req.method().clone(),
            url: req.url().clone(),
            headers: req.headers().clone(),
            body: req.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec),
            timeout: req.timeout().copied(),
        });

        let resp = http::Response::builder()
            .status(self.status)
            .header("content-type", "application/json")
            .body(self.body.clone())
            .unwrap();
        Ok(Response::from(resp))
    }
}

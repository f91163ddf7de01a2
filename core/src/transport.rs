//! The seam between `Client` and the network.
//!
//! `Client` never talks to an HTTP library directly; it hands an
//! `HttpRequest` to a `Transport` and gets an `HttpResponse` back. Any
//! status code, including errors, is a successful round-trip at this level.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, X_ERROR_HEADER};

/// Performs one POST round-trip.
///
/// Implementations must be cancel-safe: `Client` drops the returned future
/// when the caller's token fires or the timeout elapses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Default transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Transport whose requests give up after `timeout`. Reqwest's own
    /// timeout errors are reported as `TransportError::TimedOut`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::request)?;
        Ok(Self {
            http,
            timeout: Some(timeout),
        })
    }

    /// Wrap an already configured client. Its timeout, if any, is unknown
    /// here, so its timeout errors stay `TransportError::Request`.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http, timeout: None }
    }

    fn request_error(&self, err: reqwest::Error) -> TransportError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => TransportError::TimedOut(timeout),
            _ => TransportError::request(err),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status().as_u16();
        // Header values may carry non-ASCII text; keep it rather than drop the header.
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Failed calls report through X-Error; their body is left unread.
        if status != 200 {
            tracing::debug!(status, x_error = ?response.headers().get(X_ERROR_HEADER), "skipping error body");
            return Ok(HttpResponse {
                status,
                headers,
                body: Vec::new(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

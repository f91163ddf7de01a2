//! Async Pocket client that drives a `Transport`.
//!
//! # Design
//! `Client` pairs the stateless `PocketClient` with a transport. Request
//! building and response parsing stay in `PocketClient`; this layer only adds
//! the round-trip, the per-call timeout and cancellation. Every network-bound
//! method takes a `CancellationToken`. When it fires, or the timeout elapses,
//! the in-flight transport future is dropped and the call returns a
//! `TransportError` immediately.
//!
//! `Client` holds no mutable state, so one instance can serve concurrent
//! callers (share it behind an `Arc` across tasks).

use tokio_util::sync::CancellationToken;

use crate::client::PocketClient;
use crate::config::ClientConfig;
use crate::error::{PocketError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{AddInput, AuthorizationResponse};

#[derive(Debug, Clone)]
pub struct Client<T = ReqwestTransport> {
    inner: PocketClient,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Client for the public Pocket API with the default 5 second timeout.
    pub fn new(consumer_key: &str) -> Result<Self, PocketError> {
        Self::with_config(consumer_key, ClientConfig::default())
    }

    pub fn with_config(consumer_key: &str, config: ClientConfig) -> Result<Self, PocketError> {
        let inner = PocketClient::with_config(consumer_key, config)?;
        let transport = ReqwestTransport::with_timeout(inner.config().timeout)
            .map_err(|e| PocketError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { inner, transport })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(consumer_key: &str, config: ClientConfig, transport: T) -> Result<Self, PocketError> {
        let inner = PocketClient::with_config(consumer_key, config)?;
        Ok(Self { inner, transport })
    }

    /// Obtain the request token used to start the authorization flow.
    pub async fn get_request_token(&self, cancel: &CancellationToken, redirect_url: &str) -> Result<String, PocketError> {
        let request = self.inner.build_request_token(redirect_url)?;
        let response = self.execute(cancel, request).await?;
        self.inner.parse_request_token(response)
    }

    /// Link the user opens to approve `request_token`. No I/O.
    pub fn get_authorization_url(&self, request_token: &str, redirect_url: &str) -> Result<String, PocketError> {
        self.inner.authorization_url(request_token, redirect_url)
    }

    /// Exchange an approved request token for an access token.
    pub async fn authorize(
        &self,
        cancel: &CancellationToken,
        request_token: &str,
    ) -> Result<AuthorizationResponse, PocketError> {
        let request = self.inner.build_authorize(request_token)?;
        let response = self.execute(cancel, request).await?;
        let auth = self.inner.parse_authorize(response)?;
        tracing::info!(username = %auth.username, "authorized");
        Ok(auth)
    }

    /// Save a new item to the user's list.
    pub async fn add(&self, cancel: &CancellationToken, input: &AddInput) -> Result<(), PocketError> {
        let request = self.inner.build_add(input)?;
        let response = self.execute(cancel, request).await?;
        self.inner.parse_add(response)
    }

    async fn execute(&self, cancel: &CancellationToken, request: HttpRequest) -> Result<HttpResponse, PocketError> {
        let timeout = self.inner.config().timeout;
        let url = request.url.clone();
        tracing::debug!(%url, "sending request");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            sent = tokio::time::timeout(timeout, self.transport.send(request)) => match sent {
                Ok(result) => result,
                Err(_) => Err(TransportError::TimedOut(timeout)),
            },
        };

        match result {
            Ok(response) => {
                if response.status != 200 {
                    tracing::warn!(%url, status = response.status, "request rejected");
                }
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "request failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use super::*;

    /// Returns a canned response and records every request it receives.
    #[derive(Debug, Default)]
    struct RecordingTransport {
        response: HttpResponse,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingTransport {
        fn replying(status: u16, headers: &[(&str, &str)], body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse {
                    status,
                    headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                    body: body.as_bytes().to_vec(),
                },
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_body(&self) -> serde_json::Value {
            let requests = self.requests.lock().unwrap();
            serde_json::from_str(&requests.last().unwrap().body).unwrap()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    /// Never answers.
    #[derive(Default)]
    struct HangingTransport {
        started: AtomicUsize,
    }

    #[async_trait]
    impl Transport for HangingTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::request(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }
    }

    fn client<T: Transport>(transport: T) -> Client<T> {
        Client::with_transport("1234-abcd", ClientConfig::default(), transport).unwrap()
    }

    #[test]
    fn construction_rejects_empty_consumer_key() {
        let err = Client::with_transport("", ClientConfig::default(), RecordingTransport::default()).unwrap_err();
        assert!(matches!(err, PocketError::Config(_)));
        assert!(matches!(Client::new(""), Err(PocketError::Config(_))));
    }

    #[test]
    fn construction_accepts_any_non_empty_key() {
        assert!(Client::new("k").is_ok());
    }

    #[tokio::test]
    async fn get_request_token_sends_consumer_key_and_redirect() {
        let transport = RecordingTransport::replying(200, &[], "code=req-token");
        let c = client(transport.clone());

        let code = c.get_request_token(&CancellationToken::new(), "http://cb").await.unwrap();

        assert_eq!(code, "req-token");
        assert_eq!(transport.calls(), 1);
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].url, "https://getpocket.com/v3/oauth/request");
        drop(requests);
        assert_eq!(
            transport.last_body(),
            serde_json::json!({"consumer_key": "1234-abcd", "redirect_uri": "http://cb"})
        );
    }

    #[tokio::test]
    async fn get_request_token_without_code_is_protocol_error() {
        let c = client(RecordingTransport::replying(200, &[], ""));
        let err = c.get_request_token(&CancellationToken::new(), "http://cb").await.unwrap_err();
        assert!(matches!(err, PocketError::Protocol(_)));
    }

    #[tokio::test]
    async fn authorize_returns_token_and_username() {
        let transport = RecordingTransport::replying(200, &[], "access_token=tok123&username=alice");
        let c = client(transport.clone());

        let auth = c.authorize(&CancellationToken::new(), "sometoken").await.unwrap();

        assert_eq!(
            auth,
            AuthorizationResponse {
                access_token: "tok123".to_string(),
                username: "alice".to_string(),
            }
        );
        assert_eq!(
            transport.last_body(),
            serde_json::json!({"consumer_key": "1234-abcd", "code": "sometoken"})
        );
    }

    #[tokio::test]
    async fn authorize_with_empty_access_token_is_protocol_error() {
        let c = client(RecordingTransport::replying(200, &[], "access_token="));
        let err = c.authorize(&CancellationToken::new(), "sometoken").await.unwrap_err();
        assert!(matches!(err, PocketError::Protocol(_)));
    }

    #[tokio::test]
    async fn authorize_with_empty_token_makes_no_call() {
        let transport = RecordingTransport::replying(200, &[], "access_token=tok");
        let c = client(transport.clone());
        let err = c.authorize(&CancellationToken::new(), "").await.unwrap_err();
        assert!(matches!(err, PocketError::Validation(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn add_with_invalid_input_makes_no_call() {
        let transport = RecordingTransport::replying(200, &[], "");
        let c = client(transport.clone());
        let cancel = CancellationToken::new();

        let missing_url = c.add(&cancel, &AddInput::new("", "tok")).await.unwrap_err();
        let missing_token = c.add(&cancel, &AddInput::new("https://example.com", "")).await.unwrap_err();

        assert!(matches!(missing_url, PocketError::Validation(_)));
        assert!(matches!(missing_token, PocketError::Validation(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn add_sends_joined_tags() {
        let transport = RecordingTransport::replying(200, &[], "");
        let c = client(transport.clone());
        let input = AddInput::new("https://example.com", "tok").with_tags(["a", "b", "c"]);

        c.add(&CancellationToken::new(), &input).await.unwrap();

        let body = transport.last_body();
        assert_eq!(body["tags"], "a,b,c");
        assert!(body.get("title").is_none());
        assert_eq!(body["consumer_key"], "1234-abcd");
    }

    #[tokio::test]
    async fn rejected_call_reports_x_error_for_every_operation() {
        let transport = RecordingTransport::replying(403, &[("X-Error", "bad consumer key")], "%zz;garbage");
        let c = client(transport);
        let cancel = CancellationToken::new();

        let errors = [
            c.get_request_token(&cancel, "http://cb").await.unwrap_err(),
            c.authorize(&cancel, "sometoken").await.map(|_| ()).unwrap_err(),
            c.add(&cancel, &AddInput::new("https://example.com", "tok")).await.unwrap_err(),
        ];
        for err in errors {
            match err {
                PocketError::Api { status, message } => {
                    assert_eq!(status, 403);
                    assert!(message.contains("bad consumer key"));
                }
                other => panic!("expected Api error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn transport_failure_is_wrapped() {
        let c = client(FailingTransport);
        let err = c.add(&CancellationToken::new(), &AddInput::new("u", "t")).await.unwrap_err();
        assert!(matches!(err, PocketError::Transport(TransportError::Request(_))));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn pre_cancelled_token_returns_immediately() {
        let transport = Arc::new(HangingTransport::default());
        let c = client(transport.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = c.get_request_token(&cancel, "http://cb").await.unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn cancelling_in_flight_call_returns_promptly() {
        let transport = Arc::new(HangingTransport::default());
        let c = client(transport.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = c.authorize(&cancel, "sometoken").await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(transport.started.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(2), "call should not wait for the default timeout");
    }

    #[tokio::test]
    async fn slow_transport_hits_configured_timeout() {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(50));
        let c = Client::with_transport("key", config, HangingTransport::default()).unwrap();

        let err = c.add(&CancellationToken::new(), &AddInput::new("u", "t")).await.unwrap_err();

        assert!(matches!(
            err,
            PocketError::Transport(TransportError::TimedOut(d)) if d == Duration::from_millis(50)
        ));
    }

    #[test]
    fn authorization_url_needs_no_transport_call() {
        let transport = RecordingTransport::replying(200, &[], "");
        let c = client(transport.clone());
        assert_eq!(
            c.get_authorization_url("abc", "http://cb").unwrap(),
            "https://getpocket.com/auth/authorize?request_token=abc&redirect_uri=http://cb"
        );
        assert!(matches!(c.get_authorization_url("", "http://cb"), Err(PocketError::Validation(_))));
        assert!(matches!(c.get_authorization_url("abc", ""), Err(PocketError::Validation(_))));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn client_is_shareable_across_tasks() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Client>();
    }
}

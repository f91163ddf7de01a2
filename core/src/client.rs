//! Stateless request builder and response parser for the Pocket API.
//!
//! # Design
//! `PocketClient` holds only the consumer key and endpoint settings and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The caller (or `Client`, which wraps this type
//! with a `Transport`) executes the round-trip in between.
//!
//! Success bodies are URL-encoded forms while error text travels in the
//! `X-Error` header, so `parse_*` checks the status before it looks at the
//! body and never reads the body of a failed response.

use serde::Serialize;

use crate::config::{ClientConfig, ENDPOINT_ADD, ENDPOINT_AUTHORIZE, ENDPOINT_REQUEST_TOKEN};
use crate::error::PocketError;
use crate::form::{self, FormValues};
use crate::http::{HttpRequest, HttpResponse, JSON_CONTENT_TYPE, X_ERROR_HEADER};
use crate::types::{AddInput, AuthorizationRequest, AuthorizationResponse, RequestTokenRequest};

/// Synchronous, stateless client for the Pocket API.
#[derive(Debug, Clone)]
pub struct PocketClient {
    consumer_key: String,
    config: ClientConfig,
}

impl PocketClient {
    pub fn new(consumer_key: &str) -> Result<Self, PocketError> {
        Self::with_config(consumer_key, ClientConfig::default())
    }

    pub fn with_config(consumer_key: &str, config: ClientConfig) -> Result<Self, PocketError> {
        if consumer_key.is_empty() {
            return Err(PocketError::Config("consumer key is empty".to_string()));
        }
        Ok(Self {
            consumer_key: consumer_key.to_string(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_request_token(&self, redirect_url: &str) -> Result<HttpRequest, PocketError> {
        let body = RequestTokenRequest {
            consumer_key: self.consumer_key.clone(),
            redirect_uri: redirect_url.to_string(),
        };
        self.build_post(ENDPOINT_REQUEST_TOKEN, &body)
    }

    pub fn parse_request_token(&self, response: HttpResponse) -> Result<String, PocketError> {
        let values = check_response(response)?;
        match values.get("code") {
            "" => Err(PocketError::Protocol("empty request token in API response".to_string())),
            code => Ok(code.to_string()),
        }
    }

    /// Link that sends the user to approve `request_token`.
    ///
    /// Both arguments are inserted verbatim. A `redirect_url` containing `&`,
    /// `#` or other reserved characters must be escaped by the caller.
    pub fn authorization_url(&self, request_token: &str, redirect_url: &str) -> Result<String, PocketError> {
        if request_token.is_empty() {
            return Err(PocketError::Validation("requestToken is empty".to_string()));
        }
        if redirect_url.is_empty() {
            return Err(PocketError::Validation("redirectURL is empty".to_string()));
        }
        Ok(format!(
            "{}?request_token={request_token}&redirect_uri={redirect_url}",
            self.config.authorize_url
        ))
    }

    pub fn build_authorize(&self, request_token: &str) -> Result<HttpRequest, PocketError> {
        if request_token.is_empty() {
            return Err(PocketError::Validation("empty request token".to_string()));
        }
        let body = AuthorizationRequest {
            consumer_key: self.consumer_key.clone(),
            code: request_token.to_string(),
        };
        self.build_post(ENDPOINT_AUTHORIZE, &body)
    }

    pub fn parse_authorize(&self, response: HttpResponse) -> Result<AuthorizationResponse, PocketError> {
        let values = check_response(response)?;
        let access_token = values.get("access_token");
        if access_token.is_empty() {
            return Err(PocketError::Protocol("empty access token in API response".to_string()));
        }
        Ok(AuthorizationResponse {
            access_token: access_token.to_string(),
            username: values.get("username").to_string(),
        })
    }

    pub fn build_add(&self, input: &AddInput) -> Result<HttpRequest, PocketError> {
        input.validate()?;
        self.build_post(ENDPOINT_ADD, &input.to_request(&self.consumer_key))
    }

    pub fn parse_add(&self, response: HttpResponse) -> Result<(), PocketError> {
        check_response(response).map(|_| ())
    }

    fn build_post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<HttpRequest, PocketError> {
        let body = serde_json::to_string(body)
            .map_err(|e| PocketError::Decode(format!("failed to marshal body: {e}")))?;
        Ok(HttpRequest {
            url: format!("{}{endpoint}", self.config.api_host),
            headers: vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())],
            body,
        })
    }
}

/// Map a non-200 status to `PocketError::Api`, otherwise decode the form body.
pub(crate) fn check_response(response: HttpResponse) -> Result<FormValues, PocketError> {
    if response.status != 200 {
        return Err(PocketError::Api {
            status: response.status,
            message: response.header(X_ERROR_HEADER).unwrap_or_default().to_string(),
        });
    }
    let body = std::str::from_utf8(&response.body)
        .map_err(|e| PocketError::Decode(format!("failed to read response body: {e}")))?;
    form::parse(body)
}

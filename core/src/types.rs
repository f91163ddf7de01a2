//! Domain values and request payloads for the Pocket API.
//!
//! # Design
//! Payload structs mirror the JSON bodies the service expects field for
//! field. They are built fresh for every call and never outlive it. Optional
//! fields are skipped rather than sent as empty strings.

use serde::{Deserialize, Serialize};

use crate::error::PocketError;

/// Data needed to save a new item to a user's list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddInput {
    pub url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub access_token: String,
}

impl AddInput {
    pub fn new(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PocketError> {
        if self.url.is_empty() {
            return Err(PocketError::Validation("required URL values is empty".to_string()));
        }
        if self.access_token.is_empty() {
            return Err(PocketError::Validation("access token is empty".to_string()));
        }
        Ok(())
    }

    pub(crate) fn to_request(&self, consumer_key: &str) -> AddRequest {
        AddRequest {
            url: self.url.clone(),
            title: non_empty(&self.title),
            tags: non_empty(&self.tags.join(",")),
            access_token: self.access_token.clone(),
            consumer_key: consumer_key.to_string(),
        }
    }
}

/// Result of exchanging an approved request token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    pub access_token: String,
    /// May be empty; the service does not always report it.
    pub username: String,
}

/// Body of `POST /oauth/request`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestTokenRequest {
    pub consumer_key: String,
    pub redirect_uri: String,
}

/// Body of `POST /oauth/authorize`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub consumer_key: String,
    pub code: String,
}

/// Body of `POST /add`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Comma-separated tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub access_token: String,
    pub consumer_key: String,
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

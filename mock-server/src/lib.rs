//! In-memory stand-in for the Pocket v3 API.
//!
//! Speaks the same wire contract as the real service: JSON request bodies,
//! `application/x-www-form-urlencoded` success bodies, and error text in the
//! `X-Error` header on every non-200 response. `GET /auth/authorize` plays
//! the part of the user clicking "Authorize" in a browser.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const X_ERROR: &str = "X-Error";
pub const X_ERROR_CODE: &str = "X-Error-Code";

#[derive(Deserialize)]
pub struct RequestTokenBody {
    pub consumer_key: String,
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Deserialize)]
pub struct AuthorizeBody {
    pub consumer_key: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Deserialize)]
pub struct AddBody {
    pub consumer_key: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub url: String,
    pub title: Option<String>,
    pub tags: Option<String>,
}

#[derive(Deserialize)]
pub struct ApproveParams {
    pub request_token: String,
    #[serde(default)]
    pub redirect_uri: String,
}

/// An item stored through `POST /v3/add`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedItem {
    pub url: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub username: String,
}

#[derive(Default)]
struct Store {
    /// request token -> approved by the user
    request_tokens: HashMap<String, bool>,
    /// access token -> username
    access_tokens: HashMap<String, String>,
    items: Vec<SavedItem>,
}

/// Shared server state. Clones refer to the same store, so a test can keep a
/// handle and inspect what the server received.
#[derive(Clone)]
pub struct MockPocket {
    consumer_key: Arc<str>,
    username: Arc<str>,
    store: Arc<RwLock<Store>>,
}

impl MockPocket {
    pub fn new(consumer_key: &str, username: &str) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            username: username.into(),
            store: Arc::new(RwLock::new(Store::default())),
        }
    }

    pub async fn saved_items(&self) -> Vec<SavedItem> {
        self.store.read().await.items.clone()
    }

    /// Approve `request_token` without going through `/auth/authorize`.
    pub async fn approve(&self, request_token: &str) -> bool {
        match self.store.write().await.request_tokens.get_mut(request_token) {
            Some(approved) => {
                *approved = true;
                true
            }
            None => false,
        }
    }

    fn check_consumer_key(&self, key: &str) -> Result<(), ApiFailure> {
        if key.is_empty() {
            return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 138, "Missing consumer key."));
        }
        if key != &*self.consumer_key {
            return Err(ApiFailure::new(StatusCode::FORBIDDEN, 152, "Invalid consumer key."));
        }
        Ok(())
    }
}

/// A rejected call: status plus the `X-Error` / `X-Error-Code` headers.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: u16,
    message: &'static str,
}

impl ApiFailure {
    fn new(status: StatusCode, code: u16, message: &'static str) -> Self {
        Self { status, code, message }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        tracing::info!(status = %self.status, message = self.message, "rejecting request");
        (
            self.status,
            [(X_ERROR, self.message.to_string()), (X_ERROR_CODE, self.code.to_string())],
            // Clients must ignore this and read X-Error instead.
            "error=see+X-Error;",
        )
            .into_response()
    }
}

fn form(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
        body,
    )
        .into_response()
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiFailure> {
    body.map(|Json(inner)| inner).map_err(|rejection| {
        tracing::info!(error = %rejection, "unreadable request body");
        ApiFailure::new(StatusCode::BAD_REQUEST, 199, "Invalid request body.")
    })
}

pub fn app(state: MockPocket) -> Router {
    Router::new()
        .route("/v3/oauth/request", post(request_token))
        .route("/v3/oauth/authorize", post(authorize))
        .route("/v3/add", post(add))
        .route("/auth/authorize", get(approve))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockPocket) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn request_token(
    State(state): State<MockPocket>,
    body: Result<Json<RequestTokenBody>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let input = payload(body)?;
    state.check_consumer_key(&input.consumer_key)?;
    if input.redirect_uri.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 140, "Missing redirect url."));
    }

    let code = Uuid::new_v4().to_string();
    state.store.write().await.request_tokens.insert(code.clone(), false);
    tracing::info!(%code, "issued request token");
    Ok(form(format!("code={code}")))
}

async fn approve(State(state): State<MockPocket>, Query(params): Query<ApproveParams>) -> Response {
    if state.approve(&params.request_token).await {
        tracing::info!(code = %params.request_token, redirect = %params.redirect_uri, "request token approved");
        (StatusCode::OK, "Authorized. You may return to the application.").into_response()
    } else {
        (StatusCode::NOT_FOUND, "Unknown request token.").into_response()
    }
}

async fn authorize(
    State(state): State<MockPocket>,
    body: Result<Json<AuthorizeBody>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let input = payload(body)?;
    state.check_consumer_key(&input.consumer_key)?;
    if input.code.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 181, "Missing code."));
    }

    let mut store = state.store.write().await;
    match store.request_tokens.get(&input.code).copied() {
        None => Err(ApiFailure::new(StatusCode::BAD_REQUEST, 182, "Invalid request token.")),
        Some(false) => Err(ApiFailure::new(StatusCode::FORBIDDEN, 158, "User rejected code.")),
        Some(true) => {
            store.request_tokens.remove(&input.code);
            let access_token = Uuid::new_v4().to_string();
            store.access_tokens.insert(access_token.clone(), state.username.to_string());
            Ok(form(format!(
                "access_token={access_token}&username={}",
                urlencoding::encode(&state.username)
            )))
        }
    }
}

async fn add(
    State(state): State<MockPocket>,
    body: Result<Json<AddBody>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let input = payload(body)?;
    state.check_consumer_key(&input.consumer_key)?;
    if input.url.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, 199, "Missing url."));
    }

    let mut store = state.store.write().await;
    let Some(username) = store.access_tokens.get(&input.access_token).cloned() else {
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, 107, "Invalid access token."));
    };
    let tags = input
        .tags
        .as_deref()
        .map(|t| t.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    store.items.push(SavedItem {
        url: input.url,
        title: input.title,
        tags,
        username,
    });
    Ok(form("status=1".to_string()))
}

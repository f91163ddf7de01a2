//! Client for the Pocket v3 API: OAuth request-token flow and adding items.
//!
//! # Overview
//! Two layers share one request/response contract:
//! - `PocketClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `Client` drives a `Transport` (reqwest by default) around it, adding a
//!   per-call timeout and cancellation through a `CancellationToken`.
//!
//! # Design
//! - Requests are JSON POSTs; successful responses are URL-encoded forms and
//!   failed ones carry their message in the `X-Error` header.
//! - Hosts, endpoints and the timeout live in `ClientConfig`, fixed at
//!   construction.
//! - Every failure is a `PocketError`; nothing is retried.
//!
//! ```no_run
//! # async fn run() -> Result<(), pocket_core::PocketError> {
//! use pocket_core::{AddInput, CancellationToken, Client};
//!
//! let client = Client::new("1234-abcd1234abcd1234abcd1234")?;
//! let cancel = CancellationToken::new();
//!
//! let code = client.get_request_token(&cancel, "https://example.com/done").await?;
//! println!("open {}", client.get_authorization_url(&code, "https://example.com/done")?);
//!
//! let auth = client.authorize(&cancel, &code).await?;
//! client
//!     .add(&cancel, &AddInput::new("https://www.rust-lang.org", auth.access_token))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod transport;
pub mod types;

pub use api::Client;
pub use client::PocketClient;
pub use config::ClientConfig;
pub use error::{PocketError, TransportError};
pub use form::FormValues;
pub use http::{HttpRequest, HttpResponse};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ReqwestTransport, Transport};
pub use types::{AddInput, AuthorizationResponse};

//! Walks through the whole authorization flow against the real service and
//! saves one item.
//!
//! ```text
//! POCKET_CONSUMER_KEY=... POCKET_CALLBACK_URL=https://example.com/done \
//!     cargo run -p pocket-core --example auth_flow
//! ```

use pocket_core::{AddInput, CancellationToken, Client, ClientConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pocket_core=debug")))
        .init();

    let consumer_key = std::env::var("POCKET_CONSUMER_KEY").unwrap_or_default();
    let callback_url = std::env::var("POCKET_CALLBACK_URL").unwrap_or_else(|_| "https://example.com/done".to_string());
    let mut config = ClientConfig::default();
    if let Ok(host) = std::env::var("POCKET_API_HOST") {
        config = config.with_api_host(&host);
    }

    let client = Client::with_config(&consumer_key, config)?;

    // Ctrl-C aborts whichever call is in flight.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let request_token = client.get_request_token(&cancel, &callback_url).await?;
    tracing::info!(%request_token, "got request token");

    let url = client.get_authorization_url(&request_token, &callback_url)?;
    println!("Open the URL and confirm the authorization:\n{url}");
    println!("Press Enter to continue...");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    let auth = client.authorize(&cancel, &request_token).await?;
    println!("Authorized as {}", auth.username);

    client
        .add(
            &cancel,
            &AddInput::new("https://github.com/rust-lang/rust", auth.access_token).with_tags(["rust"]),
        )
        .await?;
    println!("Saved successfully!");
    Ok(())
}

//! Issue one GET through a client configured from the environment.
//!
//! Run with:
//! ```bash
//! WR_API_ORIGIN=https://qr.yayaxueqin.cn RUST_LOG=wr_http=debug \
//!     cargo run -p wr-http --example ping -- /ping
//! ```

use tracing_subscriber::EnvFilter;
use wr_http::{Client, ClientConfig, ClientError, ErrorPhase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "/ping".to_owned());

    let config = ClientConfig::from_env()?;
    let client = Client::configure(config)?;
    println!("Base URL: {}", client.base_url());

    match client.get(&path).await {
        Ok(response) => {
            println!("Status: {}", response.status());
            let body = response.text().await?;
            println!("Body: {body}");
        }
        Err(ClientError::Http { status, body }) => {
            println!("Backend answered {status}: {}", String::from_utf8_lossy(&body));
        }
        Err(e) if e.phase() == ErrorPhase::Request => {
            println!("Request was not sent: {e}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

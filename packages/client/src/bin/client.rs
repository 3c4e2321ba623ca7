//! Tayori CLI chat client.
//!
//! Authenticates with a token, keeps the local chat store in sync over the
//! relay socket and sends messages through the REST API.
//! Reconnects automatically on disconnection; a rejected token exits at once.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tayori-client -- --token alice-token
//! TAYORI_TOKEN=bob-token cargo run --bin tayori-client
//! ```

use std::time::Duration;

use clap::Parser;

use tayori_client::{
    ClientConfig, run_client,
    runner::{DEFAULT_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY},
};
use tayori_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tayori-client")]
#[command(about = "CLI chat client for the Tayori relay", long_about = None)]
struct Args {
    /// Access token
    #[arg(short = 't', long, env = "TAYORI_TOKEN")]
    token: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// REST API root URL
    #[arg(short = 'a', long, default_value = "http://127.0.0.1:8080/api")]
    api_url: String,

    /// Maximum number of reconnection attempts
    #[arg(long, default_value_t = DEFAULT_RECONNECT_ATTEMPTS)]
    reconnect_attempts: u32,

    /// Delay between reconnection attempts (milliseconds)
    #[arg(long, default_value_t = DEFAULT_RECONNECT_DELAY.as_millis() as u64)]
    reconnect_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ClientConfig {
        ws_url: args.url,
        api_url: args.api_url,
        token: args.token,
        reconnect_attempts: args.reconnect_attempts,
        reconnect_delay: Duration::from_millis(args.reconnect_delay_ms),
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

//! Tayori relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tayori-server
//! cargo run --bin tayori-server -- --host 0.0.0.0 --port 3000 --seed seed.json
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tayori_server::{
    infrastructure::seed::Seed,
    ui::{AppState, Server},
};
use tayori_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tayori-server")]
#[command(about = "Real-time relay for presence, typing, messages and read receipts", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TAYORI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TAYORI_PORT", default_value = "8080")]
    port: u16,

    /// JSON file with users (and their tokens), conversations and friendships
    #[arg(short = 's', long, env = "TAYORI_SEED")]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // 1. Load seed data
    let seed = match args.seed.as_deref().map(Seed::from_file).transpose() {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Failed to load seed file: {}", e);
            std::process::exit(1);
        }
    };
    if seed.is_none() {
        tracing::warn!("No seed file given, starting without users or tokens");
    }

    // 2. Create AppState (repositories, pusher, usecases)
    let state = match AppState::in_memory(seed.as_ref(), Arc::new(SystemClock)).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to apply seed data: {}", e);
            std::process::exit(1);
        }
    };

    // 3. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

//! Client execution logic with reconnection support.

use std::time::Duration;

use crate::{
    api::ApiClient,
    domain::should_attempt_reconnect,
    error::ClientError,
    formatter::MessageFormatter,
    session::run_client_session,
    store::ChatStore,
    ui::{Prompt, spawn_readline},
};

pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub ws_url: String,
    /// REST root, e.g. `http://127.0.0.1:8080/api`
    pub api_url: String,
    pub token: String,
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

/// Run the client with reconnection logic
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let api = ApiClient::new(&config.api_url, &config.token);
    let me = api.me().await?;
    println!("{}", MessageFormatter::format_welcome(&me));

    let mut store = ChatStore::new(me.id.clone());
    let prompt = Prompt::default();
    prompt.set(&me.id, None);
    let mut input = spawn_readline(prompt.clone());

    let mut reconnect_count = 0;
    loop {
        tracing::info!(
            "Connecting to {} as '{}' (attempt {}/{})",
            config.ws_url,
            me.id,
            reconnect_count + 1,
            config.reconnect_attempts
        );

        match run_client_session(
            &config.ws_url,
            &config.token,
            &api,
            &mut store,
            &mut input,
            &prompt,
        )
        .await
        {
            Ok(end) => {
                tracing::info!("Client session ended: {:?}", end);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, config.reconnect_attempts) {
                    tracing::error!("Giving up after {} attempt(s)", reconnect_count);
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {:?}... (attempt {}/{})",
                    config.reconnect_delay,
                    reconnect_count + 1,
                    config.reconnect_attempts
                );
                tokio::time::sleep(config.reconnect_delay).await;
            }
        }
    }
}

//! WebSocket client session management.

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, http::StatusCode, protocol::Message},
};

use tayori_server::infrastructure::dto::websocket::{
    ClientEvent, ReadRequest, SelectRequest, ServerEvent, TypingRequest,
};

use crate::{
    api::ApiClient,
    domain::{Command, parse_command},
    error::ClientError,
    formatter::MessageFormatter,
    store::{ChatStore, Effect},
    typing::TypingDebouncer,
    ui::{Input, Prompt, redisplay_prompt},
};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

const TYPING_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How a session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `/quit`, Ctrl+C or Ctrl+D
    UserExit,
}

/// Open the socket. A rejected token maps to `ClientError::Unauthorized`.
async fn connect(
    ws_url: &str,
    token: &str,
) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>, ClientError> {
    let url = format!("{}?token={}", ws_url, token);
    match connect_async(&url).await {
        Ok((ws_stream, _response)) => Ok(ws_stream),
        Err(tungstenite::Error::Http(response))
            if response.status() == StatusCode::UNAUTHORIZED =>
        {
            Err(ClientError::Unauthorized)
        }
        Err(e) => Err(ClientError::ConnectionError(e.to_string())),
    }
}

/// Run one WebSocket session until the user exits or the connection is lost.
///
/// The store and the input channel outlive the session so that a reconnect
/// keeps the local state and the readline thread.
pub async fn run_client_session(
    ws_url: &str,
    token: &str,
    api: &ApiClient,
    store: &mut ChatStore,
    input: &mut mpsc::UnboundedReceiver<Input>,
    prompt: &Prompt,
) -> Result<SessionEnd, ClientError> {
    let ws_stream = connect(ws_url, token).await?;
    tracing::info!("Connected to relay");

    let (write, mut read) = ws_stream.split();
    let mut session = Session {
        api,
        store,
        prompt,
        write,
        debouncer: TypingDebouncer::default(),
    };
    session.resync().await?;

    let mut ticker = tokio::time::interval(TYPING_POLL_INTERVAL);
    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => session.on_frame(text.as_str()).await?,
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!("Ignoring {} bytes of binary data", data.len());
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
                Some(Ok(_)) => {}
            },
            signal = input.recv() => match signal {
                Some(Input::Line(line)) => {
                    if session.on_line(&line).await? == Flow::Quit {
                        session.close().await;
                        return Ok(SessionEnd::UserExit);
                    }
                }
                Some(Input::Keystroke) => {
                    let started = session.debouncer.on_input(Instant::now());
                    session.send_typing(started).await?;
                }
                Some(Input::Closed) | None => {
                    session.close().await;
                    return Ok(SessionEnd::UserExit);
                }
            },
            _ = ticker.tick() => {
                let stopped = session.debouncer.poll(Instant::now());
                session.send_typing(stopped).await?;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Session<'a> {
    api: &'a ApiClient,
    store: &'a mut ChatStore,
    prompt: &'a Prompt,
    write: WsSink,
    debouncer: TypingDebouncer,
}

impl Session<'_> {
    async fn send_event(&mut self, event: &ClientEvent) -> Result<(), ClientError> {
        let json = serde_json::to_string(event)?;
        self.write
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))
    }

    async fn send_typing(&mut self, change: Option<bool>) -> Result<(), ClientError> {
        let (Some(is_typing), Some(conversation_id)) = (change, self.store.active()) else {
            return Ok(());
        };
        let event = ClientEvent::Typing(TypingRequest {
            conversation_id: conversation_id.to_string(),
            is_typing,
        });
        self.send_event(&event).await
    }

    async fn send_select(&mut self) -> Result<(), ClientError> {
        let event = ClientEvent::ChatSelect(SelectRequest {
            conversation_id: self.store.active().map(str::to_string),
        });
        self.send_event(&event).await
    }

    async fn send_read(&mut self, conversation_id: &str) -> Result<(), ClientError> {
        let event = ClientEvent::MessageRead(ReadRequest {
            conversation_id: conversation_id.to_string(),
        });
        self.send_event(&event).await
    }

    fn show(&self, text: &str) {
        print!("{}", text);
        redisplay_prompt(self.prompt);
    }

    /// Refetch REST state after (re)connecting and restore the selection.
    async fn resync(&mut self) -> Result<(), ClientError> {
        self.refresh_chats().await;
        if let Some(active) = self.store.active().map(str::to_string) {
            self.refresh_history(&active).await;
            self.send_select().await?;
            self.send_read(&active).await?;
        }
        Ok(())
    }

    async fn refresh_chats(&mut self) {
        match self.api.chat_list().await {
            Ok(chats) => self.store.replace_chats(chats),
            Err(e) => tracing::warn!("Failed to fetch chats: {}", e),
        }
    }

    async fn refresh_history(&mut self, conversation_id: &str) -> bool {
        match self.api.messages(conversation_id).await {
            Ok(messages) => {
                self.store.replace_messages(conversation_id, messages);
                true
            }
            Err(e) => {
                self.show(&MessageFormatter::format_notice(&e.to_string()));
                false
            }
        }
    }

    async fn refresh_friends(&mut self) {
        match self.api.notifications().await {
            Ok(notifications) => {
                self.store.mark_friends_fresh();
                tracing::debug!(
                    "Friend notifications: {} unread",
                    notifications.unread_counts.total
                );
            }
            Err(e) => tracing::warn!("Failed to fetch friend notifications: {}", e),
        }
    }

    async fn on_frame(&mut self, text: &str) -> Result<(), ClientError> {
        let event = match serde_json::from_str::<ServerEvent>(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("Unrecognized frame: {}", e);
                self.show(&MessageFormatter::format_raw_message(text));
                return Ok(());
            }
        };

        let applied = self.store.apply(&event);
        if !applied.changed {
            return Ok(());
        }
        for effect in applied.effects {
            match effect {
                Effect::MarkRead(conversation_id) => self.send_read(&conversation_id).await?,
                Effect::RefreshChats => self.refresh_chats().await,
                Effect::RefreshFriends => self.refresh_friends().await,
            }
        }
        if let Some(text) = MessageFormatter::format_event(&event, self.store) {
            self.show(&text);
        }
        Ok(())
    }

    async fn on_line(&mut self, line: &str) -> Result<Flow, ClientError> {
        match parse_command(line) {
            Command::Open(conversation_id) => self.open(&conversation_id).await?,
            Command::Close => {
                let stopped = self.debouncer.stop();
                self.send_typing(stopped).await?;
                self.store.close();
                self.send_select().await?;
                self.prompt.set(self.store.me(), None);
            }
            Command::List => {
                self.refresh_chats().await;
                self.show(&MessageFormatter::format_chat_list(self.store));
            }
            Command::History => match self.store.active().map(str::to_string) {
                Some(active) => {
                    if self.refresh_history(&active).await {
                        self.show(&MessageFormatter::format_history(self.store, &active));
                    }
                }
                None => self.show(&MessageFormatter::format_notice("No conversation is open")),
            },
            Command::Requests => self.requests().await,
            Command::Quit => return Ok(Flow::Quit),
            Command::Send(text) => self.send_message(&text).await?,
            Command::Unknown(_) => self.show(&MessageFormatter::format_help()),
        }
        Ok(Flow::Continue)
    }

    async fn open(&mut self, conversation_id: &str) -> Result<(), ClientError> {
        if !self.refresh_history(conversation_id).await {
            return Ok(());
        }
        let stopped = self.debouncer.stop();
        self.send_typing(stopped).await?;

        self.store.open(conversation_id);
        self.send_select().await?;
        self.send_read(conversation_id).await?;
        self.prompt.set(self.store.me(), Some(conversation_id));
        self.show(&MessageFormatter::format_history(self.store, conversation_id));
        Ok(())
    }

    async fn send_message(&mut self, text: &str) -> Result<(), ClientError> {
        let Some(conversation_id) = self.store.active().map(str::to_string) else {
            self.show(&MessageFormatter::format_notice(
                "Open a conversation first (/open <id>)",
            ));
            return Ok(());
        };
        let stopped = self.debouncer.stop();
        self.send_typing(stopped).await?;

        match self.api.send_message(&conversation_id, text).await {
            Ok(message) => {
                let confirmation = MessageFormatter::format_sent_confirmation(&message);
                self.store.add_own_message(message);
                self.show(&confirmation);
            }
            Err(e) => self.show(&MessageFormatter::format_notice(&e.to_string())),
        }
        Ok(())
    }

    /// Show pending requests, then mark the friend notifications read.
    async fn requests(&mut self) {
        let (requests, notifications) =
            match tokio::try_join!(self.api.friend_requests(), self.api.notifications()) {
                Ok(pair) => pair,
                Err(e) => {
                    self.show(&MessageFormatter::format_notice(&e.to_string()));
                    return;
                }
            };
        self.store.mark_friends_fresh();
        self.show(&MessageFormatter::format_friend_summary(
            &requests,
            &notifications,
        ));

        if notifications.unread_counts.total > 0
            && let Err(e) = self.api.mark_notifications_read("all").await
        {
            tracing::warn!("Failed to mark friend notifications read: {}", e);
        }
    }

    /// Stop typing and close the socket; failures are irrelevant at this point.
    async fn close(&mut self) {
        let stopped = self.debouncer.stop();
        self.send_typing(stopped).await.ok();
        self.write.send(Message::Close(None)).await.ok();
    }
}

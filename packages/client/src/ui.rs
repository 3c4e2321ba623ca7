//! UI utilities for the client.
//!
//! rustyline は同期 API のため専用スレッドで動かし、入力を mpsc で非同期側に渡す。
//! 編集中のキー入力は `Hinter` のフックで検知して typing の判定に使う。

use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use rustyline::{
    Context, Editor, Helper, completion::Completer, error::ReadlineError,
    highlight::Highlighter, hint::Hinter, history::DefaultHistory, validate::Validator,
};
use tokio::sync::mpsc;

/// Input from the readline thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// The user edited a (non-command) line
    Keystroke,
    /// Ctrl+C or Ctrl+D
    Closed,
}

/// Prompt text shared with the readline thread
#[derive(Debug, Clone, Default)]
pub struct Prompt(Arc<Mutex<String>>);

impl Prompt {
    pub fn set(&self, me: &str, conversation_id: Option<&str>) {
        let text = match conversation_id {
            Some(id) => format!("{}@{}> ", me, id),
            None => format!("{}> ", me),
        };
        match self.0.lock() {
            Ok(mut prompt) => *prompt = text,
            Err(poisoned) => *poisoned.into_inner() = text,
        }
    }

    pub fn get(&self) -> String {
        match self.0.lock() {
            Ok(prompt) => prompt.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(prompt: &Prompt) {
    print!("{}", prompt.get());
    std::io::stdout().flush().ok();
}

struct InputObserver {
    tx: mpsc::UnboundedSender<Input>,
}

impl Completer for InputObserver {
    type Candidate = String;
}

impl Hinter for InputObserver {
    type Hint = String;

    fn hint(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if !line.is_empty() && !line.starts_with('/') {
            self.tx.send(Input::Keystroke).ok();
        }
        None
    }
}

impl Highlighter for InputObserver {}

impl Validator for InputObserver {}

impl Helper for InputObserver {}

/// Spawn the blocking readline thread.
pub fn spawn_readline(prompt: Prompt) -> mpsc::UnboundedReceiver<Input> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<Input>();

    std::thread::spawn(move || {
        let mut rl: Editor<InputObserver, DefaultHistory> = match Editor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                input_tx.send(Input::Closed).ok();
                return;
            }
        };
        rl.set_helper(Some(InputObserver {
            tx: input_tx.clone(),
        }));

        loop {
            match rl.readline(&prompt.get()) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(Input::Line(line.to_string())).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    input_tx.send(Input::Closed).ok();
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    input_tx.send(Input::Closed).ok();
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    input_tx.send(Input::Closed).ok();
                    break;
                }
            }
        }
    });

    input_rx
}

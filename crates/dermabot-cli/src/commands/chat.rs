//! Terminal chat: the bot served over stdin/stdout.
//!
//! A reader thread owns the line editor and forwards each line as an
//! [`Inbound`] event. It waits for the reply to be printed before showing
//! the next prompt, so output never interleaves with typing.

use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tracing::{info, warn};

use dermabot_bot::{serve, Bot, BotEventHandler, Inbound, Transport};
use dermabot_core::error::format_error_with_suggestion;
use dermabot_core::{Config, Reply, TopState, UserId};

/// Lines starting with `:` are handled by the console itself.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Quit,
    Help,
    SwitchUser(UserId),
    Invalid(String),
}

impl ConsoleCommand {
    /// `None` if the line is a message for the bot.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix(':')?;
        let words: Vec<&str> = rest.split_whitespace().collect();
        let command = match words.as_slice() {
            ["quit" | "q" | "exit"] => ConsoleCommand::Quit,
            ["help"] => ConsoleCommand::Help,
            ["user", id] => match id.parse::<i64>() {
                Ok(id) => ConsoleCommand::SwitchUser(UserId(id)),
                Err(_) => ConsoleCommand::Invalid(format!("Invalid user id: {}", id)),
            },
            _ => ConsoleCommand::Invalid(format!("Unknown command: {}", line)),
        };
        Some(command)
    }
}

/// Reply text followed by its buttons, one row per line.
pub fn render_reply(reply: &Reply) -> String {
    let mut out = reply.text.clone();
    if !reply.keyboard.is_empty() {
        out.push('\n');
        for row in &reply.keyboard {
            out.push_str(&format!("\n  [{}]", row.join("] [")));
        }
    }
    out
}

fn print_help() {
    println!("Type a button label or any text to send it to the bot.");
    println!("  :user <id>  continue as another user");
    println!("  :help       show this help");
    println!("  :quit       exit");
}

/// Stdin/stdout transport backed by a reader thread.
pub struct ConsoleTransport {
    events: mpsc::Receiver<Inbound>,
    acks: std_mpsc::SyncSender<()>,
}

impl ConsoleTransport {
    pub fn spawn(user: UserId, history: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = history.as_deref().filter(|p| p.exists()) {
            let _ = editor.load_history(path);
        }

        let (event_tx, event_rx) = mpsc::channel(1);
        let (ack_tx, ack_rx) = std_mpsc::sync_channel(1);
        thread::Builder::new()
            .name("console-reader".into())
            .spawn(move || read_loop(editor, user, event_tx, ack_rx, history))?;

        Ok(Self {
            events: event_rx,
            acks: ack_tx,
        })
    }
}

fn read_loop(
    mut editor: DefaultEditor,
    mut user: UserId,
    events: mpsc::Sender<Inbound>,
    acks: std_mpsc::Receiver<()>,
    history: Option<PathBuf>,
) {
    loop {
        match editor.readline(&format!("[{}]> ", user)) {
            Ok(line) => {
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(text);

                match ConsoleCommand::parse(text) {
                    Some(ConsoleCommand::Quit) => break,
                    Some(ConsoleCommand::Help) => print_help(),
                    Some(ConsoleCommand::SwitchUser(id)) => {
                        user = id;
                        println!("Now chatting as user {}", user);
                    }
                    Some(ConsoleCommand::Invalid(msg)) => eprintln!("{}", msg),
                    None => {
                        if events.blocking_send(Inbound::new(user, text)).is_err() {
                            break;
                        }
                        if acks.recv().is_err() {
                            break;
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(path) = history {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = editor.save_history(&path);
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn next_event(&mut self) -> anyhow::Result<Option<Inbound>> {
        Ok(self.events.recv().await)
    }

    async fn send(&mut self, _user: UserId, reply: &Reply) -> anyhow::Result<()> {
        println!("{}\n", render_reply(reply));
        self.acks
            .send(())
            .map_err(|_| anyhow::anyhow!("console reader has exited"))
    }
}

/// Prints state changes when running verbose.
struct ConsoleEventHandler;

impl BotEventHandler for ConsoleEventHandler {
    fn on_transition(&self, user: UserId, from: &TopState, to: &TopState) {
        if from != to {
            eprintln!("  (user {}: {} -> {})", user, from.describe(), to.describe());
        }
    }
}

pub async fn run(config: &Config, user: Option<i64>, verbose: bool) -> anyhow::Result<()> {
    config
        .require_token()
        .map_err(|e| anyhow::anyhow!(format_error_with_suggestion(&e)))?;

    let mut bot = Bot::from_config(config);
    if verbose {
        bot = bot.with_event_handler(Arc::new(ConsoleEventHandler));
    }

    if config.bot.admins.is_empty() {
        warn!("No administrators configured; the admin panel is unreachable");
    }
    info!(
        "Serving content from {} ({} admin(s))",
        config.storage.data_path().display(),
        config.bot.admins.len()
    );

    let sweeper = bot
        .sessions()
        .idle_timeout()
        .map(|_| bot.sessions().clone().spawn_sweeper(config.sessions.sweep_interval()));

    let user = user
        .map(UserId)
        .or_else(|| config.bot.admins.iter().next())
        .unwrap_or(UserId(1));

    println!("Dermabot console. Send /start to begin, :help for commands.\n");
    let mut transport = ConsoleTransport::spawn(user, Some(Config::config_dir().join("history.txt")))?;
    let result = serve(&bot, &mut transport).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result
}

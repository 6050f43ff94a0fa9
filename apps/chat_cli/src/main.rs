use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{SessionController, SessionPhase, WebSocketTransport};
use shared::protocol::ServerEvent;
use storage::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod terminal;

use commands::{parse_input, InputCommand};
use config::{load_settings, normalize_database_url};
use terminal::{format_roster, Renderer, TerminalNavigator};

#[derive(Parser, Debug)]
struct Args {
    /// Chat server base URL (http, https, ws or wss).
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    nickname: Option<String>,
    /// SQLite database holding the resumable session.
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long, default_value = "chat.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }
    if args.nickname.is_some() {
        settings.nickname = args.nickname;
    }

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await?;
    info!(server_url = %settings.server_url, %database_url, "chat client starting");

    let navigator = Arc::new(TerminalNavigator::default());
    let mut controller = SessionController::new(
        Arc::new(WebSocketTransport::new(settings.server_url.clone())),
        Arc::new(storage),
        navigator.clone(),
    );
    let mut renderer = Renderer::default();

    if controller.restore_session().await {
        println!("resuming previous session...");
    } else if let Some(nickname) = settings.nickname {
        controller.set_nickname(nickname);
        start_session(&mut controller);
    } else {
        println!("choose a nickname with /nick <name>");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = controller.next_event() => {
                let Some(event) = event else {
                    break;
                };
                on_server_event(&mut controller, &navigator, event).await;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !on_input(&mut controller, &line) {
                    break;
                }
            }
        }
        renderer.flush(controller.state());
    }

    Ok(())
}

fn start_session(controller: &mut SessionController) {
    if let Err(err) = controller.connect_with_nickname() {
        println!("! {err}");
    } else {
        println!("joining as {}...", controller.state().user().username);
    }
}

async fn on_server_event(
    controller: &mut SessionController,
    navigator: &TerminalNavigator,
    event: ServerEvent,
) {
    controller.handle_event(event).await;
    if navigator.take_pending() {
        let user = controller.state().user();
        println!("== chatting as {} ==", user.username);
        controller.join_chat();
    }
}

/// Returns false when the user asked to leave.
fn on_input(controller: &mut SessionController, line: &str) -> bool {
    match parse_input(line) {
        InputCommand::Empty => {}
        InputCommand::Quit => return false,
        InputCommand::Invalid(reason) => println!("! {reason}"),
        InputCommand::Who => println!("{}", format_roster(controller.state())),
        InputCommand::Join => controller.join_chat(),
        InputCommand::Nick(nickname) => {
            if controller.has_session() {
                controller.update_nickname(nickname);
            } else {
                controller.set_nickname(nickname);
                start_session(controller);
            }
        }
        InputCommand::Say(text) => {
            if controller.state().phase() == SessionPhase::Authenticated {
                controller.send_message(text);
            } else {
                warn!("message typed before the session was established");
                println!("! not in a chat yet; pick a nickname with /nick <name>");
            }
        }
    }
    true
}

//! Lead chat - terminal front end
//!
//! Collects the visitor's contact details, then relays chat lines to the
//! qualification assistant until the lead is qualified.

use lead_chat::config::DEFAULT_LOG_FILTER;
use lead_chat::gateway::LoggingGateway;
use lead_chat::{
    AssistantGateway, ChatConfig, ConversationEngine, ConversationSnapshot, HttpGateway, Profile,
    SessionController, SessionError, SqliteStore,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

enum Command {
    Reset,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env();
    tracing::info!(
        assistant_url = %config.assistant_url,
        store_path = %config.store_path.display(),
        "Starting lead chat"
    );

    let http = HttpGateway::new(&config.assistant_url)?;
    if let Err(e) = http.health().await {
        tracing::warn!(error = %e, "Assistant backend is not reachable, messages will fail until it is");
    }
    let gateway = Arc::new(LoggingGateway::new(http));

    let store = SqliteStore::open(&config.store_path)?;
    let mut controller = SessionController::new(store, gateway);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if controller.resume()?.is_none() {
            let Some(profile) = prompt_profile(&mut input).await? else {
                return Ok(());
            };
            match controller.start(profile) {
                Ok(_) => {}
                Err(SessionError::InvalidProfile(e)) => {
                    println!("{e}. Please try again.");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let Some(engine) = controller.conversation() else {
            continue;
        };
        match chat(&engine, &mut input).await? {
            Command::Reset => controller.reset()?,
            Command::Quit => return Ok(()),
        }
    }
}

/// Ask for name, email and phone. `None` on end of input.
async fn prompt_profile(input: &mut Input) -> std::io::Result<Option<Profile>> {
    println!("Tell us a bit about yourself to get started.");
    let Some(name) = prompt(input, "Full name: ").await? else {
        return Ok(None);
    };
    let Some(email) = prompt(input, "Email address: ").await? else {
        return Ok(None);
    };
    let Some(phone) = prompt(input, "Phone number: ").await? else {
        return Ok(None);
    };
    Ok(Some(Profile::new(name, email, phone)))
}

async fn prompt(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    input.next_line().await
}

async fn chat<G: AssistantGateway + 'static>(
    engine: &ConversationEngine<G>,
    input: &mut Input,
) -> std::io::Result<Command> {
    println!("(type /reset for a new session, /quit to leave)");
    let renderer = spawn_renderer(engine.subscribe());

    let command = loop {
        let Some(line) = input.next_line().await? else {
            break Command::Quit;
        };
        match line.trim() {
            "/quit" => break Command::Quit,
            "/reset" => break Command::Reset,
            _ => {}
        }

        if !engine.snapshot().input_enabled {
            println!("Session complete. Type /reset to start over.");
            continue;
        }
        if let Err(e) = engine.submit(&line).await {
            tracing::debug!(error = %e, "Message rejected");
        }
    };

    renderer.abort();
    Ok(command)
}

/// Print whatever changed since the last snapshot
fn spawn_renderer(mut rx: watch::Receiver<ConversationSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut renderer = Renderer::default();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            renderer.render(&snapshot);
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}

#[derive(Default)]
struct Renderer {
    shown: usize,
    error: Option<String>,
    qualified: bool,
}

impl Renderer {
    fn render(&mut self, snapshot: &ConversationSnapshot) {
        for message in snapshot.messages.iter().skip(self.shown) {
            // The user's own lines are already on screen
            if message.role == lead_chat::state_machine::Role::Assistant {
                println!("assistant> {}", message.content);
            }
        }
        self.shown = snapshot.messages.len();

        if snapshot.pending {
            println!("...thinking");
        }
        if snapshot.last_error != self.error {
            if let Some(error) = &snapshot.last_error {
                println!("! {error}");
            }
            self.error.clone_from(&snapshot.last_error);
        }
        if snapshot.qualified && !self.qualified {
            self.qualified = true;
            println!(
                "Great news! You've been qualified. A team member will reach out to you within the next hour."
            );
        }
    }
}

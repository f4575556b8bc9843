use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ragchat_core::{
    Config, ConversationController, DocumentKind, HttpTransport, MessageStore, QueryOutcome,
    Role, Transport, UploadController, UploadFile, UploadOutcome,
};
use tracing::{info, warn};

mod app;
mod handler;
mod input;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(version, about = "Chat with your documents through a RAG backend")]
struct Cli {
    /// Backend base URL (overrides RAGCHAT_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Ask a single question and print the answer with its sources
    Ask {
        /// Your question
        question: String,
    },
    /// Upload a document for indexing
    Upload {
        /// Path to a PDF, DOCX, TXT, CSV or HTML file
        path: PathBuf,
    },
    /// Show backend health
    Health,
    /// Write a config file with the default settings
    Init,
}

/// Everything a session needs, wired from one config
struct Session {
    api_url: String,
    transport: Arc<dyn Transport>,
    conversation: ConversationController,
    uploads: UploadController,
}

impl Session {
    fn new(config: &Config, api_url_flag: Option<&str>) -> Self {
        let api_url = config.resolve_api_url(api_url_flag);
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&api_url));
        let templates = Arc::new(config.messages.clone());
        let store = MessageStore::new();

        let conversation = ConversationController::new(
            store.clone(),
            transport.clone(),
            config.history_policy(),
            templates.clone(),
        );
        let uploads = UploadController::new(store, transport.clone(), templates)
            .with_clear_after(config.status_clear_after());

        Self {
            api_url,
            transport,
            conversation,
            uploads,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);
    let interactive = matches!(command, Commands::Chat);

    let log_path = logging::init(cli.verbose, interactive)?;
    if let Some(path) = &log_path {
        info!(path = %path.display(), "Logging to file");
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Could not load config, using defaults");
        Config::new()
    });
    let session = Session::new(&config, cli.api_url.as_deref());
    info!(
        api_url = %session.api_url,
        policy = session.conversation.policy().as_str(),
        "Session ready"
    );

    match command {
        Commands::Chat => run_tui(session).await?,
        Commands::Ask { question } => ask(&session, &question).await?,
        Commands::Upload { path } => upload(&session, path).await?,
        Commands::Health => health(&session).await?,
        Commands::Init => init_config()?,
    }

    Ok(())
}

async fn run_tui(session: Session) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(
        session.conversation,
        session.uploads,
        session.api_url,
        events.sender(),
    );

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(session: &Session, question: &str) -> Result<()> {
    let store = session.conversation.store().clone();

    match session.conversation.submit_query(question).await {
        QueryOutcome::Ignored(_) => bail!("Question is empty"),
        QueryOutcome::Failed => {
            if let Some(reply) = store.snapshot().last() {
                eprintln!("{}", reply.content());
            }
            bail!("Query to {} failed", session.api_url);
        }
        QueryOutcome::Answered => {}
    }

    let messages = store.snapshot();
    let Some(answer) = messages.iter().rev().find(|m| m.role() == Role::Assistant) else {
        bail!("No answer recorded");
    };

    println!("{}", answer.content());
    if !answer.sources().is_empty() {
        println!();
        println!("Sources:");
        for source in answer.sources() {
            println!("  - {}", source.label());
        }
    }
    Ok(())
}

async fn upload(session: &Session, path: PathBuf) -> Result<()> {
    if DocumentKind::from_path(&path).is_none() {
        bail!("Unsupported file type: {}", path.display());
    }
    let file = UploadFile::from_path(&path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;

    let outcome = session.uploads.submit_upload(Some(file)).await;
    let status = session.uploads.status();
    match outcome {
        UploadOutcome::Uploaded => {
            println!("{}", status.label);
            Ok(())
        }
        UploadOutcome::Failed => bail!("{}", status.label),
        UploadOutcome::Ignored(reason) => bail!("Upload skipped: {:?}", reason),
    }
}

async fn health(session: &Session) -> Result<()> {
    let report = session
        .transport
        .health()
        .await
        .with_context(|| format!("Could not reach {}", session.api_url))?;

    println!("{}: {}", session.api_url, report.status);
    let mut services: Vec<_> = report.services.iter().collect();
    services.sort();
    for (name, state) in services {
        println!("  {:<10} {}", name, state);
    }
    Ok(())
}

fn init_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::new().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

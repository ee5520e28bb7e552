//! Headless chat harness
//!
//! Every line read from stdin is sent as a user message; the transcript,
//! canned replies included, is written to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mockchat::app::ChatSession;
use mockchat::storage::settings::{load_settings, load_settings_from};
use mockchat::storage::StorageError;
use mockchat::ui::chat::{ChatView, RenderAdapter};
use mockchat::ui::transcript::{TranscriptFormat, TranscriptPrinter};

#[derive(Parser)]
#[command(name = "mockchat")]
#[command(version, about = "Headless mock chat with canned auto-replies", long_about = None)]
struct Cli {
    /// Settings file (defaults to the app data directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Reply delay in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Seed for reply selection
    #[arg(long)]
    seed: Option<u64>,

    /// Start without the welcome message
    #[arg(long)]
    no_welcome: bool,

    /// Print one JSON object per message
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// A line typed into the harness
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Quit,
    KeyboardShow(f64),
    KeyboardHide,
    View,
    Send(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    match trimmed.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["/quit"] => Command::Quit,
        ["/view"] => Command::View,
        ["/keyboard", "off"] => Command::KeyboardHide,
        ["/keyboard", height] => match height.parse::<f64>() {
            Ok(h) => Command::KeyboardShow(h),
            Err(_) => Command::Send(line),
        },
        _ => Command::Send(line),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StorageError> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "mockchat=debug" } else { "mockchat=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = match &cli.settings {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(delay_ms) = cli.delay_ms {
        settings.reply_delay_ms = delay_ms;
    }
    if cli.seed.is_some() {
        settings.reply_seed = cli.seed;
    }
    if cli.no_welcome {
        settings.seed_welcome = false;
    }
    settings.validate();

    let format = if cli.json {
        TranscriptFormat::Json
    } else {
        TranscriptFormat::Text
    };

    let printer = Arc::new(TranscriptPrinter::new(std::io::stdout(), format));
    let view = Arc::new(ChatView::new(settings.viewport()));
    let adapters: Vec<Arc<dyn RenderAdapter>> = vec![printer, view.clone()];
    let (mut session, _subscriptions) = ChatSession::open(&settings, adapters);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::KeyboardShow(height) => view.keyboard_will_show(height),
            Command::KeyboardHide => view.keyboard_will_hide(),
            Command::View => {
                let layout = view.layout();
                eprintln!(
                    "rows={} anchor={:?} offset={:.1} inset={:.1} visible={:.1}",
                    view.len(),
                    layout.anchor,
                    layout.scroll_offset,
                    layout.content_inset,
                    layout.visible_height
                );
            }
            Command::Send(text) => {
                if let Err(e) = session.send_text(text) {
                    tracing::debug!("Send ignored: {}", e);
                }
            }
        }
    }

    if session.pending_replies() > 0 {
        tracing::info!("Waiting for {} pending replies", session.pending_replies());
        session.wait_for_replies().await;
    }
    session.close();
    Ok(())
}

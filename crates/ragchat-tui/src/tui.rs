use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind,
        MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the "Thinking..." animation
const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
    /// A background round-trip finished and changed shared state
    Refresh,
}

/// Merges terminal input, the animation tick and wake-ups from spawned
/// round-trips into one queue the main loop drains.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_terminal_events(tx.clone()));
        tokio::spawn(tick(tx.clone()));
        Self { rx, tx }
    }

    /// Handle for background tasks to wake the UI
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

async fn forward_terminal_events(tx: mpsc::UnboundedSender<AppEvent>) {
    let mut reader = EventStream::new();
    while let Some(evt) = reader.next().await {
        let event = match evt {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Ok(Event::Mouse(mouse)) => AppEvent::Mouse(mouse),
            Ok(Event::Resize(..)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Terminal event stream error");
                continue;
            }
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}

async fn tick(tx: mpsc::UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_RATE);
    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

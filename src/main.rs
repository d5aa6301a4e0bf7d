mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod theme;
mod tui;
mod ui;
mod view;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::app::{App, AppOptions};
use crate::config::{AppConfig, GeneralConfig, WatcherConfig};
use crate::event::{Event, EventHandler};
use crate::fs::store::FsStore;
use crate::fs::watcher::{FsWatcher, DEFAULT_FLOOD_THRESHOLD, DEFAULT_IGNORE_PATTERNS};
use crate::tui::{install_panic_hook, Tui};
use crate::view::persist::{PersistedState, StateFile};

/// A dual-pane terminal browser for note folders: a folder tree on the left,
/// previews of the selected folder's files on the right.
#[derive(Parser, Debug)]
#[command(name = "fp-tui", version, about)]
struct Cli {
    /// Vault root (defaults to the configured path, then the current directory)
    path: Option<PathBuf>,

    /// Path to a config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable filesystem watcher (auto-refresh)
    #[arg(long)]
    no_watcher: bool,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Where to keep the view state (selection, collapsed folders, settings)
    #[arg(long, value_name = "FILE")]
    state_file: Option<PathBuf>,

    /// Log file path
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags that override config values.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: self.no_mouse.then_some(false),
                ..GeneralConfig::default()
            },
            watcher: WatcherConfig {
                enabled: self.no_watcher.then_some(false),
                ..WatcherConfig::default()
            },
            ..AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    if let Some(log_path) = cli.log_file.clone().or_else(logging::default_log_path) {
        if let Err(e) = logging::init(&log_path) {
            eprintln!("warning: logging disabled: {}", e);
        }
    }

    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    let raw_path = cli
        .path
        .clone()
        .or_else(|| config.general.default_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let root = raw_path.canonicalize().map_err(|_| {
        error::AppError::InvalidPath(format!("{} does not exist", raw_path.display()))
    })?;
    if !root.is_dir() {
        return Err(error::AppError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    info!(root = %root.display(), "opening vault");

    let state_file = match cli.state_file.clone() {
        Some(path) => Some(StateFile::new(path, &root)),
        None => StateFile::for_vault(&root),
    };
    let view_store = match &state_file {
        Some(file) => file.load().into_store(config.view_defaults()),
        None => PersistedState::default().into_store(config.view_defaults()),
    };

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(100));
    let event_tx = events.sender();

    let watcher = if config.watcher_enabled() {
        let ignore_patterns = DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect();
        match FsWatcher::new(
            &root,
            Duration::from_millis(config.debounce_ms()),
            ignore_patterns,
            DEFAULT_FLOOD_THRESHOLD,
            event_tx.clone(),
        ) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!("watcher unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let store = Arc::new(FsStore::new(&root, config.show_hidden()));
    let options = AppOptions {
        confirm_delete: config.confirm_delete(),
        max_preview_bytes: config.max_preview_bytes(),
        watcher_active: watcher.is_some(),
        state_file,
        theme: theme::resolve_theme(&config.theme),
    };
    let mut app = App::new(store, view_store, options, event_tx);
    if config.watcher_enabled() && watcher.is_none() {
        app.set_status_message("⚠ Watcher unavailable, press R to refresh".into());
    }
    app.open();

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            other => app.handle_event(other),
        }

        // Sync watcher pause/resume state
        match &watcher {
            Some(w) if app.watcher_active && !w.is_active() => w.resume(),
            Some(w) if !app.watcher_active && w.is_active() => w.pause(),
            Some(_) => {}
            None => app.watcher_active = false,
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    info!("closed");
    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::fs::path::VaultPath;
use crate::fs::store::FolderNode;
use crate::view::preview_view::PreviewCard;

/// Which store mutation an [`OperationResult`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CreateNote,
    CreateFolder,
    Rename,
    Move,
    Trash,
}

impl OperationKind {
    pub fn past_tense(&self) -> &'static str {
        match self {
            OperationKind::CreateNote => "Created",
            OperationKind::CreateFolder => "Created folder",
            OperationKind::Rename => "Renamed to",
            OperationKind::Move => "Moved to",
            OperationKind::Trash => "Trashed",
        }
    }
}

/// Result of a store mutation run on the blocking pool.
#[derive(Debug)]
pub struct OperationResult {
    pub kind: OperationKind,
    /// Entry the operation acted on, for rename/move/trash.
    pub source: Option<VaultPath>,
    /// The entry's final path.
    pub outcome: Result<VaultPath>,
}

/// Result of a tree load run on the blocking pool.
#[derive(Debug)]
pub struct TreeLoad {
    pub root: Result<FolderNode>,
    /// Selected folder when the load was requested.
    pub selection: VaultPath,
    /// Whether the store still had `selection` at load time.
    pub selection_exists: bool,
}

/// Application events.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// A periodic tick for rendering.
    Tick,
    Resize(u16, u16),
    /// Filesystem change detected by watcher.
    FsChange(Vec<PathBuf>),
    /// A tree load finished.
    TreeLoaded(TreeLoad),
    /// A preview pass finished. Applied only if `generation` is still current.
    PreviewRendered {
        generation: u64,
        folder: VaultPath,
        cards: Result<Vec<PreviewCard>>,
    },
    OperationComplete(OperationResult),
    /// Re-issue a tree request that was dropped while another was in flight.
    RetryTreeRender,
    /// One-shot re-render shortly after open.
    InitialRerender,
    /// A file was opened from the preview pane.
    FileOpened(VaultPath),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            loop {
                let polled = tokio::task::block_in_place(|| event::poll(tick_rate));
                if !polled.unwrap_or(false) {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    continue;
                }
                let forwarded = match event::read() {
                    Ok(CrosstermEvent::Key(key)) => Some(Event::Key(key)),
                    Ok(CrosstermEvent::Mouse(mouse)) => Some(Event::Mouse(mouse)),
                    Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
                    _ => None,
                };
                if let Some(ev) = forwarded {
                    if event_tx.send(ev).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx, tx }
    }

    /// Sender for background tasks that report back into the loop.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| crate::error::AppError::Terminal("Event channel closed".into()))
    }
}

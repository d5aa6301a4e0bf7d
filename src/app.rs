//! The view controller: owns the view state for one open vault and turns
//! gestures and background results into state changes and render requests.
//!
//! Everything here runs on the event loop. Store I/O is pushed onto the
//! blocking pool and comes back as [`Event`]s.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::event::{Event, OperationKind, OperationResult, TreeLoad};
use crate::fs::naming::{create_folder_unique, create_unique, rename_unique};
use crate::fs::path::{split_name, VaultPath};
use crate::fs::store::{FolderNode, FolderStore};
use crate::theme::ThemeColors;
use crate::view::extract::ExtractOptions;
use crate::view::persist::StateFile;
use crate::view::preview_view::{build_cards, PreviewCard, PreviewOptions, PreviewView};
use crate::view::scheduler::{schedule_once, RenderScheduler, INITIAL_RERENDER_DELAY, SETTLE_DELAY};
use crate::view::sort::SortOrder;
use crate::view::state::{clamp_line_count, clamp_tree_width, FolderIconStyle, ViewStore};
use crate::view::tree_view::{project, TreeView};
use crate::view::validator::{can_move, NodeRef};

/// How long a status notice stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

pub const DEFAULT_NOTE_NAME: &str = "Untitled.md";
pub const DEFAULT_FOLDER_NAME: &str = "Untitled";

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    CreateNote { parent: VaultPath },
    CreateFolder { parent: VaultPath },
    Rename { original: VaultPath },
    DeleteConfirm { target: NodeRef },
}

/// Entries of the row/card context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewNote,
    NewFolder,
    Rename,
    Delete,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::NewNote => "New note",
            MenuAction::NewFolder => "New folder",
            MenuAction::Rename => "Rename",
            MenuAction::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub target: NodeRef,
    pub actions: Vec<MenuAction>,
    pub cursor: usize,
    /// Screen cell the menu opens from.
    pub anchor: (u16, u16),
}

impl ContextMenu {
    /// Folders get the create actions; the root cannot be renamed or deleted.
    pub fn for_target(target: NodeRef, anchor: (u16, u16)) -> Self {
        let mut actions = Vec::with_capacity(4);
        if target.is_folder {
            actions.push(MenuAction::NewNote);
            actions.push(MenuAction::NewFolder);
        }
        if !target.path.is_root() {
            actions.push(MenuAction::Rename);
            actions.push(MenuAction::Delete);
        }
        Self {
            target,
            actions,
            cursor: 0,
            anchor,
        }
    }

    pub fn selected(&self) -> Option<MenuAction> {
        self.actions.get(self.cursor).copied()
    }
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
    Menu(ContextMenu),
}

/// State for a dialog's text input.
#[derive(Debug, Default)]
pub struct DialogState {
    pub input: String,
    pub cursor_position: usize,
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tree,
    Preview,
}

/// An entry being dragged toward a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub item: NodeRef,
}

/// Pane geometry from the last draw, used for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneLayout {
    pub tree: Rect,
    pub preview: Rect,
    pub status: Rect,
    pub menu: Option<Rect>,
}

impl PaneLayout {
    /// Column of the tree pane's right border, which doubles as the resize
    /// handle.
    pub fn divider_x(&self) -> u16 {
        (self.tree.x + self.tree.width).saturating_sub(1)
    }
}

/// Settings that come from config and CLI rather than the persisted state.
pub struct AppOptions {
    pub confirm_delete: bool,
    pub max_preview_bytes: u64,
    pub watcher_active: bool,
    pub state_file: Option<StateFile>,
    pub theme: ThemeColors,
}

/// Main application state.
pub struct App {
    store: Arc<dyn FolderStore>,
    pub view_store: ViewStore,
    scheduler: RenderScheduler,
    /// Last folder snapshot loaded from the store.
    pub graph: Option<FolderNode>,
    pub tree: TreeView,
    pub preview: PreviewView,
    pub focus: Focus,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub drag: Option<DragPayload>,
    /// Folder under the drag, highlighted in the tree.
    pub drop_target: Option<VaultPath>,
    /// Entry under a mouse press that has not turned into a drag yet.
    pub pressed: Option<NodeRef>,
    pub resizing_tree: bool,
    pub last_card_click: Option<(usize, Instant)>,
    pub layout: PaneLayout,
    pub theme: ThemeColors,
    pub status_message: Option<(String, Instant)>,
    pub watcher_active: bool,
    pub confirm_delete: bool,
    pub should_quit: bool,
    max_preview_bytes: u64,
    state_file: Option<StateFile>,
    tree_retry_pending: bool,
    tx: mpsc::UnboundedSender<Event>,
}

impl App {
    pub fn new(
        store: Arc<dyn FolderStore>,
        view_store: ViewStore,
        options: AppOptions,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            store,
            view_store,
            scheduler: RenderScheduler::new(),
            graph: None,
            tree: TreeView::default(),
            preview: PreviewView::default(),
            focus: Focus::Tree,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            drag: None,
            drop_target: None,
            pressed: None,
            resizing_tree: false,
            last_card_click: None,
            layout: PaneLayout::default(),
            theme: options.theme,
            status_message: None,
            watcher_active: options.watcher_active,
            confirm_delete: options.confirm_delete,
            should_quit: false,
            max_preview_bytes: options.max_preview_bytes,
            state_file: options.state_file,
            tree_retry_pending: false,
            tx,
        }
    }

    /// First renders, plus the one-shot re-render that picks up data the
    /// store had not finished indexing at open.
    pub fn open(&mut self) {
        self.request_tree_render();
        self.request_preview_render();
        schedule_once(&self.tx, INITIAL_RERENDER_DELAY, Event::InitialRerender);
    }

    /// Dispatch everything except raw input, which goes through `handler`.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(_) | Event::Mouse(_) | Event::Resize(_, _) => {}
            Event::Tick => self.clear_expired_status(),
            Event::FsChange(paths) => self.handle_fs_change(paths),
            Event::TreeLoaded(result) => self.apply_tree(result),
            Event::PreviewRendered {
                generation,
                folder,
                cards,
            } => self.apply_preview(generation, folder, cards),
            Event::OperationComplete(result) => self.handle_operation_complete(result),
            Event::RetryTreeRender => {
                self.tree_retry_pending = false;
                self.request_tree_render();
            }
            Event::InitialRerender => self.refresh(),
            Event::FileOpened(path) => self.mark_active_file(&path),
        }
    }

    /// Reload both panes.
    pub fn refresh(&mut self) {
        self.request_tree_render();
        self.request_preview_render();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Tree pass ───────────────────────────────────────────────────────────

    /// Load the folder snapshot off the event loop. If a load is already in
    /// flight the request is dropped and re-issued once things settle.
    pub fn request_tree_render(&mut self) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let selection = self.view_store.selected();
        let accepted = self.scheduler.request_tree_render(move || {
            let root = store.list_root();
            let selection_exists = store.exists(&selection);
            let _ = tx.send(Event::TreeLoaded(TreeLoad {
                root,
                selection,
                selection_exists,
            }));
        });
        if !accepted && !self.tree_retry_pending {
            self.tree_retry_pending = true;
            schedule_once(&self.tx, SETTLE_DELAY, Event::RetryTreeRender);
        }
    }

    fn apply_tree(&mut self, load: TreeLoad) {
        let TreeLoad {
            root,
            selection,
            selection_exists,
        } = load;
        let root = match root {
            Ok(root) => root,
            Err(e) => {
                warn!("tree load failed: {}", e);
                self.set_status_message(e.notice());
                return;
            }
        };
        debug!(
            runs = self.scheduler.tree_runs(),
            dropped = self.scheduler.tree_dropped(),
            "tree loaded"
        );
        // A selection made after the load was requested is left for the
        // next load to judge.
        let selected = self.view_store.selected();
        let vanished = selected == selection && !selection_exists;
        let fallback = if vanished && root.find(&selected).is_none() {
            nearest_existing(&root, &selected)
        } else {
            None
        };
        self.graph = Some(root);
        match fallback {
            Some(ancestor) => {
                debug!(from = %selected, to = %ancestor, "selected folder vanished");
                self.select_folder(&ancestor);
            }
            None => self.refresh_rows(),
        }
    }

    /// Re-project rows from the cached snapshot with the current collapse
    /// set, selection and display settings.
    ///
    /// During a drag the cursor stays on the drop target (or its nearest
    /// visible ancestor) rather than jumping back to the selection.
    pub fn refresh_rows(&mut self) {
        let Some(graph) = &self.graph else {
            return;
        };
        let rows = project(graph, &self.view_store);
        let anchor = match (&self.drag, &self.drop_target) {
            (Some(_), Some(target)) => target.clone(),
            _ => self.view_store.selected(),
        };
        self.tree.set_rows(rows, &anchor);
        if self.drag.is_some() {
            self.drop_target = self.tree.current().map(|row| row.path.clone());
        }
    }

    pub fn select_folder(&mut self, folder: &VaultPath) {
        if self.view_store.select(folder) {
            self.persist();
            self.refresh_rows();
            self.request_preview_render();
        } else {
            self.refresh_rows();
        }
    }

    pub fn toggle_collapse(&mut self, folder: &VaultPath) {
        let collapsed = self.view_store.toggle_collapse(folder);
        debug!(path = %folder, collapsed, "toggle collapse");
        self.persist();
        self.refresh_rows();
    }

    /// Collapse (`true`) or expand a folder; no-op when already in that state.
    pub fn set_collapsed(&mut self, folder: &VaultPath, collapsed: bool) {
        let changed = if collapsed {
            self.view_store.collapsed.collapse(folder)
        } else {
            self.view_store.collapsed.expand(folder)
        };
        if changed {
            self.persist();
            self.refresh_rows();
        }
    }

    /// Move the tree cursor. Outside a drag this also selects the row; during
    /// a drag it only moves the drop target.
    pub fn move_tree_cursor(&mut self, delta: isize) {
        if self.tree.rows.is_empty() {
            return;
        }
        let last = self.tree.rows.len() - 1;
        let idx = self.tree.cursor.saturating_add_signed(delta).min(last);
        self.tree_cursor_to(idx);
    }

    pub fn tree_cursor_to(&mut self, idx: usize) {
        let Some(row) = self.tree.rows.get(idx) else {
            return;
        };
        let path = row.path.clone();
        if self.drag.is_some() {
            self.tree.cursor = idx;
            self.drop_target = Some(path);
        } else {
            self.select_folder(&path);
        }
    }

    /// Left on an expanded folder collapses it; otherwise go to the parent.
    pub fn collapse_or_parent(&mut self) {
        let Some(row) = self.tree.current().cloned() else {
            return;
        };
        if row.has_children && !row.collapsed {
            self.set_collapsed(&row.path, true);
        } else if let Some(parent) = row.path.parent() {
            if let Some(idx) = self.tree.index_of(&parent) {
                self.tree_cursor_to(idx);
            }
        }
    }

    pub fn expand_current(&mut self) {
        if let Some(row) = self.tree.current().cloned() {
            if row.collapsed {
                self.set_collapsed(&row.path, false);
            }
        }
    }

    // ── Preview pass ────────────────────────────────────────────────────────

    fn preview_options(&self) -> PreviewOptions {
        PreviewOptions {
            sort_order: self.view_store.view.sort_order,
            extract: ExtractOptions {
                remove_link_brackets: self.view_store.view.remove_link_brackets,
            },
            max_preview_bytes: self.max_preview_bytes,
        }
    }

    /// Build cards for the selected folder off the event loop.
    pub fn request_preview_render(&mut self) {
        let folder = self.view_store.selected();
        let options = self.preview_options();
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.scheduler.request_preview_render(move |generation| {
            let cards = build_cards(store.as_ref(), &folder, &options);
            let _ = tx.send(Event::PreviewRendered {
                generation,
                folder,
                cards,
            });
        });
    }

    fn apply_preview(&mut self, generation: u64, folder: VaultPath, cards: Result<Vec<PreviewCard>>) {
        if !self.scheduler.is_current_preview(generation) {
            debug!(generation, "stale preview discarded");
            return;
        }
        match cards {
            Ok(cards) => self.preview.set_cards(folder, cards),
            Err(e) => {
                warn!(folder = %folder, "preview failed: {}", e);
                self.set_status_message(e.notice());
            }
        }
    }

    pub fn move_card_cursor(&mut self, delta: isize) {
        if self.preview.cards.is_empty() {
            return;
        }
        let last = self.preview.cards.len() - 1;
        self.preview.cursor = self.preview.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn focus_card(&mut self, idx: usize) {
        if idx < self.preview.cards.len() {
            self.preview.cursor = idx;
            self.focus = Focus::Preview;
        }
    }

    /// Report the focused card through the open channel.
    pub fn open_current_card(&mut self) {
        if let Some(card) = self.preview.current() {
            let _ = self.tx.send(Event::FileOpened(card.path.clone()));
        }
    }

    fn mark_active_file(&mut self, file: &VaultPath) {
        if self.view_store.set_active_file(file) {
            info!(path = %file, "opened");
            self.persist();
        }
        self.set_status_message(format!("Opened {}", file));
    }

    // ── Drag and drop ───────────────────────────────────────────────────────

    pub fn start_drag(&mut self, item: NodeRef) {
        if item.path.is_root() {
            self.set_status_message("✗ the root folder cannot be moved".into());
            return;
        }
        self.set_status_message(format!(
            "Moving {}: pick a folder, Enter to drop, Esc to cancel",
            item.path
        ));
        self.drag = Some(DragPayload { item });
        self.pressed = None;
        self.focus = Focus::Tree;
        self.drop_target = self.tree.current().map(|row| row.path.clone());
    }

    pub fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            self.drop_target = None;
            self.status_message = None;
            self.refresh_rows();
        }
    }

    /// Validate the move, then hand it to the store. The next tree render
    /// comes from the store's change notification.
    pub fn drop_on(&mut self, destination: &VaultPath) {
        let Some(DragPayload { item }) = self.drag.take() else {
            return;
        };
        self.drop_target = None;
        self.refresh_rows();
        if let Err(rejection) = can_move(self.store.as_ref(), &item, destination) {
            debug!(item = %item.path, to = %destination, "move rejected: {}", rejection);
            self.set_status_message(AppError::from(rejection).notice());
            return;
        }
        let from = item.path.clone();
        let dest = destination.clone();
        let name = from.name().to_string();
        self.spawn_operation(OperationKind::Move, Some(from.clone()), move |store| {
            rename_unique(store, &from, &dest, &name)
        });
    }

    // ── Store mutations ─────────────────────────────────────────────────────

    fn spawn_operation<F>(&self, kind: OperationKind, source: Option<VaultPath>, op: F)
    where
        F: FnOnce(&dyn FolderStore) -> Result<VaultPath> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = op(store.as_ref());
            let _ = tx.send(Event::OperationComplete(OperationResult {
                kind,
                source,
                outcome,
            }));
        });
    }

    pub fn create_note(&mut self, parent: &VaultPath, input: &str) {
        let name = match entry_name(input, DEFAULT_NOTE_NAME) {
            Ok(name) => note_file_name(name),
            Err(e) => return self.set_status_message(e.notice()),
        };
        let parent = parent.clone();
        self.spawn_operation(OperationKind::CreateNote, None, move |store| {
            create_unique(store, &parent, &name, "").map(|file| file.path)
        });
    }

    pub fn create_folder(&mut self, parent: &VaultPath, input: &str) {
        let name = match entry_name(input, DEFAULT_FOLDER_NAME) {
            Ok(name) => name.to_string(),
            Err(e) => return self.set_status_message(e.notice()),
        };
        let parent = parent.clone();
        self.spawn_operation(OperationKind::CreateFolder, None, move |store| {
            create_folder_unique(store, &parent, &name)
        });
    }

    pub fn rename_entry(&mut self, original: &VaultPath, input: &str) {
        let Some(parent) = original.parent() else {
            return self.set_status_message("✗ the root folder cannot be renamed".into());
        };
        let name = match entry_name(input, original.name()) {
            Ok(name) => name.to_string(),
            Err(e) => return self.set_status_message(e.notice()),
        };
        let from = original.clone();
        self.spawn_operation(OperationKind::Rename, Some(from.clone()), move |store| {
            rename_unique(store, &from, &parent, &name)
        });
    }

    /// Delete goes through a confirmation dialog unless disabled in config.
    pub fn request_delete(&mut self, target: NodeRef) {
        if target.path.is_root() {
            return self.set_status_message("✗ the root folder cannot be deleted".into());
        }
        if self.confirm_delete {
            self.open_dialog(DialogKind::DeleteConfirm { target });
        } else {
            self.trash_entry(&target.path);
        }
    }

    pub fn trash_entry(&mut self, path: &VaultPath) {
        let target = path.clone();
        self.spawn_operation(OperationKind::Trash, Some(target.clone()), move |store| {
            store.trash(&target).map(|()| target)
        });
    }

    fn handle_operation_complete(&mut self, result: OperationResult) {
        let OperationResult {
            kind,
            source,
            outcome,
        } = result;
        let path = match outcome {
            Ok(path) => path,
            Err(e) => {
                warn!(?kind, "operation failed: {}", e);
                self.set_status_message(e.notice());
                return;
            }
        };
        info!(?kind, path = %path, "operation complete");
        match (kind, source) {
            (OperationKind::Move | OperationKind::Rename, Some(from)) => {
                self.follow_rename(&from, &path)
            }
            (OperationKind::Trash, Some(from)) => self.forget_trashed(&from),
            _ => {}
        }
        self.set_status_message(format!("✓ {} {}", kind.past_tense(), path));
        if !self.watcher_active {
            self.refresh();
        }
    }

    /// Keep selection, active file and collapsed folders pointing at an entry that moved.
    fn follow_rename(&mut self, from: &VaultPath, to: &VaultPath) {
        let mut changed = self.view_store.collapsed.rebase(from, to);
        let view = &mut self.view_store.view;
        if let Some(moved) = view.selected_folder.as_ref().and_then(|s| s.rebase(from, to)) {
            view.selected_folder = Some(moved);
            changed = true;
        }
        if let Some(moved) = view.active_file.as_ref().and_then(|f| f.rebase(from, to)) {
            view.active_file = Some(moved);
            changed = true;
        }
        if changed {
            self.persist();
            self.refresh_rows();
            self.request_preview_render();
        }
    }

    fn forget_trashed(&mut self, trashed: &VaultPath) {
        let active_gone = self
            .view_store
            .view
            .active_file
            .as_ref()
            .is_some_and(|f| f.starts_with(trashed));
        if active_gone {
            self.view_store.view.active_file = None;
            self.persist();
        }
        if self.view_store.selected().starts_with(trashed) {
            let parent = trashed.parent().unwrap_or_default();
            self.select_folder(&parent);
        }
    }

    /// Pause or resume change notifications. Resuming re-renders to catch
    /// up on anything missed while paused.
    pub fn toggle_watcher(&mut self) {
        self.watcher_active = !self.watcher_active;
        if self.watcher_active {
            self.set_status_message("Watcher resumed".into());
            self.refresh();
        } else {
            self.set_status_message("Watcher paused".into());
        }
    }

    fn handle_fs_change(&mut self, paths: Vec<PathBuf>) {
        debug!(count = paths.len(), "store changed, re-rendering");
        self.refresh();
    }

    // ── Context menu ────────────────────────────────────────────────────────

    pub fn open_context_menu(&mut self, target: NodeRef, anchor: (u16, u16)) {
        let menu = ContextMenu::for_target(target, anchor);
        if !menu.actions.is_empty() {
            self.mode = AppMode::Menu(menu);
        }
    }

    /// Menu for whatever the focused pane's cursor is on.
    pub fn open_context_menu_at_cursor(&mut self) {
        let target = match self.focus {
            Focus::Tree => self.tree.current().map(|row| NodeRef::folder(row.path.clone())),
            Focus::Preview => self.preview.current().map(|card| NodeRef::file(card.path.clone())),
        };
        if let Some(target) = target {
            let anchor = (self.layout.tree.x + 2, self.layout.tree.y + 1);
            self.open_context_menu(target, anchor);
        }
    }

    pub fn menu_move(&mut self, delta: isize) {
        if let AppMode::Menu(menu) = &mut self.mode {
            let last = menu.actions.len().saturating_sub(1);
            menu.cursor = menu.cursor.saturating_add_signed(delta).min(last);
        }
    }

    pub fn close_menu(&mut self) {
        if matches!(self.mode, AppMode::Menu(_)) {
            self.mode = AppMode::Normal;
        }
    }

    /// Run the highlighted (or given) menu action.
    pub fn run_menu_action(&mut self, index: Option<usize>) {
        let AppMode::Menu(menu) = &self.mode else {
            return;
        };
        let menu = menu.clone();
        self.mode = AppMode::Normal;
        let action = match index {
            Some(i) => menu.actions.get(i).copied(),
            None => menu.selected(),
        };
        let Some(action) = action else {
            return;
        };
        let target = menu.target;
        match action {
            MenuAction::NewNote => self.open_dialog(DialogKind::CreateNote {
                parent: target.path,
            }),
            MenuAction::NewFolder => self.open_dialog(DialogKind::CreateFolder {
                parent: target.path,
            }),
            MenuAction::Rename => self.open_dialog(DialogKind::Rename {
                original: target.path,
            }),
            MenuAction::Delete => self.request_delete(target),
        }
    }

    // ── Dialogs ─────────────────────────────────────────────────────────────

    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_state = DialogState::default();
        if let DialogKind::Rename { original } = &kind {
            let name = original.name().to_string();
            self.dialog_state.cursor_position = name.len();
            self.dialog_state.input = name;
        }
        self.mode = AppMode::Dialog(kind);
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    /// Apply the open dialog with its current input.
    pub fn confirm_dialog(&mut self) {
        let AppMode::Dialog(kind) = &self.mode else {
            return;
        };
        let kind = kind.clone();
        self.mode = AppMode::Normal;
        let input = std::mem::take(&mut self.dialog_state).input;
        match kind {
            DialogKind::CreateNote { parent } => self.create_note(&parent, &input),
            DialogKind::CreateFolder { parent } => self.create_folder(&parent, &input),
            DialogKind::Rename { original } => self.rename_entry(&original, &input),
            DialogKind::DeleteConfirm { target } => self.trash_entry(&target.path),
        }
    }

    pub fn dialog_input_char(&mut self, c: char) {
        self.dialog_state
            .input
            .insert(self.dialog_state.cursor_position, c);
        self.dialog_state.cursor_position += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn dialog_delete_char(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
            self.dialog_state
                .input
                .remove(self.dialog_state.cursor_position);
        }
    }

    pub fn dialog_move_cursor_left(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
        }
    }

    pub fn dialog_move_cursor_right(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(next) = self.dialog_state.input[pos..].chars().next() {
            self.dialog_state.cursor_position += next.len_utf8();
        }
    }

    pub fn dialog_cursor_home(&mut self) {
        self.dialog_state.cursor_position = 0;
    }

    pub fn dialog_cursor_end(&mut self) {
        self.dialog_state.cursor_position = self.dialog_state.input.len();
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub fn set_sort_order(&mut self, order: SortOrder) {
        if self.view_store.view.sort_order == order {
            return;
        }
        self.view_store.view.sort_order = order;
        self.persist();
        self.set_status_message(format!("Sort: {}", order.label()));
        self.request_preview_render();
    }

    pub fn cycle_sort_order(&mut self) {
        self.set_sort_order(self.view_store.view.sort_order.next());
    }

    pub fn set_preview_line_count(&mut self, count: u8) {
        let count = clamp_line_count(count);
        if self.view_store.view.preview_line_count == count {
            return;
        }
        self.view_store.view.preview_line_count = count;
        self.persist();
        self.request_preview_render();
    }

    pub fn adjust_preview_line_count(&mut self, delta: i8) {
        let current = self.view_store.view.preview_line_count;
        self.set_preview_line_count(current.saturating_add_signed(delta));
    }

    pub fn set_remove_link_brackets(&mut self, remove: bool) {
        if self.view_store.view.remove_link_brackets == remove {
            return;
        }
        self.view_store.view.remove_link_brackets = remove;
        self.persist();
        self.set_status_message(format!(
            "Link brackets {}",
            if remove { "hidden" } else { "shown" }
        ));
        self.request_preview_render();
    }

    pub fn set_compact_mode(&mut self, compact: bool) {
        if self.view_store.view.compact_mode == compact {
            return;
        }
        self.view_store.view.compact_mode = compact;
        self.persist();
        self.refresh_rows();
    }

    pub fn set_folder_icon_style(&mut self, style: FolderIconStyle) {
        if self.view_store.view.folder_icon_style == style {
            return;
        }
        self.view_store.view.folder_icon_style = style;
        self.persist();
        self.set_status_message(format!("Folder icons: {}", style.label()));
        self.refresh_rows();
    }

    pub fn set_tree_width(&mut self, width: u16) {
        let width = clamp_tree_width(width);
        if self.view_store.view.tree_width == width {
            return;
        }
        self.view_store.view.tree_width = width;
        self.persist();
    }

    pub fn adjust_tree_width(&mut self, delta: i16) {
        let current = self.view_store.view.tree_width;
        self.set_tree_width(current.saturating_add_signed(delta));
    }

    // ── Status & persistence ────────────────────────────────────────────────

    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message once it has been shown for `STATUS_TTL`.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, created)) = &self.status_message {
            if created.elapsed() > STATUS_TTL {
                self.status_message = None;
            }
        }
    }

    /// Flush view state; failures are logged and otherwise ignored.
    fn persist(&self) {
        let Some(file) = &self.state_file else {
            return;
        };
        if let Err(e) = file.save(&self.view_store) {
            warn!("failed to save view state to {}: {}", file.path.display(), e);
        }
    }

    /// Display name of the vault root.
    pub fn vault_name(&self) -> &str {
        self.graph.as_ref().map(|g| g.name.as_str()).unwrap_or("vault")
    }
}

/// Deepest folder on `path`'s ancestor chain that exists in `root`.
fn nearest_existing(root: &FolderNode, path: &VaultPath) -> Option<VaultPath> {
    let mut cursor = path.parent();
    while let Some(candidate) = cursor {
        if root.find(&candidate).is_some() {
            return Some(candidate);
        }
        cursor = candidate.parent();
    }
    None
}

/// Trimmed user input, or `default` when blank. Separators and dot names
/// are rejected.
fn entry_name<'a>(input: &'a str, default: &'a str) -> Result<&'a str> {
    let name = input.trim();
    if name.is_empty() {
        return Ok(default);
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(AppError::InvalidPath(format!("'{}' is not a valid name", name)));
    }
    Ok(name)
}

/// Notes without an extension get `.md`.
fn note_file_name(name: &str) -> String {
    match split_name(name) {
        (_, Some(_)) => name.to_string(),
        (_, None) => format!("{}.md", name),
    }
}

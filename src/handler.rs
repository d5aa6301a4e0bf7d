use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode, DialogKind, Focus};
use crate::components::dialog::menu_hit;
use crate::components::preview::card_at;
use crate::components::tree::caret_column;
use crate::view::validator::NodeRef;

const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const TREE_WIDTH_STEP: i16 = 2;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }
    match &app.mode {
        AppMode::Dialog(DialogKind::DeleteConfirm { .. }) => handle_confirm_key(app, key),
        AppMode::Dialog(_) => handle_input_key(app, key),
        AppMode::Menu(_) => handle_menu_key(app, key),
        AppMode::Normal if app.drag.is_some() => handle_drag_key(app, key),
        AppMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                Focus::Tree => Focus::Preview,
                Focus::Preview => Focus::Tree,
            };
        }

        // Creation, gestures and menu
        KeyCode::Char('n') => {
            let parent = app.view_store.selected();
            app.open_dialog(DialogKind::CreateNote { parent });
        }
        KeyCode::Char('N') => {
            let parent = app.view_store.selected();
            app.open_dialog(DialogKind::CreateFolder { parent });
        }
        KeyCode::Char('r') => {
            if let Some(target) = focused_entry(app) {
                if !target.path.is_root() {
                    app.open_dialog(DialogKind::Rename {
                        original: target.path,
                    });
                }
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(target) = focused_entry(app) {
                app.request_delete(target);
            }
        }
        KeyCode::Char('m') => {
            if let Some(target) = focused_entry(app) {
                app.start_drag(target);
            }
        }
        KeyCode::Char('.') => app.open_context_menu_at_cursor(),
        KeyCode::Char('R') | KeyCode::F(5) => app.refresh(),
        KeyCode::Char('w') => app.toggle_watcher(),

        // Settings
        KeyCode::Char('s') => app.cycle_sort_order(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_preview_line_count(1),
        KeyCode::Char('-') => app.adjust_preview_line_count(-1),
        KeyCode::Char('b') => {
            let remove = !app.view_store.view.remove_link_brackets;
            app.set_remove_link_brackets(remove);
        }
        KeyCode::Char('c') => {
            let compact = !app.view_store.view.compact_mode;
            app.set_compact_mode(compact);
        }
        KeyCode::Char('i') => {
            let style = app.view_store.view.folder_icon_style.next();
            app.set_folder_icon_style(style);
        }
        KeyCode::Char('<') => app.adjust_tree_width(-TREE_WIDTH_STEP),
        KeyCode::Char('>') => app.adjust_tree_width(TREE_WIDTH_STEP),

        _ => match app.focus {
            Focus::Tree => handle_tree_key(app, key),
            Focus::Preview => handle_preview_key(app, key),
        },
    }
}

fn handle_tree_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_tree_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_tree_cursor(-1),
        KeyCode::PageDown => app.move_tree_cursor(10),
        KeyCode::PageUp => app.move_tree_cursor(-10),
        KeyCode::Char('g') | KeyCode::Home => app.tree_cursor_to(0),
        KeyCode::Char('G') | KeyCode::End => {
            let last = app.tree.rows.len().saturating_sub(1);
            app.tree_cursor_to(last);
        }
        KeyCode::Char('h') | KeyCode::Left => app.collapse_or_parent(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_current(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(row) = app.tree.current() {
                if row.has_children {
                    let path = row.path.clone();
                    app.toggle_collapse(&path);
                }
            }
        }
        _ => {}
    }
}

fn handle_preview_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_card_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_card_cursor(-1),
        KeyCode::PageDown => app.move_card_cursor(5),
        KeyCode::PageUp => app.move_card_cursor(-5),
        KeyCode::Char('g') | KeyCode::Home => app.move_card_cursor(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.move_card_cursor(isize::MAX),
        KeyCode::Enter => app.open_current_card(),
        KeyCode::Char('h') | KeyCode::Left => app.focus = Focus::Tree,
        _ => {}
    }
}

fn handle_drag_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.cancel_drag(),
        KeyCode::Char('j') | KeyCode::Down => app.move_tree_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_tree_cursor(-1),
        KeyCode::Enter | KeyCode::Char('m') => {
            if let Some(row) = app.tree.current() {
                let destination = row.path.clone();
                app.drop_on(&destination);
            }
        }
        _ => {}
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.menu_move(1),
        KeyCode::Char('k') | KeyCode::Up => app.menu_move(-1),
        KeyCode::Enter => app.run_menu_action(None),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('.') => app.close_menu(),
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Backspace => app.dialog_delete_char(),
        KeyCode::Left => app.dialog_move_cursor_left(),
        KeyCode::Right => app.dialog_move_cursor_right(),
        KeyCode::Home => app.dialog_cursor_home(),
        KeyCode::End => app.dialog_cursor_end(),
        KeyCode::Char(c) => app.dialog_input_char(c),
        _ => {}
    }
}

/// The entry under the focused pane's cursor: a folder row or a file card.
fn focused_entry(app: &App) -> Option<NodeRef> {
    match app.focus {
        Focus::Tree => app.tree.current().map(|row| NodeRef::folder(row.path.clone())),
        Focus::Preview => app.preview.current().map(|card| NodeRef::file(card.path.clone())),
    }
}

/// Tree row index under a screen cell.
fn tree_row_at(app: &App, column: u16, row: u16) -> Option<usize> {
    let area = app.layout.tree;
    let inside = column > area.x
        && column + 1 < area.x + area.width
        && row > area.y
        && row + 1 < area.y + area.height;
    if !inside {
        return None;
    }
    app.tree.row_at((row - area.y - 1) as usize)
}

/// Preview card index under a screen cell.
fn card_row_at(app: &App, column: u16, row: u16) -> Option<usize> {
    let area = app.layout.preview;
    let inside = column > area.x
        && column + 1 < area.x + area.width
        && row > area.y
        && row + 1 < area.y + area.height;
    if !inside {
        return None;
    }
    card_at(
        &app.preview,
        (row - area.y - 1) as usize,
        app.view_store.view.preview_line_count,
    )
}

fn on_caret(app: &App, idx: usize, column: u16) -> bool {
    let Some(row) = app.tree.rows.get(idx) else {
        return false;
    };
    if !row.has_children {
        return false;
    }
    let start = app.layout.tree.x + 1 + caret_column(row.depth, app.view_store.view.compact_mode) as u16;
    column >= start && column < start + 2
}

/// Handle a mouse event.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    let (column, row) = (mouse.column, mouse.row);

    if let AppMode::Menu(menu) = &app.mode {
        if let MouseEventKind::Down(button) = mouse.kind {
            let hit = app
                .layout
                .menu
                .and_then(|rect| menu_hit(menu, rect, column, row));
            match (button, hit) {
                (MouseButton::Left, Some(idx)) => app.run_menu_action(Some(idx)),
                _ => app.close_menu(),
            }
        }
        return;
    }
    if matches!(app.mode, AppMode::Dialog(_)) {
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let tree = app.layout.tree;
            if column == app.layout.divider_x() && row >= tree.y && row < tree.y + tree.height {
                app.resizing_tree = true;
            } else if let Some(idx) = tree_row_at(app, column, row) {
                app.focus = Focus::Tree;
                let path = app.tree.rows[idx].path.clone();
                if on_caret(app, idx, column) {
                    app.toggle_collapse(&path);
                } else {
                    app.tree_cursor_to(idx);
                    app.pressed = Some(NodeRef::folder(path));
                }
            } else if let Some(idx) = card_row_at(app, column, row) {
                app.focus_card(idx);
                let now = Instant::now();
                let double = matches!(
                    app.last_card_click,
                    Some((last, at)) if last == idx && now.duration_since(at) <= DOUBLE_CLICK
                );
                if double {
                    app.last_card_click = None;
                    app.open_current_card();
                } else {
                    app.last_card_click = Some((idx, now));
                    app.pressed = Some(NodeRef::file(app.preview.cards[idx].path.clone()));
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.resizing_tree {
                let width = column.saturating_sub(app.layout.tree.x) + 1;
                app.set_tree_width(width);
                return;
            }
            if app.drag.is_none() {
                if let Some(item) = app.pressed.take() {
                    app.start_drag(item);
                }
            }
            if app.drag.is_some() {
                match tree_row_at(app, column, row) {
                    Some(idx) => app.tree_cursor_to(idx),
                    None => app.drop_target = None,
                }
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.resizing_tree = false;
            app.pressed = None;
            if app.drag.is_some() {
                match tree_row_at(app, column, row) {
                    Some(idx) => {
                        let destination = app.tree.rows[idx].path.clone();
                        app.drop_on(&destination);
                    }
                    None => app.cancel_drag(),
                }
            }
        }
        MouseEventKind::Down(MouseButton::Right) => {
            if let Some(idx) = tree_row_at(app, column, row) {
                let target = NodeRef::folder(app.tree.rows[idx].path.clone());
                app.open_context_menu(target, (column, row));
            } else if let Some(idx) = card_row_at(app, column, row) {
                app.focus_card(idx);
                let target = NodeRef::file(app.preview.cards[idx].path.clone());
                app.open_context_menu(target, (column, row));
            }
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            let delta = if mouse.kind == MouseEventKind::ScrollDown { 1 } else { -1 };
            if column < app.layout.preview.x {
                app.move_tree_cursor(delta);
            } else {
                app.move_card_cursor(delta);
            }
        }
        _ => {}
    }
}

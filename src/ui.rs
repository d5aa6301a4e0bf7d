use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode, Focus, PaneLayout};
use crate::components::dialog::{menu_rect, ContextMenuWidget, DialogWidget};
use crate::components::preview::{visible_cards, PreviewWidget};
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::theme::ThemeColors;

/// Minimum width left to the preview pane.
const MIN_PREVIEW_WIDTH: u16 = 20;

/// Split the screen into tree pane, preview pane and status line.
pub fn split(area: Rect, tree_width: u16) -> PaneLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let tree_width = tree_width.min(rows[0].width.saturating_sub(MIN_PREVIEW_WIDTH));
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(tree_width), Constraint::Min(0)])
        .split(rows[0]);
    PaneLayout {
        tree: panes[0],
        preview: panes[1],
        status: rows[1],
        menu: None,
    }
}

fn pane_block<'a>(title: String, focused: bool, theme: &ThemeColors) -> Block<'a> {
    let border = if focused {
        theme.border_focused_fg
    } else {
        theme.border_fg
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let view = &app.view_store.view;
    let mut layout = split(frame.area(), view.tree_width);
    let line_count = view.preview_line_count;

    // Scroll offsets depend on the inner (borderless) pane sizes.
    app.tree
        .update_scroll(layout.tree.height.saturating_sub(2) as usize);
    app.preview
        .update_scroll(visible_cards(layout.preview.height.saturating_sub(2), line_count));
    if let AppMode::Menu(menu) = &app.mode {
        layout.menu = Some(menu_rect(menu, frame.area()));
    }
    app.layout = layout;

    let app = &*app;
    let theme = &app.theme;
    let view = &app.view_store.view;

    let tree_block = pane_block(format!(" {} ", app.vault_name()), app.focus == Focus::Tree, theme);
    let tree = TreeWidget::new(&app.tree, theme)
        .icon_style(view.folder_icon_style)
        .compact(view.compact_mode)
        .drop_target(app.drop_target.as_ref())
        .block(tree_block);
    frame.render_widget(tree, layout.tree);

    let folder = app.view_store.selected();
    let preview_block = pane_block(
        format!(" {} · {} ", folder, app.preview.cards.len()),
        app.focus == Focus::Preview,
        theme,
    );
    let preview = PreviewWidget::new(&app.preview, theme, line_count)
        .focused(app.focus == Focus::Preview)
        .block(preview_block);
    frame.render_widget(preview, layout.preview);

    let location = folder.to_string();
    let info = format!(
        "{} files · {}",
        app.preview.cards.len(),
        view.sort_order.label()
    );
    let drag_info = app.drag.as_ref().map(|drag| match &app.drop_target {
        Some(target) => format!("moving {} → {}", drag.item.path, target),
        None => format!("moving {}", drag.item.path),
    });
    let mut status = StatusBarWidget::new(&location, &info, theme);
    if let Some((msg, _)) = &app.status_message {
        status = status.status_message(msg, msg.starts_with('✗'));
    }
    if let Some(drag) = &drag_info {
        status = status.drag_info(drag);
    }
    if !app.watcher_active {
        status = status.watcher_status("[watch off]");
    }
    frame.render_widget(status, layout.status);

    match &app.mode {
        AppMode::Normal => {}
        AppMode::Dialog(kind) => {
            frame.render_widget(DialogWidget::new(kind, &app.dialog_state, theme), frame.area());
        }
        AppMode::Menu(menu) => {
            if let Some(rect) = layout.menu {
                frame.render_widget(ContextMenuWidget::new(menu, theme), rect);
            }
        }
    }
}

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::{ContextMenu, DialogKind, DialogState};
use crate::theme::ThemeColors;

/// Calculate a centered rectangle within the given area.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn hint_line<'a>(hint: &'a str, theme: &ThemeColors) -> Line<'a> {
    Line::from(Span::styled(
        hint,
        Style::default()
            .fg(theme.dim_fg)
            .add_modifier(Modifier::DIM),
    ))
}

/// Centered modal for create, rename and delete.
pub struct DialogWidget<'a> {
    kind: &'a DialogKind,
    dialog_state: &'a DialogState,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(kind: &'a DialogKind, dialog_state: &'a DialogState, theme: &'a ThemeColors) -> Self {
        Self {
            kind,
            dialog_state,
            theme,
        }
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.kind {
            DialogKind::CreateNote { parent } => {
                let title = format!("New note in {}", parent);
                render_input_dialog(&title, self.dialog_state, self.theme, area, buf);
            }
            DialogKind::CreateFolder { parent } => {
                let title = format!("New folder in {}", parent);
                render_input_dialog(&title, self.dialog_state, self.theme, area, buf);
            }
            DialogKind::Rename { original } => {
                let title = format!("Rename {}", original);
                render_input_dialog(&title, self.dialog_state, self.theme, area, buf);
            }
            DialogKind::DeleteConfirm { target } => {
                let what = if target.is_folder { "folder" } else { "file" };
                render_confirm_dialog(what, &target.path.to_string(), self.theme, area, buf);
            }
        }
    }
}

fn render_input_dialog(
    title: &str,
    state: &DialogState,
    theme: &ThemeColors,
    area: Rect,
    buf: &mut Buffer,
) {
    let dialog_width = 50.min(area.width.saturating_sub(4));
    let rect = centered_rect(dialog_width, 5, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog_border_fg))
        .style(Style::default().bg(theme.dialog_bg))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let input = &state.input;
    let pos = state.cursor_position.min(input.len());
    let before = &input[..pos];
    let (cursor_char, after) = match input[pos..].chars().next() {
        Some(c) => (&input[pos..pos + c.len_utf8()], &input[pos + c.len_utf8()..]),
        None => (" ", ""),
    };

    // Keep the cursor in view by dropping characters from the left.
    let max_width = inner.width as usize;
    let before_chars = before.chars().count();
    let before_display = if before_chars + 1 > max_width {
        let skip = before_chars + 1 - max_width;
        before
            .char_indices()
            .nth(skip)
            .map(|(i, _)| &before[i..])
            .unwrap_or("")
    } else {
        before
    };

    let input_style = Style::default().fg(theme.tree_fg);
    let cursor_style = Style::default()
        .bg(theme.tree_fg)
        .fg(theme.dialog_bg)
        .add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled(before_display, input_style),
        Span::styled(cursor_char, cursor_style),
        Span::styled(after, input_style),
    ]);
    buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);

    if inner.height > 1 {
        buf.set_line(
            inner.x,
            inner.y + inner.height - 1,
            &hint_line("[Enter] Confirm  [Esc] Cancel", theme),
            inner.width,
        );
    }
}

fn render_confirm_dialog(what: &str, target: &str, theme: &ThemeColors, area: Rect, buf: &mut Buffer) {
    let dialog_width = (target.chars().count() as u16 + 10)
        .max(40)
        .min(area.width.saturating_sub(4));
    let rect = centered_rect(dialog_width, 6, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(" Move to trash ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error_fg))
        .style(Style::default().bg(theme.dialog_bg))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let header = Line::from(Span::styled(
        format!("Delete this {}?", what),
        Style::default()
            .fg(theme.warning_fg)
            .add_modifier(Modifier::BOLD),
    ));
    buf.set_line(inner.x, inner.y, &header, inner.width);

    if inner.height > 2 {
        let line = Line::from(Span::styled(
            format!("  • {}", target),
            Style::default().fg(theme.tree_fg),
        ));
        buf.set_line(inner.x, inner.y + 1, &line, inner.width);
    }

    buf.set_line(
        inner.x,
        inner.y + inner.height - 1,
        &hint_line("[y] Yes  [n/Esc] Cancel", theme),
        inner.width,
    );
}

/// Where the context menu lands: at its anchor, pushed back inside `area`.
pub fn menu_rect(menu: &ContextMenu, area: Rect) -> Rect {
    let width = menu
        .actions
        .iter()
        .map(|a| a.label().len() as u16)
        .max()
        .unwrap_or(0)
        + 6;
    let height = menu.actions.len() as u16 + 2;
    let width = width.min(area.width);
    let height = height.min(area.height);
    let (ax, ay) = menu.anchor;
    let x = ax.clamp(area.x, (area.x + area.width).saturating_sub(width));
    let y = ay.clamp(area.y, (area.y + area.height).saturating_sub(height));
    Rect::new(x, y, width, height)
}

/// Action index under a screen cell, if the cell is on a menu entry.
pub fn menu_hit(menu: &ContextMenu, rect: Rect, column: u16, row: u16) -> Option<usize> {
    let inside_x = column > rect.x && column + 1 < rect.x + rect.width;
    let inside_y = row > rect.y && row + 1 < rect.y + rect.height;
    if !(inside_x && inside_y) {
        return None;
    }
    let idx = (row - rect.y - 1) as usize;
    (idx < menu.actions.len()).then_some(idx)
}

/// Popup list of [`MenuAction`](crate::app::MenuAction)s for one entry.
pub struct ContextMenuWidget<'a> {
    menu: &'a ContextMenu,
    theme: &'a ThemeColors,
}

impl<'a> ContextMenuWidget<'a> {
    pub fn new(menu: &'a ContextMenu, theme: &'a ThemeColors) -> Self {
        Self { menu, theme }
    }
}

impl<'a> Widget for ContextMenuWidget<'a> {
    /// `area` is the rect from [`menu_rect`].
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let title = if self.menu.target.path.is_root() {
            "/".to_string()
        } else {
            self.menu.target.path.name().to_string()
        };
        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg));
        let inner = block.inner(area);
        block.render(area, buf);

        for (i, action) in self.menu.actions.iter().enumerate().take(inner.height as usize) {
            let style = if i == self.menu.cursor {
                Style::default()
                    .bg(self.theme.tree_selected_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.tree_fg)
            };
            let text = format!(" {:<width$} ", action.label(), width = inner.width.saturating_sub(2) as usize);
            buf.set_line(
                inner.x,
                inner.y + i as u16,
                &Line::from(Span::styled(text, style)),
                inner.width,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::MenuAction;
    use crate::fs::path::VaultPath;
    use crate::theme;
    use crate::view::validator::NodeRef;

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn test_input_dialog_renders() {
        let kind = DialogKind::CreateNote {
            parent: VaultPath::new("Projects"),
        };
        let state = DialogState {
            input: "Ideas".to_string(),
            cursor_position: 5,
        };
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(&kind, &state, &tc).render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("New note in /Projects"));
        assert!(content.contains("Ideas"));
        assert!(content.contains("[Enter] Confirm"));
    }

    #[test]
    fn test_input_dialog_handles_multibyte_cursor() {
        let kind = DialogKind::Rename {
            original: VaultPath::new("café.md"),
        };
        let state = DialogState {
            input: "café.md".to_string(),
            cursor_position: 3,
        };
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(&kind, &state, &tc).render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Rename /café.md"));
        assert!(content.contains("café.md"));
    }

    #[test]
    fn test_confirm_dialog_renders() {
        let kind = DialogKind::DeleteConfirm {
            target: NodeRef::folder(VaultPath::new("Archive/2023")),
        };
        let state = DialogState::default();
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(&kind, &state, &tc).render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Delete this folder?"));
        assert!(content.contains("/Archive/2023"));
        assert!(content.contains("[y] Yes"));
    }

    #[test]
    fn test_menu_stays_inside_area() {
        let menu = ContextMenu::for_target(NodeRef::folder(VaultPath::new("A")), (78, 22));
        let area = Rect::new(0, 0, 80, 24);
        let rect = menu_rect(&menu, area);
        assert!(rect.x + rect.width <= 80);
        assert!(rect.y + rect.height <= 24);
        assert_eq!(rect.height, 6);
    }

    #[test]
    fn test_menu_hit_and_render() {
        let menu = ContextMenu::for_target(NodeRef::file(VaultPath::new("A/n.md")), (2, 2));
        let area = Rect::new(0, 0, 40, 12);
        let rect = menu_rect(&menu, area);
        assert_eq!(rect, Rect::new(2, 2, 12, 4));
        assert_eq!(menu_hit(&menu, rect, 4, 3), Some(0));
        assert_eq!(menu_hit(&menu, rect, 4, 4), Some(1));
        assert_eq!(menu_hit(&menu, rect, 4, 2), None);
        assert_eq!(menu_hit(&menu, rect, 30, 3), None);

        let tc = theme::dark_theme();
        let mut buf = Buffer::empty(area);
        ContextMenuWidget::new(&menu, &tc).render(rect, &mut buf);
        let content = buffer_to_string(&buf, area);
        assert!(content.contains(MenuAction::Rename.label()));
        assert!(content.contains("Delete"));
        assert!(!content.contains("New note"));
        assert_eq!(buf.cell((3, 3)).unwrap().bg, tc.tree_selected_bg);
    }
}

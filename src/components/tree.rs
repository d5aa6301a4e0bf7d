use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::path::VaultPath;
use crate::theme::ThemeColors;
use crate::view::state::FolderIconStyle;
use crate::view::tree_view::{TreeRow, TreeView};

const CARET_EXPANDED: &str = "▾ ";
const CARET_COLLAPSED: &str = "▸ ";
const CARET_NONE: &str = "  ";

/// Folder tree pane.
pub struct TreeWidget<'a> {
    tree: &'a TreeView,
    theme: &'a ThemeColors,
    icon_style: FolderIconStyle,
    compact: bool,
    drop_target: Option<&'a VaultPath>,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree: &'a TreeView, theme: &'a ThemeColors) -> Self {
        Self {
            tree,
            theme,
            icon_style: FolderIconStyle::default(),
            compact: false,
            drop_target: None,
            block: None,
        }
    }

    pub fn icon_style(mut self, style: FolderIconStyle) -> Self {
        self.icon_style = style;
        self
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn drop_target(mut self, target: Option<&'a VaultPath>) -> Self {
        self.drop_target = target;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Guide lines for one row. The ancestors' last-sibling flags are found
    /// by walking back to the nearest row at each shallower depth.
    fn build_prefix(rows: &[TreeRow], index: usize, compact: bool) -> String {
        let row = &rows[index];
        if row.depth == 0 {
            return String::new();
        }
        if compact {
            return "  ".repeat(row.depth);
        }

        let mut prefix = String::new();
        for d in 1..row.depth {
            let ancestor_is_last = rows[..index]
                .iter()
                .rev()
                .take_while(|r| r.depth >= d)
                .find(|r| r.depth == d)
                .is_some_and(|r| r.is_last_sibling);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if row.is_last_sibling { "└──" } else { "├──" });
        prefix
    }

    fn caret(row: &TreeRow) -> &'static str {
        match (row.has_children, row.collapsed) {
            (false, _) => CARET_NONE,
            (true, true) => CARET_COLLAPSED,
            (true, false) => CARET_EXPANDED,
        }
    }

    fn icon(&self, row: &TreeRow) -> &'static str {
        let open = row.has_children && !row.collapsed;
        match self.icon_style {
            FolderIconStyle::Nerd if open => "\u{f07c} ",
            FolderIconStyle::Nerd => "\u{f07b} ",
            FolderIconStyle::Ascii => "[D] ",
            FolderIconStyle::Hidden => "",
        }
    }
}

/// Cell width taken by the guides before a row's caret.
pub fn caret_column(depth: usize, compact: bool) -> usize {
    if depth == 0 {
        0
    } else if compact {
        depth * 2
    } else {
        depth * 3
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        let rows = &self.tree.rows;
        let height = inner.height as usize;
        if rows.is_empty() || height == 0 {
            return;
        }

        let visible = rows
            .iter()
            .enumerate()
            .skip(self.tree.scroll_offset)
            .take(height);
        for (line_no, (idx, row)) in visible.enumerate() {
            let y = inner.y + line_no as u16;

            let is_drop_target = self.drop_target == Some(&row.path);
            let row_style = if is_drop_target {
                Style::default()
                    .bg(self.theme.drop_target_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else if row.selected {
                Style::default()
                    .bg(self.theme.tree_selected_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else if idx == self.tree.cursor {
                Style::default()
                    .fg(self.theme.tree_dir_fg)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(self.theme.tree_dir_fg)
            };

            let line = Line::from(vec![
                Span::styled(
                    Self::build_prefix(rows, idx, self.compact),
                    Style::default().fg(self.theme.tree_guide_fg),
                ),
                Span::styled(Self::caret(row), Style::default().fg(self.theme.tree_guide_fg)),
                Span::styled(format!("{}{}", self.icon(row), row.name), row_style),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::theme::ThemeColors;
use crate::view::preview_view::{CardBody, PreviewCard, PreviewView};

const GUTTER_FOCUSED: &str = "▌ ";
const GUTTER: &str = "  ";
const ELLIPSIS: char = '…';

/// Rows one card takes: title, `line_count` body lines, meta line, spacer.
pub fn card_height(line_count: u8) -> usize {
    line_count as usize + 3
}

/// Number of whole cards that fit in `height` rows (at least one).
pub fn visible_cards(height: u16, line_count: u8) -> usize {
    (height as usize / card_height(line_count)).max(1)
}

/// Card index under `line` rows below the top of the pane.
pub fn card_at(view: &PreviewView, line: usize, line_count: u8) -> Option<usize> {
    let idx = view.scroll_offset + line / card_height(line_count);
    (idx < view.cards.len()).then_some(idx)
}

/// Format a byte count as a human-readable size.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Hard-wrap `text` to `width` columns and keep at most `max_lines`. A cut
/// is marked with an ellipsis on the last kept line.
pub fn wrap_snippet(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for source in text.lines() {
        let chars: Vec<char> = source.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(chunk.iter().collect());
        }
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            if last.chars().count() >= width {
                last.pop();
            }
            last.push(ELLIPSIS);
        }
    }
    lines
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

/// Card list for the selected folder.
pub struct PreviewWidget<'a> {
    view: &'a PreviewView,
    theme: &'a ThemeColors,
    line_count: u8,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(view: &'a PreviewView, theme: &'a ThemeColors, line_count: u8) -> Self {
        Self {
            view,
            theme,
            line_count,
            focused: false,
            block: None,
        }
    }

    /// Whether the pane has keyboard focus; the cursor card is only marked
    /// when it does.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn body_lines(&self, card: &PreviewCard, width: usize) -> Vec<Line<'static>> {
        let body_style = Style::default().fg(self.theme.card_body_fg);
        let dim = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::ITALIC);
        let max = self.line_count as usize;
        match &card.body {
            CardBody::Text(snippet) if snippet.trim().is_empty() => {
                vec![Line::from(Span::styled("(empty)", dim))]
            }
            CardBody::Text(snippet) => wrap_snippet(snippet, width, max)
                .into_iter()
                .map(|l| Line::from(Span::styled(l, body_style)))
                .collect(),
            CardBody::Image { url } => vec![Line::from(vec![
                Span::styled("◫ ", Style::default().fg(self.theme.accent_fg)),
                Span::styled(truncate(url, width.saturating_sub(2)), dim),
            ])],
            CardBody::Placeholder(kind) => vec![Line::from(vec![
                Span::styled(
                    format!("{} ", kind.glyph()),
                    Style::default().fg(self.theme.accent_fg),
                ),
                Span::styled(kind.label(), dim),
            ])],
            CardBody::TooLarge => vec![Line::from(Span::styled("(too large to preview)", dim))],
            CardBody::Unreadable(reason) => vec![Line::from(Span::styled(
                truncate(&format!("(unreadable: {})", reason), width),
                Style::default().fg(self.theme.error_fg),
            ))],
        }
    }

    fn meta_line(&self, card: &PreviewCard) -> String {
        let modified: DateTime<Local> = card.modified.into();
        let ext = if card.extension.is_empty() {
            "file"
        } else {
            card.extension.as_str()
        };
        format!(
            "{} · {} · {}",
            ext,
            format_size(card.size),
            modified.format("%Y-%m-%d %H:%M")
        )
    }
}

impl<'a> Widget for PreviewWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.clone() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.view.cards.is_empty() {
            let line = Line::from(Span::styled(
                "No files in this folder",
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        }

        let text_width = (inner.width as usize).saturating_sub(GUTTER.len());
        let bottom = inner.y + inner.height;
        let mut y = inner.y;
        for (idx, card) in self.view.cards.iter().enumerate().skip(self.view.scroll_offset) {
            if y >= bottom {
                break;
            }
            let is_cursor = self.focused && idx == self.view.cursor;
            let gutter = if is_cursor {
                Span::styled(GUTTER_FOCUSED, Style::default().fg(self.theme.card_focus_fg))
            } else {
                Span::raw(GUTTER)
            };
            let title_style = if is_cursor {
                Style::default()
                    .fg(self.theme.card_focus_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(self.theme.card_title_fg)
                    .add_modifier(Modifier::BOLD)
            };

            let mut lines = vec![Line::from(Span::styled(
                truncate(&card.title, text_width),
                title_style,
            ))];
            lines.extend(self.body_lines(card, text_width));
            lines.push(Line::from(Span::styled(
                truncate(&self.meta_line(card), text_width),
                Style::default().fg(self.theme.card_meta_fg),
            )));

            // Body rows are padded so every card has the same height.
            let body_rows = self.line_count as usize;
            let meta_idx = lines.len() - 1;
            let mut rendered = 0;
            for (i, mut line) in lines.into_iter().enumerate() {
                if i == meta_idx {
                    y = y.saturating_add((body_rows + 1).saturating_sub(rendered) as u16);
                }
                if y >= bottom {
                    break;
                }
                line.spans.insert(0, gutter.clone());
                buf.set_line(inner.x, y, &line, inner.width);
                y += 1;
                rendered = i + 1;
            }
            y = y.saturating_add(1);
        }
    }
}

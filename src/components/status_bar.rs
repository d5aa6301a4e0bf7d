use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " Tab:pane  .:menu  m:move  s:sort  q:quit ";

/// Keep the last `budget` characters, marking the cut with `...`.
fn truncate_left(text: &str, budget: usize) -> String {
    let len = text.chars().count();
    if len <= budget {
        return text.to_string();
    }
    if budget <= 3 {
        return text.chars().take(budget).collect();
    }
    let tail: String = text.chars().skip(len - (budget - 3)).collect();
    format!("...{}", tail)
}

/// Bottom line: selected folder, pane info, indicators and key hints, or a
/// transient status notice.
pub struct StatusBarWidget<'a> {
    location: &'a str,
    info: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    drag_info: Option<&'a str>,
    watcher_status: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(location: &'a str, info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            location,
            info,
            theme,
            status_message: None,
            is_error: false,
            drag_info: None,
            watcher_status: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    pub fn drag_info(mut self, info: &'a str) -> Self {
        self.drag_info = Some(info);
        self
    }

    pub fn watcher_status(mut self, status: &'a str) -> Self {
        self.watcher_status = Some(status);
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        let base = Style::default().bg(self.theme.status_bg);

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
            } else {
                base.fg(self.theme.success_fg)
            };
            let shown: String = msg.chars().take(width).collect();
            let display = format!("{:<width$}", shown, width = width);
            buf.set_line(area.x, area.y, &Line::from(Span::styled(display, style)), area.width);
            return;
        }

        let mut indicators: Vec<Span> = Vec::new();
        if let Some(drag) = self.drag_info {
            indicators.push(Span::raw(" "));
            indicators.push(Span::styled(
                drag.to_string(),
                base.fg(self.theme.accent_fg).add_modifier(Modifier::BOLD),
            ));
        }
        if let Some(watcher) = self.watcher_status {
            indicators.push(Span::raw(" "));
            indicators.push(Span::styled(
                watcher.to_string(),
                base.fg(self.theme.warning_fg).add_modifier(Modifier::BOLD),
            ));
        }
        let indicators_len: usize = indicators.iter().map(|s| s.content.chars().count()).sum();

        // Hints go first when space runs out, then the info, then the path.
        let hints_len = KEY_HINTS.chars().count();
        let show_hints = width >= hints_len + indicators_len + 20;
        let remaining = width
            .saturating_sub(indicators_len)
            .saturating_sub(if show_hints { hints_len } else { 0 });

        let info_len = self.info.chars().count();
        let show_info = remaining > info_len + 10;
        let path_budget = if show_info {
            remaining - info_len - 1
        } else {
            remaining
        };
        let path_display = truncate_left(self.location, path_budget);
        let info_display = if show_info { self.info } else { "" };
        let gap = remaining
            .saturating_sub(path_display.chars().count())
            .saturating_sub(info_display.chars().count());

        let mut spans = vec![
            Span::styled(
                path_display,
                base.fg(self.theme.status_fg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ".repeat(gap), base),
            Span::styled(info_display, base.fg(self.theme.card_meta_fg)),
        ];
        spans.extend(indicators);
        if show_hints {
            spans.push(Span::styled(
                KEY_HINTS,
                base.fg(self.theme.dim_fg).add_modifier(Modifier::DIM),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

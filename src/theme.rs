//! Color palettes and their resolution from the `[theme]` config section.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

/// Every color the panes, cards and overlays draw with.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree pane
    pub tree_bg: Color,
    pub tree_fg: Color,
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_dir_fg: Color,
    pub tree_guide_fg: Color,

    // Preview cards
    pub card_title_fg: Color,
    pub card_meta_fg: Color,
    pub card_body_fg: Color,
    pub card_focus_fg: Color,

    pub status_bg: Color,
    pub status_fg: Color,

    pub border_fg: Color,
    pub border_focused_fg: Color,

    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    /// Highlight of the folder under a drag.
    pub drop_target_bg: Color,

    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

/// Catppuccin Mocha.
pub fn dark_theme() -> ThemeColors {
    let text = Color::Rgb(205, 214, 244);
    let blue = Color::Rgb(137, 180, 250);
    let overlay0 = Color::Rgb(108, 112, 134);
    ThemeColors {
        tree_bg: Color::Reset,
        tree_fg: text,
        tree_selected_bg: Color::Rgb(69, 71, 90),
        tree_selected_fg: text,
        tree_dir_fg: blue,
        tree_guide_fg: Color::Rgb(88, 91, 112),

        card_title_fg: Color::Rgb(180, 190, 254),
        card_meta_fg: overlay0,
        card_body_fg: Color::Rgb(186, 194, 222),
        card_focus_fg: Color::Rgb(203, 166, 247),

        status_bg: Color::Rgb(30, 30, 46),
        status_fg: text,

        border_fg: Color::Rgb(88, 91, 112),
        border_focused_fg: blue,

        dialog_bg: Color::Rgb(49, 50, 68),
        dialog_border_fg: blue,

        drop_target_bg: Color::Rgb(64, 97, 72),

        error_fg: Color::Rgb(243, 139, 168),
        warning_fg: Color::Rgb(249, 226, 175),
        success_fg: Color::Rgb(166, 227, 161),
        accent_fg: Color::Rgb(203, 166, 247),
        dim_fg: overlay0,
    }
}

/// Catppuccin Latte.
pub fn light_theme() -> ThemeColors {
    let text = Color::Rgb(76, 79, 105);
    let blue = Color::Rgb(30, 102, 245);
    let overlay0 = Color::Rgb(156, 160, 176);
    ThemeColors {
        tree_bg: Color::Reset,
        tree_fg: text,
        tree_selected_bg: Color::Rgb(204, 208, 218),
        tree_selected_fg: text,
        tree_dir_fg: blue,
        tree_guide_fg: Color::Rgb(172, 176, 190),

        card_title_fg: Color::Rgb(114, 135, 253),
        card_meta_fg: overlay0,
        card_body_fg: Color::Rgb(92, 95, 119),
        card_focus_fg: Color::Rgb(136, 57, 239),

        status_bg: Color::Rgb(239, 241, 245),
        status_fg: text,

        border_fg: Color::Rgb(172, 176, 190),
        border_focused_fg: blue,

        dialog_bg: Color::Rgb(230, 233, 239),
        dialog_border_fg: blue,

        drop_target_bg: Color::Rgb(200, 230, 201),

        error_fg: Color::Rgb(210, 15, 57),
        warning_fg: Color::Rgb(223, 142, 29),
        success_fg: Color::Rgb(64, 160, 43),
        accent_fg: Color::Rgb(136, 57, 239),
        dim_fg: overlay0,
    }
}

/// Parse `"#aabbcc"` (the `#` is optional). Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// `"light"` gives the light palette, `"custom"` the dark palette with
/// overrides, anything else the dark palette.
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref().unwrap_or("dark") {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    macro_rules! overlay {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(color) = custom.$field.as_deref().and_then(parse_hex_color) {
                    theme.$field = color;
                }
            )*
        };
    }
    overlay!(
        tree_bg,
        tree_fg,
        tree_selected_bg,
        tree_selected_fg,
        tree_dir_fg,
        tree_guide_fg,
        card_title_fg,
        card_meta_fg,
        card_body_fg,
        card_focus_fg,
        status_bg,
        status_fg,
        border_fg,
        dialog_bg,
        dialog_border_fg,
        drop_target_bg,
    );
}

//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--no-watcher`, `--no-mouse`)
//! 2. `$FP_TUI_CONFIG` environment variable (path to config file)
//! 3. Project-local `.fp-tui.toml` in the current working directory
//! 4. Global `~/.config/fp-tui/config.toml`
//! 5. Built-in defaults
//!
//! Values here only seed the view state on first launch; once a state file
//! exists its values win.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::view::sort::SortOrder;
use crate::view::state::{
    clamp_line_count, clamp_tree_width, FolderIconStyle, ViewState, DEFAULT_PREVIEW_LINES,
    DEFAULT_TREE_WIDTH,
};

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Vault root (overridden by CLI positional arg).
    pub default_path: Option<String>,
    /// List dot-entries in the tree and preview.
    pub show_hidden: Option<bool>,
    /// Ask before moving an entry to the trash.
    pub confirm_delete: Option<bool>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Preview pane settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Snippet lines per card (1-10).
    pub line_count: Option<u8>,
    /// Strip `[[...]]` and `[...](...)` down to their label.
    pub remove_link_brackets: Option<bool>,
    /// Text files larger than this are not read.
    pub max_preview_bytes: Option<u64>,
}

/// Tree pane settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Pane width in columns.
    pub width: Option<u16>,
    /// Tighter rows without tree guides.
    pub compact: Option<bool>,
    /// "nerd", "ascii" or "none".
    pub icon_style: Option<String>,
    /// One of the sort keys, e.g. "name-asc" or "modified-newest".
    pub sort_order: Option<String>,
}

/// Filesystem watcher settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    /// Enable filesystem watcher for auto-refresh.
    pub enabled: Option<bool>,
    /// Debounce interval in milliseconds.
    pub debounce_ms: Option<u64>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub tree_bg: Option<String>,
    pub tree_fg: Option<String>,
    pub tree_selected_bg: Option<String>,
    pub tree_selected_fg: Option<String>,
    pub tree_dir_fg: Option<String>,
    pub tree_guide_fg: Option<String>,
    pub card_title_fg: Option<String>,
    pub card_meta_fg: Option<String>,
    pub card_body_fg: Option<String>,
    pub card_focus_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
    pub drop_target_bg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub preview: PreviewConfig,
    pub tree: TreeConfig,
    pub watcher: WatcherConfig,
    pub theme: ThemeConfig,
}

/// Default cap on text files read for a snippet (512 KiB).
pub const DEFAULT_MAX_PREVIEW_BYTES: u64 = 512 * 1024;
/// Default debounce interval in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("FP_TUI_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".fp-tui.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("fp-tui").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (the parse error is logged).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!("failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            preview: PreviewConfig {
                line_count: other.preview.line_count.or(self.preview.line_count),
                remove_link_brackets: other
                    .preview
                    .remove_link_brackets
                    .or(self.preview.remove_link_brackets),
                max_preview_bytes: other
                    .preview
                    .max_preview_bytes
                    .or(self.preview.max_preview_bytes),
            },
            tree: TreeConfig {
                width: other.tree.width.or(self.tree.width),
                compact: other.tree.compact.or(self.tree.compact),
                icon_style: other.tree.icon_style.clone().or(self.tree.icon_style),
                sort_order: other.tree.sort_order.clone().or(self.tree.sort_order),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
                debounce_ms: other.watcher.debounce_ms.or(self.watcher.debounce_ms),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so higher-priority files overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    pub fn line_count(&self) -> u8 {
        clamp_line_count(self.preview.line_count.unwrap_or(DEFAULT_PREVIEW_LINES))
    }

    pub fn remove_link_brackets(&self) -> bool {
        self.preview.remove_link_brackets.unwrap_or(true)
    }

    pub fn max_preview_bytes(&self) -> u64 {
        self.preview
            .max_preview_bytes
            .unwrap_or(DEFAULT_MAX_PREVIEW_BYTES)
    }

    pub fn tree_width(&self) -> u16 {
        clamp_tree_width(self.tree.width.unwrap_or(DEFAULT_TREE_WIDTH))
    }

    pub fn compact(&self) -> bool {
        self.tree.compact.unwrap_or(false)
    }

    pub fn icon_style(&self) -> FolderIconStyle {
        self.tree
            .icon_style
            .as_deref()
            .map(FolderIconStyle::from_name)
            .unwrap_or_default()
    }

    /// Sort order; an unknown key falls back to name ascending.
    pub fn sort_order(&self) -> SortOrder {
        self.tree
            .sort_order
            .as_deref()
            .and_then(|key| key.parse().ok())
            .unwrap_or_default()
    }

    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    /// View state used when nothing has been persisted yet.
    pub fn view_defaults(&self) -> ViewState {
        ViewState {
            sort_order: self.sort_order(),
            preview_line_count: self.line_count(),
            tree_width: self.tree_width(),
            remove_link_brackets: self.remove_link_brackets(),
            compact_mode: self.compact(),
            folder_icon_style: self.icon_style(),
            ..ViewState::default()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(!cfg.show_hidden());
        assert!(cfg.confirm_delete());
        assert!(cfg.mouse_enabled());
        assert_eq!(cfg.line_count(), 3);
        assert!(cfg.remove_link_brackets());
        assert_eq!(cfg.max_preview_bytes(), 512 * 1024);
        assert_eq!(cfg.tree_width(), 32);
        assert!(!cfg.compact());
        assert_eq!(cfg.icon_style(), FolderIconStyle::Nerd);
        assert_eq!(cfg.sort_order(), SortOrder::NameAsc);
        assert!(cfg.watcher_enabled());
        assert_eq!(cfg.debounce_ms(), 300);
        assert_eq!(cfg.theme_scheme(), "dark");
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
show_hidden = true
confirm_delete = false
mouse = false

[preview]
line_count = 5
remove_link_brackets = false
max_preview_bytes = 2_000_000

[tree]
width = 40
compact = true
icon_style = "ascii"
sort_order = "modified-newest"

[watcher]
enabled = false
debounce_ms = 500

[theme]
scheme = "light"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(cfg.show_hidden());
        assert!(!cfg.confirm_delete());
        assert!(!cfg.mouse_enabled());
        assert_eq!(cfg.line_count(), 5);
        assert!(!cfg.remove_link_brackets());
        assert_eq!(cfg.max_preview_bytes(), 2_000_000);
        assert_eq!(cfg.tree_width(), 40);
        assert!(cfg.compact());
        assert_eq!(cfg.icon_style(), FolderIconStyle::Ascii);
        assert_eq!(cfg.sort_order(), SortOrder::ModifiedNewest);
        assert!(!cfg.watcher_enabled());
        assert_eq!(cfg.debounce_ms(), 500);
        assert_eq!(cfg.theme_scheme(), "light");
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let toml = r#"
[preview]
line_count = 40

[tree]
width = 3
sort_order = "bogus"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.line_count(), 10);
        assert_eq!(cfg.tree_width(), 16);
        assert_eq!(cfg.sort_order(), SortOrder::NameAsc);
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(!cfg.show_hidden());
        assert!(cfg.confirm_delete());
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            general: GeneralConfig {
                show_hidden: Some(false),
                confirm_delete: Some(true),
                ..Default::default()
            },
            preview: PreviewConfig {
                line_count: Some(2),
                max_preview_bytes: Some(100),
                ..Default::default()
            },
            ..Default::default()
        };

        let over = AppConfig {
            general: GeneralConfig {
                show_hidden: Some(true),
                ..Default::default()
            },
            preview: PreviewConfig {
                line_count: Some(6),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.show_hidden());
        assert!(merged.confirm_delete());
        assert_eq!(merged.line_count(), 6);
        assert_eq!(merged.max_preview_bytes(), 100);
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            watcher: WatcherConfig {
                enabled: Some(false),
                debounce_ms: Some(500),
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert!(!merged.watcher_enabled());
        assert_eq!(merged.debounce_ms(), 500);
    }

    #[test]
    fn test_load_missing_and_invalid_files() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());

        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[general]
show_hidden = true
mouse = true
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            general: GeneralConfig {
                mouse: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert!(!cfg.mouse_enabled());
        assert!(cfg.show_hidden());
    }

    #[test]
    fn test_view_defaults_follow_config() {
        let cfg: AppConfig = toml::from_str(
            r#"
[preview]
line_count = 4
remove_link_brackets = false

[tree]
icon_style = "none"
sort_order = "created-oldest"
"#,
        )
        .expect("parse");
        let view = cfg.view_defaults();
        assert_eq!(view.preview_line_count, 4);
        assert!(!view.remove_link_brackets);
        assert_eq!(view.folder_icon_style, FolderIconStyle::Hidden);
        assert_eq!(view.sort_order, SortOrder::CreatedOldest);
        assert!(view.selected_folder.is_none());
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
tree_bg = "#1a1b26"
card_title_fg = "#c0caf5"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        assert_eq!(cfg.theme_scheme(), "custom");
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.tree_bg.as_deref(), Some("#1a1b26"));
        assert_eq!(custom.card_title_fg.as_deref(), Some("#c0caf5"));
        assert!(custom.dialog_bg.is_none());
    }
}

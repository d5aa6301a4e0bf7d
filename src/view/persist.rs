//! Persisted view state: a flat TOML record rewritten after every change.
//!
//! Each vault root gets its own file, and the file records the root it was
//! written for, so one vault's selection never leaks into another.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::fs::path::VaultPath;
use crate::view::sort::SortOrder;
use crate::view::state::{
    clamp_line_count, clamp_tree_width, CollapseSet, FolderIconStyle, ViewState, ViewStore,
};

/// On-disk form of [`ViewStore`]. Every field is optional so older or
/// hand-edited files still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Vault root the state belongs to.
    pub root: Option<PathBuf>,
    pub selected_folder: Option<VaultPath>,
    pub active_file: Option<VaultPath>,
    pub sort_order: Option<SortOrder>,
    pub preview_line_count: Option<u8>,
    pub tree_width: Option<u16>,
    pub remove_link_brackets: Option<bool>,
    pub compact_mode: Option<bool>,
    pub folder_icon_style: Option<FolderIconStyle>,
    pub collapsed: Vec<VaultPath>,
}

impl PersistedState {
    pub fn from_store(store: &ViewStore) -> Self {
        let view = &store.view;
        Self {
            root: None,
            selected_folder: view.selected_folder.clone(),
            active_file: view.active_file.clone(),
            sort_order: Some(view.sort_order),
            preview_line_count: Some(view.preview_line_count),
            tree_width: Some(view.tree_width),
            remove_link_brackets: Some(view.remove_link_brackets),
            compact_mode: Some(view.compact_mode),
            folder_icon_style: Some(view.folder_icon_style),
            collapsed: store.collapsed.to_vec(),
        }
    }

    /// Overlay persisted values on `defaults` (built from config).
    pub fn into_store(self, defaults: ViewState) -> ViewStore {
        let view = ViewState {
            selected_folder: self.selected_folder.or(defaults.selected_folder),
            active_file: self.active_file.or(defaults.active_file),
            sort_order: self.sort_order.unwrap_or(defaults.sort_order),
            preview_line_count: clamp_line_count(
                self.preview_line_count
                    .unwrap_or(defaults.preview_line_count),
            ),
            tree_width: clamp_tree_width(self.tree_width.unwrap_or(defaults.tree_width)),
            remove_link_brackets: self
                .remove_link_brackets
                .unwrap_or(defaults.remove_link_brackets),
            compact_mode: self.compact_mode.unwrap_or(defaults.compact_mode),
            folder_icon_style: self.folder_icon_style.unwrap_or(defaults.folder_icon_style),
        };
        ViewStore::new(CollapseSet::from_paths(self.collapsed), view)
    }
}

/// Default state file for `root`: `<data_dir>/fp-tui/vaults/<key>.toml`.
pub fn default_state_path(root: &Path) -> Option<PathBuf> {
    dirs::data_dir().map(|d| {
        d.join("fp-tui")
            .join("vaults")
            .join(format!("{}.toml", vault_key(root)))
    })
}

/// File-name-safe form of a vault root.
fn vault_key(root: &Path) -> String {
    let key: String = root
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    match key.trim_matches('_') {
        "" => "root".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// A state file bound to one vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFile {
    pub path: PathBuf,
    pub root: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf, root: &Path) -> Self {
        Self {
            path,
            root: root.to_path_buf(),
        }
    }

    /// The default state file for `root`, if there is a data directory.
    pub fn for_vault(root: &Path) -> Option<Self> {
        default_state_path(root).map(|path| Self::new(path, root))
    }

    /// State saved for this vault. A file written for another root gives
    /// defaults.
    pub fn load(&self) -> PersistedState {
        let state = load(&self.path);
        match &state.root {
            Some(saved) if saved != &self.root => {
                info!(
                    "state file {} belongs to {}, starting fresh",
                    self.path.display(),
                    saved.display()
                );
                PersistedState::default()
            }
            _ => state,
        }
    }

    pub fn save(&self, store: &ViewStore) -> Result<()> {
        let state = PersistedState {
            root: Some(self.root.clone()),
            ..PersistedState::from_store(store)
        };
        save(&self.path, &state)
    }
}

/// Load state from `path`. Missing files give defaults; unparsable files are
/// logged and also give defaults.
pub fn load(path: &Path) -> PersistedState {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return PersistedState::default(),
    };
    match toml::from_str::<PersistedState>(&content) {
        Ok(state) => state,
        Err(e) => {
            warn!("ignoring unreadable state file {}: {}", path.display(), e);
            PersistedState::default()
        }
    }
}

/// Write state to `path` via a sibling temp file and rename.
pub fn save(path: &Path, state: &PersistedState) -> Result<()> {
    let body = toml::to_string_pretty(state).map_err(|e| AppError::Persist(e.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_store() -> ViewStore {
        let mut store = ViewStore::default();
        store.select(&VaultPath::new("A/B"));
        store.set_active_file(&VaultPath::new("A/B/n.md"));
        store.toggle_collapse(&VaultPath::new("C"));
        store.toggle_collapse(&VaultPath::new("A"));
        store.view.sort_order = SortOrder::CreatedOldest;
        store.view.preview_line_count = 7;
        store.view.tree_width = 40;
        store.view.compact_mode = true;
        store.view.folder_icon_style = FolderIconStyle::Ascii;
        store
    }

    #[test]
    fn save_then_load_restores_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.toml");
        let store = sample_store();
        save(&path, &PersistedState::from_store(&store)).unwrap();

        let loaded = load(&path).into_store(ViewState::default());
        assert_eq!(loaded, store);
        assert!(!dir.path().join("nested").join("state.toml.tmp").exists());
    }

    #[test]
    fn collapsed_is_written_as_ordered_sequence() {
        let state = PersistedState::from_store(&sample_store());
        let body = toml::to_string_pretty(&state).unwrap();
        assert!(body.contains("collapsed = ["));
        let a = body.find("\"A\"").unwrap();
        let c = body.find("\"C\"").unwrap();
        assert!(a < c);
        assert!(body.contains("sort_order = \"created-oldest\""));
    }

    #[test]
    fn state_from_another_vault_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        let store = sample_store();
        StateFile::new(path.clone(), Path::new("/vaults/a"))
            .save(&store)
            .unwrap();

        let same = StateFile::new(path.clone(), Path::new("/vaults/a")).load();
        assert_eq!(same.into_store(ViewState::default()), store);

        let other = StateFile::new(path, Path::new("/vaults/b")).load();
        assert_eq!(other, PersistedState::default());
    }

    #[test]
    fn default_path_is_keyed_by_root() {
        assert_eq!(vault_key(Path::new("/home/me/notes")), "home_me_notes");
        assert_eq!(vault_key(Path::new("/")), "root");
        if let (Some(a), Some(b)) = (
            default_state_path(Path::new("/vaults/a")),
            default_state_path(Path::new("/vaults/b")),
        ) {
            assert_ne!(a, b);
            assert!(a.ends_with("fp-tui/vaults/vaults_a.toml"));
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let state = load(Path::new("/nonexistent/fp/state.toml"));
        assert_eq!(state, PersistedState::default());
        let store = state.into_store(ViewState::default());
        assert_eq!(store, ViewStore::default());
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "sort_order = [[[").unwrap();
        assert_eq!(load(&path), PersistedState::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let state = PersistedState {
            preview_line_count: Some(99),
            tree_width: Some(1),
            ..Default::default()
        };
        let store = state.into_store(ViewState::default());
        assert_eq!(store.view.preview_line_count, 10);
        assert_eq!(store.view.tree_width, crate::view::state::MIN_TREE_WIDTH);
    }

    #[test]
    fn config_defaults_fill_gaps() {
        let defaults = ViewState {
            sort_order: SortOrder::ModifiedNewest,
            preview_line_count: 5,
            ..Default::default()
        };
        let state = PersistedState {
            preview_line_count: Some(2),
            ..Default::default()
        };
        let store = state.into_store(defaults);
        assert_eq!(store.view.sort_order, SortOrder::ModifiedNewest);
        assert_eq!(store.view.preview_line_count, 2);
    }
}

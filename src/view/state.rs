//! Collapse/selection store and the rest of the per-view state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fs::path::VaultPath;
use crate::view::sort::SortOrder;

pub const MIN_PREVIEW_LINES: u8 = 1;
pub const MAX_PREVIEW_LINES: u8 = 10;
pub const DEFAULT_PREVIEW_LINES: u8 = 3;

pub const MIN_TREE_WIDTH: u16 = 16;
pub const MAX_TREE_WIDTH: u16 = 120;
pub const DEFAULT_TREE_WIDTH: u16 = 32;

/// How folder rows are decorated in the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FolderIconStyle {
    /// Nerd Font folder glyphs.
    #[default]
    Nerd,
    /// Plain `[D]`-style markers.
    Ascii,
    /// No icon at all.
    Hidden,
}

impl FolderIconStyle {
    pub fn next(&self) -> Self {
        match self {
            FolderIconStyle::Nerd => FolderIconStyle::Ascii,
            FolderIconStyle::Ascii => FolderIconStyle::Hidden,
            FolderIconStyle::Hidden => FolderIconStyle::Nerd,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "ascii" => FolderIconStyle::Ascii,
            "none" | "hidden" => FolderIconStyle::Hidden,
            _ => FolderIconStyle::Nerd,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FolderIconStyle::Nerd => "nerd",
            FolderIconStyle::Ascii => "ascii",
            FolderIconStyle::Hidden => "none",
        }
    }
}

/// Folder paths whose children are hidden in the tree.
///
/// Membership is independent of whether the folder still exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseSet {
    paths: BTreeSet<VaultPath>,
}

impl CollapseSet {
    pub fn from_paths<I: IntoIterator<Item = VaultPath>>(paths: I) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Flip membership and return the new state (`true` = collapsed).
    pub fn toggle(&mut self, path: &VaultPath) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.clone());
            true
        }
    }

    pub fn contains(&self, path: &VaultPath) -> bool {
        self.paths.contains(path)
    }

    pub fn collapse(&mut self, path: &VaultPath) -> bool {
        self.paths.insert(path.clone())
    }

    pub fn expand(&mut self, path: &VaultPath) -> bool {
        self.paths.remove(path)
    }

    /// Move entries at or under `from` to `to`. Returns whether any moved.
    pub fn rebase(&mut self, from: &VaultPath, to: &VaultPath) -> bool {
        let moved: Vec<(VaultPath, VaultPath)> = self
            .paths
            .iter()
            .filter_map(|p| p.rebase(from, to).map(|n| (p.clone(), n)))
            .collect();
        for (old, new) in &moved {
            self.paths.remove(old);
            self.paths.insert(new.clone());
        }
        !moved.is_empty()
    }

    /// Ordered sequence for persistence.
    pub fn to_vec(&self) -> Vec<VaultPath> {
        self.paths.iter().cloned().collect()
    }
}

/// Per-view state owned by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selected_folder: Option<VaultPath>,
    pub active_file: Option<VaultPath>,
    pub sort_order: SortOrder,
    pub preview_line_count: u8,
    pub tree_width: u16,
    pub remove_link_brackets: bool,
    pub compact_mode: bool,
    pub folder_icon_style: FolderIconStyle,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selected_folder: None,
            active_file: None,
            sort_order: SortOrder::default(),
            preview_line_count: DEFAULT_PREVIEW_LINES,
            tree_width: DEFAULT_TREE_WIDTH,
            remove_link_brackets: true,
            compact_mode: false,
            folder_icon_style: FolderIconStyle::default(),
        }
    }
}

pub fn clamp_line_count(n: u8) -> u8 {
    n.clamp(MIN_PREVIEW_LINES, MAX_PREVIEW_LINES)
}

pub fn clamp_tree_width(w: u16) -> u16 {
    w.clamp(MIN_TREE_WIDTH, MAX_TREE_WIDTH)
}

/// Collapse set plus view state, mutated only by user gestures and settings.
///
/// Every operation accepts any path, including ones that do not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStore {
    pub collapsed: CollapseSet,
    pub view: ViewState,
}

impl ViewStore {
    pub fn new(collapsed: CollapseSet, view: ViewState) -> Self {
        Self { collapsed, view }
    }

    pub fn toggle_collapse(&mut self, path: &VaultPath) -> bool {
        self.collapsed.toggle(path)
    }

    pub fn is_collapsed(&self, path: &VaultPath) -> bool {
        self.collapsed.contains(path)
    }

    /// Set the selected folder. Returns `false` when it was already selected,
    /// in which case nothing needs re-rendering.
    pub fn select(&mut self, folder: &VaultPath) -> bool {
        if self.view.selected_folder.as_ref() == Some(folder) {
            return false;
        }
        self.view.selected_folder = Some(folder.clone());
        true
    }

    /// Set the active file. Returns `false` when unchanged.
    pub fn set_active_file(&mut self, file: &VaultPath) -> bool {
        if self.view.active_file.as_ref() == Some(file) {
            return false;
        }
        self.view.active_file = Some(file.clone());
        true
    }

    /// Selected folder, defaulting to the root.
    pub fn selected(&self) -> VaultPath {
        self.view.selected_folder.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> VaultPath {
        VaultPath::new(s)
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut store = ViewStore::default();
        assert!(!store.is_collapsed(&p("A")));
        assert!(store.toggle_collapse(&p("A")));
        assert!(store.is_collapsed(&p("A")));
        assert!(!store.toggle_collapse(&p("A")));
        assert!(!store.is_collapsed(&p("A")));

        store.collapsed.collapse(&p("B"));
        let before = store.collapsed.clone();
        store.toggle_collapse(&p("B"));
        store.toggle_collapse(&p("B"));
        assert_eq!(store.collapsed, before);
    }

    #[test]
    fn rebase_moves_collapsed_subtree() {
        let mut set = CollapseSet::from_paths([p("A"), p("A/B"), p("AB"), p("C")]);
        assert!(set.rebase(&p("A"), &p("C/A")));
        assert_eq!(set.to_vec(), vec![p("AB"), p("C"), p("C/A"), p("C/A/B")]);
        assert!(!set.rebase(&p("X"), &p("Y")));
    }

    #[test]
    fn nonexistent_paths_are_accepted() {
        let mut store = ViewStore::default();
        assert!(store.toggle_collapse(&p("does/not/exist")));
        assert!(store.select(&p("nowhere")));
        assert!(store.set_active_file(&p("ghost.md")));
    }

    #[test]
    fn select_same_folder_is_noop() {
        let mut store = ViewStore::default();
        store.set_active_file(&p("A/x.md"));
        assert!(store.select(&p("A")));
        assert!(!store.select(&p("A")));
        assert_eq!(store.view.active_file, Some(p("A/x.md")));
        assert!(store.select(&p("C")));
        assert_eq!(store.selected(), p("C"));
    }

    #[test]
    fn selected_defaults_to_root() {
        assert_eq!(ViewStore::default().selected(), VaultPath::root());
    }

    #[test]
    fn collapse_set_persists_in_order() {
        let set = CollapseSet::from_paths(vec![p("b"), p("a/c"), p("a")]);
        assert_eq!(set.to_vec(), vec![p("a"), p("a/c"), p("b")]);
    }

    #[test]
    fn clamps() {
        assert_eq!(clamp_line_count(0), 1);
        assert_eq!(clamp_line_count(42), 10);
        assert_eq!(clamp_line_count(4), 4);
        assert_eq!(clamp_tree_width(2), MIN_TREE_WIDTH);
        assert_eq!(clamp_tree_width(500), MAX_TREE_WIDTH);
    }

    #[test]
    fn icon_style_cycle_and_names() {
        let mut style = FolderIconStyle::Nerd;
        style = style.next();
        assert_eq!(style, FolderIconStyle::Ascii);
        style = style.next();
        assert_eq!(style, FolderIconStyle::Hidden);
        assert_eq!(style.next(), FolderIconStyle::Nerd);
        assert_eq!(FolderIconStyle::from_name("none"), FolderIconStyle::Hidden);
        assert_eq!(FolderIconStyle::from_name("whatever"), FolderIconStyle::Nerd);
    }
}

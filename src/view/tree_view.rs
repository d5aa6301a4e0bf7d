//! The tree pass: project a folder snapshot into visible rows.

use crate::fs::path::VaultPath;
use crate::fs::store::FolderNode;
use crate::view::state::ViewStore;

/// One visible folder row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub path: VaultPath,
    pub name: String,
    pub depth: usize,
    /// Whether the folder has child folders (and so a caret).
    pub has_children: bool,
    pub collapsed: bool,
    pub selected: bool,
    pub is_last_sibling: bool,
}

/// Rows currently shown in the tree pane plus cursor/scroll.
#[derive(Debug, Default)]
pub struct TreeView {
    pub rows: Vec<TreeRow>,
    pub cursor: usize,
    pub scroll_offset: usize,
}

/// Walk `root` and emit one row per folder, skipping the subtrees of
/// collapsed folders. Files never appear.
pub fn project(root: &FolderNode, store: &ViewStore) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    let selected = store.selected();
    push_rows(root, 0, true, store, &selected, &mut rows);
    rows
}

fn push_rows(
    node: &FolderNode,
    depth: usize,
    is_last: bool,
    store: &ViewStore,
    selected: &VaultPath,
    rows: &mut Vec<TreeRow>,
) {
    let collapsed = store.is_collapsed(&node.path);
    rows.push(TreeRow {
        path: node.path.clone(),
        name: node.name.clone(),
        depth,
        has_children: node.has_child_folders(),
        collapsed,
        selected: &node.path == selected,
        is_last_sibling: is_last,
    });
    if collapsed {
        return;
    }
    let count = node.folders.len();
    for (i, child) in node.folders.iter().enumerate() {
        push_rows(child, depth + 1, i + 1 == count, store, selected, rows);
    }
}

impl TreeView {
    /// Replace the rows and move the cursor onto the selected folder, or its
    /// nearest visible ancestor.
    pub fn set_rows(&mut self, rows: Vec<TreeRow>, selected: &VaultPath) {
        self.rows = rows;
        self.cursor = self.nearest_visible(selected).unwrap_or(0);
    }

    pub fn index_of(&self, path: &VaultPath) -> Option<usize> {
        self.rows.iter().position(|row| &row.path == path)
    }

    /// Row index of `path`, or of its closest ancestor that is visible.
    pub fn nearest_visible(&self, path: &VaultPath) -> Option<usize> {
        let mut cursor = Some(path.clone());
        while let Some(p) = cursor {
            if let Some(idx) = self.index_of(&p) {
                return Some(idx);
            }
            cursor = p.parent();
        }
        None
    }

    pub fn current(&self) -> Option<&TreeRow> {
        self.rows.get(self.cursor)
    }

    /// Update the scroll offset to ensure the cursor row is visible.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible_height {
            self.scroll_offset = self.cursor - visible_height + 1;
        }
    }

    /// Row index shown at `line` lines below the top of the pane.
    pub fn row_at(&self, line: usize) -> Option<usize> {
        let idx = self.scroll_offset + line;
        (idx < self.rows.len()).then_some(idx)
    }
}

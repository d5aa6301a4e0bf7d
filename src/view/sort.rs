//! File ordering for the preview pane.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fs::store::FileNode;

/// Preview card ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    ModifiedNewest,
    ModifiedOldest,
    CreatedNewest,
    CreatedOldest,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::NameAsc,
        SortOrder::NameDesc,
        SortOrder::ModifiedNewest,
        SortOrder::ModifiedOldest,
        SortOrder::CreatedNewest,
        SortOrder::CreatedOldest,
    ];

    /// Get the display label for the current sort.
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "Name A→Z",
            SortOrder::NameDesc => "Name Z→A",
            SortOrder::ModifiedNewest => "Modified (newest)",
            SortOrder::ModifiedOldest => "Modified (oldest)",
            SortOrder::CreatedNewest => "Created (newest)",
            SortOrder::CreatedOldest => "Created (oldest)",
        }
    }

    /// Cycle to the next sort option.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|o| o == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn key(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name-asc",
            SortOrder::NameDesc => "name-desc",
            SortOrder::ModifiedNewest => "modified-newest",
            SortOrder::ModifiedOldest => "modified-oldest",
            SortOrder::CreatedNewest => "created-newest",
            SortOrder::CreatedOldest => "created-oldest",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|o| o.key() == s)
            .copied()
            .ok_or_else(|| format!("unknown sort order: {}", s))
    }
}

/// Name comparison that ignores case first, then falls back to the exact
/// text so distinct names never compare equal.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort files in place. The sort is stable.
pub fn sort_files(files: &mut [FileNode], order: SortOrder) {
    match order {
        SortOrder::NameAsc => files.sort_by(|a, b| compare_names(a.file_name(), b.file_name())),
        SortOrder::NameDesc => files.sort_by(|a, b| compare_names(b.file_name(), a.file_name())),
        SortOrder::ModifiedNewest => files.sort_by(|a, b| b.modified.cmp(&a.modified)),
        SortOrder::ModifiedOldest => files.sort_by(|a, b| a.modified.cmp(&b.modified)),
        SortOrder::CreatedNewest => files.sort_by(|a, b| b.created.cmp(&a.created)),
        SortOrder::CreatedOldest => files.sort_by(|a, b| a.created.cmp(&b.created)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    use crate::fs::path::{split_name, VaultPath};

    fn file(name: &str, modified: u64, created: u64) -> FileNode {
        let (stem, ext) = split_name(name);
        FileNode {
            path: VaultPath::new(name),
            basename: stem.to_string(),
            extension: ext.unwrap_or("").to_string(),
            size: 0,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(modified),
            created: SystemTime::UNIX_EPOCH + Duration::from_secs(created),
        }
    }

    fn names(files: &[FileNode]) -> Vec<&str> {
        files.iter().map(|f| f.file_name()).collect()
    }

    #[test]
    fn name_ascending_ignores_case() {
        let mut files = vec![file("beta.md", 0, 0), file("Alpha.md", 0, 0), file("gamma.md", 0, 0)];
        sort_files(&mut files, SortOrder::NameAsc);
        assert_eq!(names(&files), vec!["Alpha.md", "beta.md", "gamma.md"]);
    }

    #[test]
    fn name_descending_is_exact_reverse() {
        let input = vec![
            file("b.md", 0, 0),
            file("A.md", 0, 0),
            file("a.md", 0, 0),
            file("c.png", 0, 0),
            file("B.md", 0, 0),
        ];
        let mut asc = input.clone();
        sort_files(&mut asc, SortOrder::NameAsc);
        let mut desc = input;
        sort_files(&mut desc, SortOrder::NameDesc);
        let mut reversed = names(&asc);
        reversed.reverse();
        assert_eq!(names(&desc), reversed);
    }

    #[test]
    fn modified_orders() {
        let mut files = vec![file("a", 10, 0), file("b", 30, 0), file("c", 20, 0)];
        sort_files(&mut files, SortOrder::ModifiedNewest);
        assert_eq!(names(&files), vec!["b", "c", "a"]);
        sort_files(&mut files, SortOrder::ModifiedOldest);
        assert_eq!(names(&files), vec!["a", "c", "b"]);
    }

    #[test]
    fn created_orders() {
        let mut files = vec![file("a", 0, 5), file("b", 0, 1), file("c", 0, 9)];
        sort_files(&mut files, SortOrder::CreatedNewest);
        assert_eq!(names(&files), vec!["c", "a", "b"]);
        sort_files(&mut files, SortOrder::CreatedOldest);
        assert_eq!(names(&files), vec!["b", "a", "c"]);
    }

    #[test]
    fn timestamp_ties_keep_input_order() {
        let mut files = vec![file("z", 7, 7), file("m", 7, 7), file("a", 7, 7)];
        sort_files(&mut files, SortOrder::ModifiedNewest);
        assert_eq!(names(&files), vec!["z", "m", "a"]);
    }

    #[test]
    fn cycle_visits_all_orders() {
        let mut order = SortOrder::NameAsc;
        for expected in SortOrder::ALL.iter().skip(1) {
            order = order.next();
            assert_eq!(&order, expected);
        }
        assert_eq!(order.next(), SortOrder::NameAsc);
    }

    #[test]
    fn parse_and_display_agree() {
        for order in SortOrder::ALL {
            assert_eq!(order.to_string().parse::<SortOrder>(), Ok(order));
        }
        assert!("size".parse::<SortOrder>().is_err());
    }
}

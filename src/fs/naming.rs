//! Sequential-probe naming for created, renamed and moved entries.

use tracing::debug;

use crate::error::{AppError, Result};
use crate::fs::path::{split_name, VaultPath};
use crate::fs::store::{FileNode, FolderStore};

/// Upper bound on probe attempts before giving up with `Conflict`.
const MAX_PROBES: usize = 10_000;

/// Candidate name for probe step `n`: `name`, `name 1`, `name 2`, ...
///
/// The counter goes before the extension (`Untitled 2.md`).
pub fn candidate_name(name: &str, n: usize) -> String {
    if n == 0 {
        return name.to_string();
    }
    match split_name(name) {
        (stem, Some(ext)) => format!("{} {}.{}", stem, n, ext),
        (stem, None) => format!("{} {}", stem, n),
    }
}

/// Find the first unused path for `name` inside `parent`, starting at probe
/// step `start`.
///
/// Each existence check runs only after the previous one came back taken.
pub fn first_free_path<S: FolderStore + ?Sized>(
    store: &S,
    parent: &VaultPath,
    name: &str,
    start: usize,
) -> Result<VaultPath> {
    probe(store, parent, name, start).map(|(path, _)| path)
}

fn probe<S: FolderStore + ?Sized>(
    store: &S,
    parent: &VaultPath,
    name: &str,
    start: usize,
) -> Result<(VaultPath, usize)> {
    for n in start..start + MAX_PROBES {
        let candidate = parent.join(&candidate_name(name, n));
        if !store.exists(&candidate) {
            return Ok((candidate, n));
        }
    }
    Err(AppError::Conflict(parent.join(name).to_string()))
}

/// Create a file under the first free name, continuing the probe when the
/// store reports a conflict that appeared after the existence check.
pub fn create_unique<S: FolderStore + ?Sized>(
    store: &S,
    parent: &VaultPath,
    name: &str,
    content: &str,
) -> Result<FileNode> {
    let mut start = 0;
    loop {
        let (path, n) = probe(store, parent, name, start)?;
        match store.create(&path, content) {
            Err(AppError::Conflict(_)) => {
                debug!(path = %path, "create raced with another writer, probing on");
                start = n + 1;
            }
            other => return other,
        }
    }
}

/// Folder counterpart of [`create_unique`].
pub fn create_folder_unique<S: FolderStore + ?Sized>(
    store: &S,
    parent: &VaultPath,
    name: &str,
) -> Result<VaultPath> {
    let mut start = 0;
    loop {
        let (path, n) = probe(store, parent, name, start)?;
        match store.create_folder(&path) {
            Ok(()) => return Ok(path),
            Err(AppError::Conflict(_)) => start = n + 1,
            Err(e) => return Err(e),
        }
    }
}

/// Move `from` into `dest_parent` under `name`, probing past taken names.
///
/// Returns the final path.
pub fn rename_unique<S: FolderStore + ?Sized>(
    store: &S,
    from: &VaultPath,
    dest_parent: &VaultPath,
    name: &str,
) -> Result<VaultPath> {
    if from.parent().as_ref() == Some(dest_parent) && from.name() == name {
        return Ok(from.clone());
    }
    let mut start = 0;
    loop {
        let (path, n) = probe(store, dest_parent, name, start)?;
        match store.rename(from, &path) {
            Ok(()) => return Ok(path),
            Err(AppError::Conflict(_)) => start = n + 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    use crate::fs::store::FsStore;

    #[test]
    fn candidate_name_places_counter_before_extension() {
        assert_eq!(candidate_name("Untitled.md", 0), "Untitled.md");
        assert_eq!(candidate_name("Untitled.md", 2), "Untitled 2.md");
        assert_eq!(candidate_name("Untitled", 1), "Untitled 1");
    }

    #[test]
    fn first_free_path_returns_bare_name_when_free() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path(), false);
        let path = first_free_path(&store, &VaultPath::root(), "Untitled.md", 0).unwrap();
        assert_eq!(path, VaultPath::new("Untitled.md"));
    }

    #[test]
    fn first_free_path_skips_taken_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Untitled.md"), "").unwrap();
        fs::write(dir.path().join("Untitled 1.md"), "").unwrap();
        let store = FsStore::new(dir.path(), false);
        let path = first_free_path(&store, &VaultPath::root(), "Untitled.md", 0).unwrap();
        assert_eq!(path, VaultPath::new("Untitled 2.md"));
    }

    #[test]
    fn create_unique_and_folder_unique() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path(), false);
        let a = create_unique(&store, &VaultPath::root(), "Untitled.md", "").unwrap();
        let b = create_unique(&store, &VaultPath::root(), "Untitled.md", "").unwrap();
        assert_eq!(a.path, VaultPath::new("Untitled.md"));
        assert_eq!(b.path, VaultPath::new("Untitled 1.md"));

        let f1 = create_folder_unique(&store, &VaultPath::root(), "Untitled").unwrap();
        let f2 = create_folder_unique(&store, &VaultPath::root(), "Untitled").unwrap();
        assert_eq!(f1, VaultPath::new("Untitled"));
        assert_eq!(f2, VaultPath::new("Untitled 1"));
    }

    #[test]
    fn rename_unique_resolves_collision() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("dest")).unwrap();
        fs::write(dir.path().join("dest").join("n.md"), "").unwrap();
        fs::write(dir.path().join("n.md"), "x").unwrap();
        let store = FsStore::new(dir.path(), false);
        let moved =
            rename_unique(&store, &VaultPath::new("n.md"), &VaultPath::new("dest"), "n.md")
                .unwrap();
        assert_eq!(moved, VaultPath::new("dest/n 1.md"));
        assert!(dir.path().join("dest").join("n 1.md").exists());
    }

    #[test]
    fn rename_unique_to_same_name_is_noop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("n.md"), "").unwrap();
        let store = FsStore::new(dir.path(), false);
        let same = rename_unique(&store, &VaultPath::new("n.md"), &VaultPath::root(), "n.md")
            .unwrap();
        assert_eq!(same, VaultPath::new("n.md"));
    }

    /// A store whose `exists` answers "free" once for a path that `create`
    /// then reports as taken, to exercise the race path.
    struct RacyStore {
        inner: FsStore,
        raced: Mutex<HashSet<String>>,
        checks: Mutex<Vec<String>>,
    }

    impl crate::fs::store::ParentLookup for RacyStore {
        fn parent_of(&self, path: &VaultPath) -> Option<VaultPath> {
            path.parent()
        }
    }

    impl FolderStore for RacyStore {
        fn list_root(&self) -> Result<crate::fs::store::FolderNode> {
            self.inner.list_root()
        }
        fn files_in(&self, folder: &VaultPath) -> Result<Vec<FileNode>> {
            self.inner.files_in(folder)
        }
        fn read(&self, file: &FileNode) -> Result<String> {
            self.inner.read(file)
        }
        fn exists(&self, path: &VaultPath) -> bool {
            self.checks.lock().unwrap().push(path.as_str().to_string());
            self.inner.exists(path)
        }
        fn create(&self, path: &VaultPath, content: &str) -> Result<FileNode> {
            let mut raced = self.raced.lock().unwrap();
            if raced.insert(path.as_str().to_string()) && path.as_str() == "Untitled.md" {
                return Err(AppError::Conflict(path.to_string()));
            }
            self.inner.create(path, content)
        }
        fn create_folder(&self, path: &VaultPath) -> Result<()> {
            self.inner.create_folder(path)
        }
        fn rename(&self, from: &VaultPath, to: &VaultPath) -> Result<()> {
            self.inner.rename(from, to)
        }
        fn trash(&self, path: &VaultPath) -> Result<()> {
            self.inner.trash(path)
        }
        fn resource_url(&self, file: &FileNode) -> String {
            self.inner.resource_url(file)
        }
    }

    #[test]
    fn create_unique_continues_probe_after_race() {
        let dir = TempDir::new().unwrap();
        let store = RacyStore {
            inner: FsStore::new(dir.path(), false),
            raced: Mutex::new(HashSet::new()),
            checks: Mutex::new(Vec::new()),
        };
        let node = create_unique(&store, &VaultPath::root(), "Untitled.md", "").unwrap();
        assert_eq!(node.path, VaultPath::new("Untitled 1.md"));
        let checks = store.checks.lock().unwrap();
        assert_eq!(
            *checks,
            vec!["Untitled.md".to_string(), "Untitled 1.md".to_string()]
        );
    }
}

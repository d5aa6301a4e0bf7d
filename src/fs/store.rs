//! The folder store contract and its filesystem-backed implementation.
//!
//! The store owns the folder/file graph. The core only reads snapshots from
//! it and mutates it through `create`, `create_folder`, `rename` and `trash`.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::fs::naming;
use crate::fs::path::{split_name, VaultPath};
use crate::view::validator::MoveRejection;

/// Name of the folder that receives trashed entries.
pub const TRASH_DIR: &str = ".trash";

/// A file in the store, without its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub path: VaultPath,
    /// File name without the extension.
    pub basename: String,
    /// Lowercase extension without the dot; empty when there is none.
    pub extension: String,
    pub size: u64,
    pub modified: SystemTime,
    pub created: SystemTime,
}

impl FileNode {
    /// Full file name (`basename.extension`).
    pub fn file_name(&self) -> &str {
        self.path.name()
    }
}

/// A folder snapshot with its direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub path: VaultPath,
    pub name: String,
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileNode>,
}

impl FolderNode {
    pub fn has_child_folders(&self) -> bool {
        !self.folders.is_empty()
    }

    /// Find a folder anywhere in this subtree.
    pub fn find(&self, path: &VaultPath) -> Option<&FolderNode> {
        if &self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.folders.iter().find_map(|child| child.find(path))
    }
}

/// Parent-chain lookup over the live store.
pub trait ParentLookup {
    /// Current parent of `path`, or `None` for the root.
    fn parent_of(&self, path: &VaultPath) -> Option<VaultPath>;
}

/// Operations the core requires of the external folder store.
pub trait FolderStore: ParentLookup + Send + Sync {
    /// Snapshot of the whole folder hierarchy.
    fn list_root(&self) -> Result<FolderNode>;

    /// Direct file children of a folder.
    fn files_in(&self, folder: &VaultPath) -> Result<Vec<FileNode>>;

    fn read(&self, file: &FileNode) -> Result<String>;

    fn exists(&self, path: &VaultPath) -> bool;

    /// Create a file. Fails with `Conflict` if the path is taken.
    fn create(&self, path: &VaultPath, content: &str) -> Result<FileNode>;

    /// Create a folder. Fails with `Conflict` if the path is taken.
    fn create_folder(&self, path: &VaultPath) -> Result<()>;

    /// Move or rename an entry.
    fn rename(&self, from: &VaultPath, to: &VaultPath) -> Result<()>;

    /// Move an entry to the store's trash.
    fn trash(&self, path: &VaultPath) -> Result<()>;

    /// A URL suitable for displaying the file as an image.
    fn resource_url(&self, file: &FileNode) -> String;
}

/// A folder store backed by a directory on the local filesystem.
///
/// Dot-prefixed entries (including the trash) are hidden unless
/// `show_hidden` is set. Symlinks are never followed.
#[derive(Debug, Clone)]
pub struct FsStore {
    base: PathBuf,
    show_hidden: bool,
}

impl FsStore {
    pub fn new(base: &Path, show_hidden: bool) -> Self {
        Self {
            base: base.to_path_buf(),
            show_hidden,
        }
    }

    fn abs(&self, path: &VaultPath) -> PathBuf {
        path.to_fs(&self.base)
    }

    fn is_visible(&self, name: &str) -> bool {
        self.show_hidden || !name.starts_with('.')
    }

    fn file_node(&self, path: VaultPath, metadata: &fs::Metadata) -> FileNode {
        let name = path.name().to_string();
        let (stem, ext) = split_name(&name);
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        FileNode {
            basename: stem.to_string(),
            extension: ext.map(|e| e.to_lowercase()).unwrap_or_default(),
            size: metadata.len(),
            modified,
            created: metadata.created().unwrap_or(modified),
            path,
        }
    }

    /// Read one directory level, splitting folders from files.
    ///
    /// Unreadable entries and symlinks are silently skipped.
    fn read_level(&self, folder: &VaultPath) -> Result<(Vec<VaultPath>, Vec<FileNode>)> {
        let mut folders = Vec::new();
        let mut files = Vec::new();
        for entry in fs::read_dir(self.abs(folder))? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.is_visible(&name) {
                continue;
            }
            let metadata = match fs::symlink_metadata(entry.path()) {
                Ok(m) => m,
                Err(_) => continue,
            };
            let path = folder.join(&name);
            if metadata.file_type().is_symlink() {
                continue;
            } else if metadata.is_dir() {
                folders.push(path);
            } else {
                files.push(self.file_node(path, &metadata));
            }
        }
        folders.sort();
        Ok((folders, files))
    }

    fn load_folder(&self, path: VaultPath) -> Result<FolderNode> {
        let (child_paths, files) = self.read_level(&path)?;
        let mut folders = Vec::with_capacity(child_paths.len());
        for child in child_paths {
            match self.load_folder(child) {
                Ok(node) => folders.push(node),
                Err(e) => debug!("skipping unreadable folder: {}", e),
            }
        }
        let name = if path.is_root() {
            self.base
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "/".to_string())
        } else {
            path.name().to_string()
        };
        Ok(FolderNode {
            path,
            name,
            folders,
            files,
        })
    }
}

fn conflict_or_io(err: std::io::Error, path: &VaultPath) -> AppError {
    if err.kind() == ErrorKind::AlreadyExists {
        AppError::Conflict(path.to_string())
    } else {
        AppError::Io(err)
    }
}

impl ParentLookup for FsStore {
    fn parent_of(&self, path: &VaultPath) -> Option<VaultPath> {
        path.parent()
    }
}

impl FolderStore for FsStore {
    fn list_root(&self) -> Result<FolderNode> {
        self.load_folder(VaultPath::root())
    }

    fn files_in(&self, folder: &VaultPath) -> Result<Vec<FileNode>> {
        let (_, files) = self.read_level(folder)?;
        Ok(files)
    }

    fn read(&self, file: &FileNode) -> Result<String> {
        let bytes = fs::read(self.abs(&file.path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn exists(&self, path: &VaultPath) -> bool {
        fs::symlink_metadata(self.abs(path)).is_ok()
    }

    fn create(&self, path: &VaultPath, content: &str) -> Result<FileNode> {
        let abs = self.abs(path);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&abs)
            .map_err(|e| conflict_or_io(e, path))?;
        file.write_all(content.as_bytes())?;
        let metadata = fs::metadata(&abs)?;
        info!(path = %path, "created file");
        Ok(self.file_node(path.clone(), &metadata))
    }

    fn create_folder(&self, path: &VaultPath) -> Result<()> {
        fs::create_dir(self.abs(path)).map_err(|e| conflict_or_io(e, path))?;
        info!(path = %path, "created folder");
        Ok(())
    }

    fn rename(&self, from: &VaultPath, to: &VaultPath) -> Result<()> {
        if from.is_root() || (to.starts_with(from) && to != from) {
            return Err(MoveRejection::IntoDescendant.into());
        }
        if self.exists(to) {
            return Err(AppError::Conflict(to.to_string()));
        }
        fs::rename(self.abs(from), self.abs(to))?;
        info!(from = %from, to = %to, "renamed");
        Ok(())
    }

    fn trash(&self, path: &VaultPath) -> Result<()> {
        if path.is_root() {
            return Err(AppError::InvalidPath("cannot trash the root folder".into()));
        }
        let trash = VaultPath::new(TRASH_DIR);
        match fs::create_dir(self.abs(&trash)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        let name = path.name().to_string();
        let dest = naming::first_free_path(self, &trash, &name, 0)?;
        fs::rename(self.abs(path), self.abs(&dest))?;
        info!(path = %path, to = %dest, "trashed");
        Ok(())
    }

    fn resource_url(&self, file: &FileNode) -> String {
        format!("file://{}", self.abs(&file.path).display())
    }
}

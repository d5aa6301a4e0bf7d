//! The preview pass: one card per direct file child of the selected folder.

use std::time::SystemTime;

use tracing::warn;

use crate::error::Result;
use crate::fs::path::VaultPath;
use crate::fs::store::{FileNode, FolderStore};
use crate::view::extract::{extract_preview, ExtractOptions};
use crate::view::sort::{sort_files, SortOrder};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "avif"];

/// Extensions with a dedicated placeholder, checked after images.
const SPECIAL_EXTENSIONS: &[(&[&str], Placeholder)] = &[
    (&["mp3", "wav", "m4a", "ogg", "flac", "3gp"], Placeholder::Audio),
    (&["mp4", "webm", "ogv", "mov", "mkv"], Placeholder::Video),
    (&["pdf"], Placeholder::Pdf),
    (&["canvas"], Placeholder::Canvas),
    (&["excalidraw"], Placeholder::Drawing),
];

/// Non-text file types shown with a glyph instead of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Audio,
    Video,
    Pdf,
    Canvas,
    Drawing,
}

impl Placeholder {
    pub fn glyph(&self) -> &'static str {
        match self {
            Placeholder::Audio => "♪",
            Placeholder::Video => "▶",
            Placeholder::Pdf => "▤",
            Placeholder::Canvas => "▦",
            Placeholder::Drawing => "✎",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Placeholder::Audio => "Audio",
            Placeholder::Video => "Video",
            Placeholder::Pdf => "PDF document",
            Placeholder::Canvas => "Canvas",
            Placeholder::Drawing => "Drawing",
        }
    }
}

/// How a file is presented, decided by extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Image,
    Special(Placeholder),
    Text,
}

pub fn classify(file: &FileNode) -> FileClass {
    let ext = file.extension.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        return FileClass::Image;
    }
    // Excalidraw drawings are usually stored as `name.excalidraw.md`.
    let ext = if file.basename.to_lowercase().ends_with(".excalidraw") {
        "excalidraw"
    } else {
        ext
    };
    SPECIAL_EXTENSIONS
        .iter()
        .find(|(exts, _)| exts.contains(&ext))
        .map(|(_, placeholder)| FileClass::Special(*placeholder))
        .unwrap_or(FileClass::Text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Image { url: String },
    Placeholder(Placeholder),
    /// Extracted snippet; may be empty.
    Text(String),
    TooLarge,
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewCard {
    pub path: VaultPath,
    pub title: String,
    pub extension: String,
    pub size: u64,
    pub modified: SystemTime,
    pub body: CardBody,
}

/// Inputs to one preview pass, captured when it is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    pub sort_order: SortOrder,
    pub extract: ExtractOptions,
    pub max_preview_bytes: u64,
}

/// Build the cards for `folder`. Only listing the folder can fail; a file
/// that cannot be read becomes an `Unreadable` card.
pub fn build_cards<S: FolderStore + ?Sized>(
    store: &S,
    folder: &VaultPath,
    options: &PreviewOptions,
) -> Result<Vec<PreviewCard>> {
    let mut files = store.files_in(folder)?;
    sort_files(&mut files, options.sort_order);
    Ok(files
        .into_iter()
        .map(|file| build_card(store, file, options))
        .collect())
}

fn build_card<S: FolderStore + ?Sized>(
    store: &S,
    file: FileNode,
    options: &PreviewOptions,
) -> PreviewCard {
    let body = match classify(&file) {
        FileClass::Image => CardBody::Image {
            url: store.resource_url(&file),
        },
        FileClass::Special(placeholder) => CardBody::Placeholder(placeholder),
        FileClass::Text if file.size > options.max_preview_bytes => CardBody::TooLarge,
        FileClass::Text => match store.read(&file) {
            Ok(content) => CardBody::Text(extract_preview(&content, &options.extract)),
            Err(e) => {
                warn!(path = %file.path, "preview read failed: {}", e);
                CardBody::Unreadable(e.to_string())
            }
        },
    };
    let title = if file.extension == "md" {
        file.basename.clone()
    } else {
        file.file_name().to_string()
    };
    PreviewCard {
        title,
        extension: file.extension,
        size: file.size,
        modified: file.modified,
        path: file.path,
        body,
    }
}

/// Cards currently shown in the preview pane.
#[derive(Debug, Default)]
pub struct PreviewView {
    /// Folder the cards belong to.
    pub folder: Option<VaultPath>,
    pub cards: Vec<PreviewCard>,
    pub cursor: usize,
    pub scroll_offset: usize,
}

impl PreviewView {
    /// Replace all cards. The cursor stays on the same file when it survives.
    pub fn set_cards(&mut self, folder: VaultPath, cards: Vec<PreviewCard>) {
        let same_folder = self.folder.as_ref() == Some(&folder);
        let focused = self.current().map(|c| c.path.clone());
        self.cards = cards;
        self.cursor = focused
            .filter(|_| same_folder)
            .and_then(|path| self.cards.iter().position(|c| c.path == path))
            .unwrap_or(0);
        if !same_folder {
            self.scroll_offset = 0;
        }
        self.folder = Some(folder);
    }

    pub fn current(&self) -> Option<&PreviewCard> {
        self.cards.get(self.cursor)
    }

    /// Keep the cursor card on screen, given how many cards fit.
    pub fn update_scroll(&mut self, visible_cards: usize) {
        if visible_cards == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible_cards {
            self.scroll_offset = self.cursor + 1 - visible_cards;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::fs::store::FsStore;

    const OPTIONS: PreviewOptions = PreviewOptions {
        sort_order: SortOrder::NameAsc,
        extract: ExtractOptions {
            remove_link_brackets: true,
        },
        max_preview_bytes: 1024,
    };

    fn node(name: &str) -> FileNode {
        let (stem, ext) = crate::fs::path::split_name(name);
        FileNode {
            path: VaultPath::new(name),
            basename: stem.to_string(),
            extension: ext.unwrap_or("").to_lowercase(),
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
            created: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn classify_checks_images_first_then_special_table() {
        assert_eq!(classify(&node("a.PNG")), FileClass::Image);
        assert_eq!(classify(&node("a.svg")), FileClass::Image);
        assert_eq!(classify(&node("a.mp3")), FileClass::Special(Placeholder::Audio));
        assert_eq!(classify(&node("a.webm")), FileClass::Special(Placeholder::Video));
        assert_eq!(classify(&node("a.pdf")), FileClass::Special(Placeholder::Pdf));
        assert_eq!(classify(&node("a.canvas")), FileClass::Special(Placeholder::Canvas));
        assert_eq!(
            classify(&node("sketch.excalidraw.md")),
            FileClass::Special(Placeholder::Drawing)
        );
        assert_eq!(classify(&node("a.md")), FileClass::Text);
        assert_eq!(classify(&node("Makefile")), FileClass::Text);
    }

    fn setup() -> (TempDir, FsStore) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("notes")).unwrap();
        fs::create_dir(root.join("notes").join("sub")).unwrap();
        fs::write(root.join("notes").join("b.md"), "---\na: 1\n---\n# B\n**bold** [[x]]").unwrap();
        fs::write(root.join("notes").join("a.md"), "alpha").unwrap();
        fs::write(root.join("notes").join("pic.png"), [0u8; 4]).unwrap();
        fs::write(root.join("notes").join("song.mp3"), [0u8; 4]).unwrap();
        fs::write(root.join("notes").join("big.txt"), "x".repeat(4096)).unwrap();
        fs::write(root.join("notes").join("sub").join("deep.md"), "deep").unwrap();
        let store = FsStore::new(root, false);
        (dir, store)
    }

    #[test]
    fn cards_are_direct_children_sorted() {
        let (_dir, store) = setup();
        let cards = build_cards(&store, &VaultPath::new("notes"), &OPTIONS).unwrap();
        let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "big.txt", "pic.png", "song.mp3"]);
    }

    #[test]
    fn card_bodies_follow_classification() {
        let (_dir, store) = setup();
        let cards = build_cards(&store, &VaultPath::new("notes"), &OPTIONS).unwrap();
        assert_eq!(cards[0].body, CardBody::Text("alpha".into()));
        assert_eq!(cards[1].body, CardBody::Text("B bold x".into()));
        assert_eq!(cards[2].body, CardBody::TooLarge);
        assert!(matches!(&cards[3].body, CardBody::Image { url } if url.ends_with("pic.png")));
        assert_eq!(cards[4].body, CardBody::Placeholder(Placeholder::Audio));
    }

    /// Fails `read` for one file name and delegates everything else.
    struct UnreadableStore {
        inner: FsStore,
        unreadable: &'static str,
    }

    impl crate::fs::store::ParentLookup for UnreadableStore {
        fn parent_of(&self, path: &VaultPath) -> Option<VaultPath> {
            self.inner.parent_of(path)
        }
    }

    impl FolderStore for UnreadableStore {
        fn list_root(&self) -> Result<crate::fs::store::FolderNode> {
            self.inner.list_root()
        }
        fn files_in(&self, folder: &VaultPath) -> Result<Vec<FileNode>> {
            self.inner.files_in(folder)
        }
        fn read(&self, file: &FileNode) -> Result<String> {
            if file.file_name() == self.unreadable {
                let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
                return Err(denied.into());
            }
            self.inner.read(file)
        }
        fn exists(&self, path: &VaultPath) -> bool {
            self.inner.exists(path)
        }
        fn create(&self, path: &VaultPath, content: &str) -> Result<FileNode> {
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
    fn unreadable_file_does_not_fail_the_pass() {
        let (_dir, fs_store) = setup();
        let store = UnreadableStore {
            inner: fs_store,
            unreadable: "b.md",
        };
        let cards = build_cards(&store, &VaultPath::new("notes"), &OPTIONS).unwrap();
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].body, CardBody::Text("alpha".into()));
        assert!(matches!(&cards[1].body, CardBody::Unreadable(msg) if msg.contains("denied")));
        assert_eq!(cards[1].title, "b");
        assert_eq!(cards[2].body, CardBody::TooLarge);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let (_dir, store) = setup();
        assert!(build_cards(&store, &VaultPath::new("nope"), &OPTIONS).is_err());
    }

    #[test]
    fn set_cards_keeps_focus_within_same_folder() {
        let mut view = PreviewView::default();
        let folder = VaultPath::new("notes");
        let card = |name: &str| PreviewCard {
            path: VaultPath::new(&format!("notes/{}", name)),
            title: name.to_string(),
            extension: "md".into(),
            size: 0,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1),
            body: CardBody::Text(String::new()),
        };
        view.set_cards(folder.clone(), vec![card("a"), card("b"), card("c")]);
        view.cursor = 2;
        view.set_cards(folder.clone(), vec![card("c"), card("a")]);
        assert_eq!(view.cursor, 0);
        assert_eq!(view.current().unwrap().title, "c");

        view.cursor = 1;
        view.set_cards(VaultPath::new("other"), vec![card("a"), card("c")]);
        assert_eq!(view.cursor, 0);
    }

    #[test]
    fn scroll_keeps_cursor_card_visible() {
        let mut view = PreviewView::default();
        view.cursor = 6;
        view.update_scroll(4);
        assert_eq!(view.scroll_offset, 3);
        view.cursor = 1;
        view.update_scroll(4);
        assert_eq!(view.scroll_offset, 1);
    }
}

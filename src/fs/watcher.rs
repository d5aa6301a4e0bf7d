use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::Event;

/// Path components whose changes never affect the view.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[".git", ".obsidian", "node_modules", "target"];

/// Default flood threshold (events per debounce window).
pub const DEFAULT_FLOOD_THRESHOLD: usize = 100;

/// Watches the vault root recursively and forwards debounced changes as
/// [`Event::FsChange`].
pub struct FsWatcher {
    /// Whether the watcher is currently forwarding events.
    active: Arc<AtomicBool>,
    /// Handle to the debouncer (dropped to stop watching).
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
}

impl FsWatcher {
    /// Watch `root` recursively.
    ///
    /// Paths matching any of `ignore_patterns` are dropped. More than
    /// `flood_threshold` paths in one debounce window collapse into a single
    /// root path.
    pub fn new(
        root: &Path,
        debounce_duration: Duration,
        ignore_patterns: Vec<String>,
        flood_threshold: usize,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> notify::Result<Self> {
        let active = Arc::new(AtomicBool::new(true));
        let forwarding = Arc::clone(&active);
        let root_path = root.to_path_buf();

        let mut debouncer = new_debouncer(
            debounce_duration,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| {
                if !forwarding.load(Ordering::Relaxed) {
                    return;
                }
                match result {
                    Ok(events) => {
                        if let Some(paths) =
                            collect_paths(&events, &ignore_patterns, flood_threshold, &root_path)
                        {
                            debug!(count = paths.len(), "fs change");
                            let _ = event_tx.send(Event::FsChange(paths));
                        }
                    }
                    Err(e) => warn!("watcher error: {}", e),
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(root, notify::RecursiveMode::Recursive)?;

        Ok(Self {
            active,
            _debouncer: debouncer,
        })
    }

    /// Stop forwarding events; the underlying watches stay alive.
    pub fn pause(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.active.store(true, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

/// Filter one debounce window down to the paths worth reporting.
fn collect_paths(
    events: &[DebouncedEvent],
    ignore_patterns: &[String],
    flood_threshold: usize,
    root: &Path,
) -> Option<Vec<PathBuf>> {
    let paths: Vec<PathBuf> = events
        .iter()
        .filter(|e| e.kind == DebouncedEventKind::Any)
        .map(|e| e.path.clone())
        .filter(|p| !should_ignore(p, ignore_patterns))
        .collect();
    if paths.is_empty() {
        None
    } else if paths.len() > flood_threshold {
        Some(vec![root.to_path_buf()])
    } else {
        Some(paths)
    }
}

/// A path is ignored if any of its components matches a pattern exactly.
pub fn should_ignore(path: &Path, patterns: &[String]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            patterns.iter().any(|p| *p == name)
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect()
    }

    fn event(path: &str) -> DebouncedEvent {
        DebouncedEvent {
            path: PathBuf::from(path),
            kind: DebouncedEventKind::Any,
        }
    }

    #[test]
    fn ignores_vault_metadata() {
        assert!(should_ignore(Path::new("/vault/.obsidian/workspace.json"), &patterns()));
        assert!(should_ignore(Path::new("/vault/.git/HEAD"), &patterns()));
        assert!(!should_ignore(Path::new("/vault/notes/a.md"), &patterns()));
    }

    #[test]
    fn trash_changes_are_reported() {
        assert!(!should_ignore(Path::new("/vault/.trash/a.md"), &patterns()));
    }

    #[test]
    fn partial_name_does_not_match() {
        assert!(!should_ignore(Path::new("/vault/target2/a.md"), &patterns()));
    }

    #[test]
    fn window_of_only_ignored_paths_is_dropped() {
        let events = vec![event("/vault/.git/index"), event("/vault/.obsidian/app.json")];
        assert!(collect_paths(&events, &patterns(), 10, Path::new("/vault")).is_none());
    }

    #[test]
    fn flood_collapses_to_root() {
        let events: Vec<DebouncedEvent> =
            (0..20).map(|i| event(&format!("/vault/n{}.md", i))).collect();
        let paths = collect_paths(&events, &patterns(), 10, Path::new("/vault")).unwrap();
        assert_eq!(paths, vec![PathBuf::from("/vault")]);

        let paths = collect_paths(&events[..5], &patterns(), 10, Path::new("/vault")).unwrap();
        assert_eq!(paths.len(), 5);
    }
}

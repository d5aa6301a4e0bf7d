//! Render scheduling for the two passes.
//!
//! The tree pass is guarded by a single token: a request that arrives while a
//! tree render is in flight is dropped, not queued. The preview pass is never
//! guarded; each request gets a generation number and only the newest
//! generation's output is applied.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

/// Quiescence delay before a dropped tree request is re-issued.
pub const SETTLE_DELAY: Duration = Duration::from_millis(250);

/// One-shot re-render after the view opens, to pick up late data.
pub const INITIAL_RERENDER_DELAY: Duration = Duration::from_millis(600);

/// Proof that the tree render is held. The flag is released on drop, so an
/// early return, an error or a panic inside the render all release it.
#[derive(Debug)]
pub struct RenderToken {
    flag: Arc<AtomicBool>,
}

impl Drop for RenderToken {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    tree_in_flight: Arc<AtomicBool>,
    preview_generation: AtomicU64,
    tree_runs: AtomicU64,
    tree_dropped: AtomicU64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the tree token if nobody holds it.
    pub fn try_acquire_tree(&self) -> Option<RenderToken> {
        self.tree_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RenderToken {
                flag: Arc::clone(&self.tree_in_flight),
            })
    }

    pub fn tree_in_flight(&self) -> bool {
        self.tree_in_flight.load(Ordering::Acquire)
    }

    /// Run `render` on the blocking pool while holding the tree token.
    ///
    /// Returns `false` if the request was dropped because another tree
    /// render is still running.
    pub fn request_tree_render<F>(&self, render: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(token) = self.try_acquire_tree() else {
            self.tree_dropped.fetch_add(1, Ordering::Relaxed);
            debug!("tree render in flight, request dropped");
            return false;
        };
        self.tree_runs.fetch_add(1, Ordering::Relaxed);
        tokio::task::spawn_blocking(move || {
            let _token = token;
            render();
        });
        true
    }

    /// Run `render` on the blocking pool with a fresh generation number.
    pub fn request_preview_render<F>(&self, render: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let generation = self.preview_generation.fetch_add(1, Ordering::AcqRel) + 1;
        tokio::task::spawn_blocking(move || render(generation));
        generation
    }

    /// Whether a preview result from `generation` is still the newest.
    pub fn is_current_preview(&self, generation: u64) -> bool {
        self.preview_generation.load(Ordering::Acquire) == generation
    }

    /// Number of tree renders started so far.
    pub fn tree_runs(&self) -> u64 {
        self.tree_runs.load(Ordering::Relaxed)
    }

    /// Number of tree requests dropped so far.
    pub fn tree_dropped(&self) -> u64 {
        self.tree_dropped.load(Ordering::Relaxed)
    }
}

/// Send `event` on `tx` once, after `delay`.
pub fn schedule_once<E: Send + 'static>(tx: &mpsc::UnboundedSender<E>, delay: Duration, event: E) {
    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(event);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc as std_mpsc;

    #[tokio::test]
    async fn second_request_while_first_in_flight_is_dropped() {
        let scheduler = RenderScheduler::new();
        let executions = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = std_mpsc::channel::<()>();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<()>();

        let count = Arc::clone(&executions);
        let done = done_tx.clone();
        assert!(scheduler.request_tree_render(move || {
            count.fetch_add(1, Ordering::SeqCst);
            let _ = release_rx.recv();
            let _ = done.send(());
        }));

        let count = Arc::clone(&executions);
        let done = done_tx.clone();
        assert!(!scheduler.request_tree_render(move || {
            count.fetch_add(1, Ordering::SeqCst);
            let _ = done.send(());
        }));

        release_tx.send(()).unwrap();
        done_rx.recv().await.unwrap();
        drop(done_tx);
        assert!(done_rx.recv().await.is_none());
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.tree_runs(), 1);
        assert_eq!(scheduler.tree_dropped(), 1);
    }

    #[tokio::test]
    async fn token_is_released_after_render() {
        let scheduler = RenderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        assert!(scheduler.request_tree_render(move || {
            let _ = tx.send(());
        }));
        rx.recv().await.unwrap();
        // The token drops right after the closure returns.
        for _ in 0..100 {
            if !scheduler.tree_in_flight() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!scheduler.tree_in_flight());
        assert!(scheduler.try_acquire_tree().is_some());
    }

    #[tokio::test]
    async fn token_is_released_when_render_panics() {
        let scheduler = RenderScheduler::new();
        assert!(scheduler.request_tree_render(|| panic!("render failed")));
        for _ in 0..100 {
            if !scheduler.tree_in_flight() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!scheduler.tree_in_flight());
    }

    #[test]
    fn token_guard_releases_on_drop() {
        let scheduler = RenderScheduler::new();
        let token = scheduler.try_acquire_tree().unwrap();
        assert!(scheduler.try_acquire_tree().is_none());
        drop(token);
        assert!(scheduler.try_acquire_tree().is_some());
    }

    #[tokio::test]
    async fn only_latest_preview_generation_is_current() {
        let scheduler = RenderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let tx1 = tx.clone();
        let first = scheduler.request_preview_render(move |g| {
            let _ = tx1.send(g);
        });
        let second = scheduler.request_preview_render(move |g| {
            let _ = tx.send(g);
        });
        let mut seen = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        seen.sort();
        assert_eq!(seen, vec![first, second]);
        assert!(!scheduler.is_current_preview(first));
        assert!(scheduler.is_current_preview(second));
    }

    #[tokio::test]
    async fn schedule_once_delivers_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel::<&'static str>();
        schedule_once(&tx, Duration::from_millis(10), "tick");
        assert_eq!(rx.recv().await, Some("tick"));
    }
}

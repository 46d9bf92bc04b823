//! Chapter Reader State Machine
//!
//! Tracks per-page image completion for the open chapter and drives the
//! fallback timer that reveals every page when load signals never arrive.
//! Each chapter change starts a new epoch; a timer only acts on the epoch it
//! was scheduled for.

mod error;
mod navigation;
mod state;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::catalog::CatalogStore;
use crate::config::ReaderConfig;

pub use error::ReaderError;
pub use navigation::{resolve_adjacent, Adjacent};
pub use state::ReaderState;

/// Reader state container for one reading view
pub struct ChapterReader {
    state: Arc<watch::Sender<ReaderState>>,
    fallback_delay: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl ChapterReader {
    pub fn new(fallback_delay: Duration) -> Self {
        let (state, _) = watch::channel(ReaderState::default());
        Self {
            state: Arc::new(state),
            fallback_delay,
            timer: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.fallback_delay())
    }

    pub fn snapshot(&self) -> ReaderState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReaderState> {
        self.state.subscribe()
    }

    // ========================================================================
    // Chapter Lifecycle
    // ========================================================================

    /// Switch to `chapter_name`: forget load signals and restart the
    /// fallback timer. Returns the new epoch, which page signals must carry.
    ///
    /// Outside a tokio runtime no timer can run, so every page is shown
    /// immediately.
    pub fn enter_chapter(&self, chapter_name: &str) -> u64 {
        self.cancel_timer();

        let mut epoch = 0;
        self.state.send_modify(|s| {
            s.epoch += 1;
            s.chapter_name = Some(chapter_name.to_string());
            s.loaded_pages.clear();
            s.force_show_all = false;
            s.expected_pages = None;
            epoch = s.epoch;
        });

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(error = %e, "No runtime for the fallback timer, showing all pages");
                self.state.send_modify(|s| s.force_show_all = true);
                return epoch;
            }
        };

        let state = Arc::clone(&self.state);
        let delay = self.fallback_delay;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|s| {
                if s.epoch != epoch || s.force_show_all {
                    return false;
                }
                s.force_show_all = true;
                tracing::debug!(
                    epoch,
                    loaded = s.loaded_pages.len(),
                    "Fallback fired, showing all pages"
                );
                true
            });
        });
        *self.timer.lock() = Some(handle);

        tracing::debug!(chapter = %chapter_name, epoch, "Entered chapter");
        epoch
    }

    /// Record how many pages the chapter of `epoch` has
    pub fn set_page_count(&self, epoch: u64, pages: usize) -> bool {
        let applied = self.state.send_if_modified(|s| {
            if s.epoch != epoch {
                return false;
            }
            s.expected_pages = Some(pages);
            true
        });
        self.cancel_if_resolved();
        applied
    }

    /// Returns `false` when the signal belongs to an earlier chapter
    pub fn image_loaded(&self, epoch: u64, page: u32) -> bool {
        self.resolve_page(epoch, page)
    }

    /// A failed image counts as resolved; it is not retried
    pub fn image_failed(&self, epoch: u64, page: u32) -> bool {
        tracing::debug!(epoch, page, "Page image failed to load");
        self.resolve_page(epoch, page)
    }

    /// Tear down the view; a pending fallback never fires
    pub fn close(&self) {
        self.cancel_timer();
    }

    // ========================================================================
    // Chapter Selector
    // ========================================================================

    pub fn open_selector(&self) {
        self.set_selector(true);
    }

    pub fn close_selector(&self) {
        self.set_selector(false);
    }

    pub fn toggle_selector(&self) {
        self.state
            .send_modify(|s| s.chapter_selector_open = !s.chapter_selector_open);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Open `chapter_name` of the comic `slug`.
    ///
    /// Enters the chapter before anything is fetched, so a failed load still
    /// clears the previous chapter's state. Loads the comic detail when the
    /// catalog holds a different comic, then the chapter images. Returns the
    /// chapter's neighbours.
    pub async fn open(
        &self,
        catalog: &CatalogStore,
        slug: &str,
        chapter_name: &str,
    ) -> Result<Adjacent, ReaderError> {
        let epoch = self.enter_chapter(chapter_name);

        if catalog.snapshot().comic_slug() != Some(slug) {
            catalog.fetch_comic_detail(slug).await?;
        }

        let catalog_state = catalog.snapshot();
        let comic = catalog_state
            .comic
            .data
            .as_ref()
            .filter(|comic| comic.slug() == slug)
            .ok_or_else(|| ReaderError::ComicUnavailable(slug.to_string()))?;

        let sequence = comic.chapter_sequence();
        let adjacent =
            resolve_adjacent(&sequence, chapter_name).ok_or_else(|| ReaderError::ChapterNotFound {
                slug: slug.to_string(),
                chapter: chapter_name.to_string(),
            })?;
        let chapter_url = sequence[adjacent.current_index].url.clone();

        if catalog.fetch_chapter_detail(&chapter_url).await? {
            if let Some(chapter) = catalog.snapshot().chapter.data {
                self.set_page_count(epoch, chapter.page_count());
            }
        }

        Ok(adjacent)
    }

    fn resolve_page(&self, epoch: u64, page: u32) -> bool {
        let mut current = true;
        self.state.send_if_modified(|s| {
            if s.epoch != epoch {
                current = false;
                return false;
            }
            s.loaded_pages.insert(page)
        });
        if !current {
            tracing::debug!(epoch, page, "Ignoring page signal from an earlier chapter");
            return false;
        }
        self.cancel_if_resolved();
        true
    }

    fn set_selector(&self, open: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.chapter_selector_open != open;
            s.chapter_selector_open = open;
            changed
        });
    }

    fn cancel_if_resolved(&self) {
        if self.state.borrow().all_resolved() {
            self.cancel_timer();
        }
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for ChapterReader {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

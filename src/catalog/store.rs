//! Catalog Store
//!
//! Holds every catalog slice behind one watch channel. Actions follow the
//! same protocol: mark the slice loading, await the adapter, then store the
//! data or the error message. A response that is no longer the slice's
//! latest request is dropped without touching the slice.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{CategoryApi, ComicApi};
use crate::comic::{Category, ChapterDetail, ComicDetail, ComicSummary};
use crate::error::Result;

use super::slice::{SequenceGate, Slice, SliceKind};

/// Snapshot of all catalog slices
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    pub home: Slice<Vec<ComicSummary>>,

    pub genre: Slice<Vec<ComicSummary>>,
    pub current_genre: Option<String>,
    pub current_page: u32,

    pub search: Slice<Vec<ComicSummary>>,
    pub current_keyword: Option<String>,
    pub current_search_page: u32,

    pub new_comics: Slice<Vec<ComicSummary>>,
    pub new_comics_page: u32,

    pub categories: Slice<Vec<Category>>,

    pub comic: Slice<Option<ComicDetail>>,
    pub chapter: Slice<Option<ChapterDetail>>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            home: Slice::default(),
            genre: Slice::default(),
            current_genre: None,
            current_page: 1,
            search: Slice::default(),
            current_keyword: None,
            current_search_page: 1,
            new_comics: Slice::default(),
            new_comics_page: 1,
            categories: Slice::default(),
            comic: Slice::default(),
            chapter: Slice::default(),
        }
    }
}

impl CatalogState {
    /// Slug of the loaded comic detail
    pub fn comic_slug(&self) -> Option<&str> {
        self.comic.data.as_ref().map(|comic| comic.slug())
    }

    pub fn is_any_loading(&self) -> bool {
        self.home.is_loading
            || self.genre.is_loading
            || self.search.is_loading
            || self.new_comics.is_loading
            || self.categories.is_loading
            || self.comic.is_loading
            || self.chapter.is_loading
    }
}

/// Catalog state container
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogStoreInner>,
}

struct CatalogStoreInner {
    comics: ComicApi,
    categories: CategoryApi,
    state: watch::Sender<CatalogState>,
    sequences: SequenceGate,
}

impl CatalogStore {
    pub fn new(comics: ComicApi, categories: CategoryApi) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self {
            inner: Arc::new(CatalogStoreInner {
                comics,
                categories,
                state,
                sequences: SequenceGate::default(),
            }),
        }
    }

    pub fn snapshot(&self) -> CatalogState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.inner.state.subscribe()
    }

    pub fn comics(&self) -> &ComicApi {
        &self.inner.comics
    }

    // ========================================================================
    // Fetch Actions
    //
    // Each returns `Ok(true)` when its result was stored, `Ok(false)` when a
    // newer request or a reset superseded it, and the error after recording
    // it on the slice.
    // ========================================================================

    pub async fn fetch_home(&self) -> Result<bool> {
        let comics = self.inner.comics.clone();
        self.run(SliceKind::Home, |s| &mut s.home, async move { comics.get_home().await }, |_| {})
            .await
    }

    pub async fn fetch_by_genre(&self, genre: &str, page: u32) -> Result<bool> {
        let comics = self.inner.comics.clone();
        let slug = genre.to_string();
        let fetch = async move { comics.get_by_genre(&slug, page).await };

        let genre = genre.to_string();
        self.run(SliceKind::Genre, |s| &mut s.genre, fetch, move |s| {
            s.current_genre = Some(genre);
            s.current_page = page;
        })
        .await
    }

    pub async fn fetch_search(&self, keyword: &str, page: u32) -> Result<bool> {
        let comics = self.inner.comics.clone();
        let query = keyword.to_string();
        let fetch = async move { comics.search(&query, page).await };

        let keyword = keyword.to_string();
        self.run(SliceKind::Search, |s| &mut s.search, fetch, move |s| {
            s.current_keyword = Some(keyword);
            s.current_search_page = page;
        })
        .await
    }

    pub async fn fetch_new(&self, page: u32) -> Result<bool> {
        let comics = self.inner.comics.clone();
        let fetch = async move { comics.get_new(page).await };

        self.run(SliceKind::NewComics, |s| &mut s.new_comics, fetch, move |s| {
            s.new_comics_page = page;
        })
        .await
    }

    pub async fn fetch_categories(&self) -> Result<bool> {
        let categories = self.inner.categories.clone();
        let fetch = async move { categories.get_all().await };

        self.run(SliceKind::Categories, |s| &mut s.categories, fetch, |_| {})
            .await
    }

    pub async fn fetch_comic_detail(&self, slug: &str) -> Result<bool> {
        let comics = self.inner.comics.clone();
        let slug = slug.to_string();
        let fetch = async move { comics.get_detail(&slug).await.map(Some) };

        self.run(SliceKind::Comic, |s| &mut s.comic, fetch, |_| {})
            .await
    }

    /// `chapter_url` is the absolute URL from a loaded comic detail
    pub async fn fetch_chapter_detail(&self, chapter_url: &str) -> Result<bool> {
        let comics = self.inner.comics.clone();
        let url = chapter_url.to_string();
        let fetch = async move { comics.get_chapter_detail(&url).await.map(Some) };

        self.run(SliceKind::Chapter, |s| &mut s.chapter, fetch, |_| {})
            .await
    }

    // ========================================================================
    // Resets
    // ========================================================================

    /// Clear every slice and drop all in-flight responses
    pub fn reset_state(&self) {
        self.inner.sequences.invalidate_all();
        self.inner.state.send_replace(CatalogState::default());
        tracing::debug!("Catalog state reset");
    }

    pub fn reset_error(&self) {
        self.inner.state.send_modify(|s| {
            s.home.error = None;
            s.genre.error = None;
            s.search.error = None;
            s.new_comics.error = None;
            s.categories.error = None;
            s.comic.error = None;
            s.chapter.error = None;
        });
    }

    async fn run<T, Fut>(
        &self,
        kind: SliceKind,
        select: fn(&mut CatalogState) -> &mut Slice<T>,
        fetch: Fut,
        on_success: impl FnOnce(&mut CatalogState),
    ) -> Result<bool>
    where
        Fut: Future<Output = Result<T>>,
    {
        let sequence = self.inner.sequences.issue(kind);
        self.inner.state.send_modify(|s| select(s).begin());

        let result = fetch.await;

        if !self.inner.sequences.is_current(kind, sequence) {
            tracing::debug!(slice = ?kind, sequence, "Discarding superseded response");
            return Ok(false);
        }

        match result {
            Ok(data) => {
                self.inner.state.send_modify(|s| {
                    select(s).succeed(data);
                    on_success(s);
                });
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(slice = ?kind, error = %e, "Catalog fetch failed");
                let message = e.to_string();
                self.inner.state.send_modify(|s| select(s).fail(message));
                Err(e)
            }
        }
    }
}

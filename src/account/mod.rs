//! Account features
//!
//! Reading list, reading progress, favorites and password flows. Every
//! protected call takes its token from the [`SessionStore`] and fails with
//! [`ClientError::AuthRequired`](crate::ClientError::AuthRequired) when none
//! is usable.

mod types;

use futures::future::join_all;

use crate::api::ComicApi;
use crate::error::Result;
use crate::session::SessionStore;

pub use types::{
    ChangePasswordRequest, EnrichedEntry, LibraryEntry, Page, Pagination, ProgressUpdate,
    FAVORITES_PER_PAGE,
};

/// Account service
#[derive(Clone)]
pub struct AccountService {
    session: SessionStore,
    comics: ComicApi,
}

impl AccountService {
    pub fn new(session: SessionStore, comics: ComicApi) -> Self {
        Self { session, comics }
    }

    pub async fn reading_list(&self, page: u32, limit: u32) -> Result<Page<LibraryEntry>> {
        let token = self.session.require_token()?;
        self.session.api().reading_list(&token, page, limit).await
    }

    /// Reading list joined with each comic's title and thumbnail
    pub async fn reading_list_enriched(&self, page: u32, limit: u32) -> Result<Page<EnrichedEntry>> {
        let list = self.reading_list(page, limit).await?;
        Ok(Page {
            items: self.enrich(list.items).await,
            pagination: list.pagination,
        })
    }

    /// Record the chapter being read
    pub async fn update_progress(&self, slug: &str, chapter: &str) -> Result<LibraryEntry> {
        let token = self.session.require_token()?;
        let update = ProgressUpdate {
            slug: slug.to_string(),
            chapter: chapter.to_string(),
        };

        let entry = self.session.api().update_progress(&token, &update).await?;
        tracing::debug!(slug = %slug, chapter = %chapter, "Reading progress saved");
        Ok(entry)
    }

    pub async fn favorites(&self) -> Result<Page<LibraryEntry>> {
        let token = self.session.require_token()?;
        self.session.api().favorites(&token).await
    }

    pub async fn favorites_enriched(&self) -> Result<Page<EnrichedEntry>> {
        let list = self.favorites().await?;
        Ok(Page {
            items: self.enrich(list.items).await,
            pagination: list.pagination,
        })
    }

    pub async fn is_favorite(&self, slug: &str) -> Result<bool> {
        Ok(self
            .favorites()
            .await?
            .items
            .iter()
            .any(|entry| entry.slug == slug))
    }

    pub async fn add_favorite(&self, slug: &str, last_read_chapter: Option<&str>) -> Result<LibraryEntry> {
        let token = self.session.require_token()?;
        let entry = self
            .session
            .api()
            .add_favorite(&token, slug, last_read_chapter)
            .await?;

        tracing::info!(slug = %slug, "Added favorite");
        Ok(entry)
    }

    pub async fn remove_favorite(&self, slug: &str) -> Result<()> {
        let token = self.session.require_token()?;
        self.session.api().remove_favorite(&token, slug).await?;

        tracing::info!(slug = %slug, "Removed favorite");
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        self.session.api().forgot_password(email).await
    }

    /// Signed-in users send their token along; signed-out users prove
    /// identity with the old password alone
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<String> {
        let token = self.session.access_token()?;
        self.session
            .api()
            .change_password(token.as_deref(), request)
            .await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<String> {
        self.session.api().resend_verification(email).await
    }

    /// Look up every entry's comic concurrently. Entries whose lookup fails
    /// are dropped.
    async fn enrich(&self, entries: Vec<LibraryEntry>) -> Vec<EnrichedEntry> {
        let lookups = entries.into_iter().map(|entry| async move {
            match self.comics.get_detail(&entry.slug).await {
                Ok(detail) => Some(EnrichedEntry {
                    title: detail.summary.title,
                    thumbnail: detail.summary.thumbnail,
                    entry,
                }),
                Err(e) => {
                    tracing::warn!(slug = %entry.slug, error = %e, "Dropping entry without comic detail");
                    None
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}

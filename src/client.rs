//! Client wiring

use std::sync::Arc;

use crate::account::AccountService;
use crate::api::{CategoryApi, ComicApi, UserApi};
use crate::catalog::CatalogStore;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::reader::ChapterReader;
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::transport::{HttpTransport, Transport};

/// All stores and services of one client, built from a [`ClientConfig`]
#[derive(Clone)]
pub struct TruyenClient {
    inner: Arc<TruyenClientInner>,
}

struct TruyenClientInner {
    config: ClientConfig,
    session: SessionStore,
    catalog: CatalogStore,
    account: AccountService,
}

impl TruyenClient {
    /// Build HTTP transports for both backends and open the session storage
    pub fn new(config: ClientConfig) -> Result<Self> {
        let timeout = config.api.timeout();
        let comic_transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(&config.api.comic_url, timeout)?);
        let auth_transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(&config.api.auth_url, timeout)?);

        let storage: Arc<dyn KeyValueStore> = match &config.session.file {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };

        Ok(Self::with_parts(config, comic_transport, auth_transport, storage))
    }

    /// Assemble a client over caller-supplied transports and storage
    pub fn with_parts(
        config: ClientConfig,
        comic_transport: Arc<dyn Transport>,
        auth_transport: Arc<dyn Transport>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let comics = ComicApi::new(comic_transport.clone(), config.api.cdn_url.clone());
        let categories = CategoryApi::new(comic_transport);
        let session = SessionStore::new(storage, UserApi::new(auth_transport));
        let catalog = CatalogStore::new(comics.clone(), categories);
        let account = AccountService::new(session.clone(), comics);

        Self {
            inner: Arc::new(TruyenClientInner {
                config,
                session,
                catalog,
                account,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    pub fn account(&self) -> &AccountService {
        &self.inner.account
    }

    /// A reader for one reading view, using the configured fallback delay
    pub fn reader(&self) -> ChapterReader {
        ChapterReader::from_config(&self.inner.config.reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::comic::fixtures;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_backends_are_separate() {
        let comics = Arc::new(MockTransport::new());
        let auth = Arc::new(MockTransport::new());
        comics.respond("/home", fixtures::listing(&["a"]));
        auth.respond(
            "/api/login",
            json!({"access_token": "acc", "user": {"id": "u1"}}),
        );

        let client = TruyenClient::with_parts(
            ClientConfig::default(),
            comics.clone(),
            auth.clone(),
            Arc::new(MemoryStore::new()),
        );

        client.catalog().fetch_home().await.unwrap();
        client.session().login("a@b.c", "pw").await.unwrap();

        assert_eq!(comics.request_count(), 1);
        assert_eq!(auth.request_count(), 1);
        assert!(client.session().is_authenticated());
    }
}

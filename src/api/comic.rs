//! Comic catalog API adapter

use std::sync::Arc;

use serde_json::Value;

use crate::comic::{
    to_chapter_detail, to_comic_detail, to_comic_summary, ChapterDetail, ComicDetail,
    ComicSummary, FetchStamp,
};
use crate::error::{ClientError, Result};
use crate::json;
use crate::transport::{ApiRequest, Transport};

/// Catalog API client
///
/// Listings map thumbnails against the configured CDN. Detail responses name
/// their own CDN (`APP_DOMAIN_CDN_IMAGE`, `domain_cdn`) and the configured one
/// is only a fallback.
#[derive(Clone)]
pub struct ComicApi {
    transport: Arc<dyn Transport>,
    cdn_base: String,
}

impl ComicApi {
    pub fn new(transport: Arc<dyn Transport>, cdn_base: impl Into<String>) -> Self {
        Self {
            transport,
            cdn_base: cdn_base.into(),
        }
    }

    pub fn cdn_base(&self) -> &str {
        &self.cdn_base
    }

    pub async fn get_home(&self) -> Result<Vec<ComicSummary>> {
        self.listing(ApiRequest::get("/home")).await
    }

    pub async fn get_by_genre(&self, genre: &str, page: u32) -> Result<Vec<ComicSummary>> {
        let path = format!("/the-loai/{}", urlencoding::encode(genre));
        self.listing(ApiRequest::get(path).query("page", page)).await
    }

    /// Newest comics, 24 per page
    pub async fn get_new(&self, page: u32) -> Result<Vec<ComicSummary>> {
        self.listing(ApiRequest::get("/danh-sach/truyen-moi").query("page", page))
            .await
    }

    pub async fn search(&self, keyword: &str, page: u32) -> Result<Vec<ComicSummary>> {
        self.listing(
            ApiRequest::get("/tim-kiem")
                .query("keyword", keyword)
                .query("page", page),
        )
        .await
    }

    pub async fn get_detail(&self, slug: &str) -> Result<ComicDetail> {
        let path = format!("/truyen-tranh/{}", urlencoding::encode(slug));
        let response = self.transport.send(ApiRequest::get(path)).await?;

        let data = json::data(&response);
        let cdn = self.cdn_or_default(data, "APP_DOMAIN_CDN_IMAGE");
        Ok(to_comic_detail(item(data)?, &cdn))
    }

    /// Fetch a chapter by the absolute URL listed in the comic detail
    pub async fn get_chapter_detail(&self, chapter_url: &str) -> Result<ChapterDetail> {
        let request = ApiRequest::get(chapter_url);
        if !request.is_absolute() {
            return Err(ClientError::InvalidUrl(chapter_url.to_string()));
        }

        let response = self.transport.send(request).await?;
        let data = json::data(&response);
        let cdn = self.cdn_or_default(data, "domain_cdn");
        Ok(to_chapter_detail(item(data)?, &cdn, FetchStamp::next()))
    }

    async fn listing(&self, request: ApiRequest) -> Result<Vec<ComicSummary>> {
        let response = self.transport.send(request).await?;
        Ok(json::array(json::data(&response), "items")
            .iter()
            .map(|raw| to_comic_summary(raw, &self.cdn_base))
            .collect())
    }

    fn cdn_or_default(&self, data: &Value, key: &str) -> String {
        json::opt_string(data, key).unwrap_or_else(|| self.cdn_base.clone())
    }
}

fn item(data: &Value) -> Result<&Value> {
    data.get("item")
        .filter(|item| item.is_object())
        .ok_or_else(|| ClientError::InvalidResponse("response has no data.item".to_string()))
}

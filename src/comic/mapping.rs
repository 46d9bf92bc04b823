//! Raw payload mapping
//!
//! Pure functions from backend JSON to comic entities. Missing or mistyped
//! fields become empty strings and collections so one bad item never breaks
//! a whole listing.

use serde_json::Value;

use crate::json::{self, cdn_url};

use super::types::{
    Category, ChapterDetail, ChapterGroup, ChapterImage, ChapterRef, ComicDetail, ComicStatus,
    ComicSummary, FetchStamp, LatestChapter, SeoInfo,
};

/// Map a listing item to a [`ComicSummary`]
pub fn to_comic_summary(raw: &Value, cdn_base: &str) -> ComicSummary {
    let thumb_path = json::string(raw, "thumb_url");
    let thumbnail = if thumb_path.is_empty() {
        String::new()
    } else {
        cdn_url(cdn_base, &format!("uploads/comics/{}", thumb_path))
    };

    let genres = json::array(raw, "category")
        .iter()
        .filter_map(|cat| match cat {
            Value::String(name) => Some(name.clone()),
            other => json::opt_string(other, "name"),
        })
        .collect();

    let latest_chapter = json::array(raw, "chaptersLatest")
        .first()
        .map(|latest| LatestChapter {
            chapter_name: json::string(latest, "chapter_name"),
            chapter_url: json::string(latest, "chapter_api_data"),
        })
        .unwrap_or_default();

    ComicSummary {
        id: json::string(raw, "_id"),
        title: json::string(raw, "name"),
        slug: json::string(raw, "slug"),
        thumbnail,
        status: ComicStatus::from_raw(&json::string(raw, "status")),
        genres,
        latest_chapter,
        updated_at: json::opt_string(raw, "updatedAt"),
        origin_names: json::string_list(raw, "origin_name"),
        thumb_path,
    }
}

/// Map a detail item to a [`ComicDetail`]
pub fn to_comic_detail(raw: &Value, cdn_base: &str) -> ComicDetail {
    let chapters = json::array(raw, "chapters")
        .iter()
        .map(|server| ChapterGroup {
            server_name: json::string(server, "server_name"),
            chapters: json::array(server, "server_data")
                .iter()
                .map(|chap| ChapterRef {
                    name: json::string(chap, "chapter_name"),
                    url: json::string(chap, "chapter_api_data"),
                    title: json::opt_string(chap, "chapter_title"),
                })
                .collect(),
        })
        .collect();

    let seo_info = raw.get("seoOnPage").filter(|v| v.is_object()).map(|seo| {
        let og_image = json::string_list(seo, "og_image")
            .into_iter()
            .next()
            .map(|image| cdn_url(cdn_base, &format!("uploads/{}", image)))
            .unwrap_or_default();

        SeoInfo {
            title: json::string(seo, "titleHead"),
            description: json::string(seo, "descriptionHead"),
            og_image,
        }
    });

    ComicDetail {
        summary: to_comic_summary(raw, cdn_base),
        content: json::string(raw, "content"),
        authors: json::string_list(raw, "author"),
        chapters,
        seo_info,
    }
}

/// Map a chapter item to a [`ChapterDetail`].
///
/// Image URLs are `{cdn_base}/{chapter_path}/{image_file}`. Each image gets a
/// `unique_id` built from the comic id, chapter name, fetch stamp and
/// position, so refetching the same chapter never reuses a render key.
pub fn to_chapter_detail(raw: &Value, cdn_base: &str, stamp: FetchStamp) -> ChapterDetail {
    let chapter_name = json::string(raw, "chapter_name");
    let chapter_path = json::string(raw, "chapter_path");
    let chapter_key = format!(
        "{}-{}-{}-{}",
        json::string(raw, "_id"),
        chapter_name,
        stamp.fetched_at.timestamp_millis(),
        stamp.sequence
    );

    let images = json::array(raw, "chapter_image")
        .iter()
        .enumerate()
        .map(|(index, img)| {
            let file = json::string(img, "image_file");
            let page = json::uint(img, "image_page")
                .and_then(|p| u32::try_from(p).ok())
                .unwrap_or(index as u32 + 1);

            ChapterImage {
                page,
                image_url: cdn_url(cdn_base, &format!("{}/{}", chapter_path.trim_matches('/'), file)),
                unique_id: format!("{}-img-{}", chapter_key, index),
            }
        })
        .collect();

    ChapterDetail {
        chapter_name,
        chapter_title: json::string(raw, "chapter_title"),
        images,
    }
}

/// Map a category item
pub fn to_category(raw: &Value) -> Category {
    Category {
        id: json::string(raw, "_id"),
        name: json::string(raw, "name"),
        slug: json::string(raw, "slug"),
    }
}

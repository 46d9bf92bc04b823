//! Comic data types
//!
//! Normalized entities consumed by the stores and views. They are only ever
//! produced by the mapping functions in [`super::mapping`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComicStatus {
    #[default]
    Ongoing,
    Completed,
}

impl ComicStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "hoan-thanh" => Self::Completed,
            _ => Self::Ongoing,
        }
    }
}

/// Pointer to the newest chapter of a comic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestChapter {
    pub chapter_name: String,
    /// Opaque chapter-detail URL
    pub chapter_url: String,
}

/// Comic as shown in listings and carousels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// Absolute thumbnail URL
    pub thumbnail: String,
    pub status: ComicStatus,
    pub genres: Vec<String>,
    pub latest_chapter: LatestChapter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Original-language titles
    pub origin_names: Vec<String>,
    /// Thumbnail path relative to the CDN
    pub thumb_path: String,
}

/// One chapter entry of a server listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Chapter listing from one mirror server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterGroup {
    pub server_name: String,
    pub chapters: Vec<ChapterRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoInfo {
    pub title: String,
    pub description: String,
    pub og_image: String,
}

/// Comic detail page data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicDetail {
    #[serde(flatten)]
    pub summary: ComicSummary,
    /// HTML description, passed through untouched
    pub content: String,
    pub authors: Vec<String>,
    pub chapters: Vec<ChapterGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_info: Option<SeoInfo>,
}

impl ComicDetail {
    pub fn slug(&self) -> &str {
        &self.summary.slug
    }

    /// Canonical chapter sequence, latest first.
    ///
    /// Server listings are concatenated in order; a chapter name already seen
    /// on an earlier server is skipped.
    pub fn chapter_sequence(&self) -> Vec<&ChapterRef> {
        let mut seen = HashSet::new();
        self.chapters
            .iter()
            .flat_map(|group| group.chapters.iter())
            .filter(|chapter| seen.insert(chapter.name.as_str()))
            .collect()
    }

    pub fn find_chapter(&self, name: &str) -> Option<&ChapterRef> {
        self.chapters
            .iter()
            .flat_map(|group| group.chapters.iter())
            .find(|chapter| chapter.name == name)
    }

    /// Most recent chapter (head of the sequence)
    pub fn newest_chapter(&self) -> Option<&ChapterRef> {
        self.chapter_sequence().first().copied()
    }

    /// Oldest chapter (tail of the sequence)
    pub fn oldest_chapter(&self) -> Option<&ChapterRef> {
        self.chapter_sequence().last().copied()
    }
}

/// A single page image of a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterImage {
    pub page: u32,
    pub image_url: String,
    /// Render key, unique across refetches of the same chapter
    pub unique_id: String,
}

/// Chapter reading data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDetail {
    pub chapter_name: String,
    pub chapter_title: String,
    pub images: Vec<ChapterImage>,
}

impl ChapterDetail {
    pub fn page_count(&self) -> usize {
        self.images.len()
    }
}

/// Genre category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Identity of one chapter-detail fetch
///
/// The sequence number keeps two fetches inside the same millisecond apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStamp {
    pub fetched_at: DateTime<Utc>,
    pub sequence: u64,
}

static FETCH_SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl FetchStamp {
    /// Stamp for a fetch happening now
    pub fn next() -> Self {
        Self {
            fetched_at: Utc::now(),
            sequence: FETCH_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn new(fetched_at: DateTime<Utc>, sequence: u64) -> Self {
        Self {
            fetched_at,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(name: &str) -> ChapterRef {
        ChapterRef {
            name: name.to_string(),
            url: format!("https://cdn.example/chapter/{}", name),
            title: None,
        }
    }

    fn detail_with(servers: &[&[&str]]) -> ComicDetail {
        ComicDetail {
            chapters: servers
                .iter()
                .enumerate()
                .map(|(i, names)| ChapterGroup {
                    server_name: format!("Server #{}", i + 1),
                    chapters: names.iter().map(|n| chapter(n)).collect(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_chapter_sequence_dedupes_across_servers() {
        let detail = detail_with(&[&["3", "2"], &["3", "1"]]);
        let names: Vec<&str> = detail
            .chapter_sequence()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["3", "2", "1"]);
        assert_eq!(detail.newest_chapter().unwrap().name, "3");
        assert_eq!(detail.oldest_chapter().unwrap().name, "1");
    }

    #[test]
    fn test_find_chapter_first_server_wins() {
        let detail = detail_with(&[&["2"], &["2", "1"]]);
        let found = detail.find_chapter("2").unwrap();
        assert_eq!(found.url, "https://cdn.example/chapter/2");
        assert!(detail.find_chapter("9").is_none());
    }

    #[test]
    fn test_empty_detail_has_no_chapters() {
        let detail = ComicDetail::default();
        assert!(detail.chapter_sequence().is_empty());
        assert!(detail.newest_chapter().is_none());
    }

    #[test]
    fn test_fetch_stamps_are_distinct() {
        let a = FetchStamp::next();
        let b = FetchStamp::next();
        assert_ne!(a.sequence, b.sequence);
    }

    #[test]
    fn test_status_from_raw() {
        assert_eq!(ComicStatus::from_raw("completed"), ComicStatus::Completed);
        assert_eq!(ComicStatus::from_raw("ongoing"), ComicStatus::Ongoing);
        assert_eq!(ComicStatus::from_raw("coming_soon"), ComicStatus::Ongoing);
    }
}

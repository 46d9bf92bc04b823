//! Comic entities and payload mapping

pub mod mapping;
mod types;

pub use mapping::{to_category, to_chapter_detail, to_comic_detail, to_comic_summary};
pub use types::{
    Category, ChapterDetail, ChapterGroup, ChapterImage, ChapterRef, ComicDetail, ComicStatus,
    ComicSummary, FetchStamp, LatestChapter, SeoInfo,
};

//! Account data types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json;

/// Comics per page when the backend omits pagination for favorites
pub const FAVORITES_PER_PAGE: usize = 24;

/// A comic in the reading list or favorites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_read_chapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_read_at: Option<String>,
}

impl LibraryEntry {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            slug: json::string(raw, "slug"),
            last_read_chapter: json::opt_string(raw, "lastReadChapter"),
            last_read_at: json::opt_string(raw, "lastReadAt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_pages: u32,
    pub current_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
}

impl Pagination {
    /// Read the `pagination` block, or derive one page count from the item
    /// count when the block is missing
    pub fn from_value(raw: &Value, item_count: usize, per_page: usize) -> Self {
        match raw.get("pagination").filter(|p| p.is_object()) {
            Some(p) => Self {
                total_pages: json::uint(p, "totalPages")
                    .map(|t| t.max(1) as u32)
                    .unwrap_or(1),
                current_page: json::uint(p, "currentPage")
                    .or_else(|| json::uint(p, "page"))
                    .map(|c| c.max(1) as u32)
                    .unwrap_or(1),
                total_items: json::uint(p, "totalItems").or_else(|| json::uint(p, "total")),
            },
            None => Self {
                total_pages: item_count.div_ceil(per_page.max(1)).max(1) as u32,
                current_page: 1,
                total_items: Some(item_count as u64),
            },
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total_pages: 1,
            current_page: 1,
            total_items: None,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Reading progress report for one comic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub slug: String,
    /// Chapter name the reader is on
    pub chapter: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

/// Library entry joined with the comic's display data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedEntry {
    pub entry: LibraryEntry,
    pub title: String,
    pub thumbnail: String,
}

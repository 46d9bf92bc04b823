//! Adjacent chapter resolution
//!
//! Sequences are latest first: index 0 is the newest chapter. The next
//! (newer) chapter sits at `i - 1` and the previous (older) one at `i + 1`.

use crate::comic::ChapterRef;

/// Neighbours of the current chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacent {
    pub current_index: usize,
    /// Chronologically later chapter
    pub next: Option<ChapterRef>,
    /// Chronologically earlier chapter
    pub previous: Option<ChapterRef>,
}

/// Locate `current` in a latest-first sequence. `None` when it is not listed.
pub fn resolve_adjacent(sequence: &[&ChapterRef], current: &str) -> Option<Adjacent> {
    let index = sequence.iter().position(|chapter| chapter.name == current)?;

    let next = index
        .checked_sub(1)
        .and_then(|i| sequence.get(i))
        .map(|chapter| (*chapter).clone());
    let previous = sequence.get(index + 1).map(|chapter| (*chapter).clone());

    Some(Adjacent {
        current_index: index,
        next,
        previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comic::{ChapterGroup, ComicDetail};

    fn detail(servers: &[&[&str]]) -> ComicDetail {
        ComicDetail {
            chapters: servers
                .iter()
                .enumerate()
                .map(|(i, names)| ChapterGroup {
                    server_name: format!("Server {}", i + 1),
                    chapters: names
                        .iter()
                        .map(|name| ChapterRef {
                            name: name.to_string(),
                            url: format!("https://sv{}.example/chapter/{}", i + 1, name),
                            title: None,
                        })
                        .collect(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn name(chapter: &Option<ChapterRef>) -> Option<&str> {
        chapter.as_ref().map(|c| c.name.as_str())
    }

    #[test]
    fn test_middle_chapter() {
        let comic = detail(&[&["3", "2"], &["3", "1"]]);
        let sequence = comic.chapter_sequence();

        let adjacent = resolve_adjacent(&sequence, "2").unwrap();
        assert_eq!(adjacent.current_index, 1);
        assert_eq!(name(&adjacent.next), Some("3"));
        assert_eq!(name(&adjacent.previous), Some("1"));
    }

    #[test]
    fn test_boundaries() {
        let comic = detail(&[&["3", "2"], &["3", "1"]]);
        let sequence = comic.chapter_sequence();

        let newest = resolve_adjacent(&sequence, "3").unwrap();
        assert_eq!(newest.current_index, 0);
        assert_eq!(newest.next, None);
        assert_eq!(name(&newest.previous), Some("2"));

        let oldest = resolve_adjacent(&sequence, "1").unwrap();
        assert_eq!(oldest.current_index, 2);
        assert_eq!(name(&oldest.next), Some("2"));
        assert_eq!(oldest.previous, None);
    }

    #[test]
    fn test_single_and_missing() {
        let comic = detail(&[&["1"]]);
        let sequence = comic.chapter_sequence();

        let only = resolve_adjacent(&sequence, "1").unwrap();
        assert_eq!(only.next, None);
        assert_eq!(only.previous, None);
        assert!(resolve_adjacent(&sequence, "99").is_none());
        assert!(resolve_adjacent(&[], "1").is_none());
    }

    #[test]
    fn test_duplicate_keeps_first_server_url() {
        let comic = detail(&[&["3", "2"], &["3", "1"]]);
        let sequence = comic.chapter_sequence();

        let adjacent = resolve_adjacent(&sequence, "2").unwrap();
        assert_eq!(
            adjacent.next.unwrap().url,
            "https://sv1.example/chapter/3"
        );
    }
}

//! Catalog slices and request sequencing

use std::sync::atomic::{AtomicU64, Ordering};

/// One independently loading piece of catalog state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slice<T> {
    pub data: T,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Slice<T> {
    pub(crate) fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, data: T) {
        self.data = data;
        self.is_loading = false;
    }

    /// Previous data is kept
    pub(crate) fn fail(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SliceKind {
    Home,
    Genre,
    Search,
    NewComics,
    Categories,
    Comic,
    Chapter,
}

impl SliceKind {
    const COUNT: usize = 7;

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-slice request counters.
///
/// Each request takes the next number for its slice; only a response
/// carrying the latest number may touch that slice.
#[derive(Debug, Default)]
pub(crate) struct SequenceGate {
    latest: [AtomicU64; SliceKind::COUNT],
}

impl SequenceGate {
    pub fn issue(&self, kind: SliceKind) -> u64 {
        self.latest[kind.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, kind: SliceKind, sequence: u64) -> bool {
        self.latest[kind.index()].load(Ordering::SeqCst) == sequence
    }

    /// Make every in-flight request stale
    pub fn invalidate_all(&self) {
        for counter in &self.latest {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_request_wins() {
        let gate = SequenceGate::default();
        let first = gate.issue(SliceKind::Search);
        let second = gate.issue(SliceKind::Search);
        assert!(!gate.is_current(SliceKind::Search, first));
        assert!(gate.is_current(SliceKind::Search, second));
    }

    #[test]
    fn test_slices_are_independent() {
        let gate = SequenceGate::default();
        let home = gate.issue(SliceKind::Home);
        gate.issue(SliceKind::Search);
        assert!(gate.is_current(SliceKind::Home, home));
    }

    #[test]
    fn test_invalidate_all() {
        let gate = SequenceGate::default();
        let comic = gate.issue(SliceKind::Comic);
        gate.invalidate_all();
        assert!(!gate.is_current(SliceKind::Comic, comic));
    }

    #[test]
    fn test_failure_keeps_data() {
        let mut slice = Slice {
            data: vec![1, 2],
            ..Default::default()
        };
        slice.begin();
        assert!(slice.is_loading);
        slice.fail("offline".to_string());
        assert_eq!(slice.data, vec![1, 2]);
        assert_eq!(slice.error.as_deref(), Some("offline"));
        assert!(!slice.is_loading);
    }
}

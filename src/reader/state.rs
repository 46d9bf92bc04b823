use std::collections::BTreeSet;

/// Reader view state for the open chapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderState {
    pub chapter_name: Option<String>,
    /// Pages whose image finished, successfully or not
    pub loaded_pages: BTreeSet<u32>,
    /// Set by the fallback timer; every page is shown regardless of load
    /// signals
    pub force_show_all: bool,
    pub chapter_selector_open: bool,
    /// Incremented on every chapter change
    pub epoch: u64,
    pub expected_pages: Option<usize>,
}

impl ReaderState {
    pub fn is_page_visible(&self, page: u32) -> bool {
        self.force_show_all || self.loaded_pages.contains(&page)
    }

    pub fn should_show_placeholder(&self, page: u32) -> bool {
        !self.is_page_visible(page)
    }

    /// Every page of a known page count has resolved
    pub fn all_resolved(&self) -> bool {
        self.expected_pages
            .map(|expected| self.loaded_pages.len() >= expected)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        let mut state = ReaderState::default();
        state.loaded_pages.insert(2);
        assert!(state.is_page_visible(2));
        assert!(state.should_show_placeholder(1));

        state.force_show_all = true;
        assert!(!state.should_show_placeholder(1));
    }

    #[test]
    fn test_all_resolved_needs_page_count() {
        let mut state = ReaderState::default();
        state.loaded_pages.extend([1, 2]);
        assert!(!state.all_resolved());

        state.expected_pages = Some(3);
        assert!(!state.all_resolved());
        state.loaded_pages.insert(3);
        assert!(state.all_resolved());
    }
}

use crate::models::history_types::{
    FilterField, HistoryRequestParams, Pagination, PaginationView, SortKey, ViewMode,
};
use std::collections::BTreeMap;

/// Number of page buttons rendered under the history list.
pub const DEFAULT_VISIBLE_PAGES: u32 = 5;

/// Paging, sorting and filtering state of the history list.
///
/// Any change to the filters or the sort order starts again from page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQueryEngine {
    page_size: u32,
    // Page size the server actually used; drives the summary.
    per_page: u32,
    current_page: u32,
    total_pages: u32,
    total: u64,
    sort: SortKey,
    filters: BTreeMap<FilterField, String>,
    view_mode: ViewMode,
}

impl HistoryQueryEngine {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            per_page: page_size.max(1),
            current_page: 1,
            total_pages: 1,
            total: 0,
            sort: SortKey::default(),
            filters: BTreeMap::new(),
            view_mode: ViewMode::default(),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn filters(&self) -> &BTreeMap<FilterField, String> {
        &self.filters
    }

    /// Sets one filter. A blank value removes it.
    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, value.to_string());
        }
        self.current_page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.current_page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.current_page = 1;
    }

    /// Jumps to `page`. Out-of-range pages leave the state untouched and return `false`.
    pub fn set_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.total_pages {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Previous/next buttons.
    pub fn change_page(&mut self, delta: i32) -> bool {
        let target = i64::from(self.current_page) + i64::from(delta);
        match u32::try_from(target) {
            Ok(page) => self.set_page(page),
            Err(_) => false,
        }
    }

    /// Switching between table and grid keeps the current page.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Adopts the paging metadata of a server response.
    pub fn apply_pagination(&mut self, pagination: &Pagination) {
        self.total_pages = pagination.total_pages.max(1);
        self.current_page = pagination.current_page.clamp(1, self.total_pages);
        self.total = pagination.total;
        self.per_page = pagination.per_page.max(1);
    }

    pub fn build_request_params(&self) -> HistoryRequestParams {
        HistoryRequestParams {
            page: self.current_page,
            limit: self.page_size,
            sort: self.sort,
            filters: self.filters.clone(),
        }
    }

    /// At most `max_visible` consecutive page numbers, kept around the current page.
    pub fn windowed_page_numbers(&self, max_visible: u32) -> Vec<u32> {
        if max_visible == 0 {
            return Vec::new();
        }
        let mut start = self.current_page.saturating_sub(max_visible / 2).max(1);
        let end = start
            .saturating_add(max_visible - 1)
            .min(self.total_pages);
        if end - start + 1 < max_visible {
            start = end.saturating_sub(max_visible - 1).max(1);
        }
        (start..=end).collect()
    }

    /// "Showing X-Y of Z" plus the page buttons.
    pub fn pagination_view(&self, max_visible: u32) -> PaginationView {
        let per_page = u64::from(self.per_page);
        let page = u64::from(self.current_page);
        let (summary_start, summary_end) = if self.total == 0 {
            (0, 0)
        } else {
            let end = (page * per_page).min(self.total);
            (((page - 1) * per_page + 1).min(end), end)
        };

        PaginationView {
            summary_start,
            summary_end,
            total: self.total,
            pages: self.windowed_page_numbers(max_visible),
            current_page: self.current_page,
            prev_disabled: self.current_page <= 1,
            next_disabled: self.current_page >= self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_pages(total_pages: u32, current: u32) -> HistoryQueryEngine {
        let mut engine = HistoryQueryEngine::new(20);
        engine.apply_pagination(&Pagination {
            current_page: current,
            total_pages,
            per_page: 20,
            total: u64::from(total_pages) * 20,
        });
        engine
    }

    #[test]
    fn window_hugs_the_edges() {
        assert_eq!(engine_with_pages(10, 1).windowed_page_numbers(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(engine_with_pages(10, 10).windowed_page_numbers(5), vec![6, 7, 8, 9, 10]);
        assert_eq!(engine_with_pages(10, 5).windowed_page_numbers(5), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn window_is_bounded_by_total_pages() {
        assert_eq!(engine_with_pages(3, 2).windowed_page_numbers(5), vec![1, 2, 3]);
        assert_eq!(engine_with_pages(1, 1).windowed_page_numbers(5), vec![1]);
        assert!(engine_with_pages(10, 4).windowed_page_numbers(0).is_empty());
    }

    #[test]
    fn window_always_contains_current_page() {
        for total in 1..=12 {
            for current in 1..=total {
                for visible in 1..=7 {
                    let pages = engine_with_pages(total, current).windowed_page_numbers(visible);
                    assert!(pages.contains(&current), "total={total} current={current} visible={visible}");
                    assert!(pages.len() as u32 <= visible);
                    assert!(pages.windows(2).all(|w| w[1] == w[0] + 1));
                }
            }
        }
    }

    #[test]
    fn filter_change_returns_to_first_page() {
        let mut engine = engine_with_pages(10, 1);
        engine.set_filter(FilterField::Category, "fire");
        assert!(engine.set_page(3));
        assert_eq!(engine.build_request_params().page, 3);

        engine.set_filter(FilterField::Search, "bridge");
        let params = engine.build_request_params();
        assert_eq!(params.page, 1);
        assert_eq!(params.filters.len(), 2);
    }

    #[test]
    fn blank_filter_value_removes_the_filter() {
        let mut engine = HistoryQueryEngine::new(20);
        engine.set_filter(FilterField::Search, "smoke");
        engine.set_filter(FilterField::Search, "   ");
        assert!(engine.filters().is_empty());
    }

    #[test]
    fn sort_change_returns_to_first_page() {
        let mut engine = engine_with_pages(4, 3);
        engine.set_sort(SortKey::ConfidenceDesc);
        assert_eq!(engine.current_page(), 1);
        assert_eq!(engine.build_request_params().sort, SortKey::ConfidenceDesc);
    }

    #[test]
    fn out_of_range_page_is_ignored() {
        let mut engine = engine_with_pages(4, 2);
        assert!(!engine.set_page(0));
        assert!(!engine.set_page(5));
        assert_eq!(engine.current_page(), 2);

        assert!(!engine_with_pages(4, 1).change_page(-1));
        assert!(engine.change_page(1));
        assert_eq!(engine.current_page(), 3);
    }

    #[test]
    fn view_mode_keeps_the_page() {
        let mut engine = engine_with_pages(4, 3);
        engine.set_view_mode(ViewMode::Grid);
        assert_eq!(engine.current_page(), 3);
        assert_eq!(engine.view_mode(), ViewMode::Grid);
    }

    #[test]
    fn server_pagination_is_clamped() {
        let mut engine = HistoryQueryEngine::new(20);
        engine.apply_pagination(&Pagination {
            current_page: 9,
            total_pages: 0,
            per_page: 20,
            total: 0,
        });
        assert_eq!(engine.total_pages(), 1);
        assert_eq!(engine.current_page(), 1);
    }

    #[test]
    fn summary_covers_last_partial_page() {
        let mut engine = HistoryQueryEngine::new(20);
        engine.apply_pagination(&Pagination {
            current_page: 3,
            total_pages: 3,
            per_page: 20,
            total: 45,
        });
        let view = engine.pagination_view(DEFAULT_VISIBLE_PAGES);
        assert_eq!((view.summary_start, view.summary_end, view.total), (41, 45, 45));
        assert!(!view.prev_disabled);
        assert!(view.next_disabled);
    }

    #[test]
    fn empty_history_summary_is_zero() {
        let view = HistoryQueryEngine::new(20).pagination_view(DEFAULT_VISIBLE_PAGES);
        assert_eq!((view.summary_start, view.summary_end), (0, 0));
        assert_eq!(view.pages, vec![1]);
        assert!(view.prev_disabled && view.next_disabled);
    }

    #[test]
    fn summary_uses_server_page_size() {
        let mut engine = HistoryQueryEngine::new(20);
        engine.apply_pagination(&Pagination {
            current_page: 2,
            total_pages: 3,
            per_page: 10,
            total: 30,
        });
        let view = engine.pagination_view(DEFAULT_VISIBLE_PAGES);
        assert_eq!((view.summary_start, view.summary_end), (11, 20));
        assert_eq!(engine.build_request_params().limit, 20);
    }

    #[test]
    fn summary_start_never_passes_end() {
        let mut engine = HistoryQueryEngine::new(20);
        engine.apply_pagination(&Pagination {
            current_page: 3,
            total_pages: 3,
            per_page: 20,
            total: 10,
        });
        let view = engine.pagination_view(DEFAULT_VISIBLE_PAGES);
        assert!(view.summary_start <= view.summary_end);
        assert_eq!(view.summary_end, 10);
    }
}

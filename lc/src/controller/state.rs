//! ControllerState - the query state store
//!
//! Fields are crate-private: the actor is the only writer, and everyone else
//! sees snapshot copies through the accessors.

use serde::Serialize;
use serde_json::Value;

use crate::domain::{ChipSpec, Chips, FetchResult, Pagination, RowData, SortModel};

/// Query parameters, committed result and UI flags of one list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerState<R> {
    pub(crate) filter_data: Value,
    pub(crate) sort: SortModel,
    pub(crate) chips: Chips,
    pub(crate) search: String,
    pub(crate) limit: usize,
    pub(crate) offset: usize,
    pub(crate) rows: Vec<R>,
    pub(crate) total: Option<usize>,
    pub(crate) payload: Value,
    pub(crate) loading: bool,
    pub(crate) init_complete: bool,
    pub(crate) filters_collapsed: bool,
    pub(crate) rerender: bool,
}

impl<R: RowData> ControllerState<R> {
    /// Initial state before the first fetch
    ///
    /// `offset` starts at `limit * page`. A chip is enabled when `chip_data`
    /// says so, otherwise by its declared `enabled` flag.
    pub(crate) fn initial(
        pagination: Pagination,
        filter_data: Value,
        sort: SortModel,
        chips: &[ChipSpec],
        chip_data: &Chips,
        search: String,
        payload: Value,
        filters_collapsed: bool,
    ) -> Self {
        let chips = chips
            .iter()
            .map(|chip| {
                let enabled = chip_data.get(&chip.name).copied().unwrap_or(false) || chip.enabled;
                (chip.name.clone(), enabled)
            })
            .collect();
        Self {
            filter_data,
            sort,
            chips,
            search,
            limit: pagination.limit,
            offset: pagination.offset,
            rows: Vec::new(),
            total: None,
            payload,
            loading: false,
            init_complete: false,
            filters_collapsed,
            rerender: false,
        }
    }

    // === Transitions (actor only) ===

    pub(crate) fn set_page(&mut self, page: usize) {
        self.offset = page.saturating_mul(self.limit);
    }

    /// Change the page size; returns the recomputed page
    pub(crate) fn set_limit(&mut self, limit: usize) -> usize {
        let pagination = self.pagination().with_limit(limit);
        self.limit = pagination.limit;
        self.offset = pagination.offset;
        pagination.page()
    }

    /// Replace rows directly; returns how many were dropped to fit the limit
    pub(crate) fn set_rows(&mut self, mut rows: Vec<R>) -> usize {
        let dropped = rows.len().saturating_sub(self.limit);
        rows.truncate(self.limit);
        self.rows = rows;
        dropped
    }

    pub(crate) fn set_sort_model(&mut self, sort: SortModel) {
        self.offset = 0;
        self.sort = sort;
    }

    /// Merge `chips` over the current chips; caller keys win
    pub(crate) fn merge_chips(&mut self, chips: Chips) {
        self.offset = 0;
        self.chips.extend(chips);
    }

    pub(crate) fn set_search(&mut self, search: String) {
        self.offset = 0;
        self.search = search;
    }

    /// Mark a fetch in flight, moving to the first page unless pagination is kept
    ///
    /// Returns the offset before the move. Page changes made while the fetch
    /// runs land on top of the reset and survive the commit.
    pub(crate) fn begin_fetch(&mut self, keep_pagination: bool) -> usize {
        let offset = self.offset;
        self.loading = true;
        if !keep_pagination {
            self.offset = 0;
        }
        offset
    }

    /// Commit a successful fetch
    pub(crate) fn commit_fetch(&mut self, filter_data: Value, result: FetchResult<R>) {
        self.init_complete = true;
        self.loading = false;
        self.filter_data = filter_data;
        self.rows = result.rows;
        self.total = result.total;
    }

    /// Leave rows and total untouched after a failed fetch
    ///
    /// `restore_offset` puts back the page the failed fetch moved away from.
    pub(crate) fn fail_fetch(&mut self, restore_offset: Option<usize>) {
        self.loading = false;
        if let Some(offset) = restore_offset {
            self.offset = offset;
        }
    }

    pub(crate) fn set_filters_collapsed(&mut self, collapsed: bool) {
        self.filters_collapsed = collapsed;
    }

    pub(crate) fn set_rerender(&mut self, rerender: bool) {
        self.rerender = rerender;
    }
}

impl<R> ControllerState<R> {
    pub fn filter_data(&self) -> &Value {
        &self.filter_data
    }

    pub fn sort(&self) -> &SortModel {
        &self.sort
    }

    pub fn chips(&self) -> &Chips {
        &self.chips
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }

    pub fn page(&self) -> usize {
        self.pagination().page()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_init_complete(&self) -> bool {
        self.init_complete
    }

    pub fn filters_collapsed(&self) -> bool {
        self.filters_collapsed
    }

    pub fn is_rerender(&self) -> bool {
        self.rerender
    }

    /// Whether rows exist beyond the committed page
    pub fn has_more(&self) -> bool {
        let pagination = self.pagination();
        match self.total {
            Some(total) => pagination.offset + self.rows.len() < total,
            None => self.limit > 0 && self.rows.len() >= self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JsonRow, SortItem};
    use proptest::prelude::*;
    use serde_json::json;

    fn state(limit: usize, page: usize) -> ControllerState<JsonRow> {
        ControllerState::initial(
            Pagination::for_page(page, limit),
            json!({"name": "a"}),
            vec![SortItem::asc("name")],
            &[ChipSpec::new("active", false), ChipSpec::new("archived", true)],
            &Chips::from([("active".to_string(), true)]),
            "foo".to_string(),
            Value::Null,
            false,
        )
    }

    fn rows(n: i64) -> Vec<JsonRow> {
        (0..n).map(JsonRow::new).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = state(10, 2);
        assert_eq!(state.offset(), 20);
        assert_eq!(state.page(), 2);
        assert_eq!(state.chips().get("active"), Some(&true));
        assert_eq!(state.chips().get("archived"), Some(&true));
        assert!(!state.is_init_complete());
        assert!(!state.is_loading());
        assert!(state.rows().is_empty());
    }

    #[test]
    fn test_set_limit_recomputes_page() {
        let mut state = state(10, 2);
        let page = state.set_limit(25);
        assert_eq!(page, 0);
        assert_eq!(state.offset(), 0);
        assert_eq!(state.limit(), 25);
    }

    #[test]
    fn test_pagination_never_touches_parameters() {
        let mut state = state(10, 0);
        let before = (state.filter_data().clone(), state.sort().clone(), state.chips().clone(), state.search().to_string());

        state.set_page(7);
        state.set_limit(3);

        let after = (state.filter_data().clone(), state.sort().clone(), state.chips().clone(), state.search().to_string());
        assert_eq!(before, after);
        assert_eq!(state.offset(), 69);
    }

    #[test]
    fn test_parameter_transitions_reset_offset() {
        let mut state = state(10, 3);
        state.set_sort_model(vec![SortItem::desc("age")]);
        assert_eq!(state.offset(), 0);

        state.set_page(3);
        state.merge_chips(Chips::from([("archived".to_string(), false), ("new".to_string(), true)]));
        assert_eq!(state.offset(), 0);
        assert_eq!(state.chips().get("active"), Some(&true));
        assert_eq!(state.chips().get("archived"), Some(&false));
        assert_eq!(state.chips().get("new"), Some(&true));

        state.set_page(3);
        state.set_search("bar".to_string());
        assert_eq!(state.offset(), 0);
        assert_eq!(state.search(), "bar");
    }

    #[test]
    fn test_commit_and_fail_fetch() {
        let mut state = state(10, 1);
        assert_eq!(state.begin_fetch(true), 10);
        assert!(state.is_loading());

        state.commit_fetch(json!({"x": 1}), FetchResult::new(rows(10), Some(25)));
        assert!(!state.is_loading());
        assert!(state.is_init_complete());
        assert_eq!(state.offset(), 10);
        assert_eq!(state.total(), Some(25));
        assert!(state.has_more());

        state.begin_fetch(true);
        state.fail_fetch(None);
        assert_eq!(state.rows().len(), 10);
        assert_eq!(state.total(), Some(25));

        assert_eq!(state.begin_fetch(false), 10);
        assert_eq!(state.offset(), 0);
        state.commit_fetch(json!({}), FetchResult::new(rows(2), None));
        assert_eq!(state.offset(), 0);
        assert!(!state.has_more());
    }

    #[test]
    fn test_page_set_during_fetch_survives_commit() {
        let mut state = state(10, 1);
        state.begin_fetch(false);
        state.set_page(3);
        state.commit_fetch(json!({}), FetchResult::new(rows(10), Some(100)));
        assert_eq!(state.offset(), 30);
    }

    #[test]
    fn test_failed_fetch_restores_offset() {
        let mut state = state(10, 2);
        let before = state.begin_fetch(false);
        state.fail_fetch(Some(before));
        assert_eq!(state.offset(), 20);
        assert!(!state.is_loading());
    }

    proptest! {
        #[test]
        fn prop_set_rows_never_exceeds_limit(limit in 0usize..50, count in 0i64..120) {
            let mut state = state(limit, 0);
            let dropped = state.set_rows(rows(count));
            prop_assert!(state.rows().len() <= limit);
            prop_assert_eq!(state.rows().len() + dropped, count as usize);
        }
    }
}

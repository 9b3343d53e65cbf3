//! Fetch coordinator decisions
//!
//! The actor owns the debounce timer; this module only answers "what should
//! a settled tick do?" so the decision table can be tested without a runtime.

use super::state::ControllerState;
use crate::domain::{Chips, Pagination, SortModel};

/// One-shot flags consumed by coordinator ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorFlags {
    /// Set by every transition; cleared when a tick dispatches its fetch
    pub fetch_pending: bool,
    /// Set by `rerender()`; the next tick republishes only
    pub force_rerender: bool,
    /// Set by `set_rows()`; the next tick keeps the supplied rows
    pub direct_patch: bool,
}

/// The parts of the query a tick compares against the last applied state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySnapshot {
    pub pagination: Pagination,
    pub sort: SortModel,
    pub chips: Chips,
    pub search: String,
}

/// What differs between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    Unchanged,
    /// Only limit and/or offset
    Pagination,
    /// Sort, chips or search (pagination may differ too)
    Parameters,
}

impl QuerySnapshot {
    pub fn of<R>(state: &ControllerState<R>) -> Self {
        Self {
            pagination: state.pagination(),
            sort: state.sort.clone(),
            chips: state.chips.clone(),
            search: state.search.clone(),
        }
    }

    /// Classify the change from `self` (previous) to `current`
    pub fn diff(&self, current: &QuerySnapshot) -> QueryChange {
        if self.sort != current.sort || self.chips != current.chips || self.search != current.search {
            QueryChange::Parameters
        } else if self.pagination != current.pagination {
            QueryChange::Pagination
        } else {
            QueryChange::Unchanged
        }
    }
}

/// Outcome of a settled debounce tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Loading or not initialised yet; retry after the fetch completes
    Deferred,
    /// Nothing pending
    Idle,
    /// A forced rerender ate this tick
    RerenderConsumed,
    /// A direct row patch ate this tick
    PatchConsumed,
    /// Refetch the current filter at the current page
    Reload,
    /// Refetch the current filter from page 0
    Refilter,
}

impl TickDecision {
    pub fn dispatches_fetch(&self) -> bool {
        matches!(self, Self::Reload | Self::Refilter)
    }
}

/// Decide what a settled tick does, consuming one-shot flags
///
/// Suppressors leave `fetch_pending` set so the deferred fetch still runs on
/// the next tick.
pub fn decide<R>(flags: &mut CoordinatorFlags, state: &ControllerState<R>, prev: &QuerySnapshot) -> TickDecision {
    if state.loading || !state.init_complete {
        return TickDecision::Deferred;
    }
    if !flags.fetch_pending {
        return TickDecision::Idle;
    }
    if flags.force_rerender {
        flags.force_rerender = false;
        return TickDecision::RerenderConsumed;
    }
    if flags.direct_patch {
        flags.direct_patch = false;
        return TickDecision::PatchConsumed;
    }

    flags.fetch_pending = false;
    match prev.diff(&QuerySnapshot::of(state)) {
        QueryChange::Parameters => TickDecision::Refilter,
        QueryChange::Pagination => TickDecision::Reload,
        // The last fetch already covered this query
        QueryChange::Unchanged => TickDecision::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChipSpec, FetchResult, JsonRow, SortItem};
    use serde_json::Value;

    fn ready_state() -> ControllerState<JsonRow> {
        let mut state = ControllerState::initial(
            Pagination::new(10, 0),
            Value::Null,
            Vec::new(),
            &[ChipSpec::new("active", false)],
            &Chips::new(),
            String::new(),
            Value::Null,
            false,
        );
        state.begin_fetch(true);
        state.commit_fetch(Value::Null, FetchResult::empty());
        state
    }

    fn pending() -> CoordinatorFlags {
        CoordinatorFlags {
            fetch_pending: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_deferred_while_loading_or_uninitialised() {
        let mut state = ready_state();
        let prev = QuerySnapshot::of(&state);
        state.begin_fetch(true);
        let mut flags = pending();
        assert_eq!(decide(&mut flags, &state, &prev), TickDecision::Deferred);
        assert!(flags.fetch_pending);

        let fresh = ControllerState::<JsonRow>::initial(
            Pagination::new(10, 0),
            Value::Null,
            Vec::new(),
            &[],
            &Chips::new(),
            String::new(),
            Value::Null,
            false,
        );
        assert_eq!(decide(&mut flags, &fresh, &prev), TickDecision::Deferred);
    }

    #[test]
    fn test_idle_without_pending_fetch() {
        let state = ready_state();
        let prev = QuerySnapshot::of(&state);
        let mut flags = CoordinatorFlags {
            force_rerender: true,
            ..Default::default()
        };
        assert_eq!(decide(&mut flags, &state, &prev), TickDecision::Idle);
        assert!(flags.force_rerender);
    }

    #[test]
    fn test_suppressors_consumed_once_in_order() {
        let mut state = ready_state();
        let prev = QuerySnapshot::of(&state);
        state.set_page(2);
        let mut flags = CoordinatorFlags {
            fetch_pending: true,
            force_rerender: true,
            direct_patch: true,
        };

        assert_eq!(decide(&mut flags, &state, &prev), TickDecision::RerenderConsumed);
        assert_eq!(decide(&mut flags, &state, &prev), TickDecision::PatchConsumed);
        assert_eq!(decide(&mut flags, &state, &prev), TickDecision::Reload);
        assert_eq!(flags, CoordinatorFlags::default());
        assert_eq!(decide(&mut flags, &state, &prev), TickDecision::Idle);
    }

    #[test]
    fn test_pagination_only_reloads() {
        let mut state = ready_state();
        let prev = QuerySnapshot::of(&state);
        state.set_page(3);
        state.set_limit(5);
        assert_eq!(prev.diff(&QuerySnapshot::of(&state)), QueryChange::Pagination);
        assert_eq!(decide(&mut pending(), &state, &prev), TickDecision::Reload);
    }

    #[test]
    fn test_parameter_change_refilters() {
        let state = ready_state();
        let prev = QuerySnapshot::of(&state);

        let mut sorted = state.clone();
        sorted.set_sort_model(vec![SortItem::asc("name")]);
        assert_eq!(decide(&mut pending(), &sorted, &prev), TickDecision::Refilter);

        let mut chipped = state.clone();
        chipped.merge_chips(Chips::from([("active".to_string(), true)]));
        assert_eq!(decide(&mut pending(), &chipped, &prev), TickDecision::Refilter);

        let mut searched = state.clone();
        searched.set_search("abc".to_string());
        searched.set_page(4);
        assert_eq!(prev.diff(&QuerySnapshot::of(&searched)), QueryChange::Parameters);
        assert_eq!(decide(&mut pending(), &searched, &prev), TickDecision::Refilter);
    }

    #[test]
    fn test_unchanged_pending_is_idle() {
        let state = ready_state();
        let prev = QuerySnapshot::of(&state);
        let mut flags = pending();
        let decision = decide(&mut flags, &state, &prev);
        assert_eq!(decision, TickDecision::Idle);
        assert!(!flags.fetch_pending);
        assert!(!decision.dispatches_fetch());
        assert!(TickDecision::Reload.dispatches_fetch());
    }
}

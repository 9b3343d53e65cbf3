//! ControllerActor - owns the ControllerState and runs the fetch coordinator
//!
//! Every command is applied synchronously; fetches run in spawned tasks and
//! report back over the completion channel.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use super::coordinator::{self, CoordinatorFlags, QuerySnapshot, TickDecision};
use super::messages::{ControllerCommand, FetchOutcome};
use super::state::ControllerState;
use crate::domain::{Chips, FetchResult, Pagination, RowData, SortModel, toggle_sort};
use crate::events::Notifier;
use crate::fields::{FieldDescriptor, resolve_defaults, resolve_initial_filter_data};
use crate::handler::{FetchAdapter, ListQuery, ignore_symbols};
use crate::lifecycle::Lifecycle;
use crate::subject::Subscription;

pub(crate) type Reply<R> = oneshot::Sender<FetchOutcome<R>>;

/// Result of a spawned fetch, tagged with the request it answers
pub(crate) struct FetchDone<R> {
    generation: u64,
    result: eyre::Result<FetchResult<R>>,
}

/// The single fetch allowed in flight
struct InFlight<R> {
    generation: u64,
    filter_data: Value,
    /// Query parameters the request was issued with
    snapshot: QuerySnapshot,
    /// Offset to put back if the fetch fails; cleared once pagination moves
    restore_offset: Option<usize>,
    reply: Option<Reply<R>>,
}

/// Fixed inputs of an actor
pub(crate) struct ActorConfig {
    pub fields: Vec<FieldDescriptor>,
    pub initial_filter_data: Value,
    pub raw_search: bool,
    pub single_sort: bool,
    pub debounce: Duration,
}

pub(crate) struct ControllerActor<R: RowData> {
    state: ControllerState<R>,
    prev: QuerySnapshot,
    flags: CoordinatorFlags,
    deadline: Option<Instant>,
    config: ActorConfig,
    adapter: Arc<FetchAdapter<R>>,
    notifier: Arc<Notifier<R>>,
    lifecycle: Lifecycle,
    state_tx: watch::Sender<ControllerState<R>>,
    done_tx: mpsc::Sender<FetchDone<R>>,
    in_flight: Option<InFlight<R>>,
    generation: u64,
    reported_page: usize,
    subscriptions: Vec<Subscription>,
}

impl<R: RowData> ControllerActor<R> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        state: ControllerState<R>,
        config: ActorConfig,
        adapter: Arc<FetchAdapter<R>>,
        notifier: Arc<Notifier<R>>,
        lifecycle: Lifecycle,
        state_tx: watch::Sender<ControllerState<R>>,
        done_tx: mpsc::Sender<FetchDone<R>>,
        subscriptions: Vec<Subscription>,
    ) -> Self {
        let prev = QuerySnapshot::of(&state);
        let reported_page = state.page();
        Self {
            state,
            prev,
            flags: CoordinatorFlags::default(),
            deadline: None,
            config,
            adapter,
            notifier,
            lifecycle,
            state_tx,
            done_tx,
            in_flight: None,
            generation: 0,
            reported_page,
            subscriptions,
        }
    }

    /// Mount, then process commands, completions and ticks until unmount
    pub(crate) async fn run(
        mut self,
        mut rx: mpsc::Receiver<ControllerCommand<R>>,
        mut done_rx: mpsc::Receiver<FetchDone<R>>,
        mount_reply: Option<Reply<R>>,
    ) {
        info!(subscriptions = self.subscriptions.len(), "ListController actor started");
        self.set_default(true, mount_reply);

        loop {
            let deadline = self.deadline;
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(ControllerCommand::Unmount { reply }) => {
                        debug!("actor: Unmount command");
                        self.teardown();
                        if let Some(reply) = reply {
                            let _ = reply.send(());
                        }
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        debug!("actor: all handles dropped");
                        self.teardown();
                        break;
                    }
                },
                Some(done) = done_rx.recv() => self.finish_fetch(done),
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => self.tick(),
            }
        }

        info!("ListController actor stopped");
    }

    fn handle_command(&mut self, cmd: ControllerCommand<R>) {
        debug!(command = cmd.name(), "actor: command");
        match cmd {
            ControllerCommand::SetFilterData {
                data,
                keep_pagination,
                reply,
            } => self.start_fetch(data, keep_pagination, false, reply),

            ControllerCommand::SetDefault { initial, reply } => self.set_default(initial, reply),

            ControllerCommand::Reload { keep_pagination, reply } => {
                self.notifier.caches_cleared();
                let filter_data = self.state.filter_data.clone();
                self.start_fetch(filter_data, keep_pagination, !keep_pagination, reply);
            }

            ControllerCommand::SetPage { page } => {
                self.flags.fetch_pending = true;
                self.pagination_moved();
                self.state.set_page(page);
                self.report_page(page);
                self.publish();
                self.arm();
            }

            ControllerCommand::SetLimit { limit } => {
                if limit == 0 {
                    warn!("actor: ignoring page size of 0");
                    return;
                }
                self.flags.fetch_pending = true;
                self.pagination_moved();
                let page = self.state.set_limit(limit);
                debug!(limit, page, "actor: limit changed");
                self.notifier.limit_changed(limit);
                self.publish();
                self.arm();
            }

            ControllerCommand::SetSortModel { sort } => self.set_sort_model(sort),

            ControllerCommand::ToggleSort { field } => {
                let sort = toggle_sort(&self.state.sort, &field, self.config.single_sort);
                self.set_sort_model(sort);
            }

            ControllerCommand::SetChips { chips } => self.set_chips(chips),

            ControllerCommand::SetSearch { search } => {
                self.flags.fetch_pending = true;
                self.pagination_moved();
                self.state.set_search(search);
                self.notifier.search_changed(&self.state.search);
                self.report_page(0);
                self.publish();
                self.arm();
            }

            ControllerCommand::SetRows { rows } => {
                self.flags.direct_patch = true;
                let dropped = self.state.set_rows(rows);
                if dropped > 0 {
                    warn!(dropped, limit = self.state.limit, "List rows count is more than its capacity, truncating");
                }
                self.notifier.rows_patched(self.state.rows.len());
                self.publish();
                self.arm();
            }

            ControllerCommand::SetFiltersCollapsed { collapsed } => {
                self.state.set_filters_collapsed(collapsed);
                self.publish();
            }

            ControllerCommand::Rerender => self.rerender(),

            ControllerCommand::GetState { reply } => {
                let _ = reply.send(self.state.clone());
            }

            ControllerCommand::Unmount { .. } => {
                // Handled by the run loop
            }
        }
    }

    // === Transitions ===

    fn set_default(&mut self, initial: bool, reply: Option<Reply<R>>) {
        let filter_data = if initial {
            resolve_initial_filter_data(&self.config.fields, &self.state.payload, &self.config.initial_filter_data)
        } else {
            resolve_defaults(&self.config.fields, &self.state.payload)
        };
        debug!(initial, "set_default: resolved filter data");
        self.start_fetch(filter_data, initial, !initial, reply);
    }

    fn set_sort_model(&mut self, sort: SortModel) {
        self.flags.fetch_pending = true;
        self.pagination_moved();
        self.state.set_sort_model(sort);
        self.notifier.sort_model_changed(&self.state.sort);
        self.report_page(0);
        self.publish();
        self.arm();
    }

    fn set_chips(&mut self, chips: Chips) {
        self.flags.fetch_pending = true;
        self.pagination_moved();
        self.state.merge_chips(chips);
        self.notifier.chips_changed(&self.state.chips);
        self.report_page(0);
        self.publish();
        self.arm();
    }

    /// Publish a forced snapshot ahead of the debounce window
    fn rerender(&mut self) {
        self.state.set_rerender(true);
        self.publish();
        self.notifier.rerendered();
        self.state.set_rerender(false);
        self.flags.force_rerender = true;
        self.publish();
        self.arm();
    }

    // === Fetching ===

    /// Dispatch a fetch of the current query with `filter_data`
    ///
    /// The fetch reads every pending transition, so it also consumes the
    /// pending debounced fetch.
    fn start_fetch(&mut self, filter_data: Value, keep_pagination: bool, reset_page: bool, reply: Option<Reply<R>>) {
        if self.state.loading {
            debug!("start_fetch: fetch in flight, ignoring");
            if let Some(reply) = reply {
                let _ = reply.send(FetchOutcome::Ignored);
            }
            return;
        }

        let pagination = if keep_pagination {
            self.state.pagination()
        } else {
            Pagination::new(self.state.limit, 0)
        };
        let search = if self.config.raw_search {
            self.state.search.clone()
        } else {
            ignore_symbols(&self.state.search)
        };
        let query = ListQuery {
            filter_data: filter_data.clone(),
            pagination,
            sort: self.state.sort.clone(),
            chips: self.state.chips.clone(),
            search,
            payload: self.state.payload.clone(),
        };
        let snapshot = QuerySnapshot {
            pagination,
            sort: query.sort.clone(),
            chips: query.chips.clone(),
            search: self.state.search.clone(),
        };

        self.generation += 1;
        let generation = self.generation;
        debug!(generation, keep_pagination, ?pagination, "start_fetch: dispatching");

        self.flags.fetch_pending = false;
        let previous_offset = self.state.begin_fetch(keep_pagination);
        self.in_flight = Some(InFlight {
            generation,
            filter_data,
            snapshot,
            restore_offset: (!keep_pagination).then_some(previous_offset),
            reply,
        });
        if reset_page {
            self.report_page(0);
        }
        self.publish();

        let adapter = Arc::clone(&self.adapter);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = adapter.fetch(query).await;
            if done_tx.send(FetchDone { generation, result }).await.is_err() {
                debug!(generation, "fetch: controller gone, dropping result");
            }
        });
    }

    fn finish_fetch(&mut self, done: FetchDone<R>) {
        let Some(in_flight) = self.in_flight.take_if(|f| f.generation == done.generation) else {
            debug!(generation = done.generation, "finish_fetch: stale completion dropped");
            return;
        };

        let outcome = match done.result {
            Ok(result) => {
                debug!(rows = result.rows.len(), total = ?result.total, "finish_fetch: committing");
                let outcome = FetchOutcome::Committed {
                    rows: result.rows.clone(),
                    total: result.total,
                };
                self.state.commit_fetch(in_flight.filter_data, result);
                self.prev = in_flight.snapshot;
                self.notifier.filter_changed(&self.state.filter_data);
                outcome
            }
            Err(err) => {
                self.state.fail_fetch(in_flight.restore_offset);
                if in_flight.restore_offset.is_some() && self.reported_page != self.state.page() {
                    self.report_page(self.state.page());
                }
                self.notifier.fetch_failed(&err);
                FetchOutcome::Failed(format!("{:#}", err))
            }
        };

        if let Some(reply) = in_flight.reply {
            let _ = reply.send(outcome);
        }
        self.publish();
        self.arm();
    }

    // === Coordinator ===

    fn tick(&mut self) {
        self.deadline = None;
        let decision = coordinator::decide(&mut self.flags, &self.state, &self.prev);
        debug!(?decision, "tick: settled");

        match decision {
            TickDecision::Deferred => return,
            TickDecision::RerenderConsumed | TickDecision::PatchConsumed => {
                // The pending fetch still runs, one window later
                self.arm();
                return;
            }
            TickDecision::Idle => {}
            TickDecision::Reload => {
                let filter_data = self.state.filter_data.clone();
                self.start_fetch(filter_data, true, false, None);
            }
            TickDecision::Refilter => {
                let filter_data = self.state.filter_data.clone();
                self.start_fetch(filter_data, false, false, None);
                // The parameter transitions already reported page 0; report it once
                if self.reported_page != 0 {
                    self.report_page(0);
                }
            }
        }
        self.prev = QuerySnapshot::of(&self.state);
    }

    // === Helpers ===

    fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.config.debounce);
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    /// Keep a page chosen during a fetch even if that fetch fails
    fn pagination_moved(&mut self) {
        if let Some(in_flight) = self.in_flight.as_mut() {
            in_flight.restore_offset = None;
        }
    }

    fn report_page(&mut self, page: usize) {
        self.reported_page = page;
        self.notifier.page_changed(page);
    }

    fn teardown(&mut self) {
        self.lifecycle.unmount();
        self.deadline = None;
        let subscriptions = self.subscriptions.len();
        self.subscriptions.clear();
        if let Some(in_flight) = self.in_flight.take() {
            debug!(generation = in_flight.generation, "teardown: abandoning in-flight fetch");
        }
        info!(subscriptions, "ListController unmounted");
    }
}

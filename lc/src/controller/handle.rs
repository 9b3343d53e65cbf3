//! ListController - cloneable handle to the controller actor

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::actor::{ActorConfig, ControllerActor, Reply};
use super::messages::{ControllerCommand, ControllerError, ControllerResponse, FetchOutcome};
use super::options::{ControllerOptions, ListTriggers};
use super::state::ControllerState;
use crate::domain::{Chips, Pagination, RowData, SortModel};
use crate::events::{EventBus, ListEvent, Notifier};
use crate::handler::FetchAdapter;
use crate::lifecycle::Lifecycle;
use crate::subject::Subscription;

/// Completions in flight at once; single-flight keeps this at one
const FETCH_DONE_BUFFER: usize = 4;

/// Handle to send commands to the controller actor
#[derive(Clone)]
pub struct ListController<R: RowData> {
    tx: mpsc::Sender<ControllerCommand<R>>,
    state_rx: watch::Receiver<ControllerState<R>>,
    bus: EventBus,
    lifecycle: Lifecycle,
}

impl<R: RowData> ListController<R> {
    /// Spawn a controller actor; the mount fetch starts immediately
    pub fn spawn(options: ControllerOptions<R>) -> Self {
        Self::start(options, None)
    }

    /// Spawn a controller actor and wait for the mount fetch to settle
    pub async fn mount(options: ControllerOptions<R>) -> ControllerResponse<(Self, FetchOutcome<R>)> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let controller = Self::start(options, Some(reply_tx));
        let outcome = reply_rx.await.map_err(|_| controller.closed())?;
        Ok((controller, outcome))
    }

    fn start(options: ControllerOptions<R>, mount_reply: Option<Reply<R>>) -> Self {
        debug!(?options, "spawn: called");
        let ControllerOptions {
            handler,
            fields,
            filter_data,
            payload,
            limit,
            page,
            sort_model,
            chips,
            chip_data,
            search,
            raw_search,
            single_sort,
            toggled_filters,
            fetch_debounce,
            command_buffer,
            event_capacity,
            callbacks,
            triggers,
        } = options;

        let limit = if limit == 0 {
            warn!("spawn: page size of 0 replaced with 1");
            1
        } else {
            limit
        };

        let (tx, rx) = mpsc::channel(command_buffer.max(1));
        let (done_tx, done_rx) = mpsc::channel(FETCH_DONE_BUFFER);
        let bus = EventBus::new(event_capacity);
        let lifecycle = Lifecycle::mounted();
        let notifier = Arc::new(Notifier::new(callbacks, bus.clone()));
        let adapter = Arc::new(FetchAdapter::new(handler, Arc::clone(&notifier), lifecycle.clone()));

        let state = ControllerState::initial(
            Pagination::for_page(page, limit),
            filter_data.clone(),
            sort_model,
            &chips,
            &chip_data,
            search,
            payload,
            toggled_filters,
        );
        let (state_tx, state_rx) = watch::channel(state.clone());
        let subscriptions = wire_triggers(&triggers, &tx);

        let config = ActorConfig {
            fields,
            initial_filter_data: filter_data,
            raw_search,
            single_sort,
            debounce: fetch_debounce,
        };
        let actor = ControllerActor::new(
            state,
            config,
            adapter,
            notifier,
            lifecycle.clone(),
            state_tx,
            done_tx,
            subscriptions,
        );
        tokio::spawn(actor.run(rx, done_rx, mount_reply));

        info!(limit, page, "ListController spawned");
        Self {
            tx,
            state_rx,
            bus,
            lifecycle,
        }
    }

    /// Receive every published state snapshot
    pub fn subscribe_state(&self) -> watch::Receiver<ControllerState<R>> {
        self.state_rx.clone()
    }

    /// Receive controller events
    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.bus.subscribe()
    }

    /// Most recently published snapshot, without a round trip to the actor
    pub fn snapshot(&self) -> ControllerState<R> {
        self.state_rx.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    // === Fetching operations ===

    /// Re-issue the current filter data
    ///
    /// Dependent caches are cleared first. Without `keep_pagination` the
    /// fetch starts at page 0 and page 0 is reported once it settles.
    pub async fn reload(&self, keep_pagination: bool) -> ControllerResponse<FetchOutcome<R>> {
        debug!(keep_pagination, "reload: called");
        self.request(|reply| ControllerCommand::Reload {
            keep_pagination,
            reply: Some(reply),
        })
        .await
    }

    /// Replace the filter data and fetch from page 0
    pub async fn set_filter_data(&self, data: Value) -> ControllerResponse<FetchOutcome<R>> {
        self.set_filter_data_with(data, false).await
    }

    /// Replace the filter data and fetch, optionally at the current page
    ///
    /// Returns [`FetchOutcome::Ignored`] without touching state when another
    /// fetch is in flight.
    pub async fn set_filter_data_with(&self, data: Value, keep_pagination: bool) -> ControllerResponse<FetchOutcome<R>> {
        debug!(keep_pagination, "set_filter_data: called");
        self.request(|reply| ControllerCommand::SetFilterData {
            data,
            keep_pagination,
            reply: Some(reply),
        })
        .await
    }

    /// Recompute filter defaults from the field schema and fetch
    ///
    /// With `initial` the caller's mount filter data is merged over the
    /// defaults and pagination is kept; otherwise page 0 is reported.
    pub async fn set_default(&self, initial: bool) -> ControllerResponse<FetchOutcome<R>> {
        debug!(initial, "set_default: called");
        self.request(|reply| ControllerCommand::SetDefault {
            initial,
            reply: Some(reply),
        })
        .await
    }

    // === Debounced operations ===

    pub async fn set_page(&self, page: usize) -> ControllerResponse<()> {
        debug!(page, "set_page: called");
        self.send(ControllerCommand::SetPage { page }).await
    }

    /// Change the page size; the page becomes `offset / limit`
    pub async fn set_limit(&self, limit: usize) -> ControllerResponse<()> {
        debug!(limit, "set_limit: called");
        if limit == 0 {
            return Err(ControllerError::InvalidLimit(limit));
        }
        self.send(ControllerCommand::SetLimit { limit }).await
    }

    pub async fn set_sort_model(&self, sort: SortModel) -> ControllerResponse<()> {
        debug!(?sort, "set_sort_model: called");
        self.send(ControllerCommand::SetSortModel { sort }).await
    }

    /// Cycle `field` through asc, desc and unsorted
    pub async fn toggle_sort(&self, field: &str) -> ControllerResponse<()> {
        debug!(%field, "toggle_sort: called");
        self.send(ControllerCommand::ToggleSort {
            field: field.to_string(),
        })
        .await
    }

    /// Merge chip states over the current ones
    pub async fn set_chips(&self, chips: Chips) -> ControllerResponse<()> {
        debug!(?chips, "set_chips: called");
        self.send(ControllerCommand::SetChips { chips }).await
    }

    pub async fn set_search(&self, search: &str) -> ControllerResponse<()> {
        debug!(%search, "set_search: called");
        self.send(ControllerCommand::SetSearch {
            search: search.to_string(),
        })
        .await
    }

    // === Direct operations ===

    /// Replace the rendered rows without fetching; extra rows are dropped
    pub async fn set_rows(&self, rows: Vec<R>) -> ControllerResponse<()> {
        debug!(count = rows.len(), "set_rows: called");
        self.send(ControllerCommand::SetRows { rows }).await
    }

    pub async fn set_filters_collapsed(&self, collapsed: bool) -> ControllerResponse<()> {
        debug!(collapsed, "set_filters_collapsed: called");
        self.send(ControllerCommand::SetFiltersCollapsed { collapsed }).await
    }

    /// Republish the current state immediately, skipping the next fetch tick
    pub async fn rerender(&self) -> ControllerResponse<()> {
        debug!("rerender: called");
        self.send(ControllerCommand::Rerender).await
    }

    /// Snapshot copy of the actor's current state
    pub async fn get_state(&self) -> ControllerResponse<ControllerState<R>> {
        debug!("get_state: called");
        self.request(|reply| ControllerCommand::GetState { reply }).await
    }

    /// Tear the controller down
    ///
    /// Pending ticks are cancelled, trigger subscriptions dropped and late
    /// fetch results discarded. Calling it again is a no-op.
    pub async fn unmount(&self) -> ControllerResponse<()> {
        debug!("unmount: called");
        let result = self
            .request(|reply| ControllerCommand::Unmount { reply: Some(reply) })
            .await;
        match result {
            Err(ControllerError::Unmounted) => Ok(()),
            other => other,
        }
    }

    // === Plumbing ===

    async fn send(&self, cmd: ControllerCommand<R>) -> ControllerResponse<()> {
        if !self.lifecycle.is_mounted() {
            return Err(ControllerError::Unmounted);
        }
        self.tx.send(cmd).await.map_err(|_| self.closed())
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> ControllerCommand<R>) -> ControllerResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| self.closed())
    }

    fn closed(&self) -> ControllerError {
        if self.lifecycle.is_mounted() {
            ControllerError::ChannelError
        } else {
            ControllerError::Unmounted
        }
    }
}

/// Subscribe the controller to every trigger subject present
///
/// Observers hold weak senders so subjects never keep the actor alive.
fn wire_triggers<R: RowData>(
    triggers: &ListTriggers<R>,
    tx: &mpsc::Sender<ControllerCommand<R>>,
) -> Vec<Subscription> {
    let mut subscriptions = Vec::new();

    if let Some(subject) = &triggers.reload {
        let tx = tx.downgrade();
        subscriptions.push(subject.subscribe(move |()| {
            forward(
                &tx,
                ControllerCommand::Reload {
                    keep_pagination: true,
                    reply: None,
                },
            )
        }));
    }
    if let Some(subject) = &triggers.rerender {
        let tx = tx.downgrade();
        subscriptions.push(subject.subscribe(move |()| forward(&tx, ControllerCommand::Rerender)));
    }
    if let Some(subject) = &triggers.set_limit {
        let tx = tx.downgrade();
        subscriptions.push(subject.subscribe(move |limit| forward(&tx, ControllerCommand::SetLimit { limit })));
    }
    if let Some(subject) = &triggers.set_page {
        let tx = tx.downgrade();
        subscriptions.push(subject.subscribe(move |page| forward(&tx, ControllerCommand::SetPage { page })));
    }
    if let Some(subject) = &triggers.set_rows {
        let tx = tx.downgrade();
        subscriptions.push(subject.subscribe(move |rows| forward(&tx, ControllerCommand::SetRows { rows })));
    }
    if let Some(subject) = &triggers.set_filter_data {
        let tx = tx.downgrade();
        subscriptions.push(subject.subscribe(move |data| {
            forward(
                &tx,
                ControllerCommand::SetFilterData {
                    data,
                    keep_pagination: false,
                    reply: None,
                },
            )
        }));
    }

    debug!(count = subscriptions.len(), "wire_triggers: subscribed");
    subscriptions
}

fn forward<R>(tx: &mpsc::WeakSender<ControllerCommand<R>>, cmd: ControllerCommand<R>) {
    let name = cmd.name();
    let Some(tx) = tx.upgrade() else {
        debug!(command = name, "trigger: controller gone");
        return;
    };
    if let Err(e) = tx.try_send(cmd) {
        warn!(command = name, error = %e, "trigger: dropping command");
    }
}

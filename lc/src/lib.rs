//! listctl - Debounced query/fetch controller for paginated lists
//!
//! A list view is driven by several independently mutable inputs: filter
//! values, a sort model, boolean chips, free-text search and offset/limit
//! pagination. `listctl` reconciles bursts of changes to those inputs into
//! exactly one fetch against an integrator-supplied handler and republishes a
//! consistent `{rows, total}` snapshot.
//!
//! # Core Concepts
//!
//! - **Single owner**: one actor task owns the controller state; everything
//!   else talks to it through [`ListController`] or [`Subject`] triggers
//! - **Debounced fetches**: a burst of transitions produces one coordinator tick
//! - **Single flight**: fetch requests arriving while loading are ignored
//! - **Non-fatal failures**: handler errors go to the `fallback` callback and
//!   over-long results are truncated with a warning
//!
//! # Modules
//!
//! - [`domain`] - Query state types, rows and fetch results
//! - [`fields`] - Field schema and default filter values
//! - [`handler`] - Handler contract and the fetch adapter
//! - [`paginators`] - Ready-made handlers (in-memory and HTTP)
//! - [`events`] - Outbound callbacks and the event bus
//! - [`subject`] - Minimal publish/subscribe channel for external triggers
//! - [`controller`] - State store, fetch coordinator and control surface
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod events;
pub mod fields;
pub mod handler;
pub mod lifecycle;
pub mod paginators;
pub mod subject;

// Re-export commonly used types
pub use config::ListConfig;
pub use controller::{
    ControllerCommand, ControllerError, ControllerOptions, ControllerResponse, ControllerState, FetchOutcome,
    ListController, ListTriggers,
};
pub use domain::{ChipSpec, Chips, FetchResult, JsonRow, Pagination, RowData, RowId, SortDirection, SortItem, SortModel};
pub use events::{EventBus, ListCallbacks, ListEvent, Notifier};
pub use fields::{DefaultValue, FieldDescriptor, FieldType, Hidden, resolve_defaults};
pub use handler::{FetchAdapter, Handler, HandlerResponse, ListHandler, ListQuery, StaticRows, handler_fn};
pub use lifecycle::Lifecycle;
pub use paginators::{ApiPaginator, ArrayPaginator};
pub use subject::{Subject, Subscription};

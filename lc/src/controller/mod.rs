//! List controller with the actor pattern
//!
//! A [`ControllerActor`](actor) task owns the [`ControllerState`] and is the
//! only thing that mutates it. [`ListController`] handles send it commands;
//! [`ListTriggers`] subjects do the same for callers without a handle.
//!
//! ```text
//!   ListController ──┐
//!                    ├─► mpsc ─► actor ──► state transitions ──► watch (snapshot)
//!   ListTriggers ────┘            │  ▲                    └────► Notifier
//!                                 │  │ completion
//!                      debounce ──┘  └── spawned fetch (FetchAdapter)
//! ```
//!
//! The fetch coordinator runs inside the actor: every transition re-arms one
//! debounce deadline, and when it fires the coordinator decides whether the
//! settled burst needs a fetch at all, and which kind.

mod actor;
mod coordinator;
mod handle;
mod messages;
mod options;
mod state;

pub use coordinator::{CoordinatorFlags, QueryChange, QuerySnapshot, TickDecision};
pub use handle::ListController;
pub use messages::{ControllerCommand, ControllerError, ControllerResponse, FetchOutcome};
pub use options::{ControllerOptions, ListTriggers};
pub use state::ControllerState;

//! Outbound notifications
//!
//! Every committed transition is reported twice: synchronously to the
//! integrator's [`ListCallbacks`], and as a [`ListEvent`] on the [`EventBus`]
//! for dependent caches and other subscribers. [`Notifier`] does both.
//!
//! ```text
//!   ControllerActor ──► Notifier ──┬──► ListCallbacks (on_rows, on_page_change, ...)
//!                                  └──► EventBus ──► subscribers
//! ```

mod bus;
mod callbacks;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
pub use callbacks::{ListCallbacks, Notifier};
pub use types::ListEvent;

//! Subject - minimal publish/subscribe channel
//!
//! Ancestors that do not hold a [`ListController`](crate::ListController)
//! drive it through subjects: the controller subscribes to the subjects it is
//! given and turns every `next` into a command. Delivery is synchronous and
//! ordered within one subject; there is no ordering across subjects.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

type Observer<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Observers<T> {
    next_id: u64,
    entries: Vec<(u64, Observer<T>)>,
}

/// Single-channel observable
pub struct Subject<T> {
    inner: Arc<Mutex<Observers<T>>>,
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Observers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register an observer; it stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped
    pub fn subscribe(&self, observer: impl Fn(T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut observers = lock(&self.inner);
            let id = observers.next_id;
            observers.next_id += 1;
            observers.entries.push((id, Arc::new(observer)));
            id
        };
        debug!(id, "Subject::subscribe");

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner).entries.retain(|(entry_id, _)| *entry_id != id);
                debug!(id, "Subject::unsubscribe");
            }
        })
    }

    /// Deliver `value` to every current observer
    pub fn next(&self, value: T) {
        // Observers run outside the lock so they may (un)subscribe
        let observers: Vec<Observer<T>> = lock(&self.inner)
            .entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(value.clone());
        }
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.inner).entries.len()
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject").finish_non_exhaustive()
    }
}

fn lock<T>(inner: &Mutex<Observers<T>>) -> MutexGuard<'_, Observers<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle that removes an observer from its subject
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

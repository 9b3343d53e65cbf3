//! Mount flag shared between the controller actor and in-flight fetches

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared mounted/unmounted flag
///
/// Cleared exactly once on unmount. Work that outlives the controller checks
/// it before touching integrator callbacks.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    mounted: Arc<AtomicBool>,
}

impl Lifecycle {
    /// Create a flag in the mounted state
    pub fn mounted() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Clear the flag; returns false if it was already cleared
    pub fn unmount(&self) -> bool {
        self.mounted.swap(false, Ordering::SeqCst)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::mounted()
    }
}

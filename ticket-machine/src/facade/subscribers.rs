//! Registry of "configuration changed" subscribers.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::poller::RefreshHandle;

/// The handles a facade notifies when it learns configuration is stale.
#[derive(Debug, Default)]
pub struct ChangeSubscribers {
    handles: Mutex<Vec<RefreshHandle>>,
}

impl ChangeSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handle: RefreshHandle) {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Request a refresh from every subscriber. Returns how many were notified.
    pub fn notify_all(&self) -> usize {
        // Clone out so a subscriber that re-enters can't deadlock on the list.
        let handles = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        debug!(subscribers = handles.len(), "configuration changed");
        for handle in &handles {
            handle.request_refresh();
        }
        handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

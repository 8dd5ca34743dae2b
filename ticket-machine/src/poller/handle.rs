//! Handle for requesting a refresh from outside the poller.

use std::fmt;
use std::sync::Arc;

/// A cloneable request line into a [`ConfigPoller`](super::ConfigPoller).
///
/// Collaborators that learn the configuration is stale call
/// [`request_refresh`](Self::request_refresh). It can be called from any
/// thread, returns immediately, and does nothing once the poller has been
/// dropped or shut down.
#[derive(Clone)]
pub struct RefreshHandle {
    request: Arc<dyn Fn() + Send + Sync>,
}

impl RefreshHandle {
    pub(crate) fn new(request: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            request: Arc::new(request),
        }
    }

    /// Ask the poller to fetch configuration now.
    pub fn request_refresh(&self) {
        (self.request)();
    }
}

impl fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshHandle")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn clones_share_the_request() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = count.clone();
        let handle = RefreshHandle::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        handle.request_refresh();
        handle.clone().request_refresh();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}

//! Feedback capture sessions
//!
//! The host pushes free-form feedback text (chat/system messages) as
//! commands take effect. A `FeedbackCapture` is an explicitly constructed,
//! cloneable handle to one capture queue: the host holds one clone as
//! producer, the executing batch holds another as consumer. Messages are
//! only queued while a capture window is open; outside a window they are
//! dropped with no backpressure.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

const MATCH_POLL_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct Inner {
    active: AtomicBool,
    queue: Mutex<VecDeque<String>>,
    notify: Notify,
}

/// Handle to one feedback capture queue
#[derive(Debug, Clone, Default)]
pub struct FeedbackCapture {
    inner: Arc<Inner>,
}

impl FeedbackCapture {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<String>> {
        // Queue operations never panic, so a poisoned lock is still usable
        self.inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Producer side: queue a message if a capture window is open
    pub fn push(&self, message: impl Into<String>) {
        if self.inner.active.load(Ordering::Acquire) {
            self.queue().push_back(message.into());
            self.inner.notify.notify_one();
        }
    }

    /// Open a capture window, clearing anything left from the last one
    pub fn start_capturing(&self) {
        self.inner.active.store(true, Ordering::Release);
        self.queue().clear();
    }

    /// Close the capture window. Un-drained messages stay queued until the
    /// next `start_capturing`.
    pub fn stop_capturing(&self) {
        self.inner.active.store(false, Ordering::Release);
    }

    pub fn is_capturing(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Wait up to `timeout` for one message
    pub async fn wait_for_message(&self, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        loop {
            // Register for wakeup before checking, so a push between the
            // check and the await is not lost
            let notified = self.inner.notify.notified();
            if let Some(message) = self.queue().pop_front() {
                return Some(message);
            }
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return None;
            };
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return self.queue().pop_front();
            }
        }
    }

    /// Wait up to `timeout` for a message satisfying `filter`, polling in
    /// short slices. Non-matching messages are discarded, not requeued.
    pub async fn wait_for_matching<F>(&self, timeout: Duration, filter: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + timeout;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            let slice = remaining.min(MATCH_POLL_SLICE);
            if let Some(message) = self.wait_for_message(slice).await {
                if filter(&message) {
                    return Some(message);
                }
            }
        }
        None
    }

    /// Remove and return everything queued, without blocking
    pub fn drain_available(&self) -> Vec<String> {
        self.queue().drain(..).collect()
    }
}

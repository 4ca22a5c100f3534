//! Background task dispatch with cancellation.
//!
//! Long-running operations (spatial queries, persistence writes) must not
//! block the interaction thread. They are spawned on the async runtime and
//! their results land in a single-slot mailbox which the session drains on
//! its own thread. Only one operation may be in flight at a time; starting
//! another while one is pending is rejected.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::async_runtime;
use crate::messenger::Messenger;

/// Token used to discard the result of a background operation that is no
/// longer wanted.
///
/// Cancellation is cooperative: the task itself runs to completion, but a
/// completed outcome whose token was cancelled is silently dropped when the
/// mailbox is drained - distinguishable from an empty result, invisible to
/// the user.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the operation as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct SlotInner<T> {
    pending: Option<CancellationToken>,
    ready: Option<(CancellationToken, T)>,
}

impl<T> Default for SlotInner<T> {
    fn default() -> Self {
        Self {
            pending: None,
            ready: None,
        }
    }
}

/// Single-slot mailbox for the one in-flight background operation of an
/// editing session.
pub(crate) struct TaskSlot<T> {
    inner: Arc<Mutex<SlotInner<T>>>,
}

impl<T: Send + 'static> TaskSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotInner::default())),
        }
    }

    /// Returns true if an operation is in flight.
    pub fn is_pending(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// Spawns the future unless another operation is already pending.
    ///
    /// When the future completes, its outcome is parked in the slot and a
    /// redraw is requested so the interaction thread comes around to drain
    /// it. Returns false if the start was rejected.
    pub fn try_start(
        &self,
        messenger: Arc<dyn Messenger>,
        future: impl Future<Output = T> + Send + 'static,
    ) -> bool {
        let token = {
            let mut inner = self.inner.lock();
            if inner.pending.is_some() {
                log::debug!("a background operation is already in flight, request rejected");
                return false;
            }
            let token = CancellationToken::new();
            inner.pending = Some(token.clone());
            token
        };

        let slot = Arc::clone(&self.inner);
        async_runtime::spawn(async move {
            let outcome = future.await;
            {
                let mut inner = slot.lock();
                inner.pending = None;
                inner.ready = Some((token, outcome));
            }
            messenger.request_redraw();
        });

        true
    }

    /// Cancels the in-flight operation and any not-yet-drained outcome.
    pub fn cancel(&self) {
        let inner = self.inner.lock();
        if let Some(token) = &inner.pending {
            token.cancel();
        }
        if let Some((token, _)) = &inner.ready {
            token.cancel();
        }
    }

    /// Takes the completed outcome, if any.
    ///
    /// An outcome whose token was cancelled is dropped and `None` is
    /// returned, so a cancelled operation is indistinguishable from "nothing
    /// happened" for the caller.
    pub fn take_ready(&self) -> Option<T> {
        let (token, outcome) = self.inner.lock().ready.take()?;
        if token.is_cancelled() {
            log::debug!("dropping outcome of a cancelled background operation");
            return None;
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::CountingMessenger;

    async fn settle<T: Send + 'static>(slot: &TaskSlot<T>) {
        for _ in 0..32 {
            if !slot.is_pending() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn outcome_is_delivered_and_redraw_requested() {
        let slot = TaskSlot::new();
        let messenger = Arc::new(CountingMessenger::default());

        assert!(slot.try_start(messenger.clone(), async { 7 }));
        settle(&slot).await;

        assert_eq!(slot.take_ready(), Some(7));
        assert_eq!(messenger.redraws(), 1);
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_pending() {
        let slot = TaskSlot::new();
        let messenger = Arc::new(CountingMessenger::default());

        assert!(slot.try_start(messenger.clone(), std::future::pending::<i32>()));
        assert!(!slot.try_start(messenger.clone(), async { 1 }));
    }

    #[tokio::test]
    async fn cancelled_outcome_is_dropped_silently() {
        let slot = TaskSlot::new();
        let messenger = Arc::new(CountingMessenger::default());

        assert!(slot.try_start(messenger.clone(), async { 7 }));
        slot.cancel();
        settle(&slot).await;

        assert_eq!(slot.take_ready(), None);
    }
}

//! Live read subscriptions. Each subscription pairs a watch channel
//! holding the latest query result with a background task that re-runs
//! the query whenever the store reports a change.

use std::fmt;

use futures::Stream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::{Totals, Trip};

pub type TripsSubscription = Subscription<Vec<Trip>>;
pub type TotalsSubscription = Subscription<Totals>;

/// A live view of one query: the current value plus every later update,
/// delivered until the handle is dropped.
///
/// Dropping the handle aborts the requery task, and the handle owns the
/// only receiver. A requery still in flight at drop time has nowhere to
/// deliver, so a stale result can never reach anyone.
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl<T: Clone> Subscription<T> {
    pub(crate) fn new(rx: watch::Receiver<T>, task: JoinHandle<()>) -> Self {
        Self { rx, task }
    }

    /// The most recently delivered value.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next delivery. Returns `false` once no further
    /// updates can arrive (the repository side has shut down).
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// The current value, then every subsequent update. The subscription
    /// rides inside the stream, so the requery task lives exactly as long
    /// as the stream does.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        futures::stream::unfold((self, true), |(mut sub, first)| async move {
            if first {
                let value = sub.current();
                return Some((value, (sub, false)));
            }
            if !sub.changed().await {
                return None;
            }
            let value = sub.current();
            Some((value, (sub, false)))
        })
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

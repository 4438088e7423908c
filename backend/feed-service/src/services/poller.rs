//! Process-wide shared polling task.
//!
//! Periodic refresh work (the online-count gauge) runs on exactly one
//! background task no matter how many parts of the process are interested.
//! Subscribers hold a guard; the task starts when the subscriber count goes
//! 0 -> 1 and stops when the last guard drops. One scheduler owns the task,
//! so there is never a second interval ticking for the same work.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::debug;

type PollFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct PollerState {
    subscribers: usize,
    task: Option<JoinHandle<()>>,
}

pub struct SharedPoller {
    interval: Duration,
    poll: PollFn,
    state: Mutex<PollerState>,
}

impl SharedPoller {
    pub fn new<F>(interval: Duration, poll: F) -> Arc<Self>
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Arc::new(Self {
            interval,
            poll: Arc::new(poll),
            state: Mutex::new(PollerState {
                subscribers: 0,
                task: None,
            }),
        })
    }

    /// Register interest. The returned guard keeps the background task
    /// alive; dropping the last guard stops it.
    pub fn subscribe(self: &Arc<Self>) -> PollerGuard {
        let mut state = self.state.lock().expect("poller state poisoned");
        state.subscribers += 1;
        if state.subscribers == 1 {
            let interval = self.interval;
            let poll = Arc::clone(&self.poll);
            state.task = Some(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // The first tick fires immediately; skip it so subscribing
                // is not itself a poll.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    poll().await;
                }
            }));
            debug!(interval_secs = interval.as_secs(), "shared poller started");
        }
        PollerGuard {
            poller: Arc::clone(self),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().expect("poller state poisoned").subscribers
    }

    pub fn is_running(&self) -> bool {
        self.state
            .lock()
            .expect("poller state poisoned")
            .task
            .is_some()
    }

    fn unsubscribe(&self) {
        let mut state = self.state.lock().expect("poller state poisoned");
        state.subscribers = state.subscribers.saturating_sub(1);
        if state.subscribers == 0 {
            if let Some(task) = state.task.take() {
                task.abort();
                debug!("shared poller stopped, no subscribers left");
            }
        }
    }
}

pub struct PollerGuard {
    poller: Arc<SharedPoller>,
}

impl Drop for PollerGuard {
    fn drop(&mut self) {
        self.poller.unsubscribe();
    }
}

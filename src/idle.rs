//! Network-idleness detection over CDP network events.
//!
//! A page counts as idle once no more than a configured number of requests
//! are in flight and nothing has started or finished for a continuous quiet
//! window. This is the standard browser-automation heuristic for "page
//! finished loading".

use crate::VerifyError;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Poll interval while waiting for the quiet window to elapse.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tracks in-flight network requests and the time of the last activity.
#[derive(Debug)]
pub struct IdleTracker {
    inflight: HashSet<String>,
    last_activity: Instant,
}

impl IdleTracker {
    pub fn new() -> Self {
        Self {
            inflight: HashSet::new(),
            last_activity: Instant::now(),
        }
    }

    pub fn request_started(&mut self, id: impl Into<String>) {
        self.inflight.insert(id.into());
        self.last_activity = Instant::now();
    }

    pub fn request_finished(&mut self, id: &str) {
        if self.inflight.remove(id) {
            self.last_activity = Instant::now();
        }
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    /// Whether the network has been quiet for the full window with at most
    /// `max_inflight` requests outstanding.
    pub fn is_quiet(&self, max_inflight: usize, quiet: Duration) -> bool {
        self.inflight.len() <= max_inflight && self.last_activity.elapsed() >= quiet
    }
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock the shared tracker, recovering from a poisoned mutex. Tracker
/// updates are single assignments, so the state stays consistent.
fn lock_tracker(tracker: &Mutex<IdleTracker>) -> std::sync::MutexGuard<'_, IdleTracker> {
    tracker.lock().unwrap_or_else(|e| e.into_inner())
}

/// Feeds an [`IdleTracker`] from a page's request lifecycle events.
pub struct NetworkMonitor {
    tracker: Arc<Mutex<IdleTracker>>,
    listener_task: JoinHandle<()>,
}

impl NetworkMonitor {
    /// Enable the Network domain on the page and start tracking request
    /// lifecycle events. Must be attached before navigation so the document
    /// request itself is observed.
    pub async fn attach(page: &Page) -> Result<Self, VerifyError> {
        page.execute(EnableParams::default())
            .await
            .map_err(|e| VerifyError::Context(e.to_string()))?;

        let mut started = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| VerifyError::Context(e.to_string()))?;
        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| VerifyError::Context(e.to_string()))?;
        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(|e| VerifyError::Context(e.to_string()))?;

        let tracker = Arc::new(Mutex::new(IdleTracker::new()));
        let shared = tracker.clone();

        let listener_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(ev) = started.next() => {
                        trace!(url = %ev.request.url, "request started");
                        lock_tracker(&shared).request_started(ev.request_id.inner().clone());
                    }
                    Some(ev) = finished.next() => {
                        lock_tracker(&shared).request_finished(ev.request_id.inner());
                    }
                    Some(ev) = failed.next() => {
                        lock_tracker(&shared).request_finished(ev.request_id.inner());
                    }
                    else => break,
                }
            }
        });

        Ok(Self {
            tracker,
            listener_task,
        })
    }

    /// Suspend until the page reports network idleness, or fail with
    /// [`VerifyError::Timeout`] once `overall` elapses.
    pub async fn wait_until_idle(
        &self,
        max_inflight: usize,
        quiet: Duration,
        overall: Duration,
    ) -> Result<(), VerifyError> {
        let deadline = Instant::now() + overall;
        loop {
            let (quiet_now, inflight) = {
                let tracker = lock_tracker(&self.tracker);
                (tracker.is_quiet(max_inflight, quiet), tracker.inflight())
            };

            if quiet_now {
                debug!("network idle reached");
                return Ok(());
            }
            if Instant::now() >= deadline {
                debug!(inflight, "network never settled");
                return Err(VerifyError::Timeout(overall));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Stop listening for network events.
    pub fn detach(self) {
        self.listener_task.abort();
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Repeating Fetch Poller
//!
//! Generic background task that re-invokes an async fetch function on a
//! fixed interval and exposes the most recently resolved value. Used for the
//! selected Safe's native balance and its ERC-20 balance map.
//!
//! ## Semantics
//!
//! - The exposed value is `None` until the first fetch resolves.
//! - Last-resolved-wins: under slow networks the exposed value may lag the
//!   most recently issued fetch. Known limitation, kept as-is.
//! - Stopping the poller ends ticking and discards any result that resolves
//!   after the stop, so a consumer never observes a post-shutdown value.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, following the same pattern as
//! the session manager's chain re-initialization tasks.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Default interval between fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Handle to a background polling task.
///
/// Dropping the handle stops the task.
pub struct Poller<T> {
    rx: watch::Receiver<Option<T>>,
    cancel: CancellationToken,
}

impl<T: Clone + Send + Sync + 'static> Poller<T> {
    /// Spawn a poller that invokes `fetch` every `interval`.
    ///
    /// `fetch` returning `None` (a failed or not-yet-possible fetch) leaves
    /// the previously exposed value in place.
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send,
    {
        let (tx, rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            loop {
                if token.is_cancelled() {
                    return;
                }

                let value = fetch().await;

                // Discard results resolving after stop.
                if token.is_cancelled() {
                    return;
                }
                if let Some(value) = value {
                    let _ = tx.send(Some(value));
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {},
                    _ = token.cancelled() => return,
                }
            }
        });

        Self { rx, cancel }
    }

    /// The most recently resolved value, if any.
    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Wait until a value is available and return it.
    #[cfg(test)]
    pub async fn next_value(&mut self) -> Option<T> {
        loop {
            if let Some(value) = self.rx.borrow_and_update().clone() {
                return Some(value);
            }
            if self.rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Stop ticking. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn exposes_latest_resolved_value() {
        let counter = Arc::new(AtomicUsize::new(0));
        let fetch_counter = counter.clone();

        let poller = Poller::spawn(Duration::from_millis(10), move || {
            let n = fetch_counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Some(format!("v{n}")) }
        });

        // Allow three ticks to resolve.
        tokio::time::sleep(Duration::from_millis(45)).await;
        poller.stop();

        let latest = poller.latest().unwrap();
        let n: usize = latest.trim_start_matches('v').parse().unwrap();
        assert!(n >= 3, "expected at least three resolutions, got {latest}");
        assert_eq!(latest, format!("v{}", counter.load(Ordering::SeqCst)));
    }

    #[tokio::test]
    async fn none_before_first_resolution() {
        let poller: Poller<String> = Poller::spawn(Duration::from_secs(60), || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Some("late".to_string())
        });

        assert!(poller.latest().is_none());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_value() {
        let counter = Arc::new(AtomicUsize::new(0));
        let fetch_counter = counter.clone();

        let mut poller = Poller::spawn(Duration::from_millis(5), move || {
            let n = fetch_counter.fetch_add(1, Ordering::SeqCst);
            // Only the first fetch succeeds.
            async move { if n == 0 { Some(42u64) } else { None } }
        });

        assert_eq!(poller.next_value().await, Some(42));
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(poller.latest(), Some(42));
    }

    #[tokio::test]
    async fn no_ticks_after_stop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let fetch_counter = counter.clone();

        let poller = Poller::spawn(Duration::from_millis(5), move || {
            fetch_counter.fetch_add(1, Ordering::SeqCst);
            async move { Some(()) }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        poller.stop();
        let ticks_at_stop = counter.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(30)).await;
        // At most one in-flight fetch may still have been counted.
        assert!(counter.load(Ordering::SeqCst) <= ticks_at_stop + 1);
    }

    #[tokio::test]
    async fn late_result_after_stop_is_discarded() {
        let poller: Poller<&'static str> = Poller::spawn(Duration::from_millis(1), || async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Some("late")
        });

        // Stop while the first fetch is still in flight.
        tokio::time::sleep(Duration::from_millis(5)).await;
        poller.stop();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(poller.latest().is_none());
    }
}

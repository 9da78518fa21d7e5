//! Waiting for the page to react.
//!
//! Termination policies (fixed point, no progress, scroll ceiling) never sleep
//! on their own; every pause goes through [`settle`] or [`poll_until`].

use super::surface::LiveSurface;
use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Condition + timeout + backoff schedule for [`poll_until`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub timeout_ms: u64,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 4000,
            initial_interval_ms: 250,
            max_interval_ms: 1000,
        }
    }
}

/// Pause applied after a scroll or an activation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Settle {
    /// Sleep for a fixed duration.
    Fixed { ms: u64 },
    /// Poll the document height until two consecutive reads agree.
    Poll(PollPolicy),
}

impl Settle {
    pub const fn fixed(ms: u64) -> Self {
        Settle::Fixed { ms }
    }
}

#[derive(Debug)]
struct NotYet;

/// Re-check `condition` on an exponential backoff schedule until it holds or
/// `policy.timeout_ms` elapses. Returns whether the condition was met.
pub async fn poll_until<F, Fut>(policy: &PollPolicy, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let schedule = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(policy.initial_interval_ms))
        .with_max_interval(Duration::from_millis(policy.max_interval_ms))
        .with_max_elapsed_time(Some(Duration::from_millis(policy.timeout_ms)))
        .build();

    retry(schedule, || {
        let check = condition();
        async move {
            if check.await {
                Ok(())
            } else {
                Err(backoff::Error::transient(NotYet))
            }
        }
    })
    .await
    .is_ok()
}

/// Let the page settle according to `settle`.
pub async fn settle<S: LiveSurface>(surface: &S, settle: &Settle) {
    match settle {
        Settle::Fixed { ms } => pause(*ms).await,
        Settle::Poll(policy) => {
            let last = Mutex::new(None::<u64>);
            let stable = poll_until(policy, || async {
                let current = surface.document_height().await.ok();
                let previous = std::mem::replace(&mut *last.lock().await, current);
                current.is_some() && previous == current
            })
            .await;
            if !stable {
                debug!("settle: height still changing after {}ms", policy.timeout_ms);
            }
        }
    }
}

pub async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

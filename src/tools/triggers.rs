//! Interactive element trigger engine.
//!
//! Two procedures over a [`LiveSurface`]:
//! * [`trigger_once`]: one bounded pass over the affordances present now.
//! * [`trigger_until_exhausted`]: re-query and activate until no affordance is
//!   left (exhaustion) or a round activates nothing (no progress).
//!
//! Failures on individual elements are logged and skipped; neither procedure
//! returns an error.

use crate::scraping::rules::Affordance;
use crate::scraping::surface::LiveSurface;
use crate::scraping::wait::{self, Settle};
use crate::types::{LoopReport, LoopTermination, PassReport};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Pauses around a single activation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerPacing {
    /// After scrolling the element into view, before activating it.
    pub reveal: Settle,
    /// After activating, while revealed content renders.
    pub after_activate: Settle,
}

impl Default for TriggerPacing {
    fn default() -> Self {
        Self {
            reveal: Settle::fixed(500),
            after_activate: Settle::fixed(1500),
        }
    }
}

/// Current candidates for `affordance` whose accessible label fits its grammar.
pub async fn locate<S: LiveSurface>(
    surface: &S,
    affordance: &Affordance,
) -> Result<Vec<S::Handle>> {
    let candidates = surface.find_candidates(&affordance.selector).await?;
    if affordance.label.is_none() {
        return Ok(candidates);
    }

    let total = candidates.len();
    let mut matched = Vec::with_capacity(total);
    for handle in candidates {
        match surface.label(&handle).await {
            Ok(label) if affordance.accepts_label(label.as_deref()) => matched.push(handle),
            Ok(_) => {}
            Err(e) => debug!("{}: skipping candidate without readable label: {}", affordance.name, e),
        }
    }
    debug!("{}: {}/{} candidates match label grammar", affordance.name, matched.len(), total);
    Ok(matched)
}

async fn activate_one<S: LiveSurface>(
    surface: &S,
    handle: &S::Handle,
    affordance: &Affordance,
    pacing: &TriggerPacing,
) -> Result<()> {
    surface.reveal(handle).await?;
    wait::settle(surface, &pacing.reveal).await;
    surface.activate(handle, affordance.activation).await?;
    wait::settle(surface, &pacing.after_activate).await;
    Ok(())
}

async fn activate_all<S: LiveSurface>(
    surface: &S,
    handles: &[S::Handle],
    affordance: &Affordance,
    pacing: &TriggerPacing,
) -> PassReport {
    let mut report = PassReport {
        found: handles.len(),
        ..Default::default()
    };
    for handle in handles {
        match activate_one(surface, handle, affordance, pacing).await {
            Ok(()) => report.activated += 1,
            Err(e) => {
                report.failed += 1;
                warn!("{}: failed to activate element: {}", affordance.name, e);
            }
        }
    }
    report
}

/// Activate every affordance currently present, once.
pub async fn trigger_once<S: LiveSurface>(
    surface: &S,
    affordance: &Affordance,
    pacing: &TriggerPacing,
) -> PassReport {
    let handles = match locate(surface, affordance).await {
        Ok(h) => h,
        Err(e) => {
            warn!("{}: failed to locate elements: {}", affordance.name, e);
            return PassReport::default();
        }
    };
    info!("{}: found {} elements", affordance.name, handles.len());

    let report = activate_all(surface, &handles, affordance, pacing).await;
    info!(
        "{}: activated {}/{} ({} failed)",
        affordance.name, report.activated, report.found, report.failed
    );
    report
}

/// Activate `affordance` until a fixed point is reached.
///
/// Stops on exhaustion (a query finds nothing), on no progress (a round finds
/// candidates but activates none), or after `max_rounds` rounds when set.
pub async fn trigger_until_exhausted<S: LiveSurface>(
    surface: &S,
    affordance: &Affordance,
    pacing: &TriggerPacing,
    max_rounds: Option<usize>,
) -> LoopReport {
    let mut rounds = 0usize;
    let mut totals = PassReport::default();

    let termination = loop {
        if max_rounds.is_some_and(|max| rounds >= max) {
            break LoopTermination::RoundLimit;
        }

        let handles = match locate(surface, affordance).await {
            Ok(h) => h,
            Err(e) => {
                warn!("{}: query failed, stopping: {}", affordance.name, e);
                break LoopTermination::QueryFailed;
            }
        };
        if handles.is_empty() {
            break LoopTermination::Exhausted;
        }

        rounds += 1;
        let round = activate_all(surface, &handles, affordance, pacing).await;
        debug!(
            "{}: round {} activated {}/{}",
            affordance.name, rounds, round.activated, round.found
        );
        totals.absorb(round);

        if round.activated == 0 {
            break LoopTermination::NoProgress;
        }
    };

    info!(
        "{}: stopped after {} rounds ({:?}), {} activated",
        affordance.name, rounds, termination, totals.activated
    );
    LoopReport {
        rounds,
        totals,
        termination,
    }
}

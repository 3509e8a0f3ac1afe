//! Stability barrier between resolution scopes and claim aggregation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use credence_core::errors::PipelineError;
use credence_resolution::ScopeResolution;

#[derive(Debug, Default)]
struct BarrierState {
    /// ref_id → scope that made it stable.
    stable: BTreeMap<String, String>,
    /// Published scopes by name.
    scopes: BTreeMap<String, Arc<ScopeResolution>>,
    closed: bool,
    /// Closed because a scope failed.
    failed: bool,
}

impl BarrierState {
    fn missing<'a>(&self, refs: &'a BTreeSet<String>) -> Option<&'a String> {
        refs.iter().find(|r| !self.stable.contains_key(*r))
    }
}

/// Lets aggregation wait until every entity reference it needs has reached a
/// stable outcome (resolved or terminal-unresolved).
///
/// A scope becomes visible only as a whole, after it has been finalized.
/// Waiters are woken by the `watch` channel on every publish; once the
/// barrier is closed, waiters whose references are still missing fail with
/// `BarrierClosed` instead of hanging.
///
/// Closing records whether every scope succeeded. Claim tasks compute as soon
/// as their references are stable but wait on [`settled`](Self::settled)
/// before they commit.
pub struct StabilityBarrier {
    tx: watch::Sender<BarrierState>,
}

impl StabilityBarrier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BarrierState::default());
        Self { tx }
    }

    /// Make every reference of a finalized scope stable. A reference already
    /// published by another scope keeps its first owner. Ignored once closed.
    pub fn publish(&self, resolution: ScopeResolution) {
        let scope = resolution.scope.clone();
        let mut accepted = true;
        self.tx.send_modify(|state| {
            if state.closed {
                accepted = false;
                return;
            }
            for r in &resolution.references {
                state
                    .stable
                    .entry(r.reference.ref_id.clone())
                    .or_insert_with(|| scope.clone());
            }
            state.scopes.insert(scope.clone(), Arc::new(resolution));
        });
        if accepted {
            debug!(%scope, "scope published to stability barrier");
        } else {
            warn!(%scope, "publish after barrier close ignored");
        }
    }

    /// No further scopes will arrive. Does not clear an earlier failure.
    pub fn close(&self) {
        self.tx.send_modify(|state| state.closed = true);
    }

    /// A scope failed; no further scopes will arrive and nothing may commit.
    pub fn fail(&self) {
        self.tx.send_modify(|state| {
            state.closed = true;
            state.failed = true;
        });
    }

    pub fn is_closed(&self) -> bool {
        self.tx.borrow().closed
    }

    pub fn is_failed(&self) -> bool {
        self.tx.borrow().failed
    }

    /// Wait until the barrier is closed. `true` if every scope succeeded.
    pub async fn settled(&self) -> bool {
        let mut rx = self.tx.subscribe();
        let settled = match rx.wait_for(|s| s.closed).await {
            Ok(state) => !state.failed,
            Err(_) => false,
        };
        settled
    }

    pub fn is_stable(&self, ref_id: &str) -> bool {
        self.tx.borrow().stable.contains_key(ref_id)
    }

    /// Published scopes, ordered by scope name.
    pub fn published(&self) -> Vec<Arc<ScopeResolution>> {
        self.tx.borrow().scopes.values().cloned().collect()
    }

    /// Wait until every reference in `refs` is stable and return the scopes
    /// owning them, ordered by scope name.
    pub async fn wait_for<I, S>(&self, refs: I) -> Result<Vec<Arc<ScopeResolution>>, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let refs: BTreeSet<String> = refs.into_iter().map(Into::into).collect();
        let mut rx = self.tx.subscribe();
        let state = rx
            .wait_for(|s| s.closed || s.missing(&refs).is_none())
            .await
            .map_err(|_| PipelineError::Cancelled)?;

        if let Some(missing) = state.missing(&refs) {
            return Err(PipelineError::BarrierClosed {
                ref_id: missing.clone(),
            });
        }
        let owners: BTreeSet<&String> = refs.iter().filter_map(|r| state.stable.get(r)).collect();
        Ok(owners
            .into_iter()
            .filter_map(|scope| state.scopes.get(scope).cloned())
            .collect())
    }
}

impl Default for StabilityBarrier {
    fn default() -> Self {
        Self::new()
    }
}

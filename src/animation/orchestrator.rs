use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::{PropertyTransition, RestState, TransitionRequest, TransitionTarget};
use crate::common::collections::HashMap;
use crate::gesture::{Feature, GestureError, OutcomeKind};
use crate::sys::proxy::{ProxyId, VisualProxyHost};

/// Identifies one `animate_to` call, so completions of superseded batches can
/// be told apart from the live one.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(pub u64);

/// Work held back until a proxy's batch finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub feature: Feature,
    pub outcome: OutcomeKind,
    pub rest: RestState,
}

#[derive(Debug)]
struct Pending {
    batch: BatchId,
    completion: Completion,
}

/// Keeps at most one pending completion per proxy.
#[derive(Debug, Default)]
pub struct TransitionOrchestrator {
    last_batch: u64,
    pending: HashMap<ProxyId, Pending>,
}

impl TransitionOrchestrator {
    pub fn new() -> Self { Self::default() }

    fn next_batch(&mut self) -> BatchId {
        self.last_batch += 1;
        BatchId(self.last_batch)
    }

    pub fn is_pending(&self, proxy: ProxyId) -> bool { self.pending.contains_key(&proxy) }

    pub fn pending_batch(&self, proxy: ProxyId) -> Option<BatchId> {
        self.pending.get(&proxy).map(|p| p.batch)
    }

    /// Animates `proxy` towards `request` and parks `completion` until the
    /// batch finishes.
    ///
    /// Returns the completion straight back when there is nothing to wait for
    /// (no proxy, or nothing to animate); the caller runs it synchronously.
    /// A pending completion on the same proxy is superseded and will never
    /// run. If the proxy turns out to be gone the completion is dropped.
    pub fn resolve(
        &mut self,
        host: &mut dyn VisualProxyHost,
        proxy: Option<ProxyId>,
        request: &TransitionRequest,
        completion: Completion,
    ) -> Option<Completion> {
        let Some(proxy) = proxy else {
            return Some(completion);
        };

        if let Some(old) = self.pending.remove(&proxy) {
            debug!(?proxy, batch = ?old.batch, outcome = ?old.completion.outcome, "superseding unfinished transition");
        }

        if request.targets.is_empty() {
            return Some(completion);
        }

        let mut target = TransitionTarget::default();
        for &(property, to) in &request.targets {
            // Start from wherever the proxy is right now, so a transition
            // that replaces a running one continues from its current value.
            let Some(from) = host.property(proxy, property) else {
                debug!(?proxy, "proxy vanished before its transition started; dropping completion");
                return None;
            };
            if let Some(running) = host.current_transition(proxy, property) {
                trace!(%property, from, old_to = running.to, to, "retargeting running transition");
            }
            target.properties.push(PropertyTransition {
                property,
                from,
                to,
                duration: request.duration,
                easing: request.easing,
            });
        }

        let batch = self.next_batch();
        match host.animate_to(proxy, &target, batch) {
            Ok(()) => {
                trace!(?proxy, ?batch, duration = ?target.duration(), "transition scheduled");
                self.pending.insert(proxy, Pending { batch, completion });
                None
            }
            Err(err) => {
                debug!(%err, "dropping completion");
                None
            }
        }
    }

    /// The host finished `batch` on `proxy`. Returns the parked completion if
    /// `batch` is the live one; stale and repeated notifications return
    /// `None`.
    pub fn on_transitions_completed(&mut self, proxy: ProxyId, batch: BatchId) -> Option<Completion> {
        match self.pending.get(&proxy) {
            Some(pending) if pending.batch == batch => {}
            _ => {
                trace!(?proxy, ?batch, "ignoring completion of superseded or finished batch");
                return None;
            }
        }
        self.pending.remove(&proxy).map(|p| p.completion)
    }

    /// The compositor destroyed `proxy`. Whatever was pending on it is dropped
    /// without running.
    pub fn on_proxy_destroyed(&mut self, proxy: ProxyId) -> bool {
        match self.pending.remove(&proxy) {
            Some(pending) => {
                debug!(?proxy, batch = ?pending.batch, "proxy destroyed mid-transition");
                true
            }
            None => false,
        }
    }

    /// Puts the proxy back into its rest state. A proxy destroyed in the
    /// meantime is not an error.
    pub fn settle(host: &mut dyn VisualProxyHost, proxy: ProxyId, rest: &RestState) {
        if rest.is_empty() {
            return;
        }
        let result = host.set_properties(proxy, &rest.properties).and_then(|()| {
            if rest.hide { host.set_visible(proxy, false) } else { Ok(()) }
        });
        match result {
            Ok(()) => {}
            Err(GestureError::StaleProxy(_)) => {
                trace!(?proxy, "proxy gone before it could settle")
            }
            Err(err) => debug!(%err, "failed to settle proxy"),
        }
    }
}

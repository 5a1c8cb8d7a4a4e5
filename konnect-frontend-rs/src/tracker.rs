//! Debounce and idempotence state for cart tracking.
//!
//! Cart edits arrive in bursts (quantity steppers, re-renders), so the tracker
//! waits for a quiet period and sends only the final state. There is no timer
//! handle to cancel: every observed change bumps a generation counter, and a
//! sleeping debounce task that wakes up with a stale generation gives up. The
//! same counter guards the response side, so a slow request that lost the race
//! against a newer edit cannot clobber newer state with its stale token.

use commerce_utils::CartSnapshot;

/// Quiet period between the last cart edit and the tracking call.
pub(crate) const DEBOUNCE_QUIET_MS: i32 = 2000;

/// What the shell should do with an observed cart change.
#[derive(Debug, PartialEq)]
pub(crate) enum ChangeAction {
    /// Hold the snapshot and check back after the quiet period, identified by
    /// the generation of this change.
    Debounce(u64),
    /// The cart emptied: there is nothing to recover, drop all tracking state.
    Cleanup,
}

#[derive(Debug, Default)]
pub(crate) struct TrackerState {
    generation: u64,
    pending: Option<CartSnapshot>,
    last_sent: Option<CartSnapshot>,
}

impl TrackerState {
    pub(crate) fn note_change(&mut self, snapshot: CartSnapshot) -> ChangeAction {
        self.generation += 1;
        if snapshot.is_empty() {
            self.pending = None;
            ChangeAction::Cleanup
        } else {
            self.pending = Some(snapshot);
            ChangeAction::Debounce(self.generation)
        }
    }

    /// Called when the quiet period for `generation` elapses. Returns the
    /// snapshot to send, or None when a newer change superseded this one or
    /// the cart still matches what was last sent successfully.
    pub(crate) fn take_due_snapshot(&mut self, generation: u64) -> Option<CartSnapshot> {
        if generation != self.generation {
            return None;
        }
        let snapshot = self.pending.take()?;
        if self.last_sent.as_ref() == Some(&snapshot) {
            return None;
        }
        Some(snapshot)
    }

    /// Record a successful sync. Returns false (and records nothing) when the
    /// response arrived after a newer change was observed.
    pub(crate) fn record_synced(&mut self, generation: u64, snapshot: CartSnapshot) -> bool {
        if generation != self.generation {
            return false;
        }
        self.last_sent = Some(snapshot);
        true
    }

    /// Cancel any debounced work without touching the idempotence guard.
    pub(crate) fn cancel_pending(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// Forget everything, including the idempotence guard. An identical cart
    /// observed after a reset syncs afresh.
    pub(crate) fn reset(&mut self) {
        self.cancel_pending();
        self.last_sent = None;
    }
}

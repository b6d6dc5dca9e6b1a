// SPDX-FileCopyrightText: 2026 ToggleTalk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appliance state reconciliation.
//!
//! The reconciler owns the three-valued (on/off/unknown) belief about
//! each appliance. Toggles apply optimistically before the server
//! responds; confirmation upgrades the belief to server truth, and
//! broadcast notifications from other users feed back in through
//! free-text inference.
//!
//! Commands are serialized per appliance: at most one is in flight, and
//! a toggle arriving meanwhile supersedes any queued desire rather than
//! racing it ("reflect the latest user intent", not "process every
//! request"). A failed command deliberately leaves the optimistic state
//! in place: the server broadcasts every executed command through the
//! notification feed, so polling-driven inference converges the belief
//! either way, and an automatic rollback would fight that convergence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, warn};

use toggletalk_core::error::ToggleTalkError;
use toggletalk_core::traits::{ApplianceDisplay, Gateway};
use toggletalk_core::types::{Appliance, ApplianceState, PendingCommand, StateSource};

/// How a toggle request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The command went to the server and resolved.
    Confirmed,
    /// An earlier command was still in flight; this desire was queued
    /// (superseding any previously queued one) and will be issued when
    /// the in-flight command resolves.
    Queued,
}

#[derive(Default)]
struct ReconcilerInner {
    states: HashMap<Appliance, ApplianceState>,
    pending: HashMap<Appliance, PendingCommand>,
    /// Single-slot queue per appliance; a newer toggle overwrites it.
    queued: HashMap<Appliance, bool>,
}

/// Owns [`ApplianceState`] and [`PendingCommand`] for every appliance.
///
/// The inner state sits behind a sync mutex (critical sections never
/// await), so the pending slot can also be released from a `Drop` impl
/// when a toggle future is cancelled mid-command.
pub struct ApplianceReconciler {
    gateway: Arc<dyn Gateway>,
    display: Arc<dyn ApplianceDisplay>,
    inner: Mutex<ReconcilerInner>,
}

/// Releases an appliance's pending and queued slots if the owning
/// toggle future is dropped before it resolves them itself.
struct PendingGuard<'a> {
    reconciler: &'a ApplianceReconciler,
    appliance: Appliance,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut inner = self.reconciler.lock_inner();
            inner.pending.remove(&self.appliance);
            inner.queued.remove(&self.appliance);
        }
    }
}

impl ApplianceReconciler {
    pub fn new(gateway: Arc<dyn Gateway>, display: Arc<dyn ApplianceDisplay>) -> Self {
        Self {
            gateway,
            display,
            inner: Mutex::new(ReconcilerInner::default()),
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, ReconcilerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Requests a toggle, reflecting it locally before the server answers.
    ///
    /// The optimistic state is visible through [`get_states`](Self::get_states)
    /// synchronously, before the gateway call resolves. The returned
    /// result describes the *first* command this call issued; queued
    /// follow-ups drained on its behalf only log their failures.
    pub async fn toggle(
        &self,
        appliance: Appliance,
        desired_on: bool,
    ) -> Result<ToggleOutcome, ToggleTalkError> {
        let queued = {
            let mut inner = self.lock_inner();
            inner.states.insert(
                appliance,
                ApplianceState {
                    appliance,
                    is_on: desired_on,
                    source: StateSource::LocalOptimistic,
                },
            );

            if inner.pending.contains_key(&appliance) {
                // Supersede: the latest desire wins when the in-flight
                // command resolves.
                inner.queued.insert(appliance, desired_on);
                true
            } else {
                inner.pending.insert(
                    appliance,
                    PendingCommand {
                        appliance,
                        desired_on,
                        issued_at: Utc::now(),
                    },
                );
                false
            }
        };
        self.publish().await;
        if queued {
            debug!(%appliance, desired_on, "toggle queued behind in-flight command");
            return Ok(ToggleOutcome::Queued);
        }

        // If this future is dropped mid-command the slots are released
        // on the way out, so a cancelled toggle cannot wedge the
        // appliance into queueing forever.
        let mut guard = PendingGuard {
            reconciler: self,
            appliance,
            armed: true,
        };

        let mut desired = desired_on;
        let mut first_result: Option<Result<(), ToggleTalkError>> = None;

        loop {
            let result = self
                .gateway
                .send_appliance_command(appliance, desired)
                .await;

            let next = {
                let mut inner = self.lock_inner();
                match &result {
                    Ok(_) => {
                        // Don't clobber a newer optimistic desire with a
                        // stale confirmation.
                        if !inner.queued.contains_key(&appliance) {
                            inner.states.insert(
                                appliance,
                                ApplianceState {
                                    appliance,
                                    is_on: desired,
                                    source: StateSource::ServerConfirmed,
                                },
                            );
                        }
                    }
                    Err(e) => {
                        warn!(%appliance, desired, error = %e, "appliance command failed, keeping optimistic state");
                    }
                }

                match inner.queued.remove(&appliance) {
                    Some(next_desired) => {
                        inner.pending.insert(
                            appliance,
                            PendingCommand {
                                appliance,
                                desired_on: next_desired,
                                issued_at: Utc::now(),
                            },
                        );
                        Some(next_desired)
                    }
                    None => {
                        inner.pending.remove(&appliance);
                        None
                    }
                }
            };
            self.publish().await;

            if first_result.is_none() {
                first_result = Some(result.map(|_| ()));
            }

            match next {
                Some(next_desired) => desired = next_desired,
                None => break,
            }
        }
        guard.armed = false;

        match first_result.unwrap_or(Ok(())) {
            Ok(()) => Ok(ToggleOutcome::Confirmed),
            Err(e) => Err(e),
        }
    }

    /// Best-effort state inference over a notification's free text.
    ///
    /// Matches an appliance keyword combined with a turn/switch verb and
    /// derives `is_on` from the on-phrase; this is heuristic matching
    /// over human-readable strings, so a server phrasing change makes it
    /// silently stop matching. Returns the inferred `(appliance, is_on)`
    /// on a match.
    pub async fn apply_inference(&self, text: &str) -> Option<(Appliance, bool)> {
        let (appliance, is_on) = infer_state_change(text)?;

        {
            let mut inner = self.lock_inner();
            inner.states.insert(
                appliance,
                ApplianceState {
                    appliance,
                    is_on,
                    source: StateSource::InferredFromNotification,
                },
            );
        }
        debug!(%appliance, is_on, "state inferred from notification");
        self.publish().await;
        Some((appliance, is_on))
    }

    /// Current on/off belief per appliance. Appliances the client has
    /// never seen a command or notification for are absent (unknown).
    pub async fn get_states(&self) -> HashMap<Appliance, bool> {
        self.lock_inner()
            .states
            .values()
            .map(|s| (s.appliance, s.is_on))
            .collect()
    }

    /// Full state records including their source, for the host UI.
    pub async fn state_records(&self) -> Vec<ApplianceState> {
        self.lock_inner().states.values().copied().collect()
    }

    /// The in-flight command for an appliance, if any.
    pub async fn pending_command(&self, appliance: Appliance) -> Option<PendingCommand> {
        self.lock_inner().pending.get(&appliance).copied()
    }

    /// Pushes the current state map to the home-screen widget seam.
    async fn publish(&self) {
        let states: HashMap<Appliance, bool> = {
            let inner = self.lock_inner();
            inner
                .states
                .values()
                .map(|s| (s.appliance, s.is_on))
                .collect()
        };
        if let Err(e) = self.display.publish(&states).await {
            warn!(error = %e, "failed to publish appliance states to widget");
        }
    }
}

/// Parses a notification body for an appliance state change.
///
/// Both directions require an explicit phrase: an appliance mention
/// with unrecognized verb phrasing infers nothing, rather than
/// defaulting to "off" when no on-phrase matches. A reworded server
/// message therefore stops updating beliefs instead of silently
/// flipping devices off.
fn infer_state_change(text: &str) -> Option<(Appliance, bool)> {
    let lower = text.to_lowercase();

    let appliance = if lower.contains(Appliance::Ac.keyword()) || contains_word(&lower, "ac") {
        Appliance::Ac
    } else if lower.contains(Appliance::WashingMachine.keyword()) {
        Appliance::WashingMachine
    } else if lower.contains(Appliance::Light.keyword()) {
        Appliance::Light
    } else {
        return None;
    };

    let on_phrases = ["turned on", "turn on", "switched on", "switch on"];
    let off_phrases = ["turned off", "turn off", "switched off", "switch off"];

    if on_phrases.iter().any(|p| lower.contains(p)) {
        Some((appliance, true))
    } else if off_phrases.iter().any(|p| lower.contains(p)) {
        Some((appliance, false))
    } else {
        None
    }
}

/// Whole-word containment check ("ac" must not match inside "machine").
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}

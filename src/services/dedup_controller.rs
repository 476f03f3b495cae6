//! Deduplication controller: pure decision logic over dedup state.
//!
//! Grounded in the teacher's circuit breaker state machine — a small,
//! pure, independently testable decision function kept apart from the
//! store I/O that supplies its inputs and applies its side effects.

use std::time::Duration;

use crate::domain::models::DedupDecision;

/// The side effects the caller must apply to the result store after a
/// decision, expressed as data rather than performed here — keeps this
/// module free of any dependency on `ResultStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupEffect {
    /// No store mutation required (dedup disabled for this spec).
    None,
    /// Set `cache-time` and `last-alert-time` to `now`.
    SetBoth,
    /// Refresh `cache-time` only, leaving `last-alert-time` untouched.
    RefreshCacheOnly,
    /// Clear both dedup keys.
    ClearBoth,
}

/// Result of a dedup decision: what to record on the Result and which
/// store mutation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupOutcome {
    pub decision: DedupDecision,
    pub effect: DedupEffect,
}

/// Decides the dedup outcome for one test result.
///
/// `dedup_window` is `None` when the spec carries no dedup duration and no
/// worker default applies (§4.3): every execution then emits unconditionally
/// and touches no dedup keys, regardless of `test_failed`.
///
/// `cache_time` / `last_alert_time` are `None` when the corresponding key is
/// absent from the store (no prior tracked failure, or it expired).
pub fn decide(
    test_failed: bool,
    dedup_window: Option<Duration>,
    now: i64,
    cache_time: Option<i64>,
    last_alert_time: Option<i64>,
) -> DedupOutcome {
    let Some(window) = dedup_window else {
        let decision = if test_failed {
            DedupDecision::EmitAlert
        } else {
            DedupDecision::EmitNothing
        };
        return DedupOutcome {
            decision,
            effect: DedupEffect::None,
        };
    };

    let window_secs = window.as_secs() as i64;

    match (cache_time, test_failed) {
        (None, true) => DedupOutcome {
            decision: DedupDecision::EmitAlert,
            effect: DedupEffect::SetBoth,
        },
        (Some(_), true) => {
            let alert_age = last_alert_time.map(|t| now.saturating_sub(t));
            let outside_window = alert_age.is_none_or(|age| age >= window_secs);
            if outside_window {
                DedupOutcome {
                    decision: DedupDecision::EmitDedupedAlert,
                    effect: DedupEffect::SetBoth,
                }
            } else {
                DedupOutcome {
                    decision: DedupDecision::Suppress,
                    effect: DedupEffect::RefreshCacheOnly,
                }
            }
        }
        (Some(_), false) => DedupOutcome {
            decision: DedupDecision::EmitRecovery,
            effect: DedupEffect::ClearBoth,
        },
        (None, false) => DedupOutcome {
            decision: DedupDecision::EmitNothing,
            effect: DedupEffect::None,
        },
    }
}

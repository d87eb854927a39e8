//! One-shot timers for deferred rules.
//!
//! Armed timers are never cancelled: a later state change does not retract
//! them, and a firing always carries the rule snapshot taken when it was
//! armed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::hooks::PolicyRule;
use crate::modules::shell::actor::ShellMessage;

/// Schedules a deferred rule firing.
pub trait TimerScheduler: Send {
    /// Arm a one-shot timer for `rule.timeout_ms` milliseconds.
    fn arm(&self, rule: PolicyRule);
}

/// Timers backed by tokio tasks that post back to the shell actor.
///
/// Holds a weak sender so pending timers do not keep the actor alive.
#[derive(Debug, Clone)]
pub struct TokioTimers {
    sender: mpsc::WeakSender<ShellMessage>,
}

impl TokioTimers {
    #[must_use]
    pub fn new(sender: &mpsc::Sender<ShellMessage>) -> Self { Self { sender: sender.downgrade() } }
}

impl TimerScheduler for TokioTimers {
    fn arm(&self, rule: PolicyRule) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(app_id = %rule.app_id, "policy: no runtime, dropping rule timer");
            return;
        };

        let sender = self.sender.clone();
        runtime.spawn(async move {
            tokio::time::sleep(Duration::from_millis(u64::from(rule.timeout_ms))).await;

            let Some(sender) = sender.upgrade() else {
                tracing::debug!(app_id = %rule.app_id, "policy: shell gone, timer discarded");
                return;
            };
            if sender.send(ShellMessage::PolicyTimerFired(rule)).await.is_err() {
                tracing::debug!("policy: shell channel closed before timer delivery");
            }
        });
    }
}

#[derive(Debug, Default)]
struct ManualClock {
    now_ms: u64,
    armed: Vec<(u64, PolicyRule)>,
}

/// Virtual-clock timers. Firings are collected with [`ManualTimers::advance`]
/// and delivered by the caller.
#[derive(Debug, Default, Clone)]
pub struct ManualTimers {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualTimers {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Move the clock forward and return every rule whose timer expired, in
    /// deadline order.
    pub fn advance(&self, ms: u64) -> Vec<PolicyRule> {
        let mut clock = self.clock.lock();
        clock.now_ms += ms;
        let now = clock.now_ms;

        let mut due: Vec<(u64, PolicyRule)> = Vec::new();
        let mut idx = 0;
        while idx < clock.armed.len() {
            if clock.armed[idx].0 <= now {
                due.push(clock.armed.remove(idx));
            } else {
                idx += 1;
            }
        }
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, rule)| rule).collect()
    }

    /// Number of timers still waiting.
    #[must_use]
    pub fn armed_len(&self) -> usize { self.clock.lock().armed.len() }

    /// Current virtual time.
    #[must_use]
    pub fn now_ms(&self) -> u64 { self.clock.lock().now_ms }
}

impl TimerScheduler for ManualTimers {
    fn arm(&self, rule: PolicyRule) {
        let mut clock = self.clock.lock();
        let deadline = clock.now_ms + u64::from(rule.timeout_ms);
        clock.armed.push((deadline, rule));
    }
}

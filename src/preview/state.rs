//! Update scheduling state machine.
//!
//! ```text
//! Idle ──change──▶ Scheduled ──deadline──▶ Rendering ──finish──▶ Idle
//!                    ▲   │ change: re-arm          │ change: mark pending
//!                    └───┘                         ▼
//!                                       finish with pending ──▶ Scheduled
//! any ──close──▶ Closed
//! ```
//!
//! There is a single timer slot. A trigger replaces the slot instead of
//! queueing, so at most one render is ever pending.
//! Pure timing: no I/O, time is passed in by the caller.

use std::time::{Duration, Instant};

use super::host::ChangeKind;

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A render fires once `deadline` is reached.
    Scheduled { deadline: Instant },
    /// A render is running; `pending` records a trigger seen meanwhile.
    Rendering { pending: bool },
    Closed,
}

/// Debounce / save-only trigger policy plus the single timer slot.
#[derive(Debug)]
pub struct Scheduler {
    phase: Phase,
    debounce: Duration,
    save_only: bool,
}

impl Scheduler {
    pub fn new(debounce: Duration, save_only: bool) -> Self {
        Self {
            phase: Phase::Idle,
            debounce,
            save_only,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// Change the trigger policy. An armed timer keeps its deadline.
    pub fn reconfigure(&mut self, debounce: Duration, save_only: bool) {
        self.debounce = debounce;
        self.save_only = save_only;
    }

    /// Whether `kind` triggers a render under the current policy.
    pub fn accepts(&self, kind: ChangeKind) -> bool {
        !self.save_only || kind == ChangeKind::Save
    }

    /// Record a change. Returns `false` when the change is ignored.
    pub fn notify(&mut self, kind: ChangeKind, now: Instant) -> bool {
        if self.is_closed() || !self.accepts(kind) {
            return false;
        }
        match self.phase {
            Phase::Rendering { .. } => self.phase = Phase::Rendering { pending: true },
            _ => self.arm(now),
        }
        true
    }

    /// Schedule a render at `now`, bypassing the debounce window.
    pub fn schedule_now(&mut self, now: Instant) {
        match self.phase {
            Phase::Closed => {}
            Phase::Rendering { .. } => self.phase = Phase::Rendering { pending: true },
            _ => self.phase = Phase::Scheduled { deadline: now },
        }
    }

    /// Deadline of the armed timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Scheduled { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Move `Scheduled → Rendering` when the deadline has passed.
    pub fn begin_if_due(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Scheduled { deadline } if deadline <= now => {
                self.phase = Phase::Rendering { pending: false };
                true
            }
            _ => false,
        }
    }

    /// Leave `Rendering`, re-arming for a trigger seen during the render.
    pub fn finish(&mut self, now: Instant) {
        match self.phase {
            Phase::Rendering { pending: true } => self.arm(now),
            Phase::Rendering { pending: false } => self.phase = Phase::Idle,
            _ => {}
        }
    }

    pub fn close(&mut self) {
        self.phase = Phase::Closed;
    }

    fn arm(&mut self, now: Instant) {
        let delay = if self.save_only {
            Duration::ZERO
        } else {
            self.debounce
        };
        self.phase = Phase::Scheduled {
            deadline: now + delay,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_starts_idle() {
        let scheduler = Scheduler::new(DEBOUNCE, false);
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_change_arms_debounce() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, false);
        assert!(scheduler.notify(ChangeKind::Edit, t0));
        assert_eq!(scheduler.next_deadline(), Some(t0 + DEBOUNCE));
        assert!(!scheduler.begin_if_due(t0 + ms(499)));
        assert!(scheduler.begin_if_due(t0 + ms(500)));
        assert_eq!(scheduler.phase(), Phase::Rendering { pending: false });
    }

    #[test]
    fn test_change_while_scheduled_restarts_window() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, false);
        scheduler.notify(ChangeKind::Edit, t0);
        scheduler.notify(ChangeKind::Edit, t0 + ms(300));
        assert!(!scheduler.begin_if_due(t0 + ms(600)));
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(800)));
    }

    #[test]
    fn test_change_while_rendering_is_pending_once() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, false);
        scheduler.notify(ChangeKind::Edit, t0);
        scheduler.begin_if_due(t0 + DEBOUNCE);

        scheduler.notify(ChangeKind::Edit, t0 + ms(510));
        scheduler.notify(ChangeKind::Save, t0 + ms(520));
        assert_eq!(scheduler.phase(), Phase::Rendering { pending: true });
        assert_eq!(scheduler.next_deadline(), None);

        let done = t0 + ms(530);
        scheduler.finish(done);
        assert_eq!(scheduler.next_deadline(), Some(done + DEBOUNCE));
    }

    #[test]
    fn test_finish_without_pending_goes_idle() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, false);
        scheduler.schedule_now(t0);
        assert!(scheduler.begin_if_due(t0));
        scheduler.finish(t0);
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[test]
    fn test_save_only_ignores_edits() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, true);
        assert!(!scheduler.notify(ChangeKind::Edit, t0));
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[test]
    fn test_save_only_has_no_debounce() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, true);
        assert!(scheduler.notify(ChangeKind::Save, t0));
        assert!(scheduler.begin_if_due(t0));
    }

    #[test]
    fn test_default_mode_debounces_saves() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, false);
        scheduler.notify(ChangeKind::Save, t0);
        assert_eq!(scheduler.next_deadline(), Some(t0 + DEBOUNCE));
    }

    #[test]
    fn test_closed_is_terminal() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, false);
        scheduler.notify(ChangeKind::Edit, t0);
        scheduler.close();

        assert!(!scheduler.notify(ChangeKind::Save, t0));
        scheduler.schedule_now(t0);
        scheduler.finish(t0);
        assert!(!scheduler.begin_if_due(t0 + DEBOUNCE));
        assert_eq!(scheduler.phase(), Phase::Closed);
    }

    #[test]
    fn test_reconfigure_applies_to_next_trigger() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(DEBOUNCE, false);
        scheduler.reconfigure(ms(100), false);
        scheduler.notify(ChangeKind::Edit, t0);
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(100)));
    }
}

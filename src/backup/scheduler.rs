//! Debounced auto-backup scheduling
//!
//! Each write re-arms the scheduler: the pending task (if any) is cancelled
//! through its token and replaced by one due `delay` after the write. The
//! owner polls with the current time and runs the backup once a task comes
//! due, so a burst of edits closer together than `delay` produces one backup.
//! At most one task is pending at any time.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

/// Shared flag used to cancel a scheduled task
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug, Clone)]
struct ScheduledBackup {
    due_at: DateTime<Utc>,
    token: CancellationToken,
}

/// Cancel-and-reschedule timer for auto-backups
#[derive(Debug, Clone)]
pub struct AutoBackupScheduler {
    delay: Duration,
    pending: Option<ScheduledBackup>,
}

impl AutoBackupScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer relative to `now`
    ///
    /// Returns the token of the new task.
    pub fn schedule(&mut self, now: DateTime<Utc>) -> CancellationToken {
        self.cancel();

        let token = CancellationToken::new();
        self.pending = Some(ScheduledBackup {
            due_at: now + self.delay,
            token: token.clone(),
        });
        token
    }

    /// Cancel the pending task, if any
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.token.cancel();
        }
    }

    /// When the pending task will fire
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.pending
            .as_ref()
            .filter(|task| !task.token.is_cancelled())
            .map(|task| task.due_at)
    }

    pub fn is_pending(&self) -> bool {
        self.due_at().is_some()
    }

    /// Consume the pending task if it has come due; true means "run it now"
    pub fn take_due(&mut self, now: DateTime<Utc>) -> bool {
        let (cancelled, due) = match &self.pending {
            Some(task) => (task.token.is_cancelled(), now >= task.due_at),
            None => return false,
        };

        if cancelled || due {
            self.pending = None;
        }
        !cancelled && due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_fires_after_quiet_period() {
        let mut scheduler = AutoBackupScheduler::new(Duration::seconds(5));
        scheduler.schedule(t0());

        assert!(!scheduler.take_due(t0() + Duration::seconds(4)));
        assert!(scheduler.take_due(t0() + Duration::seconds(5)));
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn test_reschedule_cancels_previous() {
        let mut scheduler = AutoBackupScheduler::new(Duration::seconds(5));
        let first = scheduler.schedule(t0());
        scheduler.schedule(t0() + Duration::seconds(3));

        assert!(first.is_cancelled());
        // The first deadline passes without firing
        assert!(!scheduler.take_due(t0() + Duration::seconds(6)));
        assert!(scheduler.take_due(t0() + Duration::seconds(8)));
    }

    #[test]
    fn test_external_cancel_via_token() {
        let mut scheduler = AutoBackupScheduler::new(Duration::seconds(5));
        let token = scheduler.schedule(t0());
        token.cancel();

        assert!(!scheduler.is_pending());
        assert!(!scheduler.take_due(t0() + Duration::seconds(10)));
    }

    #[test]
    fn test_nothing_pending() {
        let mut scheduler = AutoBackupScheduler::new(Duration::seconds(5));
        assert_eq!(scheduler.due_at(), None);
        assert!(!scheduler.take_due(t0()));
    }
}

// Timer model (REDESIGN FLAGS, `spec.md` §9): the active timer is a
// cancellable task handle, not a bare sleep the handler races against.
// Firing delivers a `TimerFired` command back into the room's own mailbox
// instead of invoking a callback directly, so the actor always decides what
// to do with a firing from its own single-threaded command loop.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::CancelReason;

pub type TimerId = u64;

pub struct TimerHandle {
    id: TimerId,
    join: JoinHandle<()>,
    armed_at: Instant,
}

impl TimerHandle {
    /// Arm a timer that, unless cancelled first, sends `command` on
    /// `sender` after `duration`.
    pub fn spawn<C: Send + 'static>(
        id: TimerId,
        duration: Duration,
        sender: mpsc::Sender<C>,
        command: C,
    ) -> Self {
        let join = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = sender.send(command).await;
        });
        Self {
            id,
            join,
            armed_at: Instant::now(),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Stop the timer. `Normal` discards the elapsed duration (a graceful
    /// handoff to the next handler); `Shutdown` returns how much of the
    /// timeout had already elapsed, for the caller to persist as
    /// `elapsed_time` before exiting.
    pub fn cancel(self, reason: CancelReason) -> Option<Duration> {
        self.join.abort();
        match reason {
            CancelReason::Normal => None,
            CancelReason::Shutdown => Some(self.armed_at.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fires_after_duration() {
        let (tx, mut rx) = mpsc::channel(1);
        let _handle = TimerHandle::spawn(1, Duration::from_millis(10), tx, "fired");
        let received = rx.recv().await;
        assert_eq!(received, Some("fired"));
    }

    #[tokio::test]
    async fn cancel_normal_never_fires() {
        let (tx, mut rx) = mpsc::channel::<&'static str>(1);
        let handle = TimerHandle::spawn(1, Duration::from_millis(20), tx, "fired");
        let elapsed = handle.cancel(CancelReason::Normal);
        assert_eq!(elapsed, None);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancel_shutdown_returns_elapsed() {
        let (tx, _rx) = mpsc::channel::<&'static str>(1);
        let handle = TimerHandle::spawn(1, Duration::from_secs(60), tx, "fired");
        tokio::time::sleep(Duration::from_millis(10)).await;
        let elapsed = handle.cancel(CancelReason::Shutdown);
        assert!(elapsed.is_some());
    }
}

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivered on the driver's queue when a scheduled advance is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    generation: u64,
}

/// Single-slot, cancellable auto-advance timer.
///
/// Scheduling replaces any pending timer. Each schedule gets a new
/// generation, so a fire that was already queued when its timer got
/// cancelled is recognised and dropped by [`AdvanceTimer::accept`].
#[derive(Debug, Default)]
pub struct AdvanceTimer {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl AdvanceTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a `TimerFired` on `fired` after `delay`, cancelling any pending timer.
    pub fn schedule(&mut self, delay: Duration, fired: mpsc::Sender<TimerFired>) {
        self.cancel();
        let generation = self.generation;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The driver may be gone already; nothing to do then.
            let _ = fired.send(TimerFired { generation }).await;
        }));
    }

    /// Drop the pending timer, if any. Fires already queued become stale.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// True if `fired` belongs to the pending timer. Consumes the slot.
    pub fn accept(&mut self, fired: TimerFired) -> bool {
        if self.pending.is_none() || fired.generation != self.generation {
            return false;
        }
        self.pending = None;
        true
    }
}

impl Drop for AdvanceTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = AdvanceTimer::new();
        timer.schedule(Duration::from_millis(1000), tx);
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        let fired = rx.recv().await.unwrap();
        assert!(timer.accept(fired));
        assert!(!timer.is_pending());
        assert!(!timer.accept(fired));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = AdvanceTimer::new();
        timer.schedule(Duration::from_millis(500), tx);
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn queued_fire_from_replaced_timer_is_stale() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = AdvanceTimer::new();

        timer.schedule(Duration::from_millis(100), tx.clone());
        tokio::time::sleep(Duration::from_millis(150)).await;
        let stale = rx.recv().await.unwrap();

        timer.schedule(Duration::from_millis(100), tx);
        assert!(!timer.accept(stale));
        assert!(timer.is_pending());

        let fresh = rx.recv().await.unwrap();
        assert!(timer.accept(fresh));
    }
}

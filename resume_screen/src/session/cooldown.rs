//! Countdown gating repeated password-reset requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Window applied after every successful reset-email dispatch.
pub const DEFAULT_RESET_COOLDOWN_SECS: u32 = 60;

const TICK: Duration = Duration::from_secs(1);

/// Seconds-remaining counter that ticks down once per second on its own
/// task. The task handle is the cancellation handle: it is aborted on
/// restart, [`cancel`](Self::cancel) and drop, and the task exits by itself
/// when the count reaches zero.
#[derive(Debug)]
pub struct CooldownTimer {
    window_secs: u32,
    remaining: Arc<AtomicU32>,
    ticker: Option<JoinHandle<()>>,
}

impl Default for CooldownTimer {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_COOLDOWN_SECS)
    }
}

impl CooldownTimer {
    pub fn new(window_secs: u32) -> Self {
        Self {
            window_secs,
            remaining: Arc::new(AtomicU32::new(0)),
            ticker: None,
        }
    }

    /// (Re)start at the full window. A running countdown is replaced, not
    /// extended. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.cancel();
        if self.window_secs == 0 {
            return;
        }

        // Fresh counter so an aborted ticker can never touch the new one.
        self.remaining = Arc::new(AtomicU32::new(self.window_secs));
        let remaining = Arc::clone(&self.remaining);

        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let left = remaining
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                    .map_or(0, |prev| prev - 1);
                if left == 0 {
                    break;
                }
            }
        }));
    }

    /// Stop the countdown and zero it.
    pub fn cancel(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.remaining.store(0, Ordering::Release);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.remaining() > 0
    }

    /// True while the tick task is scheduled.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn window_secs(&self) -> u32 {
        self.window_secs
    }
}

impl Drop for CooldownTimer {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

use std::{future::Future, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{sleep_until, Instant},
};

/// Slot holding at most one live timer.
///
/// Every arm or cancel bumps the generation. A firing timer must `claim` its
/// generation before acting, so a timer that fired while being replaced
/// does nothing.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called from the timer task itself; releases the slot if it is still the live timer.
    pub fn claim(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.handle.is_none() {
            return false;
        }
        self.handle = None;
        true
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

/// Arms per-key timers with a fixed window; re-arming replaces, never accumulates.
#[derive(Debug, Clone, Copy)]
pub struct DebounceScheduler {
    window: Duration,
}

impl DebounceScheduler {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancels whatever `slot` held and schedules `on_fire` one window from now.
    ///
    /// `on_fire` receives the generation it must claim.
    pub(crate) fn schedule<F, Fut>(&self, slot: &mut TimerSlot, on_fire: F)
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        slot.cancel();
        let generation = slot.generation;
        let deadline = Instant::now() + self.window;
        slot.handle = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            on_fire(generation).await;
        }));
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;

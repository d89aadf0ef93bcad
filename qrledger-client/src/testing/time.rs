//! Virtual time provider for deterministic tests of cooldown logic.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use crate::time::TimeProvider;

/// Clock that only moves when [`VirtualTimeProvider::advance`] is called.
#[derive(Clone, Debug)]
pub struct VirtualTimeProvider {
    state: Arc<Mutex<VirtualState>>,
}

#[derive(Debug)]
struct VirtualState {
    instant: Instant,
    timers: Vec<VirtualTimer>,
}

#[derive(Debug)]
struct VirtualTimer {
    deadline: Instant,
    waker: Waker,
}

impl VirtualTimeProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(VirtualState {
                instant: Instant::now(),
                timers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VirtualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move time forward and wake every sleeper whose deadline passed.
    pub fn advance(&self, duration: Duration) {
        let expired: Vec<Waker> = {
            let mut state = self.lock();
            state.instant += duration;
            let now = state.instant;
            let (ready, pending): (Vec<_>, Vec<_>) = state
                .timers
                .drain(..)
                .partition(|timer| timer.deadline <= now);
            state.timers = pending;
            ready.into_iter().map(|timer| timer.waker).collect()
        };

        for waker in expired {
            waker.wake();
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }
}

impl Default for VirtualTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for VirtualTimeProvider {
    fn now(&self) -> Instant {
        self.lock().instant
    }

    fn sleep(
        &self,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let deadline = self.now() + duration;
        Box::pin(VirtualSleep {
            provider: self.clone(),
            deadline,
        })
    }
}

struct VirtualSleep {
    provider: VirtualTimeProvider,
    deadline: Instant,
}

impl Future for VirtualSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.provider.lock();
        if state.instant >= self.deadline {
            return Poll::Ready(());
        }
        // Re-registering on every poll keeps the latest waker.
        let deadline = self.deadline;
        state.timers.retain(|timer| {
            !(timer.deadline == deadline && timer.waker.will_wake(cx.waker()))
        });
        state.timers.push(VirtualTimer {
            deadline,
            waker: cx.waker().clone(),
        });
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn sleep_resolves_only_after_advance() {
        let provider = VirtualTimeProvider::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let sleeper = provider.clone();
        let done = Arc::clone(&counter);
        let handle = tokio::spawn(async move {
            sleeper.sleep(Duration::from_secs(2)).await;
            done.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(provider.pending_timers(), 1);

        provider.advance(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        provider.advance(Duration::from_secs(1));
        handle.await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(provider.pending_timers(), 0);
    }

    #[test]
    fn advance_moves_the_instant() {
        let provider = VirtualTimeProvider::new();
        let before = provider.now();

        provider.advance(Duration::from_secs(90));

        assert_eq!(provider.now() - before, Duration::from_secs(90));
    }
}

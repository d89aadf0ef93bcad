//! Clock abstraction for the scan cooldown.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Source of time for the manager and scan loop.
pub trait TimeProvider: Send + Sync + 'static {
    /// Monotonic instant used for cooldown windows
    fn now(&self) -> Instant;

    /// Sleep for a duration (virtual providers resolve this when advanced)
    fn sleep(
        &self,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Real system time backed by tokio timers.
#[derive(Clone, Debug, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(
        &self,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

use std::time::{Duration, Instant};

/// Remembers the last forwarded payload and rejects repeats of it until the
/// cooldown window has elapsed. A different payload is always accepted.
#[derive(Debug, Clone)]
pub struct CooldownFilter {
    cooldown: Duration,
    last: Option<(String, Instant)>,
}

impl CooldownFilter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Returns `true` and records the payload when it should be handled.
    pub fn admit(&mut self, payload: &str, now: Instant) -> bool {
        if let Some((last, at)) = &self.last
            && last == payload
            && now.saturating_duration_since(*at) < self.cooldown
        {
            return false;
        }
        self.last = Some((payload.to_string(), now));
        true
    }
}

use std::time::{Duration, Instant};

/// A caller-supplied deadline handed to shutdown hooks.
///
/// Hooks receiving a [`ShutdownContext`] are expected to check
/// [`ShutdownContext::is_expired`] or [`ShutdownContext::remaining`] while
/// draining and stop early once the deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownContext {
    deadline: Option<Instant>,
}

impl ShutdownContext {
    /// A context without any deadline.
    pub fn background() -> Self {
        Self { deadline: None }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let deadline = Instant::now().checked_add(timeout);
        Self { deadline }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, or `None` if there is no
    /// deadline at all.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl Default for ShutdownContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_context_never_expires() {
        let ctx = ShutdownContext::background();
        assert!(!ctx.is_expired());
        assert_eq!(ctx.remaining(), None);
    }

    #[test]
    fn past_deadline_is_expired() {
        let ctx = ShutdownContext::with_deadline(Instant::now());
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn timeout_leaves_remaining_time() {
        let ctx = ShutdownContext::with_timeout(Duration::from_secs(60));
        assert!(!ctx.is_expired());
        assert!(ctx.remaining().unwrap() > Duration::from_secs(30));
    }
}

//! Real or fixed clock for session timestamps.

use chrono::{DateTime, Duration, Utc};

/// Clock abstraction so session math is deterministic under test.
///
/// The [`SessionLockManager`](crate::session::SessionLockManager) takes one
/// at construction; production passes `Clock::Default`, tests freeze time
/// with `Clock::Fixed`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// System time.
    #[default]
    Default,
    /// Frozen at a given instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// A clock frozen at the given instant.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// The current time according to this clock.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Advance a fixed clock; no effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic instant for tests (2025-09-13T12:26:40Z).
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_757_766_400, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_frozen() {
        let clock = Clock::fixed(fixed_now());
        assert_eq!(clock.now(), fixed_now());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn advance_moves_fixed_clock() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::minutes(30));
        assert_eq!(clock.now(), fixed_now() + Duration::minutes(30));
    }

    #[test]
    fn advance_ignores_system_clock() {
        let mut clock = Clock::Default;
        clock.advance(Duration::hours(1));
        // Still tracking real time, not an offset.
        let delta = (clock.now() - Utc::now()).num_seconds().abs();
        assert!(delta < 5);
    }
}

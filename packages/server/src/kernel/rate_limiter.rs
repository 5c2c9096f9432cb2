//! Sliding-window admission control, keyed by actor.
//!
//! Each actor owns a log of admission instants inside the current window.
//! State is sharded across a `DashMap`, so checks for different actors only
//! contend when they hash to the same shard, and only for the length of one
//! check.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::common::MemberId;

pub const DEFAULT_MAX_ACTIONS: usize = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// `retry_after` is when the oldest admission in the window expires.
    Rejected { retry_after: Duration },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

pub struct RateLimiter {
    max_actions: usize,
    window: Duration,
    windows: DashMap<MemberId, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_actions: usize, window: Duration) -> Self {
        Self {
            max_actions,
            window,
            windows: DashMap::new(),
        }
    }

    /// Admit or reject one action for `actor` at `now`.
    ///
    /// Admitted actions are recorded; rejected ones leave no trace.
    pub fn admit(&self, actor: &MemberId, now: Instant) -> Admission {
        let mut entry = self.windows.entry(actor.clone()).or_default();
        let log = entry.value_mut();

        while let Some(&oldest) = log.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= self.max_actions {
            let retry_after = log
                .front()
                .map(|&oldest| {
                    self.window
                        .saturating_sub(now.saturating_duration_since(oldest))
                })
                .unwrap_or(self.window);
            return Admission::Rejected { retry_after };
        }

        log.push_back(now);
        Admission::Admitted
    }

    /// Drop actors with no admissions inside the window. Returns how many
    /// were evicted.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, log| {
            log.back()
                .is_some_and(|&last| now.saturating_duration_since(last) < self.window)
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of actors currently holding window state
    pub fn tracked_actors(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIONS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn actor(handle: &str) -> MemberId {
        MemberId::new(handle)
    }

    #[test]
    fn sixth_action_in_window_is_rejected() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        let bob = actor("bob");

        for i in 0..5 {
            let now = start + Duration::from_millis(i * 10);
            assert_eq!(limiter.admit(&bob, now), Admission::Admitted);
        }

        let sixth = limiter.admit(&bob, start + Duration::from_millis(60));
        assert_eq!(
            sixth,
            Admission::Rejected {
                retry_after: Duration::from_millis(940)
            }
        );
    }

    #[test]
    fn window_slides_as_old_admissions_expire() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        let start = Instant::now();
        let bob = actor("bob");

        assert!(limiter.admit(&bob, start).is_admitted());
        assert!(limiter.admit(&bob, start + Duration::from_millis(50)).is_admitted());
        assert!(!limiter.admit(&bob, start + Duration::from_millis(99)).is_admitted());

        // First admission has aged out, second is still in the window
        assert!(limiter.admit(&bob, start + Duration::from_millis(100)).is_admitted());
        assert!(!limiter.admit(&bob, start + Duration::from_millis(120)).is_admitted());
    }

    #[test]
    fn rejections_do_not_extend_the_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(100));
        let start = Instant::now();
        let bob = actor("bob");

        assert!(limiter.admit(&bob, start).is_admitted());
        for ms in [10, 20, 30, 90] {
            assert!(!limiter.admit(&bob, start + Duration::from_millis(ms)).is_admitted());
        }
        assert!(limiter.admit(&bob, start + Duration::from_millis(100)).is_admitted());
    }

    #[test]
    fn actors_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        let now = Instant::now();

        assert!(limiter.admit(&actor("alice"), now).is_admitted());
        assert!(limiter.admit(&actor("bob"), now).is_admitted());
        assert!(!limiter.admit(&actor("alice"), now).is_admitted());
    }

    #[test]
    fn evict_idle_drops_expired_windows_only() {
        let limiter = RateLimiter::new(5, Duration::from_millis(100));
        let start = Instant::now();

        limiter.admit(&actor("quiet"), start);
        limiter.admit(&actor("busy"), start + Duration::from_millis(80));

        let evicted = limiter.evict_idle(start + Duration::from_millis(150));

        assert_eq!(evicted, 1);
        assert_eq!(limiter.tracked_actors(), 1);
    }

    #[test]
    fn concurrent_admissions_never_exceed_limit() {
        let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)));
        let now = Instant::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.admit(&MemberId::new("bob"), now).is_admitted())
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();

        assert_eq!(admitted, 5);
    }
}

use std::time::{Duration, Instant};

/// How long a 429 keeps the request interval widened.
const BACKOFF_WINDOW: Duration = Duration::from_secs(60);

/// Cap on the interval multiplier while backing off.
const MAX_INTERVAL_MULTIPLIER: u32 = 8;

/// Cap on the post-429 wait when the server sends no Retry-After.
const MAX_RETRY_WAIT_SECS: u64 = 30;

/// Wait prescribed when a Retry-After header is present but unparseable.
const MALFORMED_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Adaptive spacing between remote calls.
///
/// Requests are held to a minimum inter-request interval. After a 429 the
/// effective interval is multiplied exponentially (capped) for as long as
/// the failure is recent; sustained successes decay the interval back
/// toward the baseline. All delay computation is pure — callers pass `now`
/// and do their own sleeping — so backoff behavior is testable without
/// waiting.
#[derive(Debug)]
pub struct RateLimiter {
    base_interval: Duration,
    current_interval: Duration,
    consecutive_429s: u32,
    last_request: Option<Instant>,
    last_429: Option<Instant>,
}

impl RateLimiter {
    pub fn new(base_interval: Duration) -> Self {
        Self {
            base_interval,
            current_interval: base_interval,
            consecutive_429s: 0,
            last_request: None,
            last_429: None,
        }
    }

    /// How long to hold the next request. Clears the failure streak once
    /// the backoff window has passed.
    pub fn pre_request_delay(&mut self, now: Instant) -> Duration {
        let backing_off = self.consecutive_429s > 0
            && self
                .last_429
                .is_some_and(|at| now.duration_since(at) < BACKOFF_WINDOW);

        let effective = if backing_off {
            let multiplier = 2u32
                .saturating_pow(self.consecutive_429s)
                .min(MAX_INTERVAL_MULTIPLIER);
            self.current_interval * multiplier
        } else {
            self.consecutive_429s = 0;
            self.current_interval
        };

        match self.last_request {
            Some(at) => effective.saturating_sub(now.duration_since(at)),
            None => Duration::ZERO,
        }
    }

    /// Record that a request is going out now.
    pub fn note_request(&mut self, now: Instant) {
        self.last_request = Some(now);
    }

    /// Record a "too many requests" response.
    pub fn note_429(&mut self, now: Instant) {
        self.consecutive_429s += 1;
        self.last_429 = Some(now);
    }

    /// Wait to honor after a 429: the server-supplied delay when present and
    /// parseable, else exponential in the failure streak, capped.
    pub fn retry_wait(&self, retry_after: Option<&str>) -> Duration {
        match retry_after {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => MALFORMED_RETRY_WAIT,
            },
            None => Duration::from_secs(
                2u64.saturating_pow(self.consecutive_429s)
                    .min(MAX_RETRY_WAIT_SECS),
            ),
        }
    }

    /// Record a successful response: decay the interval toward baseline.
    pub fn note_success(&mut self) {
        if self.consecutive_429s == 0 && self.current_interval > self.base_interval {
            let decayed = self.current_interval.mul_f64(0.9);
            self.current_interval = decayed.max(self.base_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(100);

    #[test]
    fn first_request_is_immediate() {
        let mut limiter = RateLimiter::new(BASE);
        assert_eq!(limiter.pre_request_delay(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn back_to_back_requests_wait_out_the_interval() {
        let mut limiter = RateLimiter::new(BASE);
        let t0 = Instant::now();
        limiter.note_request(t0);

        let delay = limiter.pre_request_delay(t0 + Duration::from_millis(30));
        assert_eq!(delay, Duration::from_millis(70));

        let delay = limiter.pre_request_delay(t0 + Duration::from_millis(150));
        assert_eq!(delay, Duration::ZERO);
    }

    #[test]
    fn consecutive_429s_increase_the_retry_wait_until_capped() {
        let mut limiter = RateLimiter::new(BASE);
        let t0 = Instant::now();

        let mut waits = Vec::new();
        for _ in 0..3 {
            limiter.note_429(t0);
            waits.push(limiter.retry_wait(None));
        }
        assert_eq!(
            waits,
            [
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ],
            "each failure strictly increases the wait"
        );

        for _ in 0..4 {
            limiter.note_429(t0);
        }
        assert_eq!(
            limiter.retry_wait(None),
            Duration::from_secs(MAX_RETRY_WAIT_SECS),
            "the wait never exceeds the cap"
        );
    }

    #[test]
    fn retry_after_header_is_honored() {
        let mut limiter = RateLimiter::new(BASE);
        limiter.note_429(Instant::now());
        assert_eq!(limiter.retry_wait(Some("12")), Duration::from_secs(12));
        assert_eq!(limiter.retry_wait(Some("soon")), MALFORMED_RETRY_WAIT);
    }

    #[test]
    fn backoff_widens_the_request_interval_within_the_window() {
        let mut limiter = RateLimiter::new(BASE);
        let t0 = Instant::now();
        limiter.note_request(t0);
        limiter.note_429(t0);
        limiter.note_429(t0);

        // 2 failures -> 4x interval = 400ms; 10ms elapsed leaves 390ms.
        let delay = limiter.pre_request_delay(t0 + Duration::from_millis(10));
        assert_eq!(delay, Duration::from_millis(390));
    }

    #[test]
    fn interval_multiplier_is_capped() {
        let mut limiter = RateLimiter::new(BASE);
        let t0 = Instant::now();
        limiter.note_request(t0);
        for _ in 0..6 {
            limiter.note_429(t0);
        }

        // 2^6 would be 64x; the multiplier caps at 8x = 800ms.
        let delay = limiter.pre_request_delay(t0 + Duration::from_millis(0));
        assert_eq!(delay, Duration::from_millis(800));
    }

    #[test]
    fn failure_streak_clears_after_the_window() {
        let mut limiter = RateLimiter::new(BASE);
        let t0 = Instant::now();
        limiter.note_request(t0);
        limiter.note_429(t0);

        let later = t0 + BACKOFF_WINDOW + Duration::from_secs(1);
        let delay = limiter.pre_request_delay(later);
        assert_eq!(delay, Duration::ZERO);

        limiter.note_429(later);
        assert_eq!(
            limiter.retry_wait(None),
            Duration::from_secs(2),
            "a fresh failure after the reset starts the sequence over"
        );
    }
}

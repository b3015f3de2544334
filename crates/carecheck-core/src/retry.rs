//! Fixed-delay retry for downloads
//!
//! The decision is a pure function of (attempt, failure kind); the loop around it
//! only sleeps and logs.

use std::time::Duration;

use crate::error::FailureKind;
use crate::http::Fetch;

/// Retry budget and pauses between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Pause after a read timeout
    pub timeout_delay: Duration,
    /// Pause after any other failure
    pub error_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_delay: Duration::from_secs(5),
            error_delay: Duration::from_secs(2),
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    GiveUp,
}

impl RetryPolicy {
    /// Same budget, no pauses. Used by tests and offline runs.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            timeout_delay: Duration::ZERO,
            error_delay: Duration::ZERO,
        }
    }

    /// Decide after attempt number `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        match kind {
            FailureKind::Timeout => RetryDecision::Retry(self.timeout_delay),
            FailureKind::Other => RetryDecision::Retry(self.error_delay),
        }
    }
}

/// Download `url`, retrying per `policy`.
///
/// Returns `None` once the budget is exhausted; the caller moves on to the next item.
pub fn download_with_retry(
    fetcher: &dyn Fetch,
    url: &str,
    policy: &RetryPolicy,
) -> Option<Vec<u8>> {
    retry_with_sleep(fetcher, url, policy, std::thread::sleep)
}

fn retry_with_sleep(
    fetcher: &dyn Fetch,
    url: &str,
    policy: &RetryPolicy,
    mut sleep: impl FnMut(Duration),
) -> Option<Vec<u8>> {
    let mut attempt = 1u32;
    loop {
        match fetcher.get(url) {
            Ok(body) => return Some(body),
            Err(e) => match policy.decide(attempt, e.kind()) {
                RetryDecision::Retry(delay) => {
                    log::warn!(
                        "{url}: attempt {attempt}/{} failed: {e}, retrying in {delay:?}",
                        policy.max_attempts
                    );
                    sleep(delay);
                    attempt += 1;
                }
                RetryDecision::GiveUp => {
                    log::warn!(
                        "{url}: attempt {attempt}/{} failed: {e}, giving up",
                        policy.max_attempts
                    );
                    return None;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::error::FetchError;

    /// Replays a fixed sequence of outcomes and counts calls.
    struct Scripted {
        outcomes: RefCell<VecDeque<Result<Vec<u8>, FetchError>>>,
        calls: RefCell<u32>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<Vec<u8>, FetchError>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.borrow()
        }
    }

    impl Fetch for Scripted {
        fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            *self.calls.borrow_mut() += 1;
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(transport()))
        }
    }

    fn timeout() -> FetchError {
        FetchError::Timeout {
            message: "read timed out".to_string(),
        }
    }

    fn transport() -> FetchError {
        FetchError::Transport {
            message: "connection reset".to_string(),
        }
    }

    fn not_found() -> FetchError {
        FetchError::Status {
            status: 404,
            message: "Not Found".to_string(),
        }
    }

    #[test]
    fn decide_timeout_waits_longer() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(1, FailureKind::Timeout),
            RetryDecision::Retry(Duration::from_secs(5))
        );
        assert_eq!(
            policy.decide(1, FailureKind::Other),
            RetryDecision::Retry(Duration::from_secs(2))
        );
    }

    #[test]
    fn decide_gives_up_on_last_attempt() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            policy.decide(2, FailureKind::Other),
            RetryDecision::Retry(_)
        ));
        assert_eq!(policy.decide(3, FailureKind::Other), RetryDecision::GiveUp);
        assert_eq!(policy.decide(3, FailureKind::Timeout), RetryDecision::GiveUp);
    }

    #[test]
    fn three_attempts_total() {
        let fetcher = Scripted::new(vec![Err(not_found()), Err(not_found()), Err(not_found())]);
        let body = retry_with_sleep(&fetcher, "u", &RetryPolicy::default(), |_| {});
        assert!(body.is_none());
        assert_eq!(fetcher.calls(), 3);
    }

    #[test]
    fn pauses_follow_failure_kind() {
        let fetcher = Scripted::new(vec![Err(timeout()), Err(transport()), Err(timeout())]);
        let mut slept = Vec::new();
        let body = retry_with_sleep(&fetcher, "u", &RetryPolicy::default(), |d| slept.push(d));
        assert!(body.is_none());
        // no pause after the final attempt
        assert_eq!(slept, vec![Duration::from_secs(5), Duration::from_secs(2)]);
    }

    #[test]
    fn success_after_failure() {
        let fetcher = Scripted::new(vec![Err(timeout()), Ok(b"%PDF".to_vec())]);
        let body = retry_with_sleep(&fetcher, "u", &RetryPolicy::default(), |_| {});
        assert_eq!(body.as_deref(), Some(&b"%PDF"[..]));
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn first_success_makes_one_call() {
        let fetcher = Scripted::new(vec![Ok(Vec::new())]);
        assert!(download_with_retry(&fetcher, "u", &RetryPolicy::immediate(3)).is_some());
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn single_attempt_budget() {
        let fetcher = Scripted::new(vec![Err(timeout()), Ok(Vec::new())]);
        assert!(download_with_retry(&fetcher, "u", &RetryPolicy::immediate(1)).is_none());
        assert_eq!(fetcher.calls(), 1);
    }
}

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::metrics_source::{MetricsError, MetricsErrorKind};

/// Observable breaker position, derived from the failure window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    /// Cooling down; every call is turned away.
    Open,
    /// Cooldown elapsed; the next call is admitted as a trial.
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive upstream failures that open the breaker.
    pub failure_threshold: u32,
    /// How long an open breaker turns calls away before a trial call.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// How an outcome affects the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Healthy,
    Failed,
    Neutral,
}

fn verdict<T>(outcome: &Result<T, MetricsError>) -> Verdict {
    match outcome {
        Ok(_) => Verdict::Healthy,
        Err(error) => match error.kind() {
            // The upstream answered; it just had nothing for this target.
            MetricsErrorKind::NoData => Verdict::Healthy,
            MetricsErrorKind::Authentication
            | MetricsErrorKind::Transport
            | MetricsErrorKind::Upstream
            | MetricsErrorKind::Decode => Verdict::Failed,
            MetricsErrorKind::CircuitOpen
            | MetricsErrorKind::MissingCredentials
            | MetricsErrorKind::InvalidTarget => Verdict::Neutral,
        },
    }
}

#[derive(Debug, Default)]
struct FailureWindow {
    consecutive_failures: u32,
    open_until: Option<Instant>,
    trial_in_flight: bool,
}

/// Gate in front of the upstream metrics API.
///
/// After `failure_threshold` consecutive upstream failures the breaker turns
/// calls away with [`MetricsErrorKind::CircuitOpen`] for `cooldown`, so a dead
/// upstream costs one fast fallback instead of one timeout per page render.
/// Once the cooldown passes a single trial call is admitted and the cooldown
/// is rearmed behind it, so a trial that never reports back only delays the
/// next one. The trial's outcome closes the breaker or keeps it open.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    window: Mutex<FailureWindow>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            window: Mutex::new(FailureWindow::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FailureWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// # Errors
    ///
    /// `CircuitOpen` while cooling down, including while a trial call is out.
    pub fn admit(&self) -> Result<(), MetricsError> {
        let mut window = self.lock();
        let Some(open_until) = window.open_until else {
            return Ok(());
        };

        let now = Instant::now();
        if now < open_until {
            return Err(MetricsError::circuit_open());
        }

        window.open_until = now.checked_add(self.config.cooldown);
        window.trial_in_flight = true;
        Ok(())
    }

    /// Feeds an outcome back. Returns the failure count when this outcome is
    /// the one that opened the breaker.
    pub fn observe<T>(&self, outcome: &Result<T, MetricsError>) -> Option<u32> {
        let mut window = self.lock();
        match verdict(outcome) {
            Verdict::Healthy => {
                *window = FailureWindow::default();
                None
            }
            Verdict::Neutral => None,
            Verdict::Failed => {
                window.consecutive_failures = window.consecutive_failures.saturating_add(1);
                let reopens = window.trial_in_flight;
                window.trial_in_flight = false;

                let opens = reopens
                    || (window.open_until.is_none()
                        && window.consecutive_failures >= self.config.failure_threshold);
                if !opens {
                    return None;
                }

                window.open_until = Instant::now().checked_add(self.config.cooldown);
                (!reopens).then_some(window.consecutive_failures)
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        let window = self.lock();
        match window.open_until {
            None => CircuitState::Closed,
            Some(open_until) if Instant::now() < open_until => CircuitState::Open,
            Some(_) => CircuitState::HalfOpen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(failure_threshold: u32, cooldown: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold,
            cooldown,
        })
    }

    fn upstream_failure() -> Result<(), MetricsError> {
        Err(MetricsError::upstream(503, "Service Unavailable"))
    }

    #[test]
    fn opens_on_the_threshold_failure_and_reports_it_once() {
        let breaker = breaker(2, Duration::from_secs(60));

        assert_eq!(breaker.observe(&upstream_failure()), None);
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.observe(&upstream_failure()), Some(2));
        assert_eq!(breaker.state(), CircuitState::Open);

        let refused = breaker.admit().expect_err("open breaker refuses");
        assert_eq!(refused.kind(), MetricsErrorKind::CircuitOpen);
    }

    #[test]
    fn empty_answers_and_local_errors_never_open_it() {
        let breaker = breaker(1, Duration::from_secs(60));

        breaker.observe::<()>(&Err(MetricsError::no_data("quiet.example")));
        breaker.observe::<()>(&Err(MetricsError::missing_credentials()));

        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.admit().is_ok());
    }

    #[test]
    fn no_data_resets_the_failure_streak() {
        let breaker = breaker(2, Duration::from_secs(60));

        breaker.observe(&upstream_failure());
        breaker.observe::<()>(&Err(MetricsError::no_data("quiet.example")));
        breaker.observe(&upstream_failure());

        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn admits_one_trial_call_after_cooldown_then_closes_on_success() {
        let breaker = breaker(1, Duration::from_millis(50));
        breaker.observe(&upstream_failure());

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert!(breaker.admit().is_ok());
        assert!(breaker.admit().is_err(), "second caller waits for the trial call");

        breaker.observe(&Ok(()));
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn failed_trial_call_restarts_the_cooldown() {
        let breaker = breaker(3, Duration::from_millis(50));
        for _ in 0..3 {
            breaker.observe(&upstream_failure());
        }

        std::thread::sleep(Duration::from_millis(60));
        assert!(breaker.admit().is_ok());
        assert_eq!(breaker.observe(&upstream_failure()), None);

        assert!(breaker.admit().is_err());
    }
}
